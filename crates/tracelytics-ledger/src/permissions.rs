use crate::error::{LedgerError, LedgerResult};

/// Parse a comma-separated capability list such as `"batch:create,batch:patch"`.
///
/// Entries are trimmed and must read `entity:action` with both halves
/// non-empty. Later duplicates are dropped; order is otherwise preserved.
/// The empty string is the empty set.
pub fn parse_permissions(raw: &str) -> LedgerResult<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut permissions: Vec<String> = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        match entry.split_once(':') {
            Some((entity, action))
                if !entity.is_empty() && !action.is_empty() && !action.contains(':') => {}
            _ => {
                return Err(LedgerError::invalid(format!(
                    "invalid permission {entry:?}: expected entity:action"
                )))
            }
        }
        if !permissions.iter().any(|p| p == entry) {
            permissions.push(entry.to_string());
        }
    }
    Ok(permissions)
}

/// Render a capability for an entity and action.
pub fn capability(entity: &str, action: &str) -> String {
    format!("{entity}:{action}")
}

pub fn has_permission(permissions: &[String], entity: &str, action: &str) -> bool {
    let wanted = capability(entity, action);
    permissions.iter().any(|p| *p == wanted)
}

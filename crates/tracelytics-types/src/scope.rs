//! Tenant scopes.
//!
//! Every table is partitioned by a scope, the name of the company that owns
//! the rows. Scope names follow the ledger account-name grammar:
//! - 1 to 12 characters
//! - only `.`, `1`-`5` and `a`-`z`
//! - must not end with `.`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum length of a scope name.
pub const MAX_SCOPE_LEN: usize = 12;

const ALLOWED_CHARS: &str = ".12345abcdefghijklmnopqrstuvwxyz";

/// A validated tenant name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope(String);

impl Scope {
    /// Validate and wrap a scope name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let invalid = |reason: String| TypeError::InvalidScope {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("scope must not be empty".into()));
        }
        if name.len() > MAX_SCOPE_LEN {
            return Err(invalid(format!(
                "scope must be at most {MAX_SCOPE_LEN} characters"
            )));
        }
        if let Some(ch) = name.chars().find(|ch| !ALLOWED_CHARS.contains(*ch)) {
            return Err(invalid(format!("contains forbidden character: {ch:?}")));
        }
        if name.ends_with('.') {
            return Err(invalid("must not end with '.'".into()));
        }

        Ok(Self(name))
    }

    /// The scope name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({})", self.0)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Scope {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Scope {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_company_names() {
        assert_eq!(Scope::new("raptor").unwrap().as_str(), "raptor");
        assert!(Scope::new("a.b.c").is_ok());
        assert!(Scope::new("supplier1234").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(Scope::new("").is_err());
    }

    #[test]
    fn rejects_too_long() {
        assert!(Scope::new("abcdefghijklm").is_err());
    }

    #[test]
    fn rejects_forbidden_characters() {
        for bad in ["Raptor", "rap tor", "raptor6", "rap_tor", "raptor!"] {
            assert!(Scope::new(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn rejects_trailing_dot() {
        assert!(Scope::new("raptor.").is_err());
    }

    #[test]
    fn serde_validates() {
        let scope: Scope = serde_json::from_str("\"raptor\"").unwrap();
        assert_eq!(scope.to_string(), "raptor");
        assert!(serde_json::from_str::<Scope>("\"NOT VALID\"").is_err());
    }
}

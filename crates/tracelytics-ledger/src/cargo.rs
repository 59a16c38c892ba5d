//! Per-delivery cargo sub-ledger.
//!
//! A delivery's cargo maps item checksums to the product they are an instance
//! of, the running quantity, and the last applied delta. Deltas are additive
//! and never deduplicated: applying the same list twice doubles its effect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracelytics_crypto::checksum;
use tracelytics_types::Checksum;

use crate::error::{LedgerError, LedgerResult};

/// State of one cargo item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    pub product_checksum: Checksum,
    pub quantity: u64,
    pub delta: i64,
}

/// Serialized form of a cargo map entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoEntry {
    pub key: Checksum,
    pub value: Cargo,
}

/// A signed change to one item, addressed by natural ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoDelta {
    pub item_id: String,
    pub product_id: String,
    pub delta: i64,
}

impl CargoDelta {
    pub fn new(item_id: impl Into<String>, product_id: impl Into<String>, delta: i64) -> Self {
        Self {
            item_id: item_id.into(),
            product_id: product_id.into(),
            delta,
        }
    }
}

/// Cargo of a single delivery, ordered by item checksum.
///
/// Serialized as a list of `{key, value}` entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CargoEntry>", into = "Vec<CargoEntry>")]
pub struct CargoLedger(BTreeMap<Checksum, Cargo>);

impl CargoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pre-hashed entries. Duplicate item keys are rejected.
    pub fn from_entries(entries: Vec<CargoEntry>) -> LedgerResult<Self> {
        let mut items = BTreeMap::new();
        for entry in entries {
            if items.insert(entry.key, entry.value).is_some() {
                return Err(LedgerError::invalid(format!(
                    "duplicate cargo item {}",
                    entry.key
                )));
            }
        }
        Ok(Self(items))
    }

    pub fn get(&self, item: &Checksum) -> Option<&Cargo> {
        self.0.get(item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> Vec<CargoEntry> {
        self.0
            .iter()
            .map(|(key, value)| CargoEntry {
                key: *key,
                value: *value,
            })
            .collect()
    }

    /// Apply a list of deltas in order.
    ///
    /// Existing items get `quantity += delta` and `delta` overwritten; their
    /// product checksum is kept. Unseen items are inserted with
    /// `quantity = delta`. A quantity may never drop below zero; if any entry
    /// would, the ledger is left exactly as it was.
    pub fn apply_deltas(&mut self, deltas: &[CargoDelta]) -> LedgerResult<()> {
        let mut next = self.0.clone();
        for d in deltas {
            if d.item_id.is_empty() {
                return Err(LedgerError::invalid("cargo item id is missing."));
            }
            let item = checksum(&d.item_id);
            match next.get_mut(&item) {
                Some(cargo) => {
                    cargo.quantity = cargo.quantity.checked_add_signed(d.delta).ok_or_else(|| {
                        LedgerError::invalid(format!(
                            "cargo item {} cannot go from {} by {}",
                            d.item_id, cargo.quantity, d.delta
                        ))
                    })?;
                    cargo.delta = d.delta;
                }
                None => {
                    if d.product_id.is_empty() {
                        return Err(LedgerError::invalid("cargo product id is missing."));
                    }
                    let quantity = u64::try_from(d.delta).map_err(|_| {
                        LedgerError::invalid(format!(
                            "cargo item {} does not exist; cannot apply {}",
                            d.item_id, d.delta
                        ))
                    })?;
                    next.insert(
                        item,
                        Cargo {
                            product_checksum: checksum(&d.product_id),
                            quantity,
                            delta: d.delta,
                        },
                    );
                }
            }
        }
        self.0 = next;
        Ok(())
    }
}

impl TryFrom<Vec<CargoEntry>> for CargoLedger {
    type Error = LedgerError;

    fn try_from(entries: Vec<CargoEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<CargoLedger> for Vec<CargoEntry> {
    fn from(ledger: CargoLedger) -> Self {
        ledger.entries()
    }
}

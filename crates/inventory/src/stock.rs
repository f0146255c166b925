use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Balance-row key.
///
/// Balances are keyed by product and bin only; batch and expiry are metadata
/// carried on the row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub part_number: String,
    pub bin_code: String,
}

impl StockKey {
    pub fn new(part_number: impl Into<String>, bin_code: impl Into<String>) -> Self {
        Self {
            part_number: part_number.into(),
            bin_code: bin_code.into(),
        }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.part_number, self.bin_code)
    }
}

/// Materialised on-hand balance of one product in one bin.
///
/// A row with quantity zero may remain present; readers treat it the same as
/// an absent row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub part_number: String,
    pub bin_code: String,
    pub quantity: u64,
    pub batch: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub date_received: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl StockItem {
    pub(crate) fn empty(key: &StockKey, now: DateTime<Utc>) -> Self {
        Self {
            part_number: key.part_number.clone(),
            bin_code: key.bin_code.clone(),
            quantity: 0,
            batch: None,
            expiry_date: None,
            date_received: now,
            last_updated: now,
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.part_number.clone(), self.bin_code.clone())
    }
}

/// Trim an optional free-text field; blank becomes `None`.
pub(crate) fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

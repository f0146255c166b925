use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::Entity;

/// Default soft capacity for a bin.
pub const DEFAULT_BIN_CAPACITY: u64 = 100;

/// Operational status of a bin location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

/// Attributes supplied when registering a bin.
///
/// Zone/aisle/shelf are advisory; capacity is a soft cap that nothing enforces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BinAttributes {
    pub zone: Option<String>,
    pub aisle: Option<String>,
    pub shelf: Option<String>,
    pub capacity: Option<u64>,
    pub status: Option<BinStatus>,
}

/// A storage location, identified by its unique bin code (e.g. `A-12-04`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinLocation {
    code: String,
    pub zone: Option<String>,
    pub aisle: Option<String>,
    pub shelf: Option<String>,
    pub capacity: u64,
    pub status: BinStatus,
    created_at: DateTime<Utc>,
}

impl BinLocation {
    /// `code` is expected to be normalised already.
    pub fn new(code: String, attrs: BinAttributes, created_at: DateTime<Utc>) -> Self {
        Self {
            code,
            zone: attrs.zone,
            aisle: attrs.aisle,
            shelf: attrs.shelf,
            capacity: attrs.capacity.unwrap_or(DEFAULT_BIN_CAPACITY),
            status: attrs.status.unwrap_or_default(),
            created_at,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for BinLocation {
    type Id = String;
    const KIND: &'static str = "bin";

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

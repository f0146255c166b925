//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::UserId;

/// Marker trait for value objects.
///
/// Value objects have no identity of their own; two instances holding the same
/// attribute values are interchangeable. They are immutable: to "change" one,
/// build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A strictly positive count of units moved by a single ledger operation.
///
/// Movements always store a positive magnitude next to a kind tag, never a
/// signed integer, so the only way to obtain a `Quantity` is through
/// validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct Quantity(u64);

impl Quantity {
    /// Validate a raw (possibly signed) request value.
    pub fn positive(raw: i64) -> DomainResult<Self> {
        if raw <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be greater than zero (got {raw})"
            )));
        }
        Ok(Self(raw as u64))
    }

    /// Build from a non-zero magnitude (e.g. `abs(variance)`).
    pub fn from_magnitude(value: u64) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::positive(value)
    }
}

impl From<Quantity> for u64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl ValueObject for Quantity {}

/// Opaque, already-authenticated actor attached to movements and stocktakes.
///
/// The domain never validates credentials; it only records who acted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    pub user_id: UserId,
    pub username: String,
}

impl ActorRef {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

impl ValueObject for ActorRef {}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{ActorRef, MovementId, Quantity};

/// What kind of balance change a movement records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Receive,
    Dispatch,
    Transfer,
    Adjustment,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Receive => "receive",
            MovementKind::Dispatch => "dispatch",
            MovementKind::Transfer => "transfer",
            MovementKind::Adjustment => "adjustment",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable ledger entry.
///
/// Bin population by kind:
/// - receive: `to_bin` only
/// - dispatch: `from_bin` only
/// - transfer: both
/// - adjustment: `to_bin` when stock was found, `from_bin` when it went missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub kind: MovementKind,
    pub part_number: String,
    pub from_bin: Option<String>,
    pub to_bin: Option<String>,
    pub quantity: Quantity,
    pub actor: ActorRef,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl StockMovement {
    /// Net effect on the product's total on-hand stock.
    pub fn net_effect(&self) -> i128 {
        let q = i128::from(self.quantity.get());
        match (self.from_bin.is_some(), self.to_bin.is_some()) {
            (false, true) => q,
            (true, false) => -q,
            _ => 0,
        }
    }

    /// Net effect on the balance of a single bin.
    pub fn effect_on_bin(&self, bin_code: &str) -> i128 {
        let q = i128::from(self.quantity.get());
        let mut effect = 0;
        if self.to_bin.as_deref() == Some(bin_code) {
            effect += q;
        }
        if self.from_bin.as_deref() == Some(bin_code) {
            effect -= q;
        }
        effect
    }

    /// Whether the bin references are consistent with the kind.
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            MovementKind::Receive => self.from_bin.is_none() && self.to_bin.is_some(),
            MovementKind::Dispatch => self.from_bin.is_some() && self.to_bin.is_none(),
            MovementKind::Transfer => {
                self.from_bin.is_some() && self.to_bin.is_some() && self.from_bin != self.to_bin
            }
            MovementKind::Adjustment => self.from_bin.is_some() != self.to_bin.is_some(),
        }
    }
}

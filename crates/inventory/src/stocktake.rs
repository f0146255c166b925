use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{ActorRef, Entity, MovementId, StocktakeId};

/// Review state of a stocktake record.
///
/// Records are created `Pending`; nothing in the system advances them yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StocktakeStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
}

/// Append-only record of one physical count.
///
/// `variance = counted_quantity - expected_quantity`, always. When the
/// variance is non-zero, `adjustment` points at the ledger movement that
/// corrected the balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stocktake {
    pub id: StocktakeId,
    pub part_number: String,
    pub bin_code: String,
    pub expected_quantity: u64,
    pub counted_quantity: u64,
    pub variance: i64,
    pub actor: ActorRef,
    pub notes: Option<String>,
    pub status: StocktakeStatus,
    pub taken_at: DateTime<Utc>,
    pub adjustment: Option<MovementId>,
}

impl Stocktake {
    pub fn has_discrepancy(&self) -> bool {
        self.variance != 0
    }
}

impl Entity for Stocktake {
    type Id = StocktakeId;
    const KIND: &'static str = "stocktake";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

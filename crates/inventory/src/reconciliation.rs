//! Reconciliation: physical counts against ledger balances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{ActorRef, DomainError, DomainResult, StocktakeId};

use crate::ledger::{Adjustment, Ledger, MAX_BALANCE};
use crate::stock::normalize_text;
use crate::stocktake::{Stocktake, StocktakeStatus};

/// Command: record a physical count of (product, bin).
///
/// `counted_quantity` is the raw operator input and is validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountStock {
    pub part_number: String,
    pub bin_code: String,
    pub counted_quantity: i64,
    pub notes: Option<String>,
    pub actor: ActorRef,
    pub occurred_at: DateTime<Utc>,
}

/// Append-only list of stocktake records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StocktakeLog {
    records: Vec<Stocktake>,
}

impl StocktakeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a count with the ledger and correct the balance on variance.
    ///
    /// The expected quantity is the balance immediately before the call (an
    /// absent row counts as zero). A zero variance records the stocktake and
    /// touches nothing else.
    pub fn reconcile(&mut self, ledger: &mut Ledger, cmd: CountStock) -> DomainResult<Stocktake> {
        if cmd.counted_quantity < 0 {
            return Err(DomainError::validation(format!(
                "counted quantity cannot be negative (got {})",
                cmd.counted_quantity
            )));
        }
        let counted = cmd.counted_quantity as u64;
        if counted > MAX_BALANCE {
            return Err(DomainError::validation(format!(
                "counted quantity exceeds the maximum of {MAX_BALANCE}"
            )));
        }

        let expected = ledger.balance_of(&cmd.part_number, &cmd.bin_code);
        // Both sides are bounded by MAX_BALANCE, so the difference fits.
        let variance = cmd.counted_quantity - expected as i64;
        let notes = normalize_text(cmd.notes);

        let adjustment = if variance != 0 {
            let movement = ledger.apply_adjustment(Adjustment {
                part_number: cmd.part_number.clone(),
                bin_code: cmd.bin_code.clone(),
                counted,
                variance,
                notes: Some(match &notes {
                    Some(n) => format!("Stocktake adjustment: {variance} ({n})"),
                    None => format!("Stocktake adjustment: {variance}"),
                }),
                actor: cmd.actor.clone(),
                occurred_at: cmd.occurred_at,
            })?;
            Some(movement.id)
        } else {
            None
        };

        let record = Stocktake {
            id: StocktakeId::new(),
            part_number: cmd.part_number,
            bin_code: cmd.bin_code,
            expected_quantity: expected,
            counted_quantity: counted,
            variance,
            actor: cmd.actor,
            notes,
            status: StocktakeStatus::Pending,
            taken_at: cmd.occurred_at,
            adjustment,
        };
        self.records.push(record.clone());

        if variance != 0 {
            tracing::warn!(
                part_number = %record.part_number,
                bin_code = %record.bin_code,
                expected,
                counted,
                variance,
                "stocktake discrepancy corrected"
            );
        } else {
            tracing::info!(
                part_number = %record.part_number,
                bin_code = %record.bin_code,
                counted,
                "stocktake matched ledger"
            );
        }

        Ok(record)
    }

    /// Records in the order they were taken.
    pub fn records(&self) -> &[Stocktake] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

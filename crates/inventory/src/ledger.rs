//! Stock ledger: materialised balances plus the append-only movement log.
//!
//! Every public mutation validates all of its preconditions before touching
//! state, then changes the balance(s) and appends exactly one movement. A
//! rejected operation therefore leaves both the balances and the log exactly as
//! they were.
//!
//! Invariant: for every product, the signed sum of its movements equals the
//! sum of its current balances.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{ActorRef, DomainError, DomainResult, MovementId, Quantity};

use crate::movement::{MovementKind, StockMovement};
use crate::stock::{StockItem, StockKey, normalize_text};

/// Largest balance a row may hold.
///
/// Kept within `i64` so that stocktake variances are always representable.
pub const MAX_BALANCE: u64 = i64::MAX as u64;

/// Command: put stock into a bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receive {
    pub part_number: String,
    pub bin_code: String,
    pub quantity: Quantity,
    pub batch: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub actor: ActorRef,
    pub occurred_at: DateTime<Utc>,
}

/// Command: take stock out of a bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub part_number: String,
    pub bin_code: String,
    pub quantity: Quantity,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub actor: ActorRef,
    pub occurred_at: DateTime<Utc>,
}

/// Command: move stock between two bins in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub part_number: String,
    pub from_bin: String,
    pub to_bin: String,
    pub quantity: Quantity,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub actor: ActorRef,
    pub occurred_at: DateTime<Utc>,
}

/// Correction that overwrites a balance with a physical count.
///
/// Bypasses insufficient-stock checks; `variance` must equal
/// `counted - current balance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub part_number: String,
    pub bin_code: String,
    pub counted: u64,
    pub variance: i64,
    pub notes: Option<String>,
    pub actor: ActorRef,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiveOutcome {
    pub balance: u64,
    pub movement: StockMovement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub remaining: u64,
    pub movement: StockMovement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub from_remaining: u64,
    pub to_quantity: u64,
    pub movement: StockMovement,
}

/// Balances + movement log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LedgerRecord", into = "LedgerRecord")]
pub struct Ledger {
    items: BTreeMap<StockKey, StockItem>,
    movements: Vec<StockMovement>,
}

/// Flat persisted form (JSON object keys must be strings).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerRecord {
    items: Vec<StockItem>,
    movements: Vec<StockMovement>,
}

impl From<LedgerRecord> for Ledger {
    fn from(record: LedgerRecord) -> Self {
        Self {
            items: record
                .items
                .into_iter()
                .map(|item| (item.key(), item))
                .collect(),
            movements: record.movements,
        }
    }
}

impl From<Ledger> for LedgerRecord {
    fn from(ledger: Ledger) -> Self {
        Self {
            items: ledger.items.into_values().collect(),
            movements: ledger.movements,
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------
    // Reads
    // -------------------------

    /// Balance of (product, bin); an absent row reads as zero.
    pub fn balance_of(&self, part_number: &str, bin_code: &str) -> u64 {
        self.items
            .get(&StockKey::new(part_number, bin_code))
            .map(|item| item.quantity)
            .unwrap_or(0)
    }

    pub fn item(&self, part_number: &str, bin_code: &str) -> Option<&StockItem> {
        self.items.get(&StockKey::new(part_number, bin_code))
    }

    /// All balance rows, ordered by (part number, bin code).
    pub fn balances(&self) -> impl Iterator<Item = &StockItem> {
        self.items.values()
    }

    /// Rows of one product.
    pub fn items_for_product<'a>(
        &'a self,
        part_number: &'a str,
    ) -> impl Iterator<Item = &'a StockItem> + 'a {
        self.items
            .values()
            .filter(move |item| item.part_number == part_number)
    }

    /// Total on-hand quantity of a product across all bins.
    ///
    /// Widened to `u128`: each row is capped at `MAX_BALANCE`, the sum is not.
    pub fn on_hand(&self, part_number: &str) -> u128 {
        self.items_for_product(part_number)
            .map(|item| u128::from(item.quantity))
            .sum()
    }

    /// Total quantity stored in a bin across all products.
    pub fn bin_usage(&self, bin_code: &str) -> u128 {
        self.items
            .values()
            .filter(|item| item.bin_code == bin_code)
            .map(|item| u128::from(item.quantity))
            .sum()
    }

    /// Movement log in append order.
    pub fn movements(&self) -> &[StockMovement] {
        &self.movements
    }

    /// Signed sum of all movements of a product.
    pub fn net_movements(&self, part_number: &str) -> i128 {
        self.movements
            .iter()
            .filter(|m| m.part_number == part_number)
            .map(StockMovement::net_effect)
            .sum()
    }

    // -------------------------
    // Mutations
    // -------------------------

    /// Add stock to (product, bin), creating the row if needed.
    ///
    /// A batch-tagged receive only lands on a row holding the same batch, or on
    /// an empty untagged row (which adopts the batch). Distinct batches are
    /// never merged into one balance.
    pub fn receive(&mut self, cmd: Receive) -> DomainResult<ReceiveOutcome> {
        let key = StockKey::new(cmd.part_number.clone(), cmd.bin_code.clone());
        let batch = normalize_text(cmd.batch);
        let quantity = cmd.quantity.get();

        let (current, adopt_batch) = match self.items.get(&key) {
            None => (0, true),
            Some(item) => match (&item.batch, &batch) {
                (_, None) => (item.quantity, false),
                (Some(existing), Some(incoming)) if existing == incoming => {
                    (item.quantity, false)
                }
                (None, Some(_)) if item.quantity == 0 => (0, true),
                (existing, Some(incoming)) => {
                    return Err(DomainError::conflict(format!(
                        "bin '{}' holds {} of '{}'; cannot receive batch '{}' into it",
                        key.bin_code,
                        existing
                            .as_deref()
                            .map(|b| format!("batch '{b}'"))
                            .unwrap_or_else(|| "unbatched stock".to_string()),
                        key.part_number,
                        incoming
                    )));
                }
            },
        };

        let balance = checked_balance(current, quantity, &key)?;

        let item = self
            .items
            .entry(key.clone())
            .or_insert_with(|| StockItem::empty(&key, cmd.occurred_at));
        if adopt_batch {
            item.batch = batch;
            item.expiry_date = cmd.expiry_date;
        } else if item.expiry_date.is_none() {
            item.expiry_date = cmd.expiry_date;
        }
        item.quantity = balance;
        item.last_updated = cmd.occurred_at;

        let movement = StockMovement {
            id: MovementId::new(),
            kind: MovementKind::Receive,
            part_number: key.part_number.clone(),
            from_bin: None,
            to_bin: Some(key.bin_code.clone()),
            quantity: cmd.quantity,
            actor: cmd.actor,
            reference: normalize_text(cmd.reference),
            notes: normalize_text(cmd.notes),
            occurred_at: cmd.occurred_at,
        };
        self.movements.push(movement.clone());

        tracing::info!(
            part_number = %key.part_number,
            bin_code = %key.bin_code,
            quantity,
            balance,
            "stock received"
        );

        Ok(ReceiveOutcome { balance, movement })
    }

    /// Remove stock from (product, bin).
    pub fn dispatch(&mut self, cmd: Dispatch) -> DomainResult<DispatchOutcome> {
        let key = StockKey::new(cmd.part_number.clone(), cmd.bin_code.clone());
        let quantity = cmd.quantity.get();
        let remaining = self.checked_withdrawal(&key, quantity)?;

        if let Some(item) = self.items.get_mut(&key) {
            item.quantity = remaining;
            item.last_updated = cmd.occurred_at;
        }

        let movement = StockMovement {
            id: MovementId::new(),
            kind: MovementKind::Dispatch,
            part_number: key.part_number.clone(),
            from_bin: Some(key.bin_code.clone()),
            to_bin: None,
            quantity: cmd.quantity,
            actor: cmd.actor,
            reference: normalize_text(cmd.reference),
            notes: normalize_text(cmd.notes),
            occurred_at: cmd.occurred_at,
        };
        self.movements.push(movement.clone());

        tracing::info!(
            part_number = %key.part_number,
            bin_code = %key.bin_code,
            quantity,
            remaining,
            "stock dispatched"
        );

        Ok(DispatchOutcome {
            remaining,
            movement,
        })
    }

    /// Move stock from one bin to another as a single ledger entry.
    ///
    /// A newly created destination row inherits the source row's batch and
    /// expiry; an existing destination row keeps its own.
    pub fn transfer(&mut self, cmd: Transfer) -> DomainResult<TransferOutcome> {
        if cmd.from_bin == cmd.to_bin {
            return Err(DomainError::validation(
                "source and destination bins must differ",
            ));
        }

        let from_key = StockKey::new(cmd.part_number.clone(), cmd.from_bin.clone());
        let to_key = StockKey::new(cmd.part_number.clone(), cmd.to_bin.clone());
        let quantity = cmd.quantity.get();

        let from_remaining = self.checked_withdrawal(&from_key, quantity)?;
        let to_quantity =
            checked_balance(self.balance_of(&to_key.part_number, &to_key.bin_code), quantity, &to_key)?;

        let (batch, expiry_date) = match self.items.get_mut(&from_key) {
            Some(source) => {
                source.quantity = from_remaining;
                source.last_updated = cmd.occurred_at;
                (source.batch.clone(), source.expiry_date)
            }
            None => {
                return Err(DomainError::invariant(format!(
                    "source row {from_key} vanished during transfer"
                )));
            }
        };

        let dest = self.items.entry(to_key.clone()).or_insert_with(|| {
            let mut row = StockItem::empty(&to_key, cmd.occurred_at);
            row.batch = batch;
            row.expiry_date = expiry_date;
            row
        });
        dest.quantity = to_quantity;
        dest.last_updated = cmd.occurred_at;

        let movement = StockMovement {
            id: MovementId::new(),
            kind: MovementKind::Transfer,
            part_number: from_key.part_number.clone(),
            from_bin: Some(from_key.bin_code.clone()),
            to_bin: Some(to_key.bin_code.clone()),
            quantity: cmd.quantity,
            actor: cmd.actor,
            reference: normalize_text(cmd.reference),
            notes: normalize_text(cmd.notes),
            occurred_at: cmd.occurred_at,
        };
        self.movements.push(movement.clone());

        tracing::info!(
            part_number = %from_key.part_number,
            from_bin = %from_key.bin_code,
            to_bin = %to_key.bin_code,
            quantity,
            from_remaining,
            to_quantity,
            "stock transferred"
        );

        Ok(TransferOutcome {
            from_remaining,
            to_quantity,
            movement,
        })
    }

    /// Overwrite a balance with a counted quantity and log the correction.
    pub fn apply_adjustment(&mut self, adj: Adjustment) -> DomainResult<StockMovement> {
        let key = StockKey::new(adj.part_number.clone(), adj.bin_code.clone());
        if adj.counted > MAX_BALANCE {
            return Err(DomainError::validation(format!(
                "counted quantity exceeds the maximum of {MAX_BALANCE}"
            )));
        }

        let current = self.balance_of(&key.part_number, &key.bin_code);
        let expected_variance = adj.counted as i128 - current as i128;
        if adj.variance == 0 || i128::from(adj.variance) != expected_variance {
            return Err(DomainError::invariant(format!(
                "adjustment variance {} does not match balance {} and count {} for {}",
                adj.variance, current, adj.counted, key
            )));
        }

        let quantity = Quantity::from_magnitude(adj.variance.unsigned_abs())?;
        let (from_bin, to_bin) = if adj.variance > 0 {
            (None, Some(key.bin_code.clone()))
        } else {
            (Some(key.bin_code.clone()), None)
        };

        let item = self
            .items
            .entry(key.clone())
            .or_insert_with(|| StockItem::empty(&key, adj.occurred_at));
        item.quantity = adj.counted;
        item.last_updated = adj.occurred_at;

        let movement = StockMovement {
            id: MovementId::new(),
            kind: MovementKind::Adjustment,
            part_number: key.part_number.clone(),
            from_bin,
            to_bin,
            quantity,
            actor: adj.actor,
            reference: None,
            notes: normalize_text(adj.notes),
            occurred_at: adj.occurred_at,
        };
        self.movements.push(movement.clone());

        tracing::info!(
            part_number = %key.part_number,
            bin_code = %key.bin_code,
            variance = adj.variance,
            balance = adj.counted,
            "stock adjusted"
        );

        Ok(movement)
    }

    /// Remaining balance after taking `quantity`, or `InsufficientStock`.
    fn checked_withdrawal(&self, key: &StockKey, quantity: u64) -> DomainResult<u64> {
        let available = self.balance_of(&key.part_number, &key.bin_code);
        available
            .checked_sub(quantity)
            .ok_or_else(|| DomainError::InsufficientStock {
                part_number: key.part_number.clone(),
                bin_code: key.bin_code.clone(),
                available,
                requested: quantity,
            })
    }
}

fn checked_balance(current: u64, add: u64, key: &StockKey) -> DomainResult<u64> {
    current
        .checked_add(add)
        .filter(|total| *total <= MAX_BALANCE)
        .ok_or_else(|| {
            DomainError::invariant(format!(
                "balance of {key} would exceed the maximum of {MAX_BALANCE}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stockroom_core::UserId;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn actor() -> ActorRef {
        ActorRef::new(UserId::new(), "tester")
    }

    fn qty(n: i64) -> Quantity {
        Quantity::positive(n).unwrap()
    }

    fn receive(part: &str, bin: &str, n: i64) -> Receive {
        Receive {
            part_number: part.to_string(),
            bin_code: bin.to_string(),
            quantity: qty(n),
            batch: None,
            expiry_date: None,
            reference: None,
            notes: None,
            actor: actor(),
            occurred_at: test_time(),
        }
    }

    fn dispatch(part: &str, bin: &str, n: i64) -> Dispatch {
        Dispatch {
            part_number: part.to_string(),
            bin_code: bin.to_string(),
            quantity: qty(n),
            reference: None,
            notes: None,
            actor: actor(),
            occurred_at: test_time(),
        }
    }

    fn transfer(part: &str, from: &str, to: &str, n: i64) -> Transfer {
        Transfer {
            part_number: part.to_string(),
            from_bin: from.to_string(),
            to_bin: to.to_string(),
            quantity: qty(n),
            reference: None,
            notes: None,
            actor: actor(),
            occurred_at: test_time(),
        }
    }

    #[test]
    fn receive_then_dispatch_leaves_difference() {
        let mut ledger = Ledger::new();
        let received = ledger.receive(receive("BMG-12345", "A-12-04", 24)).unwrap();
        assert_eq!(received.balance, 24);

        let dispatched = ledger.dispatch(dispatch("BMG-12345", "A-12-04", 10)).unwrap();
        assert_eq!(dispatched.remaining, 14);
        assert_eq!(ledger.balance_of("BMG-12345", "A-12-04"), 14);

        let log = ledger.movements();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].kind, MovementKind::Receive);
        assert_eq!(log[0].quantity.get(), 24);
        assert_eq!(log[0].to_bin.as_deref(), Some("A-12-04"));
        assert_eq!(log[0].from_bin, None);
        assert_eq!(log[1].kind, MovementKind::Dispatch);
        assert_eq!(log[1].quantity.get(), 10);
        assert_eq!(log[1].from_bin.as_deref(), Some("A-12-04"));
        assert_eq!(log[1].to_bin, None);
    }

    #[test]
    fn dispatch_from_absent_row_is_insufficient() {
        let mut ledger = Ledger::new();
        let err = ledger.dispatch(dispatch("BMG-12345", "A-12-04", 1)).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert!(ledger.movements().is_empty());
        assert!(ledger.item("BMG-12345", "A-12-04").is_none());
    }

    #[test]
    fn overdraw_is_rejected_and_balance_unchanged() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 5)).unwrap();
        let before = ledger.clone();

        let err = ledger.dispatch(dispatch("P", "A", 6)).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn dispatch_to_zero_keeps_row() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 5)).unwrap();
        ledger.dispatch(dispatch("P", "A", 5)).unwrap();
        assert_eq!(ledger.item("P", "A").map(|i| i.quantity), Some(0));
        assert_eq!(ledger.balance_of("P", "A"), 0);
    }

    #[test]
    fn transfer_moves_quantity_and_logs_once() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 10)).unwrap();
        ledger.receive(receive("P", "B", 1)).unwrap();

        let out = ledger.transfer(transfer("P", "A", "B", 4)).unwrap();
        assert_eq!(out.from_remaining, 6);
        assert_eq!(out.to_quantity, 5);
        assert_eq!(ledger.balance_of("P", "A"), 6);
        assert_eq!(ledger.balance_of("P", "B"), 5);

        let last = ledger.movements().last().unwrap();
        assert_eq!(last.kind, MovementKind::Transfer);
        assert_eq!(last.from_bin.as_deref(), Some("A"));
        assert_eq!(last.to_bin.as_deref(), Some("B"));
        assert_eq!(ledger.movements().len(), 3);
    }

    #[test]
    fn transfer_exceeding_source_is_rejected_without_side_effects() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 3)).unwrap();
        let before = ledger.clone();

        let err = ledger.transfer(transfer("P", "A", "B", 4)).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(ledger, before);
        assert!(ledger.item("P", "B").is_none());
    }

    #[test]
    fn transfer_to_same_bin_is_invalid() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 3)).unwrap();
        let err = ledger.transfer(transfer("P", "A", "A", 1)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn transfer_copies_batch_only_into_new_destination_rows() {
        let mut ledger = Ledger::new();
        let mut batched = receive("P", "A", 10);
        batched.batch = Some("LOT-1".to_string());
        batched.expiry_date = NaiveDate::from_ymd_opt(2025, 6, 30);
        ledger.receive(batched).unwrap();

        let mut other = receive("P", "C", 1);
        other.batch = Some("LOT-9".to_string());
        ledger.receive(other).unwrap();

        ledger.transfer(transfer("P", "A", "B", 2)).unwrap();
        let new_row = ledger.item("P", "B").unwrap();
        assert_eq!(new_row.batch.as_deref(), Some("LOT-1"));
        assert_eq!(new_row.expiry_date, NaiveDate::from_ymd_opt(2025, 6, 30));

        ledger.transfer(transfer("P", "A", "C", 2)).unwrap();
        let existing = ledger.item("P", "C").unwrap();
        assert_eq!(existing.batch.as_deref(), Some("LOT-9"));
        assert_eq!(existing.quantity, 3);
    }

    #[test]
    fn receive_rejects_mixing_distinct_batches() {
        let mut ledger = Ledger::new();
        let mut first = receive("P", "A", 5);
        first.batch = Some("LOT-1".to_string());
        ledger.receive(first).unwrap();

        let mut second = receive("P", "A", 5);
        second.batch = Some("LOT-2".to_string());
        let err = ledger.receive(second).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(ledger.balance_of("P", "A"), 5);

        let mut same = receive("P", "A", 2);
        same.batch = Some(" LOT-1 ".to_string());
        assert_eq!(ledger.receive(same).unwrap().balance, 7);

        // An unbatched receive merges into whatever the row holds.
        assert_eq!(ledger.receive(receive("P", "A", 1)).unwrap().balance, 8);
    }

    #[test]
    fn empty_unbatched_row_adopts_incoming_batch() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 2)).unwrap();
        ledger.dispatch(dispatch("P", "A", 2)).unwrap();

        let mut batched = receive("P", "A", 4);
        batched.batch = Some("LOT-7".to_string());
        ledger.receive(batched).unwrap();
        assert_eq!(ledger.item("P", "A").unwrap().batch.as_deref(), Some("LOT-7"));
    }

    #[test]
    fn adjustment_overwrites_and_records_direction() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 10)).unwrap();

        let down = ledger
            .apply_adjustment(Adjustment {
                part_number: "P".to_string(),
                bin_code: "A".to_string(),
                counted: 7,
                variance: -3,
                notes: None,
                actor: actor(),
                occurred_at: test_time(),
            })
            .unwrap();
        assert_eq!(down.kind, MovementKind::Adjustment);
        assert_eq!(down.from_bin.as_deref(), Some("A"));
        assert_eq!(down.to_bin, None);
        assert_eq!(down.quantity.get(), 3);
        assert_eq!(ledger.balance_of("P", "A"), 7);

        let up = ledger
            .apply_adjustment(Adjustment {
                part_number: "P".to_string(),
                bin_code: "A".to_string(),
                counted: 12,
                variance: 5,
                notes: None,
                actor: actor(),
                occurred_at: test_time(),
            })
            .unwrap();
        assert_eq!(up.to_bin.as_deref(), Some("A"));
        assert_eq!(up.from_bin, None);
        assert_eq!(ledger.balance_of("P", "A"), 12);
    }

    #[test]
    fn adjustment_with_stale_variance_is_rejected() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 10)).unwrap();
        let before = ledger.clone();

        let err = ledger
            .apply_adjustment(Adjustment {
                part_number: "P".to_string(),
                bin_code: "A".to_string(),
                counted: 7,
                variance: -2,
                notes: None,
                actor: actor(),
                occurred_at: test_time(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(ledger, before);
    }

    #[test]
    fn persisted_form_round_trips() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 10)).unwrap();
        ledger.transfer(transfer("P", "A", "B", 4)).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }

    #[test]
    fn reads_aggregate_across_bins_and_products() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", 10)).unwrap();
        ledger.receive(receive("P", "B", 5)).unwrap();
        ledger.receive(receive("Q", "A", 2)).unwrap();

        assert_eq!(ledger.on_hand("P"), 15);
        assert_eq!(ledger.bin_usage("A"), 12);
        assert_eq!(ledger.items_for_product("Q").count(), 1);
    }

    #[test]
    fn totals_of_full_rows_do_not_overflow() {
        let mut ledger = Ledger::new();
        for bin in ["A", "B", "C"] {
            ledger.receive(receive("P", bin, i64::MAX)).unwrap();
            ledger.receive(receive("Q", bin, i64::MAX)).unwrap();
        }

        assert_eq!(ledger.on_hand("P"), 3 * u128::from(MAX_BALANCE));
        assert_eq!(ledger.bin_usage("A"), 2 * u128::from(MAX_BALANCE));
    }

    #[test]
    fn exceeding_the_row_ceiling_is_an_invariant_violation() {
        let mut ledger = Ledger::new();
        ledger.receive(receive("P", "A", i64::MAX)).unwrap();

        let err = ledger.receive(receive("P", "A", 1)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(ledger.balance_of("P", "A"), MAX_BALANCE);
        assert_eq!(ledger.movements().len(), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Receive(usize, i64),
            Dispatch(usize, i64),
            Transfer(usize, usize, i64),
            Count(usize, u64),
        }

        const BINS: [&str; 3] = ["A", "B", "C"];

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0..3usize, 1..50i64).prop_map(|(b, q)| Op::Receive(b, q)),
                (0..3usize, 1..50i64).prop_map(|(b, q)| Op::Dispatch(b, q)),
                (0..3usize, 0..3usize, 1..50i64).prop_map(|(f, t, q)| Op::Transfer(f, t, q)),
                (0..3usize, 0..80u64).prop_map(|(b, c)| Op::Count(b, c)),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: balances never go negative, rejected operations change
            /// nothing, each success appends exactly one well-formed movement,
            /// and the movement log always explains the balances.
            #[test]
            fn ledger_stays_consistent(ops in prop::collection::vec(op(), 1..60)) {
                let mut ledger = Ledger::new();
                let mut model = [0i128; 3];

                for op in ops {
                    let before = ledger.clone();
                    let result = match op {
                        Op::Receive(b, q) => ledger.receive(receive("P", BINS[b], q)).map(|_| {
                            model[b] += i128::from(q);
                        }),
                        Op::Dispatch(b, q) => ledger.dispatch(dispatch("P", BINS[b], q)).map(|_| {
                            model[b] -= i128::from(q);
                        }),
                        Op::Transfer(f, t, q) => ledger.transfer(transfer("P", BINS[f], BINS[t], q)).map(|_| {
                            model[f] -= i128::from(q);
                            model[t] += i128::from(q);
                        }),
                        Op::Count(b, counted) => {
                            let current = ledger.balance_of("P", BINS[b]);
                            let variance = counted as i64 - current as i64;
                            if variance == 0 {
                                Ok(())
                            } else {
                                ledger.apply_adjustment(Adjustment {
                                    part_number: "P".to_string(),
                                    bin_code: BINS[b].to_string(),
                                    counted,
                                    variance,
                                    notes: None,
                                    actor: actor(),
                                    occurred_at: test_time(),
                                }).map(|_| {
                                    model[b] = i128::from(counted);
                                })
                            }
                        }
                    };

                    match result {
                        Ok(()) => {
                            prop_assert!(ledger.movements().len() <= before.movements().len() + 1);
                            if let Some(last) = ledger.movements().last() {
                                prop_assert!(last.is_well_formed());
                            }
                        }
                        Err(_) => prop_assert_eq!(&ledger, &before),
                    }

                    for (i, bin) in BINS.iter().enumerate() {
                        prop_assert!(model[i] >= 0);
                        prop_assert_eq!(i128::from(ledger.balance_of("P", bin)), model[i]);
                    }
                    prop_assert_eq!(ledger.net_movements("P"), i128::try_from(ledger.on_hand("P")).unwrap());
                }
            }
        }
    }
}

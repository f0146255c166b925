//! Inventory domain module: stock ledger, reconciliation and read models.
//!
//! This crate contains business rules for on-hand stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Atomicity comes
//! from every operation validating fully before it mutates anything; callers
//! provide isolation by holding exclusive access to the [`Warehouse`].

pub mod ledger;
pub mod movement;
pub mod reconciliation;
pub mod reports;
pub mod search;
pub mod stock;
pub mod stocktake;
pub mod warehouse;

pub use ledger::{
    Adjustment, Dispatch, DispatchOutcome, Ledger, Receive, ReceiveOutcome, Transfer,
    TransferOutcome,
};
pub use movement::{MovementKind, StockMovement};
pub use reconciliation::{CountStock, StocktakeLog};
pub use stock::{StockItem, StockKey};
pub use stocktake::{Stocktake, StocktakeStatus};
pub use warehouse::Warehouse;

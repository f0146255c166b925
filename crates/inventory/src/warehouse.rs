//! The warehouse aggregate: catalog, ledger and stocktake log as one unit.
//!
//! Every stock operation resolves its product and bin keys through the catalog
//! first (so callers get `NotFound` for unknown keys and the ledger only ever
//! sees canonical keys), then delegates to the ledger or the reconciliation
//! log. The caller is expected to hold exclusive access for the duration of a
//! mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_catalog::{
    BinAttributes, BinLocation, Catalog, Product, ProductAttributes, SeedReport, seed_defaults,
};
use stockroom_core::DomainResult;

use crate::ledger::{
    Dispatch, DispatchOutcome, Ledger, Receive, ReceiveOutcome, Transfer, TransferOutcome,
};
use crate::reconciliation::{CountStock, StocktakeLog};
use crate::stocktake::Stocktake;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    catalog: Catalog,
    ledger: Ledger,
    #[serde(default)]
    stocktakes: StocktakeLog,
}

impl Warehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stocktakes(&self) -> &StocktakeLog {
        &self.stocktakes
    }

    // -------------------------
    // Catalog
    // -------------------------

    pub fn register_product(
        &mut self,
        part_number: &str,
        attrs: ProductAttributes,
        now: DateTime<Utc>,
    ) -> DomainResult<Product> {
        self.catalog
            .register_product(part_number, attrs, now)
            .cloned()
            .inspect_err(|e| tracing::warn!(part_number, error = %e, "product registration rejected"))
    }

    pub fn register_bin(
        &mut self,
        code: &str,
        attrs: BinAttributes,
        now: DateTime<Utc>,
    ) -> DomainResult<BinLocation> {
        self.catalog
            .register_bin(code, attrs, now)
            .cloned()
            .inspect_err(|e| tracing::warn!(bin_code = code, error = %e, "bin registration rejected"))
    }

    pub fn find_product(&self, part_number: &str) -> DomainResult<&Product> {
        self.catalog.find_product(part_number)
    }

    pub fn find_bin(&self, code: &str) -> DomainResult<&BinLocation> {
        self.catalog.find_bin(code)
    }

    /// Idempotent bulk seeding of the default bin grid and sample products.
    pub fn seed(&mut self, now: DateTime<Utc>) -> SeedReport {
        seed_defaults(&mut self.catalog, now)
    }

    // -------------------------
    // Ledger
    // -------------------------

    pub fn receive(&mut self, mut cmd: Receive) -> DomainResult<ReceiveOutcome> {
        cmd.part_number = self.resolve_product(&cmd.part_number)?;
        cmd.bin_code = self.resolve_bin(&cmd.bin_code)?;
        self.ledger
            .receive(cmd)
            .inspect_err(|e| tracing::warn!(error = %e, "receive rejected"))
    }

    pub fn dispatch(&mut self, mut cmd: Dispatch) -> DomainResult<DispatchOutcome> {
        cmd.part_number = self.resolve_product(&cmd.part_number)?;
        cmd.bin_code = self.resolve_bin(&cmd.bin_code)?;
        self.ledger
            .dispatch(cmd)
            .inspect_err(|e| tracing::warn!(error = %e, "dispatch rejected"))
    }

    pub fn transfer(&mut self, mut cmd: Transfer) -> DomainResult<TransferOutcome> {
        cmd.part_number = self.resolve_product(&cmd.part_number)?;
        cmd.from_bin = self.resolve_bin(&cmd.from_bin)?;
        cmd.to_bin = self.resolve_bin(&cmd.to_bin)?;
        self.ledger
            .transfer(cmd)
            .inspect_err(|e| tracing::warn!(error = %e, "transfer rejected"))
    }

    /// Balance of (product, bin); zero when no row exists.
    pub fn balance_of(&self, part_number: &str, bin_code: &str) -> DomainResult<u64> {
        let part_number = self.resolve_product(part_number)?;
        let bin_code = self.resolve_bin(bin_code)?;
        let balance = self.ledger.balance_of(&part_number, &bin_code);
        tracing::debug!(%part_number, %bin_code, balance, "balance read");
        Ok(balance)
    }

    // -------------------------
    // Reconciliation
    // -------------------------

    pub fn stocktake(&mut self, mut cmd: CountStock) -> DomainResult<Stocktake> {
        cmd.part_number = self.resolve_product(&cmd.part_number)?;
        cmd.bin_code = self.resolve_bin(&cmd.bin_code)?;
        self.stocktakes
            .reconcile(&mut self.ledger, cmd)
            .inspect_err(|e| tracing::warn!(error = %e, "stocktake rejected"))
    }

    fn resolve_product(&self, part_number: &str) -> DomainResult<String> {
        self.catalog
            .find_product(part_number)
            .map(|p| p.part_number().to_string())
    }

    fn resolve_bin(&self, code: &str) -> DomainResult<String> {
        self.catalog.find_bin(code).map(|b| b.code().to_string())
    }
}

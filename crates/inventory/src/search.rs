use chrono::NaiveDate;
use serde::Serialize;

use crate::Warehouse;

/// One balance row of a product matched by a stock search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockMatch {
    pub part_number: String,
    pub description: String,
    pub bin_code: String,
    pub zone: Option<String>,
    pub quantity: u64,
    pub batch: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Case-insensitive substring search over part numbers and descriptions.
///
/// Yields one entry per balance row of every matching product. A blank term
/// matches nothing.
pub fn search_stock(warehouse: &Warehouse, term: &str) -> Vec<StockMatch> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let catalog = warehouse.catalog();
    let mut matches = Vec::new();
    for product in catalog.products().filter(|p| p.matches(&needle)) {
        for item in warehouse.ledger().items_for_product(product.part_number()) {
            let zone = catalog
                .find_bin(&item.bin_code)
                .ok()
                .and_then(|bin| bin.zone.clone());
            matches.push(StockMatch {
                part_number: item.part_number.clone(),
                description: product.description.clone(),
                bin_code: item.bin_code.clone(),
                zone,
                quantity: item.quantity,
                batch: item.batch.clone(),
                expiry_date: item.expiry_date,
            });
        }
    }

    tracing::debug!(term = %needle, hits = matches.len(), "stock search");
    matches
}

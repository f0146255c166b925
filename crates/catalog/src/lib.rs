//! Catalog domain module.
//!
//! Owns product and bin-location identity. Both are keyed by a unique,
//! human-assigned string (part number / bin code) that never changes once
//! registered. No IO, no HTTP, no storage.

pub mod bin;
pub mod catalog;
pub mod product;
pub mod seed;
pub mod table;

pub use bin::{BinAttributes, BinLocation, BinStatus};
pub use catalog::Catalog;
pub use product::{Product, ProductAttributes};
pub use seed::{SeedReport, seed_defaults};
pub use table::KeyedTable;

/// Normalise a unique key supplied by a caller.
///
/// Keys are trimmed; an empty key is a validation failure.
pub fn normalize_key(field: &str, raw: &str) -> stockroom_core::DomainResult<String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(stockroom_core::DomainError::validation(format!(
            "{field} is required"
        )));
    }
    Ok(key.to_string())
}

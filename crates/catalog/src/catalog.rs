use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::DomainResult;

use crate::{
    BinAttributes, BinLocation, KeyedTable, Product, ProductAttributes, normalize_key,
};

/// Product and bin registry.
///
/// Only registration and lookup exist; identities are never updated or
/// deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    products: KeyedTable<Product>,
    bins: KeyedTable<BinLocation>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product under a unique part number.
    pub fn register_product(
        &mut self,
        part_number: &str,
        attrs: ProductAttributes,
        now: DateTime<Utc>,
    ) -> DomainResult<&Product> {
        let part_number = normalize_key("part_number", part_number)?;
        let product = Product::new(part_number, attrs, now)?;
        let product = self.products.insert_unique(product)?;
        tracing::info!(part_number = product.part_number(), "product registered");
        Ok(product)
    }

    /// Register a bin under a unique code.
    pub fn register_bin(
        &mut self,
        code: &str,
        attrs: BinAttributes,
        now: DateTime<Utc>,
    ) -> DomainResult<&BinLocation> {
        let code = normalize_key("bin_code", code)?;
        let bin = self.bins.insert_unique(BinLocation::new(code, attrs, now))?;
        tracing::info!(bin_code = bin.code(), "bin registered");
        Ok(bin)
    }

    pub fn find_product(&self, part_number: &str) -> DomainResult<&Product> {
        self.products.get(part_number.trim())
    }

    pub fn find_bin(&self, code: &str) -> DomainResult<&BinLocation> {
        self.bins.get(code.trim())
    }

    pub fn has_product(&self, part_number: &str) -> bool {
        self.products.contains(part_number.trim())
    }

    pub fn has_bin(&self, code: &str) -> bool {
        self.bins.contains(code.trim())
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn bins(&self) -> impl Iterator<Item = &BinLocation> {
        self.bins.iter()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stockroom_core::DomainError;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn bearing() -> ProductAttributes {
        ProductAttributes {
            description: "Ball Bearing 6305-2RS".to_string(),
            category: Some("Bearings".to_string()),
            manufacturer: Some("BMG".to_string()),
            min_stock_level: 10,
            max_stock_level: Some(100),
            ..ProductAttributes::default()
        }
    }

    #[test]
    fn register_and_find_product() {
        let mut catalog = Catalog::new();
        catalog
            .register_product("BMG-12345", bearing(), test_time())
            .unwrap();

        let found = catalog.find_product("BMG-12345").unwrap();
        assert_eq!(found.description, "Ball Bearing 6305-2RS");
        assert_eq!(found.max_stock_level, 100);
    }

    #[test]
    fn duplicate_part_number_conflicts_and_keeps_original() {
        let mut catalog = Catalog::new();
        catalog
            .register_product("BMG-12345", bearing(), test_time())
            .unwrap();

        let other = ProductAttributes {
            description: "Imposter".to_string(),
            ..ProductAttributes::default()
        };
        let err = catalog
            .register_product("  BMG-12345 ", other, test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(catalog.product_count(), 1);
        assert_eq!(
            catalog.find_product("BMG-12345").unwrap().description,
            "Ball Bearing 6305-2RS"
        );
    }

    #[test]
    fn duplicate_bin_code_conflicts() {
        let mut catalog = Catalog::new();
        catalog
            .register_bin("A-12-04", BinAttributes::default(), test_time())
            .unwrap();
        let err = catalog
            .register_bin("A-12-04", BinAttributes::default(), test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(catalog.bin_count(), 1);
    }

    #[test]
    fn blank_keys_are_rejected() {
        let mut catalog = Catalog::new();
        let err = catalog
            .register_product("   ", ProductAttributes::default(), test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = catalog
            .register_bin("", BinAttributes::default(), test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn unknown_keys_are_not_found() {
        let catalog = Catalog::new();
        match catalog.find_bin("Z-99-99").unwrap_err() {
            DomainError::NotFound { entity, key } => {
                assert_eq!(entity, "bin");
                assert_eq!(key, "Z-99-99");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(matches!(
            catalog.find_product("NOPE"),
            Err(DomainError::NotFound { entity: "product", .. })
        ));
    }

    #[test]
    fn new_bins_get_default_capacity_and_status() {
        let mut catalog = Catalog::new();
        let bin = catalog
            .register_bin("B-08-12", BinAttributes::default(), test_time())
            .unwrap();
        assert_eq!(bin.capacity, crate::bin::DEFAULT_BIN_CAPACITY);
        assert_eq!(bin.status, crate::BinStatus::Available);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: registering the same key twice never produces a second row.
            #[test]
            fn registration_never_duplicates(keys in prop::collection::vec("[A-D]-0[1-3]", 1..30)) {
                let mut catalog = Catalog::new();
                let mut distinct = std::collections::BTreeSet::new();
                for key in &keys {
                    let result = catalog.register_bin(key, BinAttributes::default(), test_time());
                    if distinct.insert(key.clone()) {
                        prop_assert!(result.is_ok());
                    } else {
                        prop_assert!(matches!(result, Err(DomainError::Conflict(_))));
                    }
                }
                prop_assert_eq!(catalog.bin_count(), distinct.len());
            }
        }
    }
}

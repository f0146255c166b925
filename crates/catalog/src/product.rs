use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity};

/// Default upper stock threshold when none is given.
pub const DEFAULT_MAX_STOCK_LEVEL: u64 = 1000;

/// Descriptive, mutable attributes supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductAttributes {
    pub description: String,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    /// Price in the smallest currency unit (e.g. cents).
    pub unit_price: u64,
    pub min_stock_level: u64,
    pub max_stock_level: Option<u64>,
}

/// A stock-keeping part, identified by its unique part number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    part_number: String,
    pub description: String,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub unit_price: u64,
    pub min_stock_level: u64,
    pub max_stock_level: u64,
    created_at: DateTime<Utc>,
}

impl Product {
    /// Validate attributes and build a product.
    ///
    /// `part_number` is expected to be normalised already.
    pub fn new(
        part_number: String,
        attrs: ProductAttributes,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let max_stock_level = attrs.max_stock_level.unwrap_or(DEFAULT_MAX_STOCK_LEVEL);
        if attrs.min_stock_level > max_stock_level {
            return Err(DomainError::validation(format!(
                "min_stock_level ({}) cannot exceed max_stock_level ({})",
                attrs.min_stock_level, max_stock_level
            )));
        }

        Ok(Self {
            part_number,
            description: attrs.description.trim().to_string(),
            category: attrs.category,
            manufacturer: attrs.manufacturer,
            unit_price: attrs.unit_price,
            min_stock_level: attrs.min_stock_level,
            max_stock_level,
            created_at,
        })
    }

    pub fn part_number(&self) -> &str {
        &self.part_number
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Case-insensitive substring match against part number or description.
    ///
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.part_number.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

impl Entity for Product {
    type Id = String;
    const KIND: &'static str = "product";

    fn id(&self) -> &Self::Id {
        &self.part_number
    }
}

//! Bulk seeding of a fresh warehouse.
//!
//! Seeding is idempotent: keys that already exist are skipped, never
//! overwritten.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{BinAttributes, Catalog, ProductAttributes};

pub const SEED_ZONES: [&str; 4] = ["A", "B", "C", "D"];
pub const SEED_AISLES: u32 = 5;
pub const SEED_SHELVES: u32 = 10;

/// Counts of rows created by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub bins_created: usize,
    pub products_created: usize,
}

/// Seed the standard bin grid and the sample bearings.
pub fn seed_defaults(catalog: &mut Catalog, now: DateTime<Utc>) -> SeedReport {
    let report = SeedReport {
        bins_created: seed_bins(catalog, now),
        products_created: seed_sample_products(catalog, now),
    };
    tracing::info!(
        bins_created = report.bins_created,
        products_created = report.products_created,
        "catalog seeded"
    );
    report
}

/// Bins `{zone}-{aisle:02}-{shelf:02}` for every zone/aisle/shelf.
pub fn seed_bins(catalog: &mut Catalog, now: DateTime<Utc>) -> usize {
    let mut created = 0;
    for zone in SEED_ZONES {
        for aisle in 1..=SEED_AISLES {
            for shelf in 1..=SEED_SHELVES {
                let code = format!("{zone}-{aisle:02}-{shelf:02}");
                if catalog.has_bin(&code) {
                    continue;
                }
                let attrs = BinAttributes {
                    zone: Some(zone.to_string()),
                    aisle: Some(aisle.to_string()),
                    shelf: Some(shelf.to_string()),
                    ..BinAttributes::default()
                };
                if catalog.register_bin(&code, attrs, now).is_ok() {
                    created += 1;
                }
            }
        }
    }
    created
}

pub fn seed_sample_products(catalog: &mut Catalog, now: DateTime<Utc>) -> usize {
    let samples = [
        ("BMG-12345", "Ball Bearing 6305-2RS", 10, 100),
        ("BMG-67890", "Taper Roller Bearing 30206", 5, 50),
    ];

    let mut created = 0;
    for (part_number, description, min, max) in samples {
        if catalog.has_product(part_number) {
            continue;
        }
        let attrs = ProductAttributes {
            description: description.to_string(),
            category: Some("Bearings".to_string()),
            manufacturer: Some("BMG".to_string()),
            unit_price: 0,
            min_stock_level: min,
            max_stock_level: Some(max),
        };
        if catalog.register_product(part_number, attrs, now).is_ok() {
            created += 1;
        }
    }
    created
}

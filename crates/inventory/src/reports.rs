//! Read models: listings, stock-level and movement reports, dashboard.
//!
//! Everything here is a pure projection of a [`Warehouse`]; nothing mutates.

use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use stockroom_catalog::{BinLocation, Product};

use crate::{StockMovement, Stocktake, Warehouse};

/// Number of discrepancies shown on the dashboard.
pub const RECENT_DISCREPANCY_LIMIT: usize = 10;

/// Product with its total on-hand quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub current_stock: u128,
}

/// Bin with the total quantity stored in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinView {
    #[serde(flatten)]
    pub bin: BinLocation,
    pub current_usage: u128,
}

pub fn product_view(warehouse: &Warehouse, product: &Product) -> ProductView {
    ProductView {
        product: product.clone(),
        current_stock: warehouse.ledger().on_hand(product.part_number()),
    }
}

pub fn bin_view(warehouse: &Warehouse, bin: &BinLocation) -> BinView {
    BinView {
        bin: bin.clone(),
        current_usage: warehouse.ledger().bin_usage(bin.code()),
    }
}

/// All products ordered by part number.
pub fn product_views(warehouse: &Warehouse) -> Vec<ProductView> {
    warehouse
        .catalog()
        .products()
        .map(|p| product_view(warehouse, p))
        .collect()
}

/// All bins ordered by code.
pub fn bin_views(warehouse: &Warehouse) -> Vec<BinView> {
    warehouse
        .catalog()
        .bins()
        .map(|b| bin_view(warehouse, b))
        .collect()
}

// -------------------------
// Stock levels
// -------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Normal,
    High,
}

impl StockStatus {
    /// `low` wins when the thresholds overlap.
    pub fn classify(total: u128, min: u64, max: u64) -> Self {
        if total <= u128::from(min) {
            StockStatus::Low
        } else if total >= u128::from(max) {
            StockStatus::High
        } else {
            StockStatus::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub part_number: String,
    pub description: String,
    pub current_stock: u128,
    pub min_stock_level: u64,
    pub max_stock_level: u64,
    pub status: StockStatus,
}

pub fn stock_levels(warehouse: &Warehouse) -> Vec<StockLevel> {
    warehouse
        .catalog()
        .products()
        .map(|p| {
            let current_stock = warehouse.ledger().on_hand(p.part_number());
            StockLevel {
                part_number: p.part_number().to_string(),
                description: p.description.clone(),
                current_stock,
                min_stock_level: p.min_stock_level,
                max_stock_level: p.max_stock_level,
                status: StockStatus::classify(current_stock, p.min_stock_level, p.max_stock_level),
            }
        })
        .collect()
}

// -------------------------
// Movements
// -------------------------

/// Optional movement report filters. Date bounds are inclusive (UTC days).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub part_number: Option<String>,
}

impl MovementFilter {
    pub fn accepts(&self, movement: &StockMovement) -> bool {
        let day = movement.occurred_at.date_naive();
        self.start_date.is_none_or(|start| day >= start)
            && self.end_date.is_none_or(|end| day <= end)
            && self
                .part_number
                .as_deref()
                .is_none_or(|p| movement.part_number == p.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementLine {
    #[serde(flatten)]
    pub movement: StockMovement,
    pub description: String,
}

/// Matching movements, newest first. Equal timestamps keep reverse log order.
pub fn movement_report(warehouse: &Warehouse, filter: &MovementFilter) -> Vec<MovementLine> {
    let catalog = warehouse.catalog();
    let mut lines: Vec<MovementLine> = warehouse
        .ledger()
        .movements()
        .iter()
        .rev()
        .filter(|m| filter.accepts(m))
        .map(|m| MovementLine {
            movement: m.clone(),
            description: catalog
                .find_product(&m.part_number)
                .map(|p| p.description.clone())
                .unwrap_or_default(),
        })
        .collect();
    lines.sort_by_key(|line| Reverse(line.movement.occurred_at));
    lines
}

// -------------------------
// Stocktakes and dashboard
// -------------------------

/// Stocktake records, newest first.
pub fn stocktakes_newest_first(warehouse: &Warehouse) -> Vec<Stocktake> {
    let mut records: Vec<Stocktake> = warehouse.stocktakes().records().iter().rev().cloned().collect();
    records.sort_by_key(|r| Reverse(r.taken_at));
    records
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub part_number: String,
    pub bin_code: String,
    pub variance: i64,
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockAlert {
    pub part_number: String,
    pub description: String,
    pub current_stock: u128,
    pub min_stock_level: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_products: usize,
    pub total_bins: usize,
    pub total_stocktakes: usize,
    /// Percentage of stocktakes with zero variance; 100 when none exist.
    pub stock_accuracy: f64,
    pub total_discrepancies: usize,
    pub recent_discrepancies: Vec<Discrepancy>,
    pub low_stock_alerts: Vec<LowStockAlert>,
}

pub fn dashboard(warehouse: &Warehouse) -> Dashboard {
    let records = stocktakes_newest_first(warehouse);
    let total_stocktakes = records.len();
    let total_discrepancies = records.iter().filter(|r| r.has_discrepancy()).count();
    let stock_accuracy = if total_stocktakes == 0 {
        100.0
    } else {
        let accurate = (total_stocktakes - total_discrepancies) as f64;
        round2(accurate / total_stocktakes as f64 * 100.0)
    };

    let recent_discrepancies = records
        .iter()
        .filter(|r| r.has_discrepancy())
        .take(RECENT_DISCREPANCY_LIMIT)
        .map(|r| Discrepancy {
            part_number: r.part_number.clone(),
            bin_code: r.bin_code.clone(),
            variance: r.variance,
            taken_at: r.taken_at,
        })
        .collect();

    let low_stock_alerts = stock_levels(warehouse)
        .into_iter()
        .filter(|level| level.status == StockStatus::Low)
        .map(|level| LowStockAlert {
            part_number: level.part_number,
            description: level.description,
            current_stock: level.current_stock,
            min_stock_level: level.min_stock_level,
        })
        .collect();

    Dashboard {
        total_products: warehouse.catalog().product_count(),
        total_bins: warehouse.catalog().bin_count(),
        total_stocktakes,
        stock_accuracy,
        total_discrepancies,
        recent_discrepancies,
        low_stock_alerts,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CountStock, Dispatch, Receive};
    use chrono::{Duration, TimeZone};
    use stockroom_core::{ActorRef, Quantity, UserId};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap()
    }

    fn actor() -> ActorRef {
        ActorRef::new(UserId::new(), "analyst")
    }

    fn receive_at(w: &mut Warehouse, part: &str, bin: &str, n: i64, at: DateTime<Utc>) {
        w.receive(Receive {
            part_number: part.to_string(),
            bin_code: bin.to_string(),
            quantity: Quantity::positive(n).unwrap(),
            batch: None,
            expiry_date: None,
            reference: None,
            notes: None,
            actor: actor(),
            occurred_at: at,
        })
        .unwrap();
    }

    fn count_at(w: &mut Warehouse, part: &str, bin: &str, n: i64, at: DateTime<Utc>) {
        w.stocktake(CountStock {
            part_number: part.to_string(),
            bin_code: bin.to_string(),
            counted_quantity: n,
            notes: None,
            actor: actor(),
            occurred_at: at,
        })
        .unwrap();
    }

    fn seeded() -> Warehouse {
        let mut w = Warehouse::new();
        w.seed(day(1));
        w
    }

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(StockStatus::classify(10, 10, 100), StockStatus::Low);
        assert_eq!(StockStatus::classify(11, 10, 100), StockStatus::Normal);
        assert_eq!(StockStatus::classify(100, 10, 100), StockStatus::High);
        assert_eq!(StockStatus::classify(0, 0, 0), StockStatus::Low);
    }

    #[test]
    fn stock_levels_sum_across_bins() {
        let mut w = seeded();
        receive_at(&mut w, "BMG-12345", "A-01-01", 40, day(2));
        receive_at(&mut w, "BMG-12345", "A-01-02", 60, day(2));

        let levels = stock_levels(&w);
        let bearing = levels.iter().find(|l| l.part_number == "BMG-12345").unwrap();
        assert_eq!(bearing.current_stock, 100);
        assert_eq!(bearing.status, StockStatus::High);
        let roller = levels.iter().find(|l| l.part_number == "BMG-67890").unwrap();
        assert_eq!(roller.status, StockStatus::Low);
    }

    #[test]
    fn movement_report_is_newest_first_with_inclusive_dates() {
        let mut w = seeded();
        receive_at(&mut w, "BMG-12345", "A-01-01", 1, day(2));
        receive_at(&mut w, "BMG-12345", "A-01-01", 2, day(3));
        receive_at(&mut w, "BMG-67890", "A-01-01", 3, day(4));
        w.dispatch(Dispatch {
            part_number: "BMG-12345".to_string(),
            bin_code: "A-01-01".to_string(),
            quantity: Quantity::positive(1).unwrap(),
            reference: None,
            notes: None,
            actor: actor(),
            occurred_at: day(5) + Duration::hours(11),
        })
        .unwrap();

        let all = movement_report(&w, &MovementFilter::default());
        let quantities: Vec<u64> = all.iter().map(|l| l.movement.quantity.get()).collect();
        assert_eq!(quantities, vec![1, 3, 2, 1]);
        assert_eq!(all[1].description, "Taper Roller Bearing 30206");

        let window = MovementFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 3),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 5),
            part_number: Some("BMG-12345".to_string()),
        };
        let filtered = movement_report(&w, &window);
        let quantities: Vec<u64> = filtered.iter().map(|l| l.movement.quantity.get()).collect();
        assert_eq!(quantities, vec![1, 2]);
    }

    #[test]
    fn dashboard_accuracy_and_alerts() {
        let mut w = seeded();
        assert_eq!(dashboard(&w).stock_accuracy, 100.0);

        receive_at(&mut w, "BMG-12345", "A-01-01", 50, day(2));
        count_at(&mut w, "BMG-12345", "A-01-01", 50, day(3));
        count_at(&mut w, "BMG-12345", "A-01-01", 48, day(4));
        count_at(&mut w, "BMG-67890", "A-01-02", 0, day(5));

        let d = dashboard(&w);
        assert_eq!(d.total_products, 2);
        assert_eq!(d.total_bins, 200);
        assert_eq!(d.total_stocktakes, 3);
        assert_eq!(d.total_discrepancies, 1);
        assert_eq!(d.stock_accuracy, 66.67);
        assert_eq!(d.recent_discrepancies.len(), 1);
        assert_eq!(d.recent_discrepancies[0].variance, -2);

        let alerts: Vec<&str> = d.low_stock_alerts.iter().map(|a| a.part_number.as_str()).collect();
        assert_eq!(alerts, vec!["BMG-67890"]);
    }

    #[test]
    fn dashboard_keeps_only_recent_discrepancies() {
        let mut w = seeded();
        for i in 0..12 {
            count_at(&mut w, "BMG-12345", "A-01-01", i + 1, day(2) + Duration::minutes(i));
        }
        let d = dashboard(&w);
        assert_eq!(d.total_discrepancies, 12);
        assert_eq!(d.recent_discrepancies.len(), RECENT_DISCREPANCY_LIMIT);
        assert_eq!(d.recent_discrepancies[0].taken_at, day(2) + Duration::minutes(11));
    }

    #[test]
    fn listings_carry_totals() {
        let mut w = seeded();
        receive_at(&mut w, "BMG-12345", "A-01-01", 7, day(2));
        receive_at(&mut w, "BMG-67890", "A-01-01", 3, day(2));

        let products = product_views(&w);
        assert_eq!(products[0].current_stock, 7);
        let bin = bin_views(&w).into_iter().find(|b| b.bin.code() == "A-01-01").unwrap();
        assert_eq!(bin.current_usage, 10);

        let json = serde_json::to_value(&products[0]).unwrap();
        assert_eq!(json["part_number"], "BMG-12345");
        assert_eq!(json["current_stock"], 7);
    }
}

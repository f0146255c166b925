use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_auth::UserView;
use stockroom_catalog::{BinAttributes, ProductAttributes};
use stockroom_core::{DomainError, DomainResult};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub part_number: String,
    #[serde(flatten)]
    pub attributes: ProductAttributes,
}

#[derive(Debug, Deserialize)]
pub struct CreateBinRequest {
    pub bin_code: String,
    #[serde(flatten)]
    pub attributes: BinAttributes,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveStockRequest {
    pub part_number: String,
    pub bin_code: String,
    pub quantity: i64,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DispatchStockRequest {
    pub part_number: String,
    pub bin_code: String,
    pub quantity: i64,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferStockRequest {
    pub part_number: String,
    pub from_bin: String,
    pub to_bin: String,
    pub quantity: i64,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StocktakeRequest {
    pub part_number: String,
    pub bin_code: String,
    pub counted_quantity: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockCheckRequest {
    #[serde(default)]
    pub search_term: String,
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub part_number: String,
    pub bin_code: String,
}

/// Dates are `YYYY-MM-DD`; both bounds are inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub part_number: Option<String>,
}

impl MovementQuery {
    pub fn parse_date(field: &str, raw: Option<&str>) -> DomainResult<Option<NaiveDate>> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                    DomainError::validation(format!("{field} must be a YYYY-MM-DD date (got '{s}')"))
                })
            })
            .transpose()
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct ReceiveResponse {
    pub message: &'static str,
    pub new_quantity: u64,
    pub movement_id: String,
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub message: &'static str,
    pub remaining_quantity: u64,
    pub movement_id: String,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub message: &'static str,
    pub from_quantity: u64,
    pub to_quantity: u64,
    pub movement_id: String,
}

#[derive(Debug, Serialize)]
pub struct StocktakeResponse {
    pub message: &'static str,
    pub stocktake_id: String,
    pub expected_quantity: u64,
    pub counted_quantity: u64,
    pub variance: i64,
    pub adjustment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub part_number: String,
    pub bin_code: String,
    pub quantity: u64,
}

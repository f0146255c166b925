use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use stockroom_auth::permissions;
use stockroom_inventory::{CountStock, reports};

use crate::app::routes::common::{require, write_blocking};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// Record a physical count; a variance writes an adjustment movement.
pub async fn perform_stocktake(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::StocktakeRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::STOCKTAKE_PERFORM) {
        return resp;
    }

    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let cmd = CountStock {
        part_number: body.part_number,
        bin_code: body.bin_code,
        counted_quantity: body.counted_quantity,
        notes: body.notes,
        actor: principal.actor(),
        occurred_at: Utc::now(),
    };

    match write_blocking(&services, move |w| w.stocktake(cmd)).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(dto::StocktakeResponse {
                message: if record.has_discrepancy() {
                    "stocktake recorded; balance adjusted"
                } else {
                    "stocktake recorded"
                },
                stocktake_id: record.id.to_string(),
                expected_quantity: record.expected_quantity,
                counted_quantity: record.counted_quantity,
                variance: record.variance,
                adjustment_id: record.adjustment.map(|id| id.to_string()),
            }),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn list_stocktakes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::REPORTS_READ) {
        return resp;
    }

    match services.store().read(reports::stocktakes_newest_first) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

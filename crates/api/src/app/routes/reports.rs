use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_auth::permissions;
use stockroom_inventory::reports::{self, MovementFilter};

use crate::app::routes::common::require;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/stock-levels", get(stock_levels))
        .route("/movements", get(movements))
}

pub async fn stock_levels(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::REPORTS_READ) {
        return resp;
    }

    match services.store().read(reports::stock_levels) {
        Ok(levels) => (StatusCode::OK, Json(levels)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    q: Result<Query<dto::MovementQuery>, QueryRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::REPORTS_READ) {
        return resp;
    }
    let q = match errors::query_params(q) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    let filter = match parse_filter(&q) {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().read(|w| reports::movement_report(w, &filter)) {
        Ok(lines) => (StatusCode::OK, Json(lines)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::REPORTS_READ) {
        return resp;
    }

    match services.store().read(reports::dashboard) {
        Ok(d) => (StatusCode::OK, Json(d)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_filter(q: &dto::MovementQuery) -> stockroom_core::DomainResult<MovementFilter> {
    Ok(MovementFilter {
        start_date: dto::MovementQuery::parse_date("start_date", q.start_date.as_deref())?,
        end_date: dto::MovementQuery::parse_date("end_date", q.end_date.as_deref())?,
        part_number: q
            .part_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    })
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use stockroom_auth::permissions;
use stockroom_inventory::reports;

use crate::app::routes::common::{require, write_blocking};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_bins).post(create_bin))
        .route("/:code", get(get_bin))
}

pub async fn list_bins(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::CATALOG_READ) {
        return resp;
    }

    match services.store().read(reports::bin_views) {
        Ok(bins) => (StatusCode::OK, Json(bins)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_bin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateBinRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::CATALOG_WRITE) {
        return resp;
    }

    let cmd = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let now = Utc::now();

    match write_blocking(&services, move |w| w.register_bin(&cmd.bin_code, cmd.attributes, now)).await {
        Ok(bin) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "bin created",
                "bin": bin,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_bin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(code): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::CATALOG_READ) {
        return resp;
    }

    let view = services
        .store()
        .read(|w| w.find_bin(&code).map(|b| reports::bin_view(w, b)));

    match view {
        Ok(Ok(view)) => (StatusCode::OK, Json(view)).into_response(),
        Ok(Err(e)) => errors::domain_error_to_response(e),
        Err(e) => errors::store_error_to_response(e),
    }
}

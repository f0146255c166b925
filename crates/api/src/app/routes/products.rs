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
        .route("/", get(list_products).post(create_product))
        .route("/:part_number", get(get_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::CATALOG_READ) {
        return resp;
    }

    match services.store().read(reports::product_views) {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::CATALOG_WRITE) {
        return resp;
    }

    let cmd = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let now = Utc::now();

    let created = write_blocking(&services, move |w| {
        w.register_product(&cmd.part_number, cmd.attributes, now)
    })
    .await;

    match created {
        Ok(product) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "product created",
                "product": product,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(part_number): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::CATALOG_READ) {
        return resp;
    }

    let view = services.store().read(|w| {
        w.find_product(&part_number)
            .map(|p| reports::product_view(w, p))
    });

    match view {
        Ok(Ok(view)) => (StatusCode::OK, Json(view)).into_response(),
        Ok(Err(e)) => errors::domain_error_to_response(e),
        Err(e) => errors::store_error_to_response(e),
    }
}

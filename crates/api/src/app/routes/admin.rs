//! Administrative endpoints.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use stockroom_auth::permissions;

use crate::app::routes::common::{require, write_blocking};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/seed", post(seed))
}

/// Create the default bin grid and sample products; existing keys are skipped.
pub async fn seed(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::CATALOG_SEED) {
        return resp;
    }

    match write_blocking(&services, |w| Ok(w.seed(Utc::now()))).await {
        Ok(report) => {
            tracing::info!(
                user_id = %principal.user_id(),
                bins_created = report.bins_created,
                products_created = report.products_created,
                "catalog seeded"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(resp) => resp,
    }
}

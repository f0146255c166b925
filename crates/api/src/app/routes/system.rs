use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use stockroom_auth::permissions_for_role;

use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": principal.user_id().to_string(),
        "username": principal.username(),
        "role": principal.role().as_str(),
        "permissions": permissions_for_role(principal.role())
            .iter()
            .map(|p| p.as_str().to_string())
            .collect::<Vec<_>>(),
    }))
}

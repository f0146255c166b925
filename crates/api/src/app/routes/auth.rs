//! Login and user registration.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use stockroom_auth::{NewUser, Role, permissions};

use crate::app::routes::common::require;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// Exchange credentials for a bearer token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    if body.username.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and password are required",
        );
    }

    // bcrypt verification is CPU-bound; keep it off the async workers.
    let store = services.store_handle();
    let username = body.username.clone();
    let verified = tokio::task::spawn_blocking(move || store.authenticate(&username, &body.password)).await;

    let account = match verified {
        Ok(Ok(Some(account))) => account,
        Ok(Ok(None)) => {
            tracing::warn!(username = %body.username.trim(), "login failed");
            return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid credentials");
        }
        Ok(Err(e)) => return errors::store_error_to_response(e),
        Err(e) => {
            tracing::error!(error = %e, "login task failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "login failed");
        }
    };

    let token = match services.jwt().issue(account.id, &account.username, account.role, Utc::now()) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "token signing failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string());
        }
    };

    tracing::info!(user_id = %account.id, username = %account.username, "login succeeded");
    (
        StatusCode::OK,
        Json(dto::LoginResponse {
            token,
            user: account.view(),
        }),
    )
        .into_response()
}

/// Create a user account (admin only).
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::RegisterUserRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::USERS_CREATE) {
        return resp;
    }

    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let role = match body.role.as_deref() {
        None => Role::default(),
        Some(raw) => match raw.parse::<Role>() {
            Ok(r) => r,
            Err(e) => return errors::domain_error_to_response(e),
        },
    };

    let cmd = NewUser {
        username: body.username,
        email: body.email,
        password: body.password,
        role,
        department: body.department,
    };

    let store = services.store_handle();
    let cost = services.bcrypt_cost();
    let created = tokio::task::spawn_blocking(move || store.register_user(cmd, cost, Utc::now())).await;

    match created {
        Ok(Ok(account)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "user created",
                "user": account.view(),
            })),
        )
            .into_response(),
        Ok(Err(e)) => errors::store_error_to_response(e),
        Err(e) => {
            tracing::error!(error = %e, "register task failed");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "registration failed")
        }
    }
}

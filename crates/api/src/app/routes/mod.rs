use axum::{Router, routing::{get, post}};

pub mod admin;
pub mod auth;
pub mod bins;
pub mod common;
pub mod products;
pub mod reports;
pub mod stock;
pub mod stocktake;
pub mod system;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new().route("/api/auth/login", post(auth::login))
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/api/auth/register", post(auth::register))
        .nest("/api/products", products::router())
        .nest("/api/bins", bins::router())
        .nest("/api/stock", stock::router())
        .route("/api/stocktake", post(stocktake::perform_stocktake))
        .route("/api/stocktakes", get(stocktake::list_stocktakes))
        .nest("/api/reports", reports::router())
        .route("/api/dashboard", get(reports::dashboard))
        .nest("/api/admin", admin::router())
}

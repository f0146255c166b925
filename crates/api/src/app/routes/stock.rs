//! Ledger endpoints: receive, dispatch, transfer and balance reads.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use stockroom_auth::permissions;
use stockroom_core::Quantity;
use stockroom_inventory::{Dispatch, Receive, StockItem, Transfer, search};

use crate::app::routes::common::{require, write_blocking};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/receive", post(receive_stock))
        .route("/dispatch", post(dispatch_stock))
        .route("/transfer", post(transfer_stock))
        .route("/items", get(list_items))
        .route("/balance", get(get_balance))
        .route("/check", post(check_stock))
}

pub async fn receive_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::ReceiveStockRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::STOCK_RECEIVE) {
        return resp;
    }

    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let quantity = match Quantity::positive(body.quantity) {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let cmd = Receive {
        part_number: body.part_number,
        bin_code: body.bin_code,
        quantity,
        batch: body.batch_number,
        expiry_date: body.expiry_date,
        reference: body.reference_number,
        notes: body.notes,
        actor: principal.actor(),
        occurred_at: Utc::now(),
    };

    match write_blocking(&services, move |w| w.receive(cmd)).await {
        Ok(out) => (
            StatusCode::OK,
            Json(dto::ReceiveResponse {
                message: "stock received",
                new_quantity: out.balance,
                movement_id: out.movement.id.to_string(),
            }),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn dispatch_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::DispatchStockRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::STOCK_DISPATCH) {
        return resp;
    }

    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let quantity = match Quantity::positive(body.quantity) {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let cmd = Dispatch {
        part_number: body.part_number,
        bin_code: body.bin_code,
        quantity,
        reference: body.reference_number,
        notes: body.notes,
        actor: principal.actor(),
        occurred_at: Utc::now(),
    };

    match write_blocking(&services, move |w| w.dispatch(cmd)).await {
        Ok(out) => (
            StatusCode::OK,
            Json(dto::DispatchResponse {
                message: "stock dispatched",
                remaining_quantity: out.remaining,
                movement_id: out.movement.id.to_string(),
            }),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn transfer_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::TransferStockRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::STOCK_TRANSFER) {
        return resp;
    }

    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let quantity = match Quantity::positive(body.quantity) {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let cmd = Transfer {
        part_number: body.part_number,
        from_bin: body.from_bin,
        to_bin: body.to_bin,
        quantity,
        reference: body.reference_number,
        notes: body.notes,
        actor: principal.actor(),
        occurred_at: Utc::now(),
    };

    match write_blocking(&services, move |w| w.transfer(cmd)).await {
        Ok(out) => (
            StatusCode::OK,
            Json(dto::TransferResponse {
                message: "stock transferred",
                from_quantity: out.from_remaining,
                to_quantity: out.to_quantity,
                movement_id: out.movement.id.to_string(),
            }),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

/// Every balance row, zero rows included.
pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::STOCK_READ) {
        return resp;
    }

    let items = services
        .store()
        .read(|w| w.ledger().balances().cloned().collect::<Vec<StockItem>>());
    match items {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    q: Result<Query<dto::BalanceQuery>, QueryRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::STOCK_READ) {
        return resp;
    }
    let q = match errors::query_params(q) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    match services.store().read(|w| w.balance_of(&q.part_number, &q.bin_code)) {
        Ok(Ok(quantity)) => (
            StatusCode::OK,
            Json(dto::BalanceResponse {
                part_number: q.part_number,
                bin_code: q.bin_code,
                quantity,
            }),
        )
            .into_response(),
        Ok(Err(e)) => errors::domain_error_to_response(e),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn check_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::StockCheckRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, permissions::STOCK_READ) {
        return resp;
    }
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services
        .store()
        .read(|w| search::search_stock(w, &body.search_term))
    {
        Ok(matches) => (StatusCode::OK, Json(matches)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

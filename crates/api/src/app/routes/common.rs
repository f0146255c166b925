use std::sync::Arc;

use stockroom_auth::{CommandAuthorization, Permission};
use stockroom_core::DomainResult;
use stockroom_inventory::Warehouse;

use axum::http::StatusCode;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Small helper wrapper to associate required permissions with a command.
pub struct CmdAuth<C> {
    pub inner: C,
    pub required: Vec<Permission>,
}

impl<C> CommandAuthorization for CmdAuth<C> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}

impl<C> CmdAuth<C> {
    pub fn new(inner: C, required: Permission) -> Self {
        Self {
            inner,
            required: vec![required],
        }
    }

    /// Check the principal and hand back the command, or a 403 response.
    pub fn authorize(self, principal: &PrincipalContext) -> Result<C, axum::response::Response> {
        match crate::authz::authorize_command(principal, &self) {
            Ok(()) => Ok(self.inner),
            Err(e) => Err(errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())),
        }
    }
}

/// Require a permission for a read-only request.
pub fn require(
    principal: &PrincipalContext,
    permission: Permission,
) -> Result<(), axum::response::Response> {
    CmdAuth::new((), permission).authorize(principal)
}

/// Run a warehouse mutation on the blocking pool.
///
/// The store holds a `std::sync` lock and may fsync a snapshot while holding
/// it, so mutations stay off the async workers.
pub async fn write_blocking<T, F>(
    services: &Arc<AppServices>,
    f: F,
) -> Result<T, axum::response::Response>
where
    F: FnOnce(&mut Warehouse) -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = services.store_handle();
    match tokio::task::spawn_blocking(move || store.write(f)).await {
        Ok(Ok(out)) => Ok(out),
        Ok(Err(e)) => Err(errors::store_error_to_response(e)),
        Err(e) => {
            tracing::error!(error = %e, "store task failed");
            Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "store task failed",
            ))
        }
    }
}

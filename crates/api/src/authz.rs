//! API-side authorization guard for commands.
//!
//! Enforced at the command boundary (before the store is touched), keeping the
//! domain and infra crates auth-agnostic.

use stockroom_auth::{AuthzError, CommandAuthorization, authorize};

use crate::context::PrincipalContext;

/// Check authorization for a command in the current request context.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    let principal = principal.principal();

    for perm in command.required_permissions() {
        if let Err(e) = authorize(&principal, perm) {
            tracing::warn!(
                user_id = %principal.user_id,
                role = %principal.role,
                permission = %perm,
                "authorization denied"
            );
            return Err(e);
        }
    }

    Ok(())
}

use thiserror::Error;

use stockroom_auth::PasswordError;
use stockroom_core::DomainError;

/// Failure of a store operation.
///
/// `Domain` carries business rejections through unchanged; everything else is
/// an infrastructure fault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid json: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// The domain error, if this is a business rejection.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

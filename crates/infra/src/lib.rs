//! Infrastructure layer: the shared store handle and its persistence.

pub mod error;
pub mod snapshot;
pub mod store;
pub mod users;

pub use error::StoreError;
pub use store::{StoreOptions, WarehouseStore};
pub use users::UserDirectory;

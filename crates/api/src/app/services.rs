//! Service wiring shared by all handlers.

use std::sync::Arc;

use chrono::Utc;

use stockroom_auth::Hs256Jwt;
use stockroom_infra::{StoreError, StoreOptions, WarehouseStore};

use crate::config::AppConfig;

/// Handles shared by every request.
pub struct AppServices {
    store: Arc<WarehouseStore>,
    jwt: Arc<Hs256Jwt>,
    bcrypt_cost: u32,
}

impl AppServices {
    pub fn new(store: Arc<WarehouseStore>, config: &AppConfig) -> Self {
        Self {
            store,
            jwt: Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes(), config.jwt_ttl)),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Open the configured store and, when enabled, seed it.
    pub fn open(config: &AppConfig) -> Result<Self, StoreError> {
        let store = WarehouseStore::open(StoreOptions {
            snapshot_path: config.data_file.clone(),
        })?;
        let services = Self::new(Arc::new(store), config);
        if config.seed_on_start {
            services.bootstrap(config)?;
        }
        Ok(services)
    }

    /// Create the admin account and the default bins/products (idempotent).
    pub fn bootstrap(&self, config: &AppConfig) -> Result<(), StoreError> {
        let now = Utc::now();
        if let Some(admin) = self.store.ensure_admin(
            &config.admin_username,
            &config.admin_password,
            self.bcrypt_cost,
            now,
        )? {
            tracing::info!(username = %admin.username, "bootstrap admin created");
        }
        let report = self.store.write(|w| Ok(w.seed(now)))?;
        tracing::info!(
            bins_created = report.bins_created,
            products_created = report.products_created,
            "startup seeding finished"
        );
        Ok(())
    }

    pub fn store(&self) -> &WarehouseStore {
        &self.store
    }

    pub fn store_handle(&self) -> Arc<WarehouseStore> {
        Arc::clone(&self.store)
    }

    pub fn jwt(&self) -> Arc<Hs256Jwt> {
        Arc::clone(&self.jwt)
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}

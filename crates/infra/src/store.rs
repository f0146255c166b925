//! The explicit store handle shared by every request.
//!
//! All state sits behind one `RwLock`. A mutation holds the write lock for its
//! whole read-decide-write sequence, which serialises operations on the same
//! (product, bin) and rules out lost updates. When a snapshot path is
//! configured, each committed mutation is persisted before the lock is
//! released; if persisting fails the in-memory state is rolled back, so a
//! mutation is either both applied and saved or not applied at all.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use stockroom_auth::{NewUser, Role, UserAccount, hash_password, verify_password};
use stockroom_core::DomainResult;
use stockroom_inventory::Warehouse;

use crate::snapshot::{self, Snapshot};
use crate::{StoreError, UserDirectory};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// JSON snapshot file; `None` keeps everything in memory.
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct WarehouseStore {
    state: RwLock<Snapshot>,
    snapshot_path: Option<PathBuf>,
}

impl WarehouseStore {
    /// Open the store, loading the snapshot if one is configured and present.
    pub fn open(options: StoreOptions) -> Result<Self, StoreError> {
        let state = match &options.snapshot_path {
            Some(path) => match snapshot::load(path)? {
                Some(snapshot) => {
                    tracing::info!(
                        path = %path.display(),
                        products = snapshot.warehouse.catalog().product_count(),
                        bins = snapshot.warehouse.catalog().bin_count(),
                        movements = snapshot.warehouse.ledger().movements().len(),
                        "store opened from snapshot"
                    );
                    snapshot
                }
                None => {
                    tracing::info!(path = %path.display(), "no snapshot yet; starting empty");
                    Snapshot::default()
                }
            },
            None => Snapshot::default(),
        };

        Ok(Self {
            state: RwLock::new(state),
            snapshot_path: options.snapshot_path,
        })
    }

    /// Purely in-memory store.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(Snapshot::default()),
            snapshot_path: None,
        }
    }

    /// Flush a final snapshot (if configured).
    pub fn close(&self) -> Result<(), StoreError> {
        let state = self.read_guard()?;
        if let Some(path) = &self.snapshot_path {
            snapshot::save(path, &state)?;
            tracing::info!(path = %path.display(), "store closed; snapshot flushed");
        }
        Ok(())
    }

    // -------------------------
    // Warehouse
    // -------------------------

    /// Run a read-only projection under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&Warehouse) -> T) -> Result<T, StoreError> {
        let state = self.read_guard()?;
        Ok(f(&state.warehouse))
    }

    /// Run a fallible warehouse mutation as one critical section.
    pub fn write<T>(
        &self,
        f: impl FnOnce(&mut Warehouse) -> DomainResult<T>,
    ) -> Result<T, StoreError> {
        self.mutate(|state| f(&mut state.warehouse))
    }

    // -------------------------
    // Users
    // -------------------------

    /// Register a user; bcrypt runs before the lock is taken.
    pub fn register_user(
        &self,
        user: NewUser,
        bcrypt_cost: u32,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, StoreError> {
        let user = user.normalized()?;
        let hash = hash_password(&user.password, bcrypt_cost)?;
        self.mutate(|state| state.users.insert(user, hash, now))
    }

    /// Verify credentials. `Ok(None)` for unknown users, wrong passwords and
    /// suspended accounts alike.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let account = {
            let state = self.read_guard()?;
            state.users.find_by_username(username).cloned()
        };

        Ok(account.filter(|a| a.is_active() && verify_password(password, &a.password_hash)))
    }

    pub fn find_user(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let state = self.read_guard()?;
        Ok(state.users.find_by_username(username).cloned())
    }

    /// Create the bootstrap admin unless an account with that name exists.
    pub fn ensure_admin(
        &self,
        username: &str,
        password: &str,
        bcrypt_cost: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<UserAccount>, StoreError> {
        if self.find_user(username)?.is_some() {
            return Ok(None);
        }
        let admin = NewUser {
            username: username.to_string(),
            email: format!("{}@stockroom.local", username.trim()),
            password: password.to_string(),
            role: Role::Admin,
            department: Some("IT".to_string()),
        };
        self.register_user(admin, bcrypt_cost, now).map(Some)
    }

    pub fn users<T>(&self, f: impl FnOnce(&UserDirectory) -> T) -> Result<T, StoreError> {
        let state = self.read_guard()?;
        Ok(f(&state.users))
    }

    // -------------------------
    // Internals
    // -------------------------

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> DomainResult<T>,
    ) -> Result<T, StoreError> {
        let mut state = self.write_guard()?;

        let Some(path) = &self.snapshot_path else {
            return Ok(f(&mut *state)?);
        };

        let before = state.clone();
        let out = f(&mut *state)?;
        if let Err(e) = snapshot::save(path, &state) {
            *state = before;
            tracing::error!(path = %path.display(), error = %e, "snapshot write failed; mutation rolled back");
            return Err(e);
        }
        Ok(out)
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, Snapshot>, StoreError> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, Snapshot>, StoreError> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use stockroom_core::{ActorRef, DomainError, Quantity, UserId};
    use stockroom_inventory::{Dispatch, Receive};

    const COST: u32 = 4;

    fn actor() -> ActorRef {
        ActorRef::new(UserId::new(), "tester")
    }

    fn receive(part: &str, bin: &str, n: i64) -> Receive {
        Receive {
            part_number: part.to_string(),
            bin_code: bin.to_string(),
            quantity: Quantity::positive(n).unwrap(),
            batch: None,
            expiry_date: None,
            reference: None,
            notes: None,
            actor: actor(),
            occurred_at: Utc::now(),
        }
    }

    fn dispatch(part: &str, bin: &str, n: i64) -> Dispatch {
        Dispatch {
            part_number: part.to_string(),
            bin_code: bin.to_string(),
            quantity: Quantity::positive(n).unwrap(),
            reference: None,
            notes: None,
            actor: actor(),
            occurred_at: Utc::now(),
        }
    }

    fn seeded(options: StoreOptions) -> WarehouseStore {
        let store = WarehouseStore::open(options).unwrap();
        store.write(|w| Ok(w.seed(Utc::now()))).unwrap();
        store
    }

    #[test]
    fn concurrent_dispatches_never_overdraw() {
        let store = Arc::new(seeded(StoreOptions::default()));
        store.write(|w| w.receive(receive("BMG-12345", "A-01-01", 5))).unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.write(|w| w.dispatch(dispatch("BMG-12345", "A-01-01", 1))))
            })
            .collect();

        let mut ok = 0;
        for h in handles {
            match h.join().unwrap() {
                Ok(_) => ok += 1,
                Err(StoreError::Domain(DomainError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(ok, 5);
        let balance = store.read(|w| w.ledger().balance_of("BMG-12345", "A-01-01")).unwrap();
        assert_eq!(balance, 0);
        let movements = store.read(|w| w.ledger().movements().len()).unwrap();
        assert_eq!(movements, 6);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            snapshot_path: Some(dir.path().join("stockroom.json")),
        };

        {
            let store = seeded(options.clone());
            store.write(|w| w.receive(receive("BMG-67890", "B-02-02", 9))).unwrap();
            store
                .ensure_admin("admin", "admin123", COST, Utc::now())
                .unwrap();
            store.close().unwrap();
        }

        let reopened = WarehouseStore::open(options).unwrap();
        let balance = reopened
            .read(|w| w.ledger().balance_of("BMG-67890", "B-02-02"))
            .unwrap();
        assert_eq!(balance, 9);
        assert!(reopened.authenticate("admin", "admin123").unwrap().is_some());
    }

    #[test]
    fn rejected_mutation_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockroom.json");
        let store = seeded(StoreOptions {
            snapshot_path: Some(path.clone()),
        });
        let saved = std::fs::read(&path).unwrap();

        let err = store
            .write(|w| w.dispatch(dispatch("BMG-12345", "A-01-01", 1)))
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InsufficientStock { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), saved);
    }

    #[test]
    fn failed_snapshot_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let store = WarehouseStore::open(StoreOptions {
            snapshot_path: Some(dir.path().join("missing-dir").join("stockroom.json")),
        })
        .unwrap();

        let err = store.write(|w| Ok(w.seed(Utc::now()))).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.read(|w| w.catalog().bin_count()).unwrap(), 0);
    }

    #[test]
    fn authentication_rules() {
        let store = WarehouseStore::in_memory();
        store
            .register_user(
                NewUser {
                    username: "picker".to_string(),
                    email: "picker@example.com".to_string(),
                    password: "pick-pass".to_string(),
                    role: Role::Employee,
                    department: Some("Dispatch".to_string()),
                },
                COST,
                Utc::now(),
            )
            .unwrap();

        assert!(store.authenticate("picker", "pick-pass").unwrap().is_some());
        assert!(store.authenticate("picker", "wrong").unwrap().is_none());
        assert!(store.authenticate("ghost", "pick-pass").unwrap().is_none());

        // Seeding the admin twice creates it once.
        assert!(store.ensure_admin("admin", "pw", COST, Utc::now()).unwrap().is_some());
        assert!(store.ensure_admin("admin", "pw", COST, Utc::now()).unwrap().is_none());
        assert_eq!(store.users(|u| u.len()).unwrap(), 2);
    }
}

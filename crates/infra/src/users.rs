use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_auth::{NewUser, UserAccount, UserStatus};
use stockroom_core::{DomainError, DomainResult, UserId};

/// User accounts keyed by id, with unique usernames and emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserDirectory {
    accounts: BTreeMap<UserId, UserAccount>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new account. `user` must already be normalised and
    /// `password_hash` computed.
    pub fn insert(
        &mut self,
        user: NewUser,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<UserAccount> {
        if self.find_by_username(&user.username).is_some() {
            return Err(DomainError::conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }
        if self.accounts.values().any(|a| a.email == user.email) {
            return Err(DomainError::conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let account = UserAccount {
            id: UserId::new(),
            username: user.username,
            email: user.email,
            password_hash,
            role: user.role,
            department: user.department,
            status: UserStatus::Active,
            created_at: now,
        };
        self.accounts.insert(account.id, account.clone());
        tracing::info!(user_id = %account.id, username = %account.username, role = %account.role, "user registered");
        Ok(account)
    }

    pub fn get(&self, id: UserId) -> Option<&UserAccount> {
        self.accounts.get(&id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&UserAccount> {
        let username = username.trim();
        self.accounts.values().find(|a| a.username == username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

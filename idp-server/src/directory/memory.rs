//! In-memory account directory for development and tests
//!
//! Passwords are compared in plain text; the real directory service owns
//! hashing, so this backend is only suitable as a local fixture.

use crate::directory::{Account, AccountDirectory, DirectoryError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Entry {
    account: Account,
    password: Option<String>,
    roles: Vec<String>,
    failed_attempts: u32,
}

/// Thread-safe in-memory directory keyed by account id.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    accounts: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with its credential and roles.
    pub async fn insert(&self, account: Account, password: Option<&str>, roles: &[&str]) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(
            account.id.clone(),
            Entry {
                account,
                password: password.map(str::to_owned),
                roles: roles.iter().map(|role| (*role).to_owned()).collect(),
                failed_attempts: 0,
            },
        );
    }

    /// Current failure counter for an account; `None` for unknown ids.
    pub async fn failed_attempts(&self, id: &str) -> Option<u32> {
        let accounts = self.accounts.read().await;
        accounts.get(id).map(|entry| entry.failed_attempts)
    }
}

#[async_trait::async_trait]
impl AccountDirectory for InMemoryDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|entry| entry.account.username == username)
            .map(|entry| entry.account.clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DirectoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).map(|entry| entry.account.clone()))
    }

    async fn roles(&self, id: &str) -> Result<Vec<String>, DirectoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(id)
            .map(|entry| entry.roles.clone())
            .unwrap_or_default())
    }

    async fn verify_password(&self, id: &str, password: &str) -> Result<bool, DirectoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(id)
            .and_then(|entry| entry.password.as_deref())
            .is_some_and(|stored| stored == password))
    }

    async fn record_failed_attempt(&self, id: &str) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.write().await;
        if let Some(entry) = accounts.get_mut(id) {
            entry.failed_attempts += 1;
        }
        Ok(())
    }

    async fn reset_failure_count(&self, id: &str) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.write().await;
        if let Some(entry) = accounts.get_mut(id) {
            entry.failed_attempts = 0;
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}

//! Account persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::account::Account;
use crate::error::{LedgerError, Result};

/// Storage for accounts keyed by email.
pub trait AccountStore {
    /// Look up an account.
    fn find(&self, email: &str) -> Option<Account>;

    /// Add a new account; fails if the email is taken.
    fn insert(&mut self, account: Account) -> std::result::Result<(), LedgerError>;

    /// Replace an existing account.
    fn update(&mut self, account: Account) -> std::result::Result<(), LedgerError>;

    /// Remove an account, returning it.
    fn delete(&mut self, email: &str) -> std::result::Result<Account, LedgerError>;
}

/// In-memory store that can be snapshotted to a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    accounts: BTreeMap<String, Account>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No ledger at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&content)?;
        debug!("Loaded {} accounts from {}", store.len(), path.display());
        Ok(store)
    }

    /// Write a snapshot, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved {} accounts to {}", self.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountStore for MemoryStore {
    fn find(&self, email: &str) -> Option<Account> {
        self.accounts.get(email).cloned()
    }

    fn insert(&mut self, account: Account) -> std::result::Result<(), LedgerError> {
        if self.accounts.contains_key(&account.email) {
            return Err(LedgerError::DuplicateAccount(account.email));
        }
        self.accounts.insert(account.email.clone(), account);
        Ok(())
    }

    fn update(&mut self, account: Account) -> std::result::Result<(), LedgerError> {
        match self.accounts.get_mut(&account.email) {
            Some(slot) => {
                *slot = account;
                Ok(())
            }
            None => Err(LedgerError::AccountNotFound(account.email)),
        }
    }

    fn delete(&mut self, email: &str) -> std::result::Result<Account, LedgerError> {
        self.accounts
            .remove(email)
            .ok_or_else(|| LedgerError::AccountNotFound(email.to_string()))
    }
}

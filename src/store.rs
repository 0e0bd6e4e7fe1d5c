//! Flat-file tracked-account store.
//!
//! Accounts are persisted as one JSON object mapping account id to
//! [`TrackedAccount`]. A `BTreeMap` keeps iteration order deterministic,
//! which the engine's rotation rebuild relies on. The file is re-read on
//! every operation and rewritten whole on every mutation; missing or
//! corrupt files read as an empty mapping.
//!
//! Username lookups are case-insensitive while records keep the API's
//! canonical casing, so a differently-cased re-add resolves to the same
//! record instead of creating a duplicate-looking entry.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::AppError;
use crate::tracker::types::TrackedAccount;

pub type AccountMap = BTreeMap<String, TrackedAccount>;

#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the accounts file location: `FTBOT_ACCOUNTS_FILE` or
    /// `data.json` in the working directory.
    pub fn from_env() -> Self {
        let path = env::var("FTBOT_ACCOUNTS_FILE")
            .unwrap_or_else(|_| "data.json".to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tracked accounts keyed by id, ordered by id.
    pub async fn get_all(&self) -> Result<AccountMap, AppError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                Ok(serde_json::from_str(&content).unwrap_or_default())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(AccountMap::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Case-insensitive lookup by username.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<TrackedAccount>, AppError> {
        let all = self.get_all().await?;
        Ok(all
            .into_values()
            .find(|account| account.username.eq_ignore_ascii_case(username)))
    }

    /// Insert or replace the record keyed by its id. Returns the updated
    /// mapping.
    pub async fn upsert(
        &self,
        account: TrackedAccount,
    ) -> Result<AccountMap, AppError> {
        let mut all = self.get_all().await?;
        all.insert(account.id.clone(), account);
        self.write_all(&all).await?;
        Ok(all)
    }

    /// Delete by username (case-insensitive). Deleting an absent username
    /// is a no-op. Returns the updated mapping.
    pub async fn delete_by_username(
        &self,
        username: &str,
    ) -> Result<AccountMap, AppError> {
        let mut all = self.get_all().await?;
        let target_id = all
            .values()
            .find(|account| account.username.eq_ignore_ascii_case(username))
            .map(|account| account.id.clone());
        if let Some(id) = target_id {
            all.remove(&id);
        }
        self.write_all(&all).await?;
        Ok(all)
    }

    async fn write_all(&self, all: &AccountMap) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(all)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

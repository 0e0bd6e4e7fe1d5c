//! Flat-file credential / configuration store.
//!
//! Config is a single JSON object on disk holding the API credentials and
//! the polling interval. Reads are tolerant: a missing or corrupt file
//! yields the default (all-null) record so a fresh checkout works without
//! any setup step. Every setter rewrites the whole file and returns the
//! updated record.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::AppError;

/// Polling interval used when `track_interval` is unset (10 minutes).
pub const DEFAULT_TRACK_INTERVAL_SECS: u64 = 600;

/// Persisted key/value configuration record.
///
/// `track_interval` is in seconds; the scheduler converts to milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub token: Option<String>,
    pub track_interval: Option<u64>,
}

impl ConfigRecord {
    /// Interval between tracking cycles, in seconds.
    pub fn track_interval_secs(&self) -> u64 {
        self.track_interval.unwrap_or(DEFAULT_TRACK_INTERVAL_SECS)
    }
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the config file location: `FTBOT_CONFIG_FILE` or
    /// `config.json` in the working directory.
    pub fn from_env() -> Self {
        let path = env::var("FTBOT_CONFIG_FILE")
            .unwrap_or_else(|_| "config.json".to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full config record. Missing or unparseable files read as
    /// the default record.
    pub async fn get(&self) -> Result<ConfigRecord, AppError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                Ok(serde_json::from_str(&content).unwrap_or_default())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(ConfigRecord::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn set_consumer_key(
        &self,
        value: Option<String>,
    ) -> Result<ConfigRecord, AppError> {
        self.update(|conf| conf.consumer_key = none_if_empty(value)).await
    }

    pub async fn set_consumer_secret(
        &self,
        value: Option<String>,
    ) -> Result<ConfigRecord, AppError> {
        self.update(|conf| conf.consumer_secret = none_if_empty(value)).await
    }

    pub async fn set_token(
        &self,
        value: Option<String>,
    ) -> Result<ConfigRecord, AppError> {
        self.update(|conf| conf.token = none_if_empty(value)).await
    }

    pub async fn set_track_interval(
        &self,
        value: Option<u64>,
    ) -> Result<ConfigRecord, AppError> {
        self.update(|conf| conf.track_interval = value).await
    }

    async fn update<F>(&self, apply: F) -> Result<ConfigRecord, AppError>
    where
        F: FnOnce(&mut ConfigRecord),
    {
        let mut conf = self.get().await?;
        apply(&mut conf);
        let content = serde_json::to_string_pretty(&conf)?;
        fs::write(&self.path, content).await?;
        Ok(conf)
    }
}

/// Empty strings persist as null, matching `set.<key>` with no value.
fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

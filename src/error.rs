//! Unified application error.
//!
//! This ensures all layers (config, token exchange, API calls, storage)
//! fail in a predictable and debuggable way. Engine operations never
//! surface these to their caller directly; they are routed to the
//! tracker event channel instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Token acquisition failed: {message}")]
    TokenAcquisition { message: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("@{username} not found")]
    AccountNotFound { username: String },

    #[error("@{username} not exists in the track list")]
    NotTracked { username: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn token_acquisition(message: impl Into<String>) -> Self {
        Self::TokenAcquisition { message: message.into() }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::Api { message: message.into() }
    }

    pub fn account_not_found(username: impl Into<String>) -> Self {
        Self::AccountNotFound { username: username.into() }
    }

    pub fn not_tracked(username: impl Into<String>) -> Self {
        Self::NotTracked { username: username.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Api { message: err.to_string() }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage { message: err.to_string() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage { message: err.to_string() }
    }
}

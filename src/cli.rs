use clap::{Parser, Subcommand};

/// Following tracker CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "ftbot",
    version,
    about = "Track when accounts start following new accounts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the periodic tracking loop
    Start,

    /// Add an account to the track list
    Add {
        /// Target username
        username: String,
    },

    /// Unlist an account from the track list
    Unlist {
        /// Target username
        username: String,
    },

    /// Run one tracking pass for an account
    Track {
        /// Target username
        username: String,
    },

    /// List all tracked accounts
    All,

    /// Set the API consumer key in config
    #[command(name = "set.consumer_key")]
    SetConsumerKey { value: Option<String> },

    /// Set the API consumer secret in config
    #[command(name = "set.consumer_secret")]
    SetConsumerSecret { value: Option<String> },

    /// Set the API bearer token in config
    #[command(name = "set.token")]
    SetToken { value: Option<String> },

    /// Set the track interval (seconds) in config
    #[command(name = "set.track_interval")]
    SetTrackInterval { value: Option<u64> },

    /// Print all config values
    #[command(name = "get.config")]
    GetConfig,
}

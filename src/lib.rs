// Library root — exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod config;
pub mod error;
pub mod notifier;
pub mod scheduler;
pub mod services;
pub mod store;
pub mod tracker;

// These modules are only needed by the binary.
// Declared pub so integration tests can reach them if needed, but they
// contain no logic of interest to tests.
pub mod cli;
pub mod logging;

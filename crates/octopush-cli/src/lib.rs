//! Configuration and logging setup shared by the `octopush` binary and its tests.

pub mod config;
pub mod observability;

pub use config::{AppConfig, LoggingConfig};

pub mod aggregator;
pub mod config;
pub mod error;
pub mod feeds;
pub mod observability;
pub mod scheduler;
pub mod types;
pub mod utils;

/// Environment variable selecting the `config/<env>` overlay.
pub const APP_ENV_VAR: &str = "APP_ENV";

pub const DEFAULT_APP_ENV: &str = "development";

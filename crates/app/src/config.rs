//! Application configuration

use std::path::PathBuf;

use clap::Args;

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Fixture settings.
#[derive(Debug, Args)]
pub struct FixturesConfig {
    /// Directory holding `catalog/`, `discounts/` and `carts/` fixture sets
    #[arg(
        long = "fixtures",
        env = "REBATE_FIXTURES",
        default_value = "crates/core/fixtures",
        global = true
    )]
    pub path: PathBuf,

    /// Fixture set name
    #[arg(long, default_value = "default", global = true)]
    pub set: String,
}

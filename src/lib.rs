//! Battle-Ripple: a match-graph crawler for game statistics
//!
//! This crate walks the graph of players connected through shared matches,
//! starting from one seed player, deduplicates every match it sees by a
//! content fingerprint, and aggregates win/loss and pick counts over a
//! caller-chosen grouping key (entity name, or map plus team composition).

pub mod battle;
pub mod config;
pub mod crawler;
pub mod output;
pub mod source;
pub mod state;
pub mod stats;

use thiserror::Error;

/// Main error type for Battle-Ripple operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl worker failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Result type alias for Battle-Ripple operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use battle::{BattleFingerprint, BattleRecord, Outcome, PlayerId, TeamSide};
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlOutcome};
pub use source::{BattleLogSource, HttpBattleLogSource};
pub use state::{DedupTracker, FrontierTracker, PlayerState};
pub use stats::{AggregateCounter, Grouping, StatsAggregator};

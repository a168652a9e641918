//! Battle log sources
//!
//! The crawl engine only sees the `BattleLogSource` trait. This module
//! provides the HTTP implementation talking to the statistics service and an
//! in-memory implementation backed by fixed logs.

mod http;
mod memory;

pub use http::{build_http_client, decode_battle_log, HttpBattleLogSource};
pub use memory::MemorySource;

use crate::battle::{PlayerId, RawBattleEntry};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching one player's battle log
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error for {player}: {source}")]
    Http {
        player: String,
        source: reqwest::Error,
    },

    #[error("Request timeout for {player}")]
    Timeout { player: String },

    #[error("Rate limited while fetching {player}")]
    RateLimited { player: String },

    #[error("HTTP {status} for {player}: {message}")]
    Status {
        player: String,
        status: u16,
        message: String,
    },

    #[error("Malformed battle log for {player}: {message}")]
    Decode { player: String, message: String },

    #[error("Cannot build request URL for {player}")]
    InvalidUrl { player: String },

    #[error("No battle log available for {player}")]
    Unavailable { player: String },
}

impl SourceError {
    /// Returns true if the service asked us to slow down
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Capability to fetch a player's recent battles
#[async_trait]
pub trait BattleLogSource: Send + Sync {
    /// Fetches the raw battle log of `player`
    async fn fetch_log(&self, player: &PlayerId) -> SourceResult<Vec<RawBattleEntry>>;
}

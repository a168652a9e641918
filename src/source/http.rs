//! HTTP battle log source
//!
//! This module handles all requests to the statistics service, including:
//! - Building the HTTP client with user agent and timeouts
//! - Building the per-player battle log URL
//! - Bearer token authentication
//! - Error classification (rate limiting, timeouts, non-success statuses)
//! - Lenient decoding of the battle log payload

use crate::battle::{PlayerId, RawBattleEntry};
use crate::config::{ApiConfig, Config};
use crate::source::{BattleLogSource, SourceError, SourceResult};
use crate::RippleError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Longest error body kept in a `SourceError::Status` message
const MAX_ERROR_BODY: usize = 200;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The API configuration (user agent)
/// * `timeout` - Total timeout for a single request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Battle log payload with items kept as raw JSON
#[derive(Deserialize)]
struct LenientLog {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// Decodes a battle log response body
///
/// The envelope must be valid JSON. Individual items that do not match the
/// expected shape are kept as empty entries so normalization rejects and
/// counts them instead of failing the whole log.
pub fn decode_battle_log(body: &str) -> Result<Vec<RawBattleEntry>, serde_json::Error> {
    let log: LenientLog = serde_json::from_str(body)?;

    Ok(log
        .items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                tracing::debug!("Undecodable battle log item: {}", e);
                RawBattleEntry::default()
            })
        })
        .collect())
}

/// Battle log source backed by the statistics service's REST API
pub struct HttpBattleLogSource {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpBattleLogSource {
    pub fn new(client: Client, base_url: Url, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            token: token.into(),
        }
    }

    /// Builds the source from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, RippleError> {
        let timeout = Duration::from_millis(config.crawler.request_timeout);
        let client = build_http_client(&config.api, timeout)?;
        let base_url = Url::parse(&config.api.base_url)?;
        let token = config.api.token.clone().unwrap_or_default();
        Ok(Self::new(client, base_url, token))
    }

    /// Returns `{base}/players/{tag}/battlelog` with the tag percent-encoded
    pub fn battlelog_url(&self, player: &PlayerId) -> SourceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl {
                player: player.to_string(),
            })?
            .pop_if_empty()
            .extend(["players", player.as_str(), "battlelog"]);
        Ok(url)
    }

    fn classify(player: &PlayerId, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::Timeout {
                player: player.to_string(),
            }
        } else {
            SourceError::Http {
                player: player.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl BattleLogSource for HttpBattleLogSource {
    async fn fetch_log(&self, player: &PlayerId) -> SourceResult<Vec<RawBattleEntry>> {
        let url = self.battlelog_url(player)?;
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Self::classify(player, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited {
                player: player.to_string(),
            });
        }

        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            message.truncate(
                message
                    .char_indices()
                    .nth(MAX_ERROR_BODY)
                    .map_or(message.len(), |(i, _)| i),
            );
            return Err(SourceError::Status {
                player: player.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::classify(player, e))?;

        decode_battle_log(&body).map_err(|e| SourceError::Decode {
            player: player.to_string(),
            message: e.to_string(),
        })
    }
}

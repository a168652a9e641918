use crate::battle::{BattleFilter, UnknownResultPolicy};
use serde::Deserialize;

/// Main configuration structure for Battle-Ripple
///
/// Every section is optional; a configuration file may be empty when the
/// token and seed player come from the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Player tag the crawl starts from, e.g. `#PLYYP2RRQ`
    #[serde(rename = "seed-player", default)]
    pub seed_player: Option<String>,

    /// Number of concurrent fetch workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Timeout for one battle log request (milliseconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Minimum time between two requests (milliseconds, 0 disables pacing)
    #[serde(rename = "minimum-request-interval", default)]
    pub minimum_request_interval: u64,

    /// Pause after the service rate limits us (milliseconds)
    #[serde(rename = "rate-limit-cooldown", default = "default_rate_limit_cooldown")]
    pub rate_limit_cooldown: u64,

    /// Maximum number of players to fetch
    #[serde(rename = "max-players", default)]
    pub max_players: Option<u32>,

    #[serde(rename = "unknown-result", default)]
    pub unknown_result: UnknownResultPolicy,

    #[serde(default)]
    pub grouping: GroupingKind,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_player: None,
            workers: default_workers(),
            request_timeout: default_request_timeout(),
            minimum_request_interval: 0,
            rate_limit_cooldown: default_rate_limit_cooldown(),
            max_players: None,
            unknown_result: UnknownResultPolicy::default(),
            grouping: GroupingKind::default(),
        }
    }
}

fn default_workers() -> u32 {
    4
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_rate_limit_cooldown() -> u64 {
    5_000
}

/// Which aggregation key the crawl reports on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum GroupingKind {
    /// One key per entity (brawler)
    #[default]
    #[serde(rename = "entity")]
    Entity,

    /// Map name plus the team's sorted entity trio
    #[serde(rename = "map-trio")]
    MapTrio,
}

impl GroupingKind {
    /// Prefix used for report file names
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::MapTrio => "map_trio",
        }
    }
}

/// Statistics service access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Bearer token; usually supplied through the environment instead
    #[serde(default)]
    pub token: Option<String>,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.brawlstars.com/v1".to_string()
}

fn default_user_agent() -> String {
    format!("battle-ripple/{}", env!("CARGO_PKG_VERSION"))
}

/// Battle filtering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Mode tokens rejected outright
    #[serde(rename = "excluded-modes", default = "default_excluded_modes")]
    pub excluded_modes: Vec<String>,

    /// Case-insensitive substrings of the event mode that reject a battle
    #[serde(rename = "excluded-markers", default = "default_excluded_markers")]
    pub excluded_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_modes: default_excluded_modes(),
            excluded_markers: default_excluded_markers(),
        }
    }
}

impl FilterConfig {
    pub fn to_filter(&self) -> BattleFilter {
        BattleFilter::new(self.excluded_modes.clone(), self.excluded_markers.clone())
    }
}

fn default_excluded_modes() -> Vec<String> {
    vec!["soloShowdown".to_string(), "duoShowdown".to_string()]
}

fn default_excluded_markers() -> Vec<String> {
    vec!["5v5".to_string()]
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the JSON reports are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_output_directory() -> String {
    "./reports".to_string()
}

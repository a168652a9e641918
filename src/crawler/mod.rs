//! Crawler module for walking the player graph
//!
//! This module contains the core crawling logic, including:
//! - The worker pool draining the player frontier
//! - Request pacing against the battle log service
//! - Wiring a configuration into a ready-to-run engine

mod coordinator;
mod limiter;

pub use coordinator::{CrawlEngine, CrawlOutcome, EngineSettings};
pub use limiter::{limiter_from_config, IntervalLimiter, RequestLimiter, Unlimited};

use crate::battle::PlayerId;
use crate::config::Config;
use crate::source::HttpBattleLogSource;
use crate::stats::Grouping;
use crate::RippleError;
use std::hash::Hash;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl against the configured service
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP battle log source
/// 2. Build the request limiter
/// 3. Crawl from the configured seed player until the frontier drains,
///    the player budget runs out, or `cancel` fires
///
/// # Arguments
///
/// * `config` - A validated configuration
/// * `grouping` - The aggregation key function
/// * `cancel` - Stop signal for the session
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished or stopped cleanly
/// * `Err(RippleError)` - The source could not be built or a worker failed
pub async fn crawl<K>(
    config: &Config,
    grouping: Arc<dyn Grouping<K>>,
    cancel: CancellationToken,
) -> Result<CrawlOutcome<K>, RippleError>
where
    K: Clone + Eq + Hash + Ord + Send + Sync + 'static,
{
    let seed = config
        .crawler
        .seed_player
        .clone()
        .map(PlayerId::from)
        .ok_or_else(|| {
            crate::ConfigError::MissingCredential("crawler.seed-player".to_string())
        })?;

    let source = HttpBattleLogSource::from_config(config)?;
    let engine = CrawlEngine::new(Arc::new(source), grouping)
        .with_limiter(limiter_from_config(&config.crawler))
        .with_filter(config.filter.to_filter())
        .with_settings(EngineSettings::from_config(&config.crawler))
        .with_cancellation(cancel);

    engine.run(seed).await
}

//! Request pacing for the battle log service
//!
//! This module handles:
//! - Enforcing a minimum interval between consecutive requests
//! - Backing off for a cooldown period after the service rate limits us
//!
//! Slots are reserved under a lock and waited for outside it, so concurrent
//! workers are spaced out rather than released together.

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Paces outbound requests
#[async_trait]
pub trait RequestLimiter: Send + Sync {
    /// Waits until the next request may be sent
    async fn acquire(&self);

    /// Signals that the service answered with a rate limit
    async fn penalize(&self) {}
}

/// Limiter that never waits
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

#[async_trait]
impl RequestLimiter for Unlimited {
    async fn acquire(&self) {}
}

/// Limiter spacing requests by a fixed minimum interval
#[derive(Debug)]
pub struct IntervalLimiter {
    min_interval: Duration,
    cooldown: Duration,

    /// Earliest instant the next request may start
    next_slot: Mutex<Option<Instant>>,
}

impl IntervalLimiter {
    pub fn new(min_interval: Duration, cooldown: Duration) -> Self {
        Self {
            min_interval,
            cooldown,
            next_slot: Mutex::new(None),
        }
    }

    /// Reserves the next slot and returns how long to wait for it
    async fn reserve(&self) -> Duration {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        let slot = next_slot.map_or(now, |s| s.max(now));
        *next_slot = Some(slot + self.min_interval);
        slot.saturating_duration_since(now)
    }
}

#[async_trait]
impl RequestLimiter for IntervalLimiter {
    async fn acquire(&self) {
        let wait = self.reserve().await;
        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before next request", wait);
            tokio::time::sleep(wait).await;
        }
    }

    async fn penalize(&self) {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        let resume = next_slot.map_or(now, |s| s.max(now)) + self.cooldown;
        *next_slot = Some(resume);
        tracing::warn!("Rate limited, pausing requests for {:?}", self.cooldown);
    }
}

/// Builds the limiter described by the crawler configuration
///
/// A zero minimum interval and zero cooldown means no pacing at all.
pub fn limiter_from_config(config: &CrawlerConfig) -> Arc<dyn RequestLimiter> {
    if config.minimum_request_interval == 0 && config.rate_limit_cooldown == 0 {
        return Arc::new(Unlimited);
    }
    Arc::new(IntervalLimiter::new(
        Duration::from_millis(config.minimum_request_interval),
        Duration::from_millis(config.rate_limit_cooldown),
    ))
}

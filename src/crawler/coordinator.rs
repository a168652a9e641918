//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the worker pool that drains the player frontier,
//! including:
//! - Handing out discovered players to a fixed number of workers
//! - Fetching battle logs through the injected source and limiter
//! - Normalizing, deduplicating and aggregating accepted battles
//! - Discovering new players from accepted battles
//! - Cooperative cancellation and the optional player budget
//!
//! All session state lives behind a single mutex. An accepted battle is
//! checked and applied to the dedup tracker, the statistics and the frontier
//! in one critical section, so no other worker can observe it half applied.
//! Fetches run concurrently, but their results are applied in the order the
//! players were claimed, which makes the outcome over a fixed source
//! independent of worker scheduling.

use crate::battle::{
    normalize, BattleFilter, CandidateBattle, PlayerId, Rejection, UnknownResultPolicy,
};
use crate::config::CrawlerConfig;
use crate::crawler::limiter::{RequestLimiter, Unlimited};
use crate::output::{CrawlCounters, CrawlSummary};
use crate::source::BattleLogSource;
use crate::state::{Claim, DedupTracker, FrontierTracker};
use crate::stats::{Grouping, StatsAggregator};
use crate::RippleError;
use chrono::Utc;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runtime settings of the engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Number of concurrent workers
    pub workers: usize,

    /// Upper bound on a single battle log fetch
    pub fetch_timeout: Duration,

    /// Stop handing out players after this many have been claimed
    pub max_players: Option<usize>,

    /// What to do with results that are neither victory nor defeat
    pub unknown_result: UnknownResultPolicy,

    /// Log a progress line every this many finished players
    pub progress_every: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            fetch_timeout: Duration::from_secs(10),
            max_players: None,
            unknown_result: UnknownResultPolicy::default(),
            progress_every: 25,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            workers: config.workers as usize,
            fetch_timeout: Duration::from_millis(config.request_timeout),
            max_players: config.max_players.map(|n| n as usize),
            unknown_result: config.unknown_result,
            ..Self::default()
        }
    }
}

/// Final state of a crawl session
#[derive(Debug)]
pub struct CrawlOutcome<K> {
    pub stats: StatsAggregator<K>,
    pub frontier: FrontierTracker,
    pub dedup: DedupTracker,
    pub summary: CrawlSummary,
}

/// Result of fetching one claimed player, waiting to be applied
enum FetchResult {
    Fetched {
        entries: usize,
        candidates: Vec<CandidateBattle>,
        rejections: Vec<Rejection>,
    },
    Failed {
        rate_limited: bool,
    },
}

struct Finished {
    player: PlayerId,
    result: FetchResult,
}

/// Mutable state shared by all workers of a session
struct Session<K> {
    frontier: FrontierTracker,
    dedup: DedupTracker,
    stats: StatsAggregator<K>,
    counters: CrawlCounters,

    /// Fetched logs keyed by claim sequence, held until every earlier claim
    /// has been applied
    ready: BTreeMap<usize, Finished>,

    /// Sequence of the next claim to apply
    next_to_apply: usize,
}

impl<K> Session<K>
where
    K: Clone + Eq + Hash + Ord,
{
    fn new(seed: PlayerId) -> Self {
        Self {
            frontier: FrontierTracker::with_seed(seed),
            dedup: DedupTracker::new(),
            stats: StatsAggregator::new(),
            counters: CrawlCounters::default(),
            ready: BTreeMap::new(),
            next_to_apply: 0,
        }
    }

    /// Players claimed whose result has not been applied yet
    fn in_flight(&self) -> usize {
        self.frontier.claimed_count() - self.next_to_apply
    }

    /// Removes the result of the next claim in sequence, if it has arrived
    fn take_next_ready(&mut self) -> Option<Finished> {
        let finished = self.ready.remove(&self.next_to_apply)?;
        self.next_to_apply += 1;
        Some(finished)
    }

    /// Applies one candidate battle fetched from `fetched`'s log
    ///
    /// Every check runs before the first mutation, so a rejected candidate
    /// leaves the session untouched. Returns the number of newly discovered
    /// players.
    fn apply(
        &mut self,
        candidate: CandidateBattle,
        fetched: &PlayerId,
        grouping: &dyn Grouping<K>,
        policy: UnknownResultPolicy,
    ) -> Result<usize, Rejection> {
        if self.dedup.seen(&candidate.fingerprint) {
            return Err(Rejection::Duplicate(candidate.fingerprint));
        }

        let record = candidate.into_record(fetched)?;
        let winner = record.winner(policy).ok_or(Rejection::Indeterminate)?;

        self.dedup.record(record.fingerprint());
        self.stats.observe_battle(&record, grouping, winner);
        self.counters.unique_battles += 1;

        let mut discovered = 0;
        for member in record.participants() {
            if self.frontier.mark_discovered(&member.player) {
                discovered += 1;
            }
        }
        Ok(discovered)
    }
}

struct Shared<K> {
    session: Mutex<Session<K>>,

    /// Woken whenever a player finishes, so idle workers re-check the frontier
    finished: Notify,
}

/// Engine crawling the player graph from a seed
///
/// The source, limiter and grouping are injected; the engine only owns the
/// traversal. Each call to `run` starts a fresh session.
pub struct CrawlEngine<K> {
    source: Arc<dyn BattleLogSource>,
    limiter: Arc<dyn RequestLimiter>,
    grouping: Arc<dyn Grouping<K>>,
    filter: BattleFilter,
    settings: EngineSettings,
    cancel: CancellationToken,
}

impl<K> CrawlEngine<K>
where
    K: Clone + Eq + Hash + Ord + Send + Sync + 'static,
{
    /// Creates an engine with default filter and settings and no pacing
    pub fn new(source: Arc<dyn BattleLogSource>, grouping: Arc<dyn Grouping<K>>) -> Self {
        Self {
            source,
            limiter: Arc::new(Unlimited),
            grouping,
            filter: BattleFilter::default(),
            settings: EngineSettings::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_limiter(mut self, limiter: Arc<dyn RequestLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_filter(mut self, filter: BattleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Uses `cancel` as the session's stop signal
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the crawl when cancelled
    ///
    /// In-flight fetches complete and are applied; no new player is handed
    /// out afterwards.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls the player graph reachable from `seed`
    ///
    /// # Arguments
    ///
    /// * `seed` - The player whose log is fetched first
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Statistics, final frontier and summary
    /// * `Err(RippleError)` - A worker task panicked
    pub async fn run(&self, seed: PlayerId) -> Result<CrawlOutcome<K>, RippleError> {
        let started_at = Utc::now();
        let workers = self.settings.workers.max(1);
        tracing::info!("Starting crawl from {} with {} workers", seed, workers);

        let shared = Arc::new(Shared {
            session: Mutex::new(Session::new(seed.clone())),
            finished: Notify::new(),
        });

        let mut tasks = JoinSet::new();
        for worker_id in 0..workers {
            let worker = Worker {
                id: worker_id,
                source: Arc::clone(&self.source),
                limiter: Arc::clone(&self.limiter),
                grouping: Arc::clone(&self.grouping),
                filter: self.filter.clone(),
                settings: self.settings.clone(),
                cancel: self.cancel.clone(),
                shared: Arc::clone(&shared),
            };
            tasks.spawn(worker.run());
        }

        while let Some(joined) = tasks.join_next().await {
            joined.map_err(|e| RippleError::Worker(e.to_string()))?;
        }

        let session = Arc::try_unwrap(shared)
            .map_err(|_| {
                RippleError::Worker("session still shared after workers exited".to_string())
            })?
            .session
            .into_inner();

        let mut summary = CrawlSummary::from_session(
            seed.as_str(),
            started_at,
            &session.frontier,
            session.counters,
            session.stats.len(),
        );
        summary.cancelled = self.cancel.is_cancelled();
        summary.budget_exhausted = self
            .settings
            .max_players
            .is_some_and(|max| session.frontier.claimed_count() >= max)
            && session.frontier.has_unclaimed();

        if summary.counters.failed_fetches > 0 {
            tracing::warn!(
                "{} battle log fetches failed during the crawl",
                summary.counters.failed_fetches
            );
        }
        tracing::info!(
            "Crawl finished: {} players processed, {} unique battles, {} duplicates in {:.1}s",
            summary.players_processed,
            summary.counters.unique_battles,
            summary.counters.duplicate_battles,
            summary.duration_seconds
        );

        Ok(CrawlOutcome {
            stats: session.stats,
            frontier: session.frontier,
            dedup: session.dedup,
            summary,
        })
    }
}

/// One worker of the pool
struct Worker<K> {
    id: usize,
    source: Arc<dyn BattleLogSource>,
    limiter: Arc<dyn RequestLimiter>,
    grouping: Arc<dyn Grouping<K>>,
    filter: BattleFilter,
    settings: EngineSettings,
    cancel: CancellationToken,
    shared: Arc<Shared<K>>,
}

impl<K> Worker<K>
where
    K: Clone + Eq + Hash + Ord + Send + Sync + 'static,
{
    async fn run(self) {
        loop {
            // Registered before inspecting the frontier so a player finishing
            // in between still wakes us.
            let finished = self.shared.finished.notified();

            let claimed = {
                let mut session = self.shared.session.lock().await;
                if self.cancel.is_cancelled() {
                    tracing::debug!("Worker {} stopping: cancelled", self.id);
                    return;
                }
                if let Some(max) = self.settings.max_players {
                    if session.frontier.claimed_count() >= max {
                        tracing::debug!("Worker {} stopping: player budget reached", self.id);
                        return;
                    }
                }

                match session.frontier.claim_next() {
                    Some(claim) => Some(claim),
                    None if session.in_flight() == 0 => {
                        self.shared.finished.notify_waiters();
                        return;
                    }
                    None => None,
                }
            };

            match claimed {
                Some(claim) => {
                    self.process_player(claim).await;
                    self.shared.finished.notify_waiters();
                }
                None => {
                    tokio::select! {
                        _ = finished => {}
                        _ = self.cancel.cancelled() => {}
                    }
                }
            }
        }
    }

    /// Fetches one player's battle log and applies every result now in turn
    ///
    /// Results are applied strictly in claim order, so the session evolves
    /// exactly as it would with a single worker whatever order fetches
    /// complete in.
    async fn process_player(&self, claim: Claim) {
        let Claim { seq, player } = claim;
        let result = self.fetch(&player).await;

        let mut session = self.shared.session.lock().await;
        session.ready.insert(seq, Finished { player, result });
        while let Some(finished) = session.take_next_ready() {
            self.apply_finished(&mut session, finished);
        }
    }

    /// Fetches and normalizes a log outside the session lock
    async fn fetch(&self, player: &PlayerId) -> FetchResult {
        tracing::debug!("Worker {} fetching {}", self.id, player);
        self.limiter.acquire().await;

        let fetched =
            tokio::time::timeout(self.settings.fetch_timeout, self.source.fetch_log(player)).await;

        let entries = match fetched {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                tracing::warn!("Failed to fetch battle log for {}: {}", player, e);
                let rate_limited = e.is_rate_limited();
                if rate_limited {
                    self.limiter.penalize().await;
                }
                return FetchResult::Failed { rate_limited };
            }
            Err(_) => {
                tracing::warn!(
                    "Timed out after {:?} fetching battle log for {}",
                    self.settings.fetch_timeout,
                    player
                );
                return FetchResult::Failed {
                    rate_limited: false,
                };
            }
        };

        let mut candidates = Vec::with_capacity(entries.len());
        let mut rejections = Vec::new();
        for entry in &entries {
            match normalize(entry, &self.filter) {
                Ok(candidate) => candidates.push(candidate),
                Err(rejection) => {
                    tracing::trace!("Rejected entry from {}: {}", player, rejection);
                    rejections.push(rejection);
                }
            }
        }

        FetchResult::Fetched {
            entries: entries.len(),
            candidates,
            rejections,
        }
    }

    fn apply_finished(&self, session: &mut Session<K>, finished: Finished) {
        let Finished { player, result } = finished;
        match result {
            FetchResult::Fetched {
                entries,
                candidates,
                rejections,
            } => {
                for rejection in &rejections {
                    session.counters.count_rejection(rejection);
                }

                let mut discovered = 0;
                for candidate in candidates {
                    match session.apply(
                        candidate,
                        &player,
                        self.grouping.as_ref(),
                        self.settings.unknown_result,
                    ) {
                        Ok(new_players) => discovered += new_players,
                        Err(rejection) => {
                            tracing::trace!("Rejected battle from {}: {}", player, rejection);
                            session.counters.count_rejection(&rejection);
                        }
                    }
                }

                session.frontier.mark_processed(&player);
                tracing::debug!(
                    "Processed {}: {} entries, {} new players",
                    player,
                    entries,
                    discovered
                );
            }
            FetchResult::Failed { rate_limited } => {
                session.frontier.mark_failed(&player);
                session.counters.failed_fetches += 1;
                if rate_limited {
                    session.counters.rate_limited_fetches += 1;
                }
            }
        }
        self.report_progress(session);
    }

    fn report_progress(&self, session: &Session<K>) {
        let done = session.frontier.processed_count();
        if self.settings.progress_every > 0 && done % self.settings.progress_every == 0 {
            tracing::info!(
                "Progress: {} players done, {} discovered, {} unique battles",
                done,
                session.frontier.discovered_count(),
                session.counters.unique_battles
            );
        }
    }
}

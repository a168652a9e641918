//! Crawl summary and counters
//!
//! This module provides the bookkeeping counters maintained while crawling
//! and the summary reported at the end of a session.

use crate::battle::Rejection;
use crate::state::FrontierTracker;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters maintained by the engine during a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlCounters {
    /// Records accepted into the statistics
    pub unique_battles: u64,

    /// Records skipped because their fingerprint was already counted
    pub duplicate_battles: u64,

    /// Excluded modes, missing modes and excluded compositions
    pub rejected_mode: u64,

    /// Missing fields, wrong team count, fetched player absent
    pub rejected_malformed: u64,

    /// Indeterminate results skipped by policy
    pub rejected_indeterminate: u64,

    pub failed_fetches: u64,
    pub rate_limited_fetches: u64,
}

impl CrawlCounters {
    /// Counts one rejected record under its category
    pub fn count_rejection(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::ExcludedMode(_)
            | Rejection::MissingMode
            | Rejection::ExcludedComposition(_) => self.rejected_mode += 1,
            Rejection::Malformed(_) | Rejection::TeamCount(_) | Rejection::PlayerAbsent => {
                self.rejected_malformed += 1
            }
            Rejection::Duplicate(_) => self.duplicate_battles += 1,
            Rejection::Indeterminate => self.rejected_indeterminate += 1,
        }
    }

    /// Total number of records considered, accepted or not
    pub fn records_seen(&self) -> u64 {
        self.unique_battles
            + self.duplicate_battles
            + self.rejected_mode
            + self.rejected_malformed
            + self.rejected_indeterminate
    }
}

/// Summary of one crawl session
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_seconds: f64,

    /// SHA-256 of the configuration file, when crawled from one
    pub config_hash: Option<String>,

    pub players_discovered: u64,
    pub players_processed: u64,
    pub players_failed: u64,

    /// Discovered players never fetched because the crawl stopped early
    pub players_pending: u64,

    #[serde(flatten)]
    pub counters: CrawlCounters,

    /// Distinct keys in the statistics
    pub distinct_keys: u64,

    pub cancelled: bool,
    pub budget_exhausted: bool,
}

impl CrawlSummary {
    /// Builds the summary from the final session state
    pub fn from_session(
        seed: &str,
        started_at: DateTime<Utc>,
        frontier: &FrontierTracker,
        counters: CrawlCounters,
        distinct_keys: usize,
    ) -> Self {
        let finished_at = Utc::now();
        let duration_seconds = (finished_at - started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let failed = frontier.failed_count() as u64;
        let terminal = frontier.processed_count() as u64;
        let discovered = frontier.discovered_count() as u64;

        Self {
            seed: seed.to_string(),
            started_at,
            finished_at,
            duration_seconds,
            config_hash: None,
            players_discovered: discovered,
            players_processed: terminal - failed,
            players_failed: failed,
            players_pending: discovered - terminal,
            counters,
            distinct_keys: distinct_keys as u64,
            cancelled: false,
            budget_exhausted: false,
        }
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Session:");
    println!("  Seed player: {}", summary.seed);
    println!("  Duration: {:.1}s", summary.duration_seconds);
    if let Some(hash) = &summary.config_hash {
        println!("  Config hash: {}", hash);
    }
    if summary.cancelled {
        println!("  Stopped early: cancelled");
    } else if summary.budget_exhausted {
        println!("  Stopped early: player budget reached");
    }
    println!();

    println!("Players:");
    println!("  Discovered: {}", summary.players_discovered);
    println!("  Processed: {}", summary.players_processed);
    println!("  Failed: {}", summary.players_failed);
    println!("  Pending: {}", summary.players_pending);
    println!();

    let counters = &summary.counters;
    println!("Battles:");
    println!("  Unique: {}", counters.unique_battles);
    println!("  Duplicates: {}", counters.duplicate_battles);
    println!("  Rejected (mode): {}", counters.rejected_mode);
    println!("  Rejected (malformed): {}", counters.rejected_malformed);
    println!(
        "  Rejected (indeterminate): {}",
        counters.rejected_indeterminate
    );
    println!();

    if counters.failed_fetches > 0 {
        println!(
            "Failed fetches: {} ({} rate limited)",
            counters.failed_fetches, counters.rate_limited_fetches
        );
        println!();
    }

    let seen = counters.records_seen();
    let acceptance = if seen > 0 {
        (counters.unique_battles as f64 / seen as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Acceptance Rate: {:.1}% ({} / {} records counted), {} distinct keys",
        acceptance, counters.unique_battles, seen, summary.distinct_keys
    );
}

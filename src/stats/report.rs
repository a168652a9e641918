//! Counter and report row types
//!
//! Ranking is fully deterministic: descending winrate, then descending pick
//! count, then ascending key. Winrates are compared with `f64::total_cmp`.

use serde::Serialize;
use std::cmp::Ordering;

/// Win/loss/pick counters for one grouping key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateCounter {
    pub wins: u64,
    pub losses: u64,

    /// Raw occurrence count, maintained alongside wins and losses
    pub picks: u64,
}

impl AggregateCounter {
    /// Wins plus losses
    pub fn total(&self) -> u64 {
        self.wins + self.losses
    }

    /// Fraction of games won, 0.0 when no games were recorded
    pub fn winrate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.wins as f64 / total as f64
    }

    pub fn finalize(&self) -> FinalStats {
        FinalStats {
            wins: self.wins,
            losses: self.losses,
            picks: self.picks,
            winrate: self.winrate(),
        }
    }
}

/// Counters with the winrate computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalStats {
    pub wins: u64,
    pub losses: u64,
    pub picks: u64,
    pub winrate: f64,
}

/// One ranked entry of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow<K> {
    pub key: K,

    #[serde(flatten)]
    pub stats: FinalStats,
}

impl<K: Ord> ReportRow<K> {
    /// Ranking order used by every report
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .stats
            .winrate
            .total_cmp(&self.stats.winrate)
            .then_with(|| other.stats.picks.cmp(&self.stats.picks))
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// Sorts rows into ranking order
pub fn rank_rows<K: Ord>(rows: &mut [ReportRow<K>]) {
    rows.sort_by(|a, b| a.rank_cmp(b));
}

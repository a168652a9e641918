use crate::battle::{BattleRecord, TeamSide};
use crate::stats::report::{rank_rows, AggregateCounter, FinalStats, ReportRow};
use crate::stats::Grouping;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Accumulates win/loss/pick counters per grouping key
#[derive(Debug, Clone)]
pub struct StatsAggregator<K> {
    counters: HashMap<K, AggregateCounter>,
}

impl<K> Default for StatsAggregator<K> {
    fn default() -> Self {
        Self {
            counters: HashMap::new(),
        }
    }
}

impl<K> StatsAggregator<K>
where
    K: Clone + Eq + Hash + Ord,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one appearance of `key` with its result
    pub fn observe(&mut self, key: K, won: bool) {
        let counter = self.counters.entry(key).or_default();
        counter.picks += 1;
        if won {
            counter.wins += 1;
        } else {
            counter.losses += 1;
        }
    }

    /// Observes both teams of an accepted battle
    pub fn observe_battle<G>(&mut self, record: &BattleRecord, grouping: &G, winner: TeamSide)
    where
        G: Grouping<K> + ?Sized,
    {
        for side in [TeamSide::A, TeamSide::B] {
            let won = side == winner;
            for key in grouping.keys(record, side) {
                self.observe(key, won);
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&AggregateCounter> {
        self.counters.get(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Every key with its counters and computed winrate
    pub fn finalize(&self) -> BTreeMap<K, FinalStats> {
        self.counters
            .iter()
            .map(|(key, counter)| (key.clone(), counter.finalize()))
            .collect()
    }

    /// Every key in ranking order
    pub fn report(&self) -> Vec<ReportRow<K>> {
        let mut rows: Vec<ReportRow<K>> = self
            .counters
            .iter()
            .map(|(key, counter)| ReportRow {
                key: key.clone(),
                stats: counter.finalize(),
            })
            .collect();
        rank_rows(&mut rows);
        rows
    }

    /// Occurrence count per key, ordered by key
    pub fn popularity(&self) -> BTreeMap<K, u64> {
        self.counters
            .iter()
            .map(|(key, counter)| (key.clone(), counter.picks))
            .collect()
    }

    /// Occurrence count per key, most picked first, ties by key
    pub fn popularity_ranked(&self) -> Vec<(K, u64)> {
        let mut ranked: Vec<(K, u64)> = self.popularity().into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

use crate::battle::{PlayerId, RawBattleEntry};
use crate::source::{BattleLogSource, SourceError, SourceResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Battle log source serving fixed logs from memory
///
/// Players without a registered log get an empty one. Players registered
/// with `with_failure` always fail. Every call is counted per player.
#[derive(Debug, Default)]
pub struct MemorySource {
    logs: HashMap<PlayerId, Vec<RawBattleEntry>>,
    failing: HashSet<PlayerId>,
    calls: Mutex<HashMap<PlayerId, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the log returned for `player`
    pub fn with_log(mut self, player: impl Into<PlayerId>, entries: Vec<RawBattleEntry>) -> Self {
        self.logs.insert(player.into(), entries);
        self
    }

    /// Makes every fetch of `player` fail
    pub fn with_failure(mut self, player: impl Into<PlayerId>) -> Self {
        self.failing.insert(player.into());
        self
    }

    /// Number of times `player`'s log was requested
    pub fn fetch_count(&self, player: &PlayerId) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(player).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Total number of requests across all players
    pub fn total_fetches(&self) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl BattleLogSource for MemorySource {
    async fn fetch_log(&self, player: &PlayerId) -> SourceResult<Vec<RawBattleEntry>> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(player.clone()).or_default() += 1;
        }

        if self.failing.contains(player) {
            return Err(SourceError::Unavailable {
                player: player.to_string(),
            });
        }

        Ok(self.logs.get(player).cloned().unwrap_or_default())
    }
}

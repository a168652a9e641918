use crate::battle::BattleFingerprint;
use std::collections::HashSet;

/// Set of battle fingerprints already counted this session
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: HashSet<BattleFingerprint>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the battle was already counted
    pub fn seen(&self, fingerprint: &BattleFingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Records a fingerprint; returns false if it was already present
    pub fn record(&mut self, fingerprint: BattleFingerprint) -> bool {
        self.seen.insert(fingerprint)
    }

    /// Number of unique battles recorded
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

use crate::battle::PlayerId;
use crate::state::PlayerState;
use std::collections::HashMap;

/// A player handed out for fetching
///
/// `seq` numbers claims from zero in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub seq: usize,
    pub player: PlayerId,
}

/// Tracks which players have been discovered and which have been processed
///
/// Players are kept in an append-only sequence in discovery order. A cursor
/// walks that sequence to hand out the next player to fetch, so new players
/// discovered while draining are simply appended behind the cursor and
/// picked up in turn. Nothing is ever removed.
#[derive(Debug, Default)]
pub struct FrontierTracker {
    /// Every player ever discovered, in discovery order
    order: Vec<PlayerId>,

    /// Current state of each discovered player
    states: HashMap<PlayerId, PlayerState>,

    /// Index of the next entry in `order` not yet handed out
    cursor: usize,

    claimed: usize,
    terminal: usize,
    failed: usize,
}

impl FrontierTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker with the seed player already discovered
    pub fn with_seed(seed: PlayerId) -> Self {
        let mut tracker = Self::new();
        tracker.mark_discovered(&seed);
        tracker
    }

    /// Marks a player as discovered
    ///
    /// Returns true the first time `id` is seen and false on every later
    /// call, whatever state the player is in by then. Only first-time
    /// discoveries are queued.
    pub fn mark_discovered(&mut self, id: &PlayerId) -> bool {
        if self.states.contains_key(id) {
            return false;
        }
        self.states.insert(id.clone(), PlayerState::Discovered);
        self.order.push(id.clone());
        true
    }

    /// Hands out the next discovered player and marks it as fetching
    pub fn claim_next(&mut self) -> Option<Claim> {
        while let Some(id) = self.order.get(self.cursor) {
            self.cursor += 1;
            if let Some(state) = self.states.get_mut(id) {
                if *state == PlayerState::Discovered {
                    *state = PlayerState::Fetching;
                    let claim = Claim {
                        seq: self.claimed,
                        player: id.clone(),
                    };
                    self.claimed += 1;
                    return Some(claim);
                }
            }
        }
        None
    }

    /// Marks a player's log as fully considered
    pub fn mark_processed(&mut self, id: &PlayerId) {
        self.finish(id, PlayerState::Processed);
    }

    /// Marks a player whose log could not be fetched
    pub fn mark_failed(&mut self, id: &PlayerId) {
        self.finish(id, PlayerState::Failed);
    }

    fn finish(&mut self, id: &PlayerId, terminal: PlayerState) {
        match self.states.get_mut(id) {
            Some(state) if state.can_transition_to(terminal) => *state = terminal,
            Some(state) => {
                tracing::debug!("Ignoring transition {} -> {} for {}", state, terminal, id);
                return;
            }
            None => {
                self.states.insert(id.clone(), terminal);
                self.order.push(id.clone());
            }
        }

        self.terminal += 1;
        if terminal == PlayerState::Failed {
            self.failed += 1;
        }
    }

    /// Returns discovered players not yet processed, in discovery order
    ///
    /// Players currently being fetched are included.
    pub fn pending(&self) -> Vec<PlayerId> {
        self.order
            .iter()
            .filter(|id| self.state(id).is_some_and(|s| s.is_active()))
            .cloned()
            .collect()
    }

    /// Returns true if some discovered player has not been handed out yet
    pub fn has_unclaimed(&self) -> bool {
        self.order[self.cursor..]
            .iter()
            .any(|id| self.state(id) == Some(PlayerState::Discovered))
    }

    pub fn state(&self, id: &PlayerId) -> Option<PlayerState> {
        self.states.get(id).copied()
    }

    pub fn is_processed(&self, id: &PlayerId) -> bool {
        self.state(id).is_some_and(|s| s.is_terminal())
    }

    /// Number of players ever discovered
    pub fn discovered_count(&self) -> usize {
        self.order.len()
    }

    /// Number of players handed out by `claim_next` so far
    pub fn claimed_count(&self) -> usize {
        self.claimed
    }

    /// Number of players in a terminal state (processed or failed)
    pub fn processed_count(&self) -> usize {
        self.terminal
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }
}

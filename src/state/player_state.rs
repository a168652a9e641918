//! Player state definitions for tracking crawl progress
//!
//! This module defines every state a player can be in during a crawl session.

use std::fmt;

/// Represents the current state of a player in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    // ===== Active States =====
    /// Player has been seen in an accepted battle but not yet fetched
    Discovered,

    /// Player's battle log is currently being fetched
    Fetching,

    // ===== Terminal States =====
    /// Player's battle log was fetched and every entry considered
    Processed,

    /// Player's battle log could not be fetched; no contribution
    Failed,
}

impl PlayerState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Failed)
    }

    /// Returns true if this is an active state (player may still be processed)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Fetching => "fetching",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }

    /// Checks if a transition from this state to another is valid
    ///
    /// Valid transitions:
    /// - Discovered -> Fetching, Processed, Failed
    /// - Fetching -> Processed, Failed
    /// - Terminal states cannot transition
    pub fn can_transition_to(&self, target: PlayerState) -> bool {
        match self {
            Self::Discovered => target != Self::Discovered,
            Self::Fetching => target.is_terminal(),
            Self::Processed | Self::Failed => false,
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

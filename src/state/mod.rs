//! State module for tracking crawl progress
//!
//! This module provides the session-scoped bookkeeping of a crawl.
//!
//! # Components
//!
//! - `PlayerState`: Tracks the state of individual players (discovered, fetching, processed, failed)
//! - `FrontierTracker`: Discovery-ordered worklist of players
//! - `DedupTracker`: Fingerprints of battles already counted

mod dedup;
mod frontier;
mod player_state;

// Re-export main types
pub use dedup::DedupTracker;
pub use frontier::{Claim, FrontierTracker};
pub use player_state::PlayerState;

//! Battle data model
//!
//! This module defines the normalized view of a fetched match and the pieces
//! needed to get there from raw source output:
//!
//! - `raw`: lenient wire shape of a battle log as returned by the source
//! - `fingerprint`: content digest identifying a match regardless of which
//!   participant's history it was fetched from
//! - `normalize`: mode filtering and conversion into candidate battles

mod fingerprint;
mod normalize;
pub mod raw;

pub use fingerprint::{BattleFingerprint, BattleHasher};
pub use normalize::{normalize, BattleFilter, CandidateBattle, Rejection};
pub use raw::{RawBattle, RawBattleEntry, RawBattleLog, RawBrawler, RawEvent, RawPlayer};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque player account identifier (the service's player tag)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for PlayerId {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// Game mode of a battle
///
/// Known modes get their own variant; anything else the service reports is
/// carried through verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameMode {
    GemGrab,
    BrawlBall,
    Heist,
    Bounty,
    HotZone,
    Knockout,
    Siege,
    Wipeout,
    Duels,
    SoloShowdown,
    DuoShowdown,
    TrioShowdown,
    Other(String),
}

impl GameMode {
    /// Parses a mode token as reported by the service
    pub fn from_token(token: &str) -> Self {
        match token {
            "gemGrab" => Self::GemGrab,
            "brawlBall" => Self::BrawlBall,
            "heist" => Self::Heist,
            "bounty" => Self::Bounty,
            "hotZone" => Self::HotZone,
            "knockout" => Self::Knockout,
            "siege" => Self::Siege,
            "wipeout" => Self::Wipeout,
            "duels" => Self::Duels,
            "soloShowdown" => Self::SoloShowdown,
            "duoShowdown" => Self::DuoShowdown,
            "trioShowdown" => Self::TrioShowdown,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the service token for this mode
    pub fn as_token(&self) -> &str {
        match self {
            Self::GemGrab => "gemGrab",
            Self::BrawlBall => "brawlBall",
            Self::Heist => "heist",
            Self::Bounty => "bounty",
            Self::HotZone => "hotZone",
            Self::Knockout => "knockout",
            Self::Siege => "siege",
            Self::Wipeout => "wipeout",
            Self::Duels => "duels",
            Self::SoloShowdown => "soloShowdown",
            Self::DuoShowdown => "duoShowdown",
            Self::TrioShowdown => "trioShowdown",
            Self::Other(token) => token,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// One participant of a battle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    /// Account identifier, used for frontier membership
    pub player: PlayerId,

    /// Display name, used for fingerprinting
    pub name: String,

    /// Entity (character) the player picked
    pub entity: String,
}

impl TeamMember {
    pub fn new(
        player: impl Into<PlayerId>,
        name: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            player: player.into(),
            name: name.into(),
            entity: entity.into(),
        }
    }
}

/// Which of the two teams of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamSide {
    /// The team containing the player whose log was fetched
    A,
    B,
}

impl TeamSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Result of a battle as reported from team A's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    TeamA,
    TeamB,
    /// The source gave no definitive result (draw, missing field, unknown token)
    Indeterminate,
}

impl Outcome {
    /// Maps the source's result token for team A
    pub fn from_result_token(token: Option<&str>) -> Self {
        match token {
            Some("victory") => Self::TeamA,
            Some("defeat") => Self::TeamB,
            _ => Self::Indeterminate,
        }
    }
}

/// How to treat a battle whose result is neither victory nor defeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownResultPolicy {
    /// Count the fetched player's team as having lost
    #[default]
    #[serde(rename = "loss")]
    DefaultToLoss,

    /// Reject the record entirely
    #[serde(rename = "skip")]
    Skip,
}

/// Normalized two-team battle
///
/// Team A is always the team of the player whose log produced the record.
/// Fields are private; a record never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleRecord {
    fingerprint: BattleFingerprint,
    timestamp: String,
    mode: GameMode,
    map_name: Option<String>,
    team_a: Vec<TeamMember>,
    team_b: Vec<TeamMember>,
    outcome: Outcome,
}

impl BattleRecord {
    /// Builds a record, computing its fingerprint from the timestamp and names
    pub fn new(
        timestamp: impl Into<String>,
        mode: GameMode,
        map_name: Option<String>,
        team_a: Vec<TeamMember>,
        team_b: Vec<TeamMember>,
        outcome: Outcome,
    ) -> Self {
        let timestamp = timestamp.into();
        let fingerprint = BattleHasher::fingerprint(&timestamp, &team_a, &team_b);
        Self {
            fingerprint,
            timestamp,
            mode,
            map_name,
            team_a,
            team_b,
            outcome,
        }
    }

    pub fn fingerprint(&self) -> BattleFingerprint {
        self.fingerprint
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn map_name(&self) -> Option<&str> {
        self.map_name.as_deref()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn team(&self, side: TeamSide) -> &[TeamMember] {
        match side {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }

    /// Every participant across both teams
    pub fn participants(&self) -> impl Iterator<Item = &TeamMember> {
        self.team_a.iter().chain(self.team_b.iter())
    }

    /// Resolves the winning side under the given policy
    ///
    /// Returns `None` only for an indeterminate outcome under `Skip`.
    pub fn winner(&self, policy: UnknownResultPolicy) -> Option<TeamSide> {
        match (self.outcome, policy) {
            (Outcome::TeamA, _) => Some(TeamSide::A),
            (Outcome::TeamB, _) => Some(TeamSide::B),
            (Outcome::Indeterminate, UnknownResultPolicy::DefaultToLoss) => Some(TeamSide::B),
            (Outcome::Indeterminate, UnknownResultPolicy::Skip) => None,
        }
    }
}

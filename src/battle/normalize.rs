//! Normalization of raw battle log entries
//!
//! Turning a raw entry into a `BattleRecord` happens in two steps so the
//! engine can check the fingerprint in between:
//!
//! 1. `normalize` applies the mode filter, validates the required fields and
//!    computes the fingerprint, producing a `CandidateBattle`.
//! 2. `CandidateBattle::into_record` requires exactly two teams and orients
//!    them around the fetched player.

use crate::battle::{
    BattleFingerprint, BattleHasher, BattleRecord, GameMode, Outcome, PlayerId, RawBattleEntry,
    RawPlayer, TeamMember,
};
use std::fmt;

/// Why a raw entry did not become an accepted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Mode is on the exclusion list
    ExcludedMode(String),

    /// Event carries no mode token
    MissingMode,

    /// Event mode carries an excluded composition marker (e.g. 5v5)
    ExcludedComposition(String),

    /// Required field missing or unusable
    Malformed(&'static str),

    /// Fingerprint already counted this session
    Duplicate(BattleFingerprint),

    /// Record does not have exactly two teams
    TeamCount(usize),

    /// Fetched player is on neither team
    PlayerAbsent,

    /// Result is indeterminate and the policy says to skip it
    Indeterminate,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcludedMode(mode) => write!(f, "excluded mode {}", mode),
            Self::MissingMode => write!(f, "event has no mode"),
            Self::ExcludedComposition(mode) => write!(f, "excluded composition in {}", mode),
            Self::Malformed(what) => write!(f, "malformed record: {}", what),
            Self::Duplicate(fp) => write!(f, "duplicate battle {:?}", fp),
            Self::TeamCount(n) => write!(f, "expected 2 teams, got {}", n),
            Self::PlayerAbsent => write!(f, "fetched player not found in either team"),
            Self::Indeterminate => write!(f, "indeterminate result"),
        }
    }
}

/// Mode and composition filter applied before fingerprinting
#[derive(Debug, Clone)]
pub struct BattleFilter {
    excluded_modes: Vec<String>,
    excluded_markers: Vec<String>,
}

impl BattleFilter {
    /// Creates a filter
    ///
    /// Modes are matched exactly. Markers are matched case-insensitively as
    /// substrings of the event mode, since the service spells them both
    /// `5v5` and `5V5`.
    pub fn new(excluded_modes: Vec<String>, excluded_markers: Vec<String>) -> Self {
        Self {
            excluded_modes,
            excluded_markers: excluded_markers
                .into_iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }

    fn is_excluded_mode(&self, token: &str) -> bool {
        self.excluded_modes.iter().any(|m| m == token)
    }

    fn has_excluded_marker(&self, event_mode: &str) -> bool {
        let lowered = event_mode.to_lowercase();
        self.excluded_markers
            .iter()
            .any(|marker| lowered.contains(marker.as_str()))
    }

    /// Checks the mode tokens of an entry and returns the effective mode
    pub fn check_mode(&self, entry: &RawBattleEntry) -> Result<GameMode, Rejection> {
        let battle_mode = entry.battle.as_ref().and_then(|b| b.mode.as_deref());
        if let Some(mode) = battle_mode {
            if self.is_excluded_mode(mode) {
                return Err(Rejection::ExcludedMode(mode.to_string()));
            }
        }

        let event_mode = entry
            .event
            .as_ref()
            .and_then(|e| e.mode.as_deref())
            .ok_or(Rejection::MissingMode)?;

        if self.is_excluded_mode(event_mode) {
            return Err(Rejection::ExcludedMode(event_mode.to_string()));
        }
        if self.has_excluded_marker(event_mode) {
            return Err(Rejection::ExcludedComposition(event_mode.to_string()));
        }

        Ok(GameMode::from_token(battle_mode.unwrap_or(event_mode)))
    }
}

impl Default for BattleFilter {
    fn default() -> Self {
        Self::new(
            vec!["soloShowdown".to_string(), "duoShowdown".to_string()],
            vec!["5v5".to_string()],
        )
    }
}

/// A battle that passed the mode filter and has a fingerprint
///
/// The team count is not yet checked; that happens after the duplicate
/// check in `into_record`.
#[derive(Debug, Clone)]
pub struct CandidateBattle {
    pub fingerprint: BattleFingerprint,
    pub timestamp: String,
    pub mode: GameMode,
    pub map_name: Option<String>,
    pub teams: Vec<Vec<TeamMember>>,
    pub result: Option<String>,
}

impl CandidateBattle {
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Converts into a record oriented around `fetched`
    ///
    /// The team containing `fetched` becomes team A and the result token is
    /// read from its point of view.
    pub fn into_record(mut self, fetched: &PlayerId) -> Result<BattleRecord, Rejection> {
        if self.teams.len() != 2 {
            return Err(Rejection::TeamCount(self.teams.len()));
        }

        let primary = self
            .teams
            .iter()
            .position(|team| team.iter().any(|m| &m.player == fetched))
            .ok_or(Rejection::PlayerAbsent)?;

        let second = self.teams.pop().unwrap_or_default();
        let first = self.teams.pop().unwrap_or_default();
        let (team_a, team_b) = if primary == 0 {
            (first, second)
        } else {
            (second, first)
        };

        Ok(BattleRecord::new(
            self.timestamp,
            self.mode,
            self.map_name,
            team_a,
            team_b,
            Outcome::from_result_token(self.result.as_deref()),
        ))
    }
}

fn member_from_raw(raw: &RawPlayer) -> Result<TeamMember, Rejection> {
    let tag = raw
        .tag
        .as_deref()
        .ok_or(Rejection::Malformed("player without tag"))?;
    let name = raw
        .name
        .as_deref()
        .ok_or(Rejection::Malformed("player without name"))?;
    let entity = raw
        .brawler
        .as_ref()
        .and_then(|b| b.name.as_deref())
        .ok_or(Rejection::Malformed("player without entity"))?;

    Ok(TeamMember::new(tag, name, entity))
}

/// Filters and normalizes one raw entry into a candidate battle
///
/// Mode rejections happen before anything else is inspected, so an excluded
/// entry never reaches fingerprinting.
pub fn normalize(
    entry: &RawBattleEntry,
    filter: &BattleFilter,
) -> Result<CandidateBattle, Rejection> {
    let battle = entry
        .battle
        .as_ref()
        .ok_or(Rejection::Malformed("missing battle"))?;

    let mode = filter.check_mode(entry)?;

    let timestamp = entry
        .battle_time
        .clone()
        .ok_or(Rejection::Malformed("missing battle time"))?;

    let raw_teams = battle
        .teams
        .as_ref()
        .ok_or(Rejection::Malformed("missing teams"))?;

    let teams = raw_teams
        .iter()
        .map(|team| team.iter().map(member_from_raw).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;

    let fingerprint = BattleHasher::fingerprint_teams(&timestamp, &teams);

    Ok(CandidateBattle {
        fingerprint,
        timestamp,
        mode,
        map_name: entry.event.as_ref().and_then(|e| e.map.clone()),
        teams,
        result: battle.result.clone(),
    })
}

//! Raw battle log shape as returned by the statistics service
//!
//! Every field is optional. Missing or malformed data is tolerated here and
//! rejected per record during normalization.

use serde::{Deserialize, Serialize};

/// A player's battle log response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBattleLog {
    pub items: Vec<RawBattleEntry>,
}

/// One entry of a battle log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawBattleEntry {
    /// Ordering token, e.g. `20240512T181530.000Z`
    pub battle_time: Option<String>,
    pub event: Option<RawEvent>,
    pub battle: Option<RawBattle>,
}

/// Event (rotation slot) a battle was played in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub id: Option<i64>,

    /// Event mode; also carries the composition marker (e.g. `brawlBall5V5`)
    pub mode: Option<String>,

    pub map: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBattle {
    pub mode: Option<String>,

    #[serde(rename = "type")]
    pub battle_type: Option<String>,

    /// Result for the queried player's team: `victory`, `defeat`, `draw`
    pub result: Option<String>,

    pub duration: Option<u32>,

    pub teams: Option<Vec<Vec<RawPlayer>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPlayer {
    pub tag: Option<String>,
    pub name: Option<String>,
    pub brawler: Option<RawBrawler>,
}

/// Entity a player picked for the battle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBrawler {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub power: Option<u32>,
    pub trophies: Option<i64>,
}

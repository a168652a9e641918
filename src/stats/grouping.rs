//! Grouping keys for aggregation
//!
//! A grouping maps one side of an accepted battle to zero or more keys.
//! Any `Fn(&BattleRecord, TeamSide) -> Vec<K>` is a grouping; the two used
//! by the CLI are `by_entity` and `by_map_trio`.

use crate::battle::{BattleRecord, TeamSide};
use crate::stats::ReportRow;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Maps one team of a battle to aggregation keys
pub trait Grouping<K>: Send + Sync {
    fn keys(&self, record: &BattleRecord, side: TeamSide) -> Vec<K>;
}

impl<K, F> Grouping<K> for F
where
    F: Fn(&BattleRecord, TeamSide) -> Vec<K> + Send + Sync,
{
    fn keys(&self, record: &BattleRecord, side: TeamSide) -> Vec<K> {
        self(record, side)
    }
}

/// One key per entity on the team
pub fn by_entity(record: &BattleRecord, side: TeamSide) -> Vec<String> {
    record
        .team(side)
        .iter()
        .map(|member| member.entity.clone())
        .collect()
}

/// Map name plus the team's sorted, comma-joined entity names
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MapTrio {
    pub map: String,
    pub trio: String,
}

impl fmt::Display for MapTrio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.map, self.trio)
    }
}

/// One key per team, or none when the battle has no map
pub fn by_map_trio(record: &BattleRecord, side: TeamSide) -> Vec<MapTrio> {
    let Some(map) = record.map_name() else {
        return Vec::new();
    };

    let mut entities: Vec<&str> = record
        .team(side)
        .iter()
        .map(|member| member.entity.as_str())
        .collect();
    entities.sort_unstable();

    vec![MapTrio {
        map: map.to_string(),
        trio: entities.join(","),
    }]
}

/// Regroups ranked map/trio rows under their map, keeping rank order
pub fn report_by_map(rows: &[ReportRow<MapTrio>]) -> BTreeMap<String, Vec<ReportRow<String>>> {
    let mut by_map: BTreeMap<String, Vec<ReportRow<String>>> = BTreeMap::new();
    for row in rows {
        by_map
            .entry(row.key.map.clone())
            .or_default()
            .push(ReportRow {
                key: row.key.trio.clone(),
                stats: row.stats,
            });
    }
    by_map
}

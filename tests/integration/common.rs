//! Builders for raw battle log entries shared by the integration tests

use battle_ripple::battle::{RawBattle, RawBattleEntry, RawBrawler, RawEvent, RawPlayer};
use battle_ripple::crawler::CrawlEngine;
use battle_ripple::source::BattleLogSource;
use battle_ripple::stats::{by_entity, Grouping};
use std::sync::Arc;

pub const MAP: &str = "Hard Rock Mine";

pub fn member(tag: &str, brawler: &str) -> RawPlayer {
    RawPlayer {
        tag: Some(tag.to_string()),
        name: Some(format!("name-{}", tag)),
        brawler: Some(RawBrawler {
            name: Some(brawler.to_string()),
            ..Default::default()
        }),
    }
}

/// Entry with arbitrary mode and teams; `result` is for the first team
pub fn battle(
    time: &str,
    mode: &str,
    teams: &[&[(&str, &str)]],
    result: Option<&str>,
) -> RawBattleEntry {
    RawBattleEntry {
        battle_time: Some(time.to_string()),
        event: Some(RawEvent {
            id: Some(15000007),
            mode: Some(mode.to_string()),
            map: Some(MAP.to_string()),
        }),
        battle: Some(RawBattle {
            mode: Some(mode.to_string()),
            battle_type: Some("ranked".to_string()),
            result: result.map(str::to_string),
            duration: Some(120),
            teams: Some(
                teams
                    .iter()
                    .map(|team| team.iter().map(|(tag, b)| member(tag, b)).collect())
                    .collect(),
            ),
        }),
    }
}

/// Gem Grab battle between two teams as seen from a member of `own`
pub fn gem_grab(
    time: &str,
    own: &[(&str, &str)],
    other: &[(&str, &str)],
    result: &str,
) -> RawBattleEntry {
    battle(time, "gemGrab", &[own, other], Some(result))
}

pub fn entity_engine(source: Arc<dyn BattleLogSource>) -> CrawlEngine<String> {
    let grouping: Arc<dyn Grouping<String>> = Arc::new(by_entity);
    CrawlEngine::new(source, grouping)
}

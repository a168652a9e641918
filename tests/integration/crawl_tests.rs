//! Integration tests for the crawl engine
//!
//! These tests drive the engine over in-memory battle logs and check the
//! traversal, deduplication and aggregation end-to-end.

use crate::common::{battle, entity_engine, gem_grab};
use async_trait::async_trait;
use battle_ripple::battle::{PlayerId, RawBattleEntry};
use battle_ripple::crawler::EngineSettings;
use battle_ripple::source::{BattleLogSource, MemorySource, SourceResult};
use battle_ripple::state::PlayerState;
use battle_ripple::stats::{by_map_trio, Grouping, MapTrio};
use battle_ripple::CrawlEngine;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const TEAM_P: [(&str, &str); 3] = [("#P1", "SHELLY"), ("#P2", "BULL"), ("#P3", "COLT")];
const TEAM_O: [(&str, &str); 3] = [("#O1", "PIPER"), ("#O2", "MAX"), ("#O3", "POCO")];

fn id(tag: &str) -> PlayerId {
    PlayerId::from(tag)
}

fn single_worker() -> EngineSettings {
    EngineSettings {
        workers: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_three_vs_three_victory_from_seed() {
    let source = Arc::new(
        MemorySource::new().with_log("#P1", vec![gem_grab("t1", &TEAM_P, &TEAM_O, "victory")]),
    );

    let outcome = entity_engine(source.clone()).run(id("#P1")).await.unwrap();
    let stats = &outcome.stats;

    for entity in ["SHELLY", "BULL", "COLT"] {
        let counter = stats.get(&entity.to_string()).unwrap();
        assert_eq!((counter.wins, counter.losses), (1, 0), "{}", entity);
    }
    for entity in ["PIPER", "MAX", "POCO"] {
        let counter = stats.get(&entity.to_string()).unwrap();
        assert_eq!((counter.wins, counter.losses), (0, 1), "{}", entity);
    }

    // Every participant discovered and fetched, only the seed had battles
    assert_eq!(outcome.frontier.discovered_count(), 6);
    assert_eq!(outcome.summary.players_processed, 6);
    assert_eq!(outcome.summary.counters.unique_battles, 1);
    assert_eq!(source.total_fetches(), 6);
}

#[tokio::test]
async fn test_teammate_log_duplicate_is_not_recounted() {
    let teammate_view = [("#P2", "BULL"), ("#P1", "SHELLY"), ("#P3", "COLT")];
    let source = Arc::new(
        MemorySource::new()
            .with_log("#P1", vec![gem_grab("t1", &TEAM_P, &TEAM_O, "victory")])
            .with_log("#P2", vec![gem_grab("t1", &teammate_view, &TEAM_O, "victory")]),
    );

    let outcome = entity_engine(source).run(id("#P1")).await.unwrap();

    assert_eq!(outcome.summary.counters.unique_battles, 1);
    assert_eq!(outcome.summary.counters.duplicate_battles, 1);
    let shelly = outcome.stats.get(&"SHELLY".to_string()).unwrap();
    assert_eq!((shelly.wins, shelly.losses, shelly.picks), (1, 0, 1));
}

#[tokio::test]
async fn test_opponent_log_duplicate_is_not_recounted() {
    let source = Arc::new(
        MemorySource::new()
            .with_log("#P1", vec![gem_grab("t1", &TEAM_P, &TEAM_O, "victory")])
            .with_log("#O1", vec![gem_grab("t1", &TEAM_O, &TEAM_P, "defeat")]),
    );

    let outcome = entity_engine(source).run(id("#P1")).await.unwrap();

    assert_eq!(outcome.summary.counters.duplicate_battles, 1);
    let piper = outcome.stats.get(&"PIPER".to_string()).unwrap();
    assert_eq!((piper.wins, piper.losses), (0, 1));
}

#[tokio::test]
async fn test_solo_showdown_is_rejected_without_discovery() {
    let source = Arc::new(MemorySource::new().with_log(
        "#P1",
        vec![battle(
            "t1",
            "soloShowdown",
            &[&[("#P1", "SHELLY")], &[("#X1", "CROW")]],
            Some("victory"),
        )],
    ));

    let outcome = entity_engine(source.clone()).run(id("#P1")).await.unwrap();

    assert_eq!(outcome.summary.counters.rejected_mode, 1);
    assert!(outcome.stats.is_empty());
    assert!(outcome.dedup.is_empty());
    assert_eq!(outcome.frontier.state(&id("#X1")), None);
    assert_eq!(source.fetch_count(&id("#X1")), 0);
}

#[tokio::test]
async fn test_five_vs_five_event_is_rejected() {
    let source = Arc::new(MemorySource::new().with_log(
        "#P1",
        vec![battle(
            "t1",
            "brawlBall5V5",
            &[&[("#P1", "SHELLY")], &[("#X1", "CROW")]],
            Some("victory"),
        )],
    ));

    let outcome = entity_engine(source).run(id("#P1")).await.unwrap();

    assert_eq!(outcome.summary.counters.rejected_mode, 1);
    assert_eq!(outcome.frontier.discovered_count(), 1);
}

#[tokio::test]
async fn test_three_team_battle_is_rejected() {
    let source = Arc::new(MemorySource::new().with_log(
        "#P1",
        vec![battle(
            "t1",
            "gemGrab",
            &[
                &[("#P1", "SHELLY")],
                &[("#X1", "CROW")],
                &[("#Y1", "SPIKE")],
            ],
            Some("victory"),
        )],
    ));

    let outcome = entity_engine(source).run(id("#P1")).await.unwrap();

    assert_eq!(outcome.summary.counters.rejected_malformed, 1);
    assert_eq!(outcome.summary.counters.unique_battles, 0);
    assert!(outcome.stats.is_empty());
    assert_eq!(outcome.frontier.discovered_count(), 1);
}

#[tokio::test]
async fn test_malformed_entry_does_not_abort_log() {
    let source = Arc::new(MemorySource::new().with_log(
        "#P1",
        vec![
            RawBattleEntry::default(),
            gem_grab("t1", &TEAM_P, &TEAM_O, "victory"),
        ],
    ));

    let outcome = entity_engine(source).run(id("#P1")).await.unwrap();

    assert_eq!(outcome.summary.counters.rejected_malformed, 1);
    assert_eq!(outcome.summary.counters.unique_battles, 1);
}

#[tokio::test]
async fn test_cyclic_graph_processes_each_player_once() {
    let a = [("#A", "SHELLY")];
    let b = [("#B", "BULL")];
    let c = [("#C", "COLT")];
    let source = Arc::new(
        MemorySource::new()
            .with_log(
                "#A",
                vec![
                    gem_grab("t1", &a, &b, "victory"),
                    gem_grab("t3", &a, &c, "defeat"),
                ],
            )
            .with_log(
                "#B",
                vec![
                    gem_grab("t1", &b, &a, "defeat"),
                    gem_grab("t2", &b, &c, "victory"),
                ],
            )
            .with_log(
                "#C",
                vec![
                    gem_grab("t2", &c, &b, "defeat"),
                    gem_grab("t3", &c, &a, "victory"),
                ],
            ),
    );

    let settings = EngineSettings {
        workers: 3,
        ..Default::default()
    };
    let outcome = entity_engine(source.clone())
        .with_settings(settings)
        .run(id("#A"))
        .await
        .unwrap();

    for tag in ["#A", "#B", "#C"] {
        assert_eq!(source.fetch_count(&id(tag)), 1, "{}", tag);
        assert_eq!(outcome.frontier.state(&id(tag)), Some(PlayerState::Processed));
    }
    assert_eq!(outcome.summary.counters.unique_battles, 3);
    assert_eq!(outcome.summary.counters.duplicate_battles, 3);
    assert_eq!(outcome.summary.players_pending, 0);

    let shelly = outcome.stats.get(&"SHELLY".to_string()).unwrap();
    assert_eq!((shelly.wins, shelly.losses), (1, 1));
}

fn web_of_players() -> MemorySource {
    let mut source = MemorySource::new();
    let entities = ["SHELLY", "BULL", "COLT", "PIPER", "MAX", "POCO", "CROW", "SPIKE"];
    for i in 0..8usize {
        let me = format!("#N{}", i);
        let mut log = Vec::new();
        for j in 1..4usize {
            let other = format!("#N{}", (i + j) % 8);
            let (first, second) = if i < (i + j) % 8 { (i, (i + j) % 8) } else { ((i + j) % 8, i) };
            let time = format!("t{}-{}", first, second);
            let won = (first + second) % 2 == 0;
            let result = if (i == first) == won { "victory" } else { "defeat" };
            log.push(gem_grab(
                &time,
                &[(me.as_str(), entities[i])],
                &[(other.as_str(), entities[(i + j) % 8])],
                result,
            ));
        }
        source = source.with_log(me.as_str(), log);
    }
    source
}

#[tokio::test]
async fn test_reports_are_identical_across_runs() {
    let settings = EngineSettings {
        workers: 4,
        ..Default::default()
    };

    let first = entity_engine(Arc::new(web_of_players()))
        .with_settings(settings.clone())
        .run(id("#N0"))
        .await
        .unwrap();
    let second = entity_engine(Arc::new(web_of_players()))
        .with_settings(settings)
        .run(id("#N0"))
        .await
        .unwrap();

    let first_json = serde_json::to_string(&first.stats.report()).unwrap();
    let second_json = serde_json::to_string(&second.stats.report()).unwrap();
    assert_eq!(first_json, second_json);
    assert_eq!(
        first.stats.popularity_ranked(),
        second.stats.popularity_ranked()
    );
    assert_eq!(first.summary.counters, second.summary.counters);

    for row in first.stats.report() {
        assert!((0.0..=1.0).contains(&row.stats.winrate));
    }
}

/// Source that delays each player's log by a fixed per-player amount
struct Delayed {
    inner: MemorySource,
    delays: HashMap<PlayerId, u64>,
}

#[async_trait]
impl BattleLogSource for Delayed {
    async fn fetch_log(&self, player: &PlayerId) -> SourceResult<Vec<RawBattleEntry>> {
        let millis = self.delays.get(player).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(millis)).await;
        self.inner.fetch_log(player).await
    }
}

fn draw_between_discovered_players() -> MemorySource {
    let s = [("#S", "SHELLY")];
    let a = [("#A", "PIPER")];
    let b = [("#B", "CROW")];
    MemorySource::new()
        .with_log(
            "#S",
            vec![
                gem_grab("t1", &s, &a, "victory"),
                gem_grab("t2", &s, &b, "victory"),
            ],
        )
        .with_log("#A", vec![gem_grab("t3", &a, &b, "draw")])
        .with_log("#B", vec![gem_grab("t3", &b, &a, "draw")])
}

#[tokio::test]
async fn test_draw_outcome_independent_of_fetch_completion_order() {
    let mut reports = HashSet::new();

    for run in 0..12u64 {
        // Vary which of #A and #B finishes first
        let delays = HashMap::from([
            (id("#A"), (run * 7) % 15),
            (id("#B"), (run * 11 + 5) % 15),
        ]);
        let source = Arc::new(Delayed {
            inner: draw_between_discovered_players(),
            delays,
        });

        let outcome = entity_engine(source).run(id("#S")).await.unwrap();

        // #A was discovered first, so its view of the draw is the one counted
        let piper = outcome.stats.get(&"PIPER".to_string()).unwrap();
        assert_eq!((piper.wins, piper.losses), (0, 2), "run {}", run);
        let crow = outcome.stats.get(&"CROW".to_string()).unwrap();
        assert_eq!((crow.wins, crow.losses), (1, 1), "run {}", run);
        assert_eq!(outcome.summary.counters.duplicate_battles, 1);

        reports.insert(serde_json::to_string(&outcome.stats.report()).unwrap());
    }

    assert_eq!(reports.len(), 1);
}

#[tokio::test]
async fn test_failed_fetch_does_not_stop_crawl() {
    let source = Arc::new(
        MemorySource::new()
            .with_log("#P1", vec![gem_grab("t1", &TEAM_P, &TEAM_O, "victory")])
            .with_failure("#P2")
            .with_log(
                "#O1",
                vec![gem_grab("t2", &TEAM_O, &[("#Z1", "SPIKE")], "victory")],
            ),
    );

    let outcome = entity_engine(source.clone())
        .with_settings(single_worker())
        .run(id("#P1"))
        .await
        .unwrap();

    assert_eq!(outcome.frontier.state(&id("#P2")), Some(PlayerState::Failed));
    assert_eq!(outcome.summary.counters.failed_fetches, 1);
    assert_eq!(outcome.summary.players_failed, 1);
    assert_eq!(source.fetch_count(&id("#P2")), 1);

    // Players discovered after the failure are still crawled
    assert_eq!(source.fetch_count(&id("#Z1")), 1);
    assert_eq!(outcome.summary.counters.unique_battles, 2);
}

/// Source that raises the stop signal once it has served one log
struct CancelAfterFirst {
    inner: MemorySource,
    cancel: CancellationToken,
}

#[async_trait]
impl BattleLogSource for CancelAfterFirst {
    async fn fetch_log(&self, player: &PlayerId) -> SourceResult<Vec<RawBattleEntry>> {
        let log = self.inner.fetch_log(player).await;
        self.cancel.cancel();
        log
    }
}

#[tokio::test]
async fn test_cancellation_finishes_in_flight_player() {
    let cancel = CancellationToken::new();
    let source = Arc::new(CancelAfterFirst {
        inner: MemorySource::new()
            .with_log("#P1", vec![gem_grab("t1", &TEAM_P, &TEAM_O, "victory")]),
        cancel: cancel.clone(),
    });

    let outcome = entity_engine(source.clone())
        .with_settings(single_worker())
        .with_cancellation(cancel)
        .run(id("#P1"))
        .await
        .unwrap();

    assert!(outcome.summary.cancelled);
    assert_eq!(source.inner.total_fetches(), 1);
    assert_eq!(outcome.summary.players_processed, 1);
    assert_eq!(outcome.summary.players_pending, 5);

    // The in-flight player's battle was fully applied
    assert_eq!(outcome.summary.counters.unique_battles, 1);
    assert_eq!(outcome.stats.len(), 6);
}

#[tokio::test]
async fn test_cancelled_before_start_fetches_nothing() {
    let source = Arc::new(
        MemorySource::new().with_log("#P1", vec![gem_grab("t1", &TEAM_P, &TEAM_O, "victory")]),
    );
    let engine = entity_engine(source.clone());
    engine.cancellation_token().cancel();

    let outcome = engine.run(id("#P1")).await.unwrap();

    assert!(outcome.summary.cancelled);
    assert_eq!(source.total_fetches(), 0);
    assert!(outcome.stats.is_empty());
}

#[tokio::test]
async fn test_player_budget_limits_fetches() {
    let source = Arc::new(
        MemorySource::new().with_log("#P1", vec![gem_grab("t1", &TEAM_P, &TEAM_O, "victory")]),
    );
    let settings = EngineSettings {
        workers: 2,
        max_players: Some(3),
        ..Default::default()
    };

    let outcome = entity_engine(source.clone())
        .with_settings(settings)
        .run(id("#P1"))
        .await
        .unwrap();

    assert_eq!(source.total_fetches(), 3);
    assert!(outcome.summary.budget_exhausted);
    assert!(!outcome.summary.cancelled);
    assert_eq!(outcome.summary.players_pending, 3);
}

#[tokio::test]
async fn test_map_trio_grouping() {
    let source = Arc::new(
        MemorySource::new().with_log("#P1", vec![gem_grab("t1", &TEAM_P, &TEAM_O, "victory")]),
    );
    let grouping: Arc<dyn Grouping<MapTrio>> = Arc::new(by_map_trio);

    let outcome = CrawlEngine::new(source, grouping)
        .run(id("#P1"))
        .await
        .unwrap();

    let rows = outcome.stats.report();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].key.trio, "BULL,COLT,SHELLY");
    assert_eq!(rows[0].stats.wins, 1);
    assert_eq!(rows[1].key.trio, "MAX,PIPER,POCO");
    assert_eq!(rows[1].stats.losses, 1);
}

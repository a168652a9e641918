//! Integration tests for the HTTP battle log source
//!
//! These tests use wiremock to stand in for the statistics service.

use crate::common::gem_grab;
use battle_ripple::battle::{PlayerId, RawBattleLog};
use battle_ripple::config::{validate, Config};
use battle_ripple::crawler::crawl;
use battle_ripple::output::write_reports;
use battle_ripple::source::{BattleLogSource, HttpBattleLogSource, SourceError};
use battle_ripple::stats::{by_entity, Grouping};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a validated test configuration pointing at the mock server
fn create_test_config(base_url: &str, seed: &str) -> Config {
    let mut config = Config::default();
    config.crawler.seed_player = Some(seed.to_string());
    config.crawler.workers = 2;
    config.crawler.request_timeout = 2000;
    config.crawler.rate_limit_cooldown = 0;
    config.api.base_url = base_url.to_string();
    config.api.token = Some("test-token".to_string());
    validate(&config).expect("test config should be valid");
    config
}

fn log_body() -> RawBattleLog {
    RawBattleLog {
        items: vec![gem_grab(
            "20240512T181530.000Z",
            &[("#P1", "SHELLY"), ("#P2", "BULL"), ("#P3", "COLT")],
            &[("#O1", "PIPER"), ("#O2", "MAX"), ("#O3", "POCO")],
            "victory",
        )],
    }
}

#[tokio::test]
async fn test_fetch_log_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players/%23P1/battlelog"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(log_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "#P1");
    let source = HttpBattleLogSource::from_config(&config).unwrap();

    let entries = source.fetch_log(&PlayerId::from("#P1")).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].battle_time.as_deref(),
        Some("20240512T181530.000Z")
    );
}

#[tokio::test]
async fn test_rate_limit_is_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "#P1");
    let source = HttpBattleLogSource::from_config(&config).unwrap();

    let result = source.fetch_log(&PlayerId::from("#P1")).await;
    assert!(matches!(result, Err(SourceError::RateLimited { .. })));
}

#[tokio::test]
async fn test_server_error_is_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("accessDenied"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "#P1");
    let source = HttpBattleLogSource::from_config(&config).unwrap();

    match source.fetch_log(&PlayerId::from("#P1")).await {
        Err(SourceError::Status {
            status, message, ..
        }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "accessDenied");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_payload_is_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "#P1");
    let source = HttpBattleLogSource::from_config(&config).unwrap();

    let result = source.fetch_log(&PlayerId::from("#P1")).await;
    assert!(matches!(result, Err(SourceError::Decode { .. })));
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players/%23P1/battlelog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(log_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The opponents' logs are rate limited, the teammates' are empty
    for tag in ["%23O1", "%23O2", "%23O3"] {
        Mock::given(method("GET"))
            .and(path(format!("/players/{}/battlelog", tag)))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    for tag in ["%23P2", "%23P3"] {
        Mock::given(method("GET"))
            .and(path(format!("/players/{}/battlelog", tag)))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items": []}"#))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&mock_server.uri(), "#P1");
    let grouping: Arc<dyn Grouping<String>> = Arc::new(by_entity);
    let outcome = crawl(&config, grouping, CancellationToken::new())
        .await
        .unwrap();

    let summary = &outcome.summary;
    assert_eq!(summary.players_discovered, 6);
    assert_eq!(summary.players_processed, 3);
    assert_eq!(summary.players_failed, 3);
    assert_eq!(summary.counters.failed_fetches, 3);
    assert_eq!(summary.counters.rate_limited_fetches, 3);
    assert_eq!(summary.counters.unique_battles, 1);

    let shelly = outcome.stats.get(&"SHELLY".to_string()).unwrap();
    assert_eq!((shelly.wins, shelly.losses), (1, 0));

    let dir = TempDir::new().unwrap();
    let written = write_reports(dir.path(), "entity", &outcome.stats, summary).unwrap();
    assert!(written.iter().all(|p| p.exists()));
}

#[tokio::test]
async fn test_unreachable_service_fails_seed_only() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), "#P1");
    drop(mock_server);

    let grouping: Arc<dyn Grouping<String>> = Arc::new(by_entity);
    let outcome = crawl(&config, grouping, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.summary.players_failed, 1);
    assert!(outcome.stats.is_empty());
}

#[tokio::test]
async fn test_rate_limited_fetch_pauses_later_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players/%23P1/battlelog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(log_body()))
        .mount(&mock_server)
        .await;
    for tag in ["%23P2", "%23P3", "%23O1", "%23O2", "%23O3"] {
        Mock::given(method("GET"))
            .and(path(format!("/players/{}/battlelog", tag)))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config(&mock_server.uri(), "#P1");
    config.crawler.workers = 1;
    config.crawler.rate_limit_cooldown = 150;

    let grouping: Arc<dyn Grouping<String>> = Arc::new(by_entity);
    let start = Instant::now();
    let outcome = crawl(&config, grouping, CancellationToken::new())
        .await
        .unwrap();

    // Each of the four fetches after the first 429 waits out a cooldown
    assert!(start.elapsed() >= Duration::from_millis(450));
    assert_eq!(outcome.summary.counters.rate_limited_fetches, 5);
    assert_eq!(outcome.summary.players_failed, 5);
    assert_eq!(outcome.summary.counters.unique_battles, 1);
}

//! End-to-end cache behaviour: provider, coordinator, query surface and
//! refresher wired together against a mock Open-Meteo server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use meteo_weather::{
    BackgroundRefresher, CacheState, Clock, ManualClock, QueryError, RefreshCoordinator,
    WeatherCache, WeatherProvider, WeatherQuery,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{forecast_body, provider_for};

const TTL: Duration = Duration::from_secs(300);

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
}

fn stack(server: &MockServer) -> WeatherQuery<WeatherProvider> {
    let coordinator = RefreshCoordinator::new(
        provider_for(server),
        Arc::new(WeatherCache::new()),
        TTL,
    );
    WeatherQuery::new(coordinator)
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[tokio::test]
async fn test_ttl_scenario() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(18.0)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(19.0)))
        .mount(&mock_server)
        .await;

    let query = stack(&mock_server);

    let at_start = query.current(t(0)).await.unwrap();
    assert_eq!(at_start.current.temperature, 18.0);

    let cached = query.current(t(4)).await.unwrap();
    assert_eq!(cached.current.temperature, 18.0);
    assert_eq!(request_count(&mock_server).await, 1);

    let refreshed = query.current(t(6)).await.unwrap();
    assert_eq!(refreshed.current.temperature, 19.0);
    assert_eq!(request_count(&mock_server).await, 2);

    let entry = query.coordinator().cache().load().unwrap();
    assert_eq!(entry.fetched_at(), t(6));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cold_reads_make_one_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body(18.0))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let query = stack(&mock_server);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let query = query.clone();
            tokio::spawn(async move {
                match i % 3 {
                    0 => query.full(t(0)).await.map(|s| s.current.temperature),
                    1 => query.current(t(0)).await.map(|c| c.current.temperature),
                    _ => query.hourly(t(0)).await.map(|h| h.temperature[0].unwrap_or_default()),
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_hourly_before_any_fetch_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let query = stack(&mock_server);

    let err = query.hourly(t(0)).await.unwrap_err();
    assert!(matches!(err, QueryError::NotYetAvailable(_)));
    assert_eq!(query.coordinator().cache().state(), CacheState::Empty);
}

#[tokio::test]
async fn test_outage_serves_last_good_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(18.0)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let query = stack(&mock_server);
    query.full(t(0)).await.unwrap();

    let stale = query.full(t(30)).await.unwrap();
    assert_eq!(stale.current.temperature, 18.0);
    assert_eq!(query.coordinator().cache().load().unwrap().fetched_at(), t(0));
}

#[tokio::test]
async fn test_background_tick_warms_cache_without_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(18.0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = stack(&mock_server);
    let clock = Arc::new(ManualClock::new(t(0)));
    let refresher =
        BackgroundRefresher::new(query.coordinator().clone(), Arc::clone(&clock), TTL);

    clock.advance(chrono::Duration::minutes(5));
    refresher.tick().await.unwrap();

    let entry = query.coordinator().cache().load().unwrap();
    assert_eq!(entry.fetched_at(), clock.now());

    // A request inside the TTL is served from what the tick stored
    let current = query.current(t(7)).await.unwrap();
    assert_eq!(current.current.temperature, 18.0);
}

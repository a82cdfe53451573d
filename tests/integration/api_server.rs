//! Integration tests for the HTTP surface
//!
//! Tests health, metrics, the snapshot view and the local control endpoints.

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tickerwatch::config::SignalPolicy;
use tickerwatch::core::http::{create_router, AppState};
use tickerwatch::core::monitor::ControlIntent;
use tickerwatch::core::snapshot::{MarketSnapshot, SkipReason, SkippedSymbol};
use tickerwatch::core::SnapshotBoard;
use tickerwatch::metrics::Metrics;
use tokio::sync::mpsc;

/// Test helper for API server integration tests
struct TestApiServer {
    server: TestServer,
    board: SnapshotBoard,
    intents: mpsc::Receiver<ControlIntent>,
}

impl TestApiServer {
    fn new() -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let board = SnapshotBoard::new();
        let (tx, intents) = mpsc::channel(8);

        let app = create_router(AppState::new(metrics, board.clone(), tx));
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            board,
            intents,
        }
    }
}

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new();
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["monitoring"], false);
    assert_eq!(body["service"], "tickerwatch-monitor");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new();
    let _ = app.server.get("/health").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    for metric in [
        "http_requests_total",
        "http_request_duration_seconds",
        "evaluation_cycles_total",
        "alerts_sent_total",
        "monitoring_active",
    ] {
        assert!(body.contains(metric), "Expected {} metric", metric);
    }
}

#[tokio::test]
async fn snapshot_endpoint_serves_latest_publication() {
    let app = TestApiServer::new();

    let body: Value = app.server.get("/api/snapshot").await.json();
    assert_eq!(body["records"], json!([]));
    assert!(body["top_mover"].is_null());

    app.board.publish(MarketSnapshot::new(
        Vec::new(),
        vec![SkippedSymbol {
            symbol: "ZZZ".to_string(),
            reason: SkipReason::NoData,
        }],
    ));

    let body: Value = app.server.get("/api/snapshot").await.json();
    assert_eq!(body["skipped"][0]["symbol"], "ZZZ");
    assert_eq!(body["skipped"][0]["reason"]["kind"], "no_data");
}

#[tokio::test]
async fn start_and_stop_forward_intents() {
    let mut app = TestApiServer::new();

    let response = app.server.post("/api/monitor/start").await;
    assert_eq!(response.status_code(), 202);
    assert_eq!(app.intents.try_recv().ok(), Some(ControlIntent::Start));

    let response = app.server.post("/api/monitor/stop").await;
    assert_eq!(response.status_code(), 202);
    assert_eq!(app.intents.try_recv().ok(), Some(ControlIntent::Stop));
}

#[tokio::test]
async fn watchlist_update_is_normalised() {
    let mut app = TestApiServer::new();

    let response = app
        .server
        .put("/api/watchlist")
        .json(&json!({ "symbols": ["msft", " nvda ", "MSFT"] }))
        .await;
    assert_eq!(response.status_code(), 202);
    assert_eq!(
        app.intents.try_recv().ok(),
        Some(ControlIntent::SetWatchlist(vec![
            "MSFT".to_string(),
            "NVDA".to_string()
        ]))
    );
}

#[tokio::test]
async fn empty_watchlist_is_rejected() {
    let mut app = TestApiServer::new();

    let response = app
        .server
        .put("/api/watchlist")
        .json(&json!({ "symbols": [" "] }))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), 422);
    assert!(app.intents.try_recv().is_err());
}

#[tokio::test]
async fn settings_update_forwards_each_change() {
    let mut app = TestApiServer::new();

    let response = app
        .server
        .put("/api/settings")
        .json(&json!({ "refresh_interval_seconds": 300, "policy": "threshold" }))
        .await;
    assert_eq!(response.status_code(), 202);

    assert_eq!(
        app.intents.try_recv().ok(),
        Some(ControlIntent::SetRefreshInterval(Duration::from_secs(300)))
    );
    assert_eq!(
        app.intents.try_recv().ok(),
        Some(ControlIntent::SetPolicy(SignalPolicy::Threshold))
    );
    assert!(app.intents.try_recv().is_err());
}

#[tokio::test]
async fn control_endpoints_fail_when_monitor_is_gone() {
    let app = TestApiServer::new();
    drop(app.intents);

    let response = app
        .server
        .post("/api/monitor/start")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), 503);
}

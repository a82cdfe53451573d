//! HTTP surface: health, metrics, the latest snapshot and local start/stop

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use crate::config::{parse_watchlist, SignalPolicy, SignalThresholds};
use crate::core::board::SnapshotBoard;
use crate::core::monitor::ControlIntent;
use crate::core::snapshot::MarketSnapshot;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub board: SnapshotBoard,
    pub intents: mpsc::Sender<ControlIntent>,
}

impl AppState {
    pub fn new(
        metrics: Arc<Metrics>,
        board: SnapshotBoard,
        intents: mpsc::Sender<ControlIntent>,
    ) -> Self {
        Self {
            metrics,
            start_time: Arc::new(Instant::now()),
            board,
            intents,
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "monitoring": state.metrics.monitoring_active.get() > 0.0,
        "service": "tickerwatch-monitor"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn snapshot_handler(State(state): State<AppState>) -> Json<MarketSnapshot> {
    Json(state.board.latest())
}

async fn submit(state: &AppState, intent: ControlIntent) -> Result<StatusCode, StatusCode> {
    state.intents.send(intent).await.map_err(|_| {
        warn!("Control intent rejected: monitor loop is not running");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok(StatusCode::ACCEPTED)
}

async fn start_monitoring(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    submit(&state, ControlIntent::Start).await
}

async fn stop_monitoring(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    submit(&state, ControlIntent::Stop).await
}

#[derive(Debug, Deserialize)]
struct WatchlistRequest {
    symbols: Vec<String>,
}

async fn update_watchlist(
    State(state): State<AppState>,
    Json(request): Json<WatchlistRequest>,
) -> Result<StatusCode, StatusCode> {
    let watchlist = parse_watchlist(&request.symbols.join(","));
    if watchlist.is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    submit(&state, ControlIntent::SetWatchlist(watchlist)).await
}

#[derive(Debug, Deserialize)]
struct SettingsRequest {
    refresh_interval_seconds: Option<u64>,
    thresholds: Option<SignalThresholds>,
    policy: Option<SignalPolicy>,
}

async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<SettingsRequest>,
) -> Result<StatusCode, StatusCode> {
    if let Some(secs) = request.refresh_interval_seconds {
        submit(&state, ControlIntent::SetRefreshInterval(Duration::from_secs(secs))).await?;
    }
    if let Some(thresholds) = request.thresholds {
        submit(&state, ControlIntent::SetThresholds(thresholds)).await?;
    }
    if let Some(policy) = request.policy {
        submit(&state, ControlIntent::SetPolicy(policy)).await?;
    }
    Ok(StatusCode::ACCEPTED)
}

async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;

    state.metrics.http_requests_in_flight.dec();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(start.elapsed().as_secs_f64());

    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/snapshot", get(snapshot_handler))
        .route("/api/monitor/start", post(start_monitoring))
        .route("/api/monitor/stop", post(stop_monitoring))
        .route("/api/watchlist", put(update_watchlist))
        .route("/api/settings", put(update_settings))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

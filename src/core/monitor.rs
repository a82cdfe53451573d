//! Monitor loop: the single owner of run state, the command cursor and the
//! evaluation schedule.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::{clamp_refresh_interval, Config, SignalPolicy, SignalThresholds};
use crate::core::alerts::{deliver, format_alert, format_status_report, quote_link, AlertDecision, AlertPolicy};
use crate::core::board::SnapshotBoard;
use crate::core::commands::{Command, CommandChannel, CommandCursor};
use crate::core::snapshot::{MarketSnapshot, MarketSnapshotBuilder};
use crate::metrics::Metrics;
use crate::services::market_data::MarketDataProvider;
use crate::services::messaging::MessagingTransport;
use crate::signals::engine::SignalEngine;

pub const ACTIVE_TICK: Duration = Duration::from_secs(5);
pub const IDLE_TICK: Duration = Duration::from_secs(15);

/// Whether monitoring is on, and who may toggle it remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub active: bool,
    pub authorized_id: String,
}

/// Requests from local surfaces, applied by the loop at the start of a tick
#[derive(Debug, Clone, PartialEq)]
pub enum ControlIntent {
    Start,
    Stop,
    SetWatchlist(Vec<String>),
    SetRefreshInterval(Duration),
    SetThresholds(SignalThresholds),
    SetPolicy(SignalPolicy),
}

/// What one tick did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub commands: Vec<Command>,
    pub evaluated: bool,
    pub alerts_sent: usize,
}

pub struct MonitorLoop {
    run_state: RunState,
    channel: CommandChannel,
    builder: MarketSnapshotBuilder,
    transport: Option<Arc<dyn MessagingTransport>>,
    alerts: AlertPolicy,
    board: SnapshotBoard,
    metrics: Arc<Metrics>,
    intents: Option<mpsc::Receiver<ControlIntent>>,
    watchlist: Vec<String>,
    refresh_interval: Duration,
    high_lookback_days: u32,
    last_evaluation: Option<Instant>,
    active_tick: Duration,
    idle_tick: Duration,
}

impl MonitorLoop {
    pub fn new(
        config: &Config,
        provider: Arc<dyn MarketDataProvider>,
        transport: Option<Arc<dyn MessagingTransport>>,
        board: SnapshotBoard,
        metrics: Arc<Metrics>,
    ) -> Self {
        let engine = SignalEngine::new(config.policy, config.thresholds);
        let builder = MarketSnapshotBuilder::new(
            provider,
            engine,
            config.indicators,
            config.history.clone(),
        )
        .with_metrics(metrics.clone());

        let authorized_id = config.telegram.chat_id.clone();
        metrics
            .monitoring_active
            .set(if config.start_active { 1.0 } else { 0.0 });

        Self {
            run_state: RunState {
                active: config.start_active,
                authorized_id: authorized_id.clone(),
            },
            channel: CommandChannel::new(authorized_id),
            builder,
            transport,
            alerts: AlertPolicy::new(&config.alerts),
            board,
            metrics,
            intents: None,
            watchlist: config.watchlist.clone(),
            refresh_interval: clamp_refresh_interval(config.refresh_interval),
            high_lookback_days: config.indicators.high_lookback_days,
            last_evaluation: None,
            active_tick: ACTIVE_TICK,
            idle_tick: IDLE_TICK,
        }
    }

    pub fn with_intents(mut self, intents: mpsc::Receiver<ControlIntent>) -> Self {
        self.intents = Some(intents);
        self
    }

    pub fn with_ticks(mut self, active: Duration, idle: Duration) -> Self {
        self.active_tick = active;
        self.idle_tick = idle;
        self
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn cursor(&self) -> CommandCursor {
        self.channel.cursor()
    }

    pub fn watchlist(&self) -> &[String] {
        &self.watchlist
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn engine(&self) -> &SignalEngine {
        self.builder.engine()
    }

    pub fn set_watchlist(&mut self, watchlist: Vec<String>) {
        info!(symbols = ?watchlist, "Monitor: watchlist updated");
        self.watchlist = watchlist;
    }

    /// Intervals below the minimum are raised to it
    pub fn set_refresh_interval(&mut self, interval: Duration) {
        self.refresh_interval = clamp_refresh_interval(interval);
        info!(seconds = self.refresh_interval.as_secs(), "Monitor: refresh interval updated");
    }

    pub fn set_thresholds(&mut self, thresholds: SignalThresholds) {
        self.builder.engine_mut().set_thresholds(thresholds);
        info!(thresholds = ?thresholds, "Monitor: signal thresholds updated");
    }

    pub fn set_policy(&mut self, policy: SignalPolicy) {
        self.builder.engine_mut().set_policy(policy);
        info!(policy = %policy, "Monitor: signal policy updated");
    }

    fn set_active(&mut self, active: bool) {
        if active && !self.run_state.active {
            // evaluate on the next opportunity rather than waiting out the interval
            self.last_evaluation = None;
        }
        self.run_state.active = active;
        self.metrics
            .monitoring_active
            .set(if active { 1.0 } else { 0.0 });
        info!(active = active, "Monitor: monitoring {}", if active { "started" } else { "stopped" });
    }

    fn evaluation_due(&self, now: Instant) -> bool {
        self.run_state.active
            && self
                .last_evaluation
                .map_or(true, |last| now.saturating_duration_since(last) >= self.refresh_interval)
    }

    fn apply_intent(&mut self, intent: ControlIntent) {
        match intent {
            ControlIntent::Start => self.set_active(true),
            ControlIntent::Stop => self.set_active(false),
            ControlIntent::SetWatchlist(watchlist) => self.set_watchlist(watchlist),
            ControlIntent::SetRefreshInterval(interval) => self.set_refresh_interval(interval),
            ControlIntent::SetThresholds(thresholds) => self.set_thresholds(thresholds),
            ControlIntent::SetPolicy(policy) => self.set_policy(policy),
        }
    }

    fn drain_intents(&mut self) {
        let mut pending = Vec::new();
        if let Some(rx) = self.intents.as_mut() {
            while let Ok(intent) = rx.try_recv() {
                pending.push(intent);
            }
        }
        for intent in pending {
            self.apply_intent(intent);
        }
    }

    /// Send to the authorized recipient; failures are logged and swallowed
    async fn notify(&self, text: &str, link: Option<&str>) -> bool {
        let Some(ref transport) = self.transport else {
            debug!("Monitor: no transport configured, message not sent");
            return false;
        };
        if self.run_state.authorized_id.is_empty() {
            return false;
        }

        match deliver(transport.as_ref(), &self.run_state.authorized_id, text, link).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Monitor: failed to deliver message");
                false
            }
        }
    }

    async fn dispatch(&mut self, command: Command) {
        self.metrics.commands_received_total.inc();
        match command {
            Command::Start => {
                self.set_active(true);
                let text = format!(
                    "🚀 Monitoring started for {} symbols: {}",
                    self.watchlist.len(),
                    self.watchlist.join(", ")
                );
                self.notify(&text, None).await;
            }
            Command::Stop => {
                self.set_active(false);
                self.notify("🛑 Monitoring stopped", None).await;
            }
            Command::Status => {
                let snapshot = self.builder.build(&self.watchlist).await;
                let report = format_status_report(&snapshot, self.run_state.active);
                self.board.publish(snapshot);
                self.notify(&report, None).await;
            }
        }
    }

    async fn poll_commands(&mut self) -> Vec<Command> {
        let Some(transport) = self.transport.clone() else {
            return Vec::new();
        };

        let report = self.channel.poll(transport.as_ref()).await;
        if report.transport_failed {
            self.metrics.transport_poll_failures_total.inc();
        }
        self.metrics
            .commands_unauthorized_total
            .inc_by(report.unauthorized as u64);

        for command in &report.commands {
            self.dispatch(*command).await;
        }
        self.channel.finish_dispatch();
        report.commands
    }

    /// Alert every qualifying record, one message at a time
    async fn send_alerts(&mut self, snapshot: &MarketSnapshot) -> usize {
        let mut sent = 0;
        for record in &snapshot.records {
            let now = Instant::now();
            let kind = match self.alerts.decide(record, now) {
                AlertDecision::NotWorthy => continue,
                AlertDecision::Suppressed => {
                    debug!(symbol = %record.symbol, recommendation = %record.recommendation, "Monitor: alert suppressed by cooldown");
                    self.metrics.alerts_suppressed_total.inc();
                    continue;
                }
                AlertDecision::Send(kind) => kind,
            };

            info!(
                symbol = %record.symbol,
                recommendation = %record.recommendation,
                score = record.score,
                kind = ?kind,
                "Monitor: alert for {} ({})",
                record.symbol,
                record.recommendation
            );

            let text = format_alert(record, self.high_lookback_days, kind);
            let link = quote_link(&record.symbol);
            if self.notify(&text, Some(&link)).await {
                self.alerts.mark_sent(record, now);
                self.metrics.alerts_sent_total.inc();
                sent += 1;
            } else {
                self.metrics.alerts_failed_total.inc();
            }
        }
        sent
    }

    /// One scheduler step: intents, commands, then a due evaluation.
    ///
    /// Returns the pause before the next tick.
    pub async fn tick(&mut self) -> (TickReport, Duration) {
        let mut report = TickReport::default();

        self.drain_intents();
        report.commands = self.poll_commands().await;

        let now = Instant::now();
        if self.evaluation_due(now) {
            let snapshot = self.builder.build(&self.watchlist).await;
            report.alerts_sent = self.send_alerts(&snapshot).await;
            self.board.publish(snapshot);
            self.last_evaluation = Some(now);
            report.evaluated = true;
        }

        let pause = if self.run_state.active {
            self.active_tick
        } else {
            self.idle_tick
        };
        (report, pause)
    }

    /// Tick until `shutdown` resolves. A tick in progress always completes.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            symbols = ?self.watchlist,
            refresh_secs = self.refresh_interval.as_secs(),
            active = self.run_state.active,
            "Monitor: loop started"
        );

        loop {
            let (_, pause) = self.tick().await;
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Monitor: loop stopped");
    }
}

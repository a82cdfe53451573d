//! Alert selection, formatting and delivery

use backon::{ExponentialBuilder, Retryable};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AlertConfig;
use crate::core::snapshot::MarketSnapshot;
use crate::models::signal::{PullbackSeverity, Recommendation, SignalRecord};
use crate::services::messaging::{MessagingTransport, TransportError};

const DELIVERY_ATTEMPTS: usize = 3;

/// Why a record qualified for an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Trigger recommendation or score threshold
    Signal,
    /// Pullback severity reached `Alert` and drop alerts are enabled
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    Send(AlertKind),
    NotWorthy,
    /// Same symbol and recommendation alerted within the cooldown
    Suppressed,
}

pub struct AlertPolicy {
    triggers: HashSet<Recommendation>,
    on_drop: bool,
    score_threshold: u8,
    cooldown: Duration,
    last_sent: HashMap<(String, Recommendation), Instant>,
}

impl AlertPolicy {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            triggers: config.triggers.iter().copied().collect(),
            on_drop: config.on_drop,
            score_threshold: config.score_threshold,
            cooldown: Duration::from_secs(config.cooldown_seconds),
            last_sent: HashMap::new(),
        }
    }

    pub fn alert_kind(&self, record: &SignalRecord) -> Option<AlertKind> {
        if self.triggers.contains(&record.recommendation) || record.score >= self.score_threshold {
            Some(AlertKind::Signal)
        } else if self.on_drop && record.severity == PullbackSeverity::Alert {
            Some(AlertKind::Drop)
        } else {
            None
        }
    }

    pub fn is_alert_worthy(&self, record: &SignalRecord) -> bool {
        self.alert_kind(record).is_some()
    }

    pub fn decide(&self, record: &SignalRecord, now: Instant) -> AlertDecision {
        let Some(kind) = self.alert_kind(record) else {
            return AlertDecision::NotWorthy;
        };
        if self.cooldown.is_zero() {
            return AlertDecision::Send(kind);
        }

        let key = (record.symbol.clone(), record.recommendation);
        match self.last_sent.get(&key) {
            Some(sent) if now.saturating_duration_since(*sent) < self.cooldown => {
                AlertDecision::Suppressed
            }
            _ => AlertDecision::Send(kind),
        }
    }

    pub fn mark_sent(&mut self, record: &SignalRecord, now: Instant) {
        if !self.cooldown.is_zero() {
            self.last_sent
                .insert((record.symbol.clone(), record.recommendation), now);
        }
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:+.2}%", v))
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}", v))
}

/// Chart link attached to alerts
pub fn quote_link(symbol: &str) -> String {
    format!("https://finance.yahoo.com/quote/{}", symbol)
}

pub fn format_alert(record: &SignalRecord, high_lookback_days: u32, kind: AlertKind) -> String {
    let header = match kind {
        AlertKind::Drop => format!(
            "⚠️ {} DROP ALERT!\nRecommendation: {}",
            record.symbol, record.recommendation
        ),
        AlertKind::Signal => {
            let icon = if record.recommendation.is_bullish() {
                "🟢"
            } else if record.recommendation.is_bearish() {
                "🔴"
            } else {
                "⚠️"
            };
            format!("{} {} {} ALERT!", icon, record.symbol, record.recommendation)
        }
    };
    let set = &record.indicators;

    format!(
        "{header}\n\
         Price: ${price:.2}\n\
         Pullback: {pullback} (vs {days}D High)\n\
         Daily Performance: {daily} (vs Open)\n\
         RSI: {rsi} | ADX: {adx} ({trend})\n\
         Score: {score}/10\n\
         Reason: {reason}",
        price = record.price,
        pullback = fmt_pct(set.pullback_pct),
        days = high_lookback_days,
        daily = fmt_pct(set.session_change_pct),
        rsi = fmt_value(set.rsi_value()),
        adx = fmt_value(set.adx_value()),
        trend = record.trend_status,
        score = record.score,
        reason = record.reason,
    )
}

pub fn format_status_report(snapshot: &MarketSnapshot, active: bool) -> String {
    let mut lines = vec![format!(
        "📊 Status: monitoring {} ({} symbols evaluated)",
        if active { "ACTIVE" } else { "STOPPED" },
        snapshot.records.len()
    )];

    if snapshot.records.is_empty() {
        lines.push("No market data available.".to_string());
    }

    for record in &snapshot.records {
        let set = &record.indicators;
        lines.push(format!(
            "{} ${:.2} | {} | score {} | pullback {} | RSI {} | ADX {}",
            record.symbol,
            record.price,
            record.recommendation,
            record.score,
            fmt_pct(set.pullback_pct),
            fmt_value(set.rsi_value()),
            fmt_value(set.adx_value()),
        ));
    }

    if let Some(ref top) = snapshot.top_mover {
        lines.push(format!(
            "🔥 Top pullback: {} {}",
            top.symbol,
            fmt_pct(top.pullback_pct())
        ));
    }

    if !snapshot.skipped.is_empty() {
        let symbols: Vec<&str> = snapshot.skipped.iter().map(|s| s.symbol.as_str()).collect();
        lines.push(format!("Skipped: {}", symbols.join(", ")));
    }

    lines.join("\n")
}

/// Send with bounded exponential retry. API rejections are permanent and not retried.
pub async fn deliver(
    transport: &dyn MessagingTransport,
    recipient: &str,
    text: &str,
    link: Option<&str>,
) -> Result<(), TransportError> {
    let backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(DELIVERY_ATTEMPTS - 1);

    (move || async move { transport.send_message(recipient, text, link).await })
        .retry(backoff)
        .sleep(tokio::time::sleep)
        .when(|e: &TransportError| !matches!(e, TransportError::Rejected(_)))
        .notify(|e: &TransportError, after: Duration| {
            warn!(recipient = %recipient, error = %e, retry_in_ms = after.as_millis() as u64, "Alert delivery failed, retrying");
        })
        .await
}

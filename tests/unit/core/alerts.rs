//! Unit tests for alert selection, formatting and delivery

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tickerwatch::config::AlertConfig;
use tickerwatch::core::alerts::{
    deliver, format_alert, format_status_report, quote_link, AlertDecision, AlertKind,
    AlertPolicy,
};
use tickerwatch::core::snapshot::{MarketSnapshot, SkipReason, SkippedSymbol};
use tickerwatch::models::indicators::{AdxIndicator, IndicatorSet, RsiIndicator};
use tickerwatch::models::signal::{PullbackSeverity, Recommendation, SignalRecord, TrendStatus};
use tickerwatch::services::messaging::{InboundMessage, MessagingTransport, TransportError};

fn record(symbol: &str, recommendation: Recommendation, score: u8, pullback: f64) -> SignalRecord {
    let indicators = IndicatorSet::new(symbol.to_string(), 95.0, Utc::now())
        .with_rsi(RsiIndicator { value: 27.5, period: 14 })
        .with_adx(AdxIndicator {
            value: 31.2,
            plus_di: 28.0,
            minus_di: 12.0,
            period: 14,
        })
        .with_recent_high(100.0, Some(pullback))
        .with_session_change(-1.25);

    SignalRecord {
        symbol: symbol.to_string(),
        price: 95.0,
        indicators,
        score,
        recommendation,
        reason: "bullish pullback with trend support".to_string(),
        trend_status: TrendStatus::Strong,
        severity: PullbackSeverity::Alert,
    }
}

/// Fails the first `failures` sends, then succeeds
struct FlakyTransport {
    failures: usize,
    rejected: bool,
    attempts: AtomicUsize,
}

impl FlakyTransport {
    fn transient(failures: usize) -> Self {
        Self {
            failures,
            rejected: false,
            attempts: AtomicUsize::new(0),
        }
    }

    fn rejecting() -> Self {
        Self {
            failures: usize::MAX,
            rejected: true,
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MessagingTransport for FlakyTransport {
    async fn send_message(&self, _: &str, _: &str, _: Option<&str>) -> Result<(), TransportError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.failures {
            Ok(())
        } else if self.rejected {
            Err(TransportError::Rejected("Bad Request: chat not found".to_string()))
        } else {
            Err(TransportError::Decode("Bad Gateway".to_string()))
        }
    }

    async fn get_updates(&self, _: i64, _: Duration) -> Result<Vec<InboundMessage>, TransportError> {
        Ok(Vec::new())
    }
}

#[test]
fn test_default_triggers() {
    let policy = AlertPolicy::new(&AlertConfig::default());
    assert!(policy.is_alert_worthy(&record("A", Recommendation::Buy, 3, -1.0)));
    assert!(policy.is_alert_worthy(&record("A", Recommendation::StrongSell, 0, -1.0)));
    assert!(!policy.is_alert_worthy(&record("A", Recommendation::Sell, 4, -1.0)));
    assert!(!policy.is_alert_worthy(&record("A", Recommendation::Hold, 6, -1.0)));
}

#[test]
fn test_score_threshold_alone_qualifies() {
    let policy = AlertPolicy::new(&AlertConfig::default());
    assert!(policy.is_alert_worthy(&record("A", Recommendation::Hold, 7, -1.0)));
}

#[test]
fn test_zero_cooldown_alerts_every_cycle() {
    let mut policy = AlertPolicy::new(&AlertConfig::default());
    let rec = record("A", Recommendation::Buy, 8, -6.0);
    let now = Instant::now();

    assert_eq!(policy.decide(&rec, now), AlertDecision::Send(AlertKind::Signal));
    policy.mark_sent(&rec, now);
    assert_eq!(policy.decide(&rec, now), AlertDecision::Send(AlertKind::Signal));
}

#[test]
fn test_cooldown_suppresses_repeat_alerts() {
    let config = AlertConfig {
        cooldown_seconds: 600,
        ..AlertConfig::default()
    };
    let mut policy = AlertPolicy::new(&config);
    let rec = record("A", Recommendation::Buy, 8, -6.0);
    let now = Instant::now();

    policy.mark_sent(&rec, now);
    assert_eq!(policy.decide(&rec, now + Duration::from_secs(60)), AlertDecision::Suppressed);
    assert_eq!(
        policy.decide(&rec, now + Duration::from_secs(601)),
        AlertDecision::Send(AlertKind::Signal)
    );

    // a different recommendation for the same symbol is not suppressed
    let other = record("A", Recommendation::StrongSell, 2, -6.0);
    assert_eq!(policy.decide(&other, now), AlertDecision::Send(AlertKind::Signal));
    assert_eq!(
        policy.decide(&record("A", Recommendation::Hold, 1, 0.0), now),
        AlertDecision::NotWorthy
    );
}

#[test]
fn test_format_alert() {
    let text = format_alert(&record("ZGLD.TO", Recommendation::Buy, 9, -5.0), 3, AlertKind::Signal);

    assert!(text.starts_with("🟢 ZGLD.TO BUY ALERT!"));
    assert!(text.contains("Price: $95.00"));
    assert!(text.contains("Pullback: -5.00% (vs 3D High)"));
    assert!(text.contains("Daily Performance: -1.25% (vs Open)"));
    assert!(text.contains("RSI: 27.5 | ADX: 31.2 (strong)"));
    assert!(text.contains("Score: 9/10"));
    assert!(text.contains("Reason: bullish pullback with trend support"));
}

#[test]
fn test_format_alert_marks_undefined_values() {
    let mut rec = record("A", Recommendation::StrongSell, 2, -9.0);
    rec.indicators.rsi = None;
    rec.indicators.session_change_pct = None;
    let text = format_alert(&rec, 3, AlertKind::Signal);

    assert!(text.starts_with("🔴 A STRONG_SELL ALERT!"));
    assert!(text.contains("RSI: n/a"));
    assert!(text.contains("Daily Performance: n/a"));
}

#[test]
fn test_drop_trigger_is_opt_in() {
    let severe = record("A", Recommendation::Hold, 3, -6.0);
    let mut mild = record("A", Recommendation::Hold, 3, -2.0);
    mild.severity = PullbackSeverity::Safe;

    let default_policy = AlertPolicy::new(&AlertConfig::default());
    assert_eq!(default_policy.alert_kind(&severe), None);

    let config = AlertConfig {
        on_drop: true,
        ..AlertConfig::default()
    };
    let policy = AlertPolicy::new(&config);
    assert_eq!(policy.alert_kind(&severe), Some(AlertKind::Drop));
    assert_eq!(policy.alert_kind(&mild), None);
    assert_eq!(
        policy.decide(&severe, Instant::now()),
        AlertDecision::Send(AlertKind::Drop)
    );

    // a trigger recommendation still reports as a signal alert
    let buy = record("A", Recommendation::Buy, 3, -6.0);
    assert_eq!(policy.alert_kind(&buy), Some(AlertKind::Signal));
}

#[test]
fn test_format_drop_alert() {
    let text = format_alert(&record("TSLA", Recommendation::Hold, 3, -6.0), 3, AlertKind::Drop);

    assert!(text.starts_with("⚠️ TSLA DROP ALERT!\nRecommendation: HOLD"));
    assert!(text.contains("Pullback: -6.00% (vs 3D High)"));
    assert!(text.contains("Score: 3/10"));
}

#[test]
fn test_quote_link() {
    assert_eq!(quote_link("AAPL"), "https://finance.yahoo.com/quote/AAPL");
}

#[test]
fn test_status_report_lists_records_and_skips() {
    let snapshot = MarketSnapshot::new(
        vec![
            record("A", Recommendation::Buy, 9, -6.0),
            record("B", Recommendation::Hold, 2, -1.0),
        ],
        vec![SkippedSymbol {
            symbol: "ZZZ".to_string(),
            reason: SkipReason::NoData,
        }],
    );
    let text = format_status_report(&snapshot, true);

    assert!(text.starts_with("📊 Status: monitoring ACTIVE (2 symbols evaluated)"));
    assert!(text.contains("A $95.00 | BUY | score 9"));
    assert!(text.contains("B $95.00 | HOLD | score 2"));
    assert!(text.contains("🔥 Top pullback: A -6.00%"));
    assert!(text.contains("Skipped: ZZZ"));
}

#[test]
fn test_status_report_without_data() {
    let text = format_status_report(&MarketSnapshot::empty(), false);
    assert!(text.contains("monitoring STOPPED (0 symbols evaluated)"));
    assert!(text.contains("No market data available."));
}

#[tokio::test]
async fn test_deliver_retries_transient_failures() {
    let transport = FlakyTransport::transient(2);
    let result = deliver(&transport, "123", "hello", None).await;

    assert!(result.is_ok());
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_deliver_gives_up_after_bounded_attempts() {
    let transport = FlakyTransport::transient(usize::MAX);
    let result = deliver(&transport, "123", "hello", None).await;

    assert!(matches!(result, Err(TransportError::Decode(_))));
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_deliver_does_not_retry_rejections() {
    let transport = FlakyTransport::rejecting();
    let result = deliver(&transport, "999", "hello", None).await;

    assert!(matches!(result, Err(TransportError::Rejected(_))));
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
}

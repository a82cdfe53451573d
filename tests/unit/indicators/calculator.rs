//! Unit tests for indicator set assembly

use chrono::{Duration, TimeZone, Utc};
use tickerwatch::config::IndicatorConfig;
use tickerwatch::indicators::compute_indicator_set;
use tickerwatch::models::indicators::{PricePoint, PriceSeries};

fn hourly_uptrend(symbol: &str, count: usize) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 14, 0, 0).unwrap();
    let points = (0..count)
        .map(|i| {
            let close = 100.0 + i as f64;
            PricePoint::new(close, close + 0.5, close - 0.5, close, start + Duration::hours(i as i64))
        })
        .collect();
    PriceSeries::new(symbol, points)
}

#[test]
fn test_empty_series_yields_nothing() {
    let config = IndicatorConfig::default();
    assert!(compute_indicator_set(&PriceSeries::empty("ZZZ"), &config).is_none());
}

#[test]
fn test_full_history_defines_every_indicator() {
    let config = IndicatorConfig::default();
    let set = compute_indicator_set(&hourly_uptrend("AAPL", 60), &config).unwrap();

    assert_eq!(set.symbol, "AAPL");
    assert_eq!(set.price, 159.0);
    assert_eq!(set.rsi_value(), Some(100.0));
    assert!(set.adx_value().is_some());
    assert_eq!(set.sma_value(), Some(134.5));
    assert!(set.distance_from_sma_pct.unwrap() > 0.0);
    assert_eq!(set.recent_high, Some(159.5));
    assert!(set.pullback_pct.unwrap() < 0.0);
    assert!(set.session_change_pct.is_some());
}

#[test]
fn test_short_history_leaves_sma_undefined() {
    let config = IndicatorConfig::default();
    let set = compute_indicator_set(&hourly_uptrend("AAPL", 30), &config).unwrap();

    assert!(set.rsi.is_some());
    assert!(set.adx.is_some());
    assert!(set.sma.is_none());
    assert!(set.distance_from_sma_pct.is_none());
}

#[test]
fn test_min_points_covers_adx_and_rsi() {
    let config = IndicatorConfig::default();
    assert_eq!(config.min_points(), 28);

    let rsi_heavy = IndicatorConfig {
        rsi_period: 40,
        ..IndicatorConfig::default()
    };
    assert_eq!(rsi_heavy.min_points(), 41);
}

#[test]
fn test_oversized_high_lookback_uses_whole_series() {
    let config = IndicatorConfig {
        high_lookback_days: 200_000_000,
        ..IndicatorConfig::default()
    };
    let set = compute_indicator_set(&hourly_uptrend("AAPL", 60), &config).unwrap();
    assert_eq!(set.recent_high, Some(159.5));
}

#[test]
fn test_session_change_uses_exchange_offset() {
    let config = IndicatorConfig::default();
    let utc = compute_indicator_set(&hourly_uptrend("AAPL", 60), &config).unwrap();
    // last bar is 01:00 UTC on Jan 5, so the UTC session opened at 158
    assert!((utc.session_change_pct.unwrap() - 100.0 / 158.0).abs() < 1e-9);

    // 20:00 on Jan 4 in New York; that session opened at 05:00 UTC (bar 39)
    let new_york = hourly_uptrend("AAPL", 60).with_utc_offset(-5 * 3600);
    let local = compute_indicator_set(&new_york, &config).unwrap();
    assert!((local.session_change_pct.unwrap() - 2000.0 / 139.0).abs() < 1e-9);
}

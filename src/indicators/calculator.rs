//! Builds an [`IndicatorSet`] from one price series

use crate::config::IndicatorConfig;
use crate::indicators::momentum::calculate_rsi;
use crate::indicators::structure::{pullback_pct, rolling_high, session_change_pct};
use crate::indicators::trend::{calculate_adx, calculate_sma, distance_from_sma_pct};
use crate::models::indicators::{IndicatorSet, PriceSeries};

/// Compute every indicator for the latest point of `series`.
///
/// Returns `None` for an empty series. Individual indicators stay undefined
/// when the series is too short for their period.
pub fn compute_indicator_set(series: &PriceSeries, config: &IndicatorConfig) -> Option<IndicatorSet> {
    let last = series.last()?;
    let points = series.points();
    let offset = series.session_offset();
    let price = last.close;

    let mut set = IndicatorSet::new(series.symbol.clone(), price, last.timestamp);

    if let Some(rsi) = calculate_rsi(points, config.rsi_period) {
        set = set.with_rsi(rsi);
    }

    if let Some(adx) = calculate_adx(points, config.adx_period) {
        set = set.with_adx(adx);
    }

    if let Some(sma) = calculate_sma(points, config.sma_period) {
        let distance = distance_from_sma_pct(price, &sma);
        set = set.with_sma(sma, distance);
    }

    if let Some(high) = rolling_high(points, config.high_lookback_sessions(), offset) {
        set = set.with_recent_high(high, pullback_pct(price, high));
    }

    if let Some(change) = session_change_pct(points, offset) {
        set = set.with_session_change(change);
    }

    Some(set)
}

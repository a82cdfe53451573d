//! Descriptive labels that never feed into scoring

use crate::models::signal::{PullbackSeverity, TrendStatus};

/// Share of the drop threshold at which a pullback turns into a warning
pub const WARNING_FRACTION: f64 = 0.7;

/// ADX < 20 weak/choppy, [20, 25) building, [25, 50] strong, > 50 super trend
pub fn trend_status(adx: Option<f64>) -> TrendStatus {
    match adx {
        None => TrendStatus::Unknown,
        Some(v) if v < 20.0 => TrendStatus::WeakChoppy,
        Some(v) if v < 25.0 => TrendStatus::Building,
        Some(v) if v <= 50.0 => TrendStatus::Strong,
        Some(_) => TrendStatus::SuperTrend,
    }
}

/// Place a pullback against the configured drop threshold
pub fn pullback_severity(pullback_pct: Option<f64>, drop_threshold_pct: f64) -> PullbackSeverity {
    match pullback_pct {
        Some(p) if p <= -drop_threshold_pct => PullbackSeverity::Alert,
        Some(p) if p <= -(drop_threshold_pct * WARNING_FRACTION) => PullbackSeverity::Warning,
        _ => PullbackSeverity::Safe,
    }
}

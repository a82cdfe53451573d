//! Confluence scoring
//!
//! Three independent bands are summed into a 0-10 score:
//! RSI (max 4), ADX (max 3) and SMA support (max 3). An undefined input
//! contributes nothing to its band.

pub const MAX_SCORE: u8 = 10;

/// RSI band: < 30 scores 4, [30, 40) scores 2
pub fn rsi_band(rsi: Option<f64>) -> u8 {
    match rsi {
        Some(v) if v < 30.0 => 4,
        Some(v) if v < 40.0 => 2,
        _ => 0,
    }
}

/// ADX band: > 25 scores 3, [20, 25] scores 1
pub fn adx_band(adx: Option<f64>) -> u8 {
    match adx {
        Some(v) if v > 25.0 => 3,
        Some(v) if v >= 20.0 => 1,
        _ => 0,
    }
}

/// Support band: within (-2%, 2%) of the SMA scores 3, further above scores 1
pub fn support_band(distance_from_sma_pct: Option<f64>) -> u8 {
    match distance_from_sma_pct {
        Some(d) if d > -2.0 && d < 2.0 => 3,
        Some(d) if d > 0.0 => 1,
        _ => 0,
    }
}

/// Sum of the three bands, bounded to [0, 10]
pub fn confluence_score(
    rsi: Option<f64>,
    adx: Option<f64>,
    distance_from_sma_pct: Option<f64>,
) -> u8 {
    (rsi_band(rsi) + adx_band(adx) + support_band(distance_from_sma_pct)).min(MAX_SCORE)
}

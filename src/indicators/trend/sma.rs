//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::models::indicators::{PricePoint, SmaIndicator};

/// Calculate SMA of closes over the last `period` points
pub fn calculate_sma(points: &[PricePoint], period: u32) -> Option<SmaIndicator> {
    if period == 0 || points.len() < period as usize {
        return None;
    }

    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    let value = math::sma(&closes, period as usize)?;

    Some(SmaIndicator { value, period })
}

/// Percentage distance of `price` above (positive) or below (negative) the SMA
pub fn distance_from_sma_pct(price: f64, sma: &SmaIndicator) -> Option<f64> {
    math::pct_change(price, sma.value)
}

//! RSI (Relative Strength Index) indicator

use crate::common::math;
use crate::models::indicators::{PricePoint, RsiIndicator};

/// RSI reported when both average gain and average loss are zero.
pub const FLAT_RSI: f64 = 50.0;

/// Calculate the full RSI series, one slot per input point.
///
/// gain_t = max(close_t - close_{t-1}, 0), loss_t = max(close_{t-1} - close_t, 0),
/// each averaged with a trailing simple mean over `period` points.
/// RSI = 100 - (100 / (1 + RS)), RS = Average Gain / Average Loss.
///
/// The first `period` slots are `None`.
pub fn rsi_series(points: &[PricePoint], period: u32) -> Vec<Option<f64>> {
    let period = period as usize;
    if period == 0 || points.is_empty() {
        return vec![None; points.len()];
    }

    let mut gains = Vec::with_capacity(points.len());
    let mut losses = Vec::with_capacity(points.len());
    gains.push(None);
    losses.push(None);

    for pair in points.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(Some(change.max(0.0)));
        losses.push(Some((-change).max(0.0)));
    }

    let avg_gains = math::rolling_mean(&gains, period);
    let avg_losses = math::rolling_mean(&losses, period);

    avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) => Some(rsi_from_averages(g, l)),
            _ => None,
        })
        .collect()
}

/// avg_loss == 0 yields 100, or [`FLAT_RSI`] when avg_gain is also 0.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return FLAT_RSI;
        }
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

/// Calculate RSI for the latest point
pub fn calculate_rsi(points: &[PricePoint], period: u32) -> Option<RsiIndicator> {
    if points.len() < period as usize + 1 {
        return None;
    }

    let value = rsi_series(points, period).last().copied().flatten()?;
    Some(RsiIndicator { value, period })
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(points: &[PricePoint]) -> Option<RsiIndicator> {
    calculate_rsi(points, 14)
}

//! ADX (Average Directional Index) indicator

use crate::common::math;
use crate::models::indicators::{AdxIndicator, PricePoint};

/// Directional readings for one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalReading {
    pub plus_di: f64,
    pub minus_di: f64,
    pub adx: f64,
}

/// Calculate the full ADX series, one slot per input point.
///
/// TR, +DM and -DM are averaged with a trailing simple mean over `period`
/// points, DX is derived from +DI/-DI and ADX is the trailing mean of DX.
/// A slot is `None` until `2 * period` points of history exist, and whenever
/// the window holds a zero true range or a zero DI sum.
pub fn adx_series(points: &[PricePoint], period: u32) -> Vec<Option<DirectionalReading>> {
    let period = period as usize;
    if period == 0 || points.is_empty() {
        return vec![None; points.len()];
    }

    let mut tr_values = Vec::with_capacity(points.len());
    let mut plus_dm_values = Vec::with_capacity(points.len());
    let mut minus_dm_values = Vec::with_capacity(points.len());
    tr_values.push(None);
    plus_dm_values.push(None);
    minus_dm_values.push(None);

    for pair in points.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        tr_values.push(Some(math::true_range(curr.high, curr.low, prev.close)));

        let up_move = curr.high - prev.high;
        let down_move = prev.low - curr.low;

        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
        plus_dm_values.push(Some(plus_dm));
        minus_dm_values.push(Some(minus_dm));
    }

    let atr = math::rolling_mean(&tr_values, period);
    let plus_dm_avg = math::rolling_mean(&plus_dm_values, period);
    let minus_dm_avg = math::rolling_mean(&minus_dm_values, period);

    let mut plus_di = vec![None; points.len()];
    let mut minus_di = vec![None; points.len()];
    let mut dx = vec![None; points.len()];

    for i in 0..points.len() {
        let (Some(tr), Some(pdm), Some(mdm)) = (atr[i], plus_dm_avg[i], minus_dm_avg[i]) else {
            continue;
        };
        if tr <= 0.0 {
            continue;
        }

        let p = 100.0 * pdm / tr;
        let m = 100.0 * mdm / tr;
        plus_di[i] = Some(p);
        minus_di[i] = Some(m);

        let di_sum = p + m;
        if di_sum > 0.0 {
            dx[i] = Some(100.0 * (p - m).abs() / di_sum);
        }
    }

    let adx = math::rolling_mean(&dx, period);

    (0..points.len())
        .map(|i| match (plus_di[i], minus_di[i], adx[i]) {
            (Some(plus_di), Some(minus_di), Some(adx)) => Some(DirectionalReading {
                plus_di,
                minus_di,
                adx: adx.clamp(0.0, 100.0),
            }),
            _ => None,
        })
        .collect()
}

/// Calculate ADX for the latest point.
///
/// Returns `None` for fewer than `2 * period` points; callers must treat that
/// as unknown trend strength.
pub fn calculate_adx(points: &[PricePoint], period: u32) -> Option<AdxIndicator> {
    if period == 0 || points.len() < 2 * period as usize {
        return None;
    }

    let reading = adx_series(points, period).last().copied().flatten()?;

    Some(AdxIndicator {
        value: reading.adx,
        plus_di: reading.plus_di,
        minus_di: reading.minus_di,
        period,
    })
}

/// Calculate ADX with default period (14)
pub fn calculate_adx_default(points: &[PricePoint]) -> Option<AdxIndicator> {
    calculate_adx(points, 14)
}

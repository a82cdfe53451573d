//! Reference price levels: rolling high and session open

use chrono::{FixedOffset, NaiveDate};

use crate::common::math;
use crate::models::indicators::PricePoint;

/// Exchange-local calendar date of a bar
fn session_date(point: &PricePoint, offset: FixedOffset) -> NaiveDate {
    point.timestamp.with_timezone(&offset).date_naive()
}

/// Highest high over the last `sessions` trading sessions present in `points`.
///
/// Sessions are distinct exchange-local dates, so weekends and holidays do not
/// shrink the window. A count larger than the series covers every point.
pub fn rolling_high(points: &[PricePoint], sessions: usize, offset: FixedOffset) -> Option<f64> {
    if sessions == 0 {
        return None;
    }

    let mut seen = 0usize;
    let mut current: Option<NaiveDate> = None;
    let mut high: Option<f64> = None;

    for point in points.iter().rev() {
        let date = session_date(point, offset);
        if current != Some(date) {
            seen += 1;
            if seen > sessions {
                break;
            }
            current = Some(date);
        }
        if point.high.is_finite() {
            high = Some(high.map_or(point.high, |h| h.max(point.high)));
        }
    }

    high
}

/// Percentage decline of `price` from `high` (zero or negative when below)
pub fn pullback_pct(price: f64, high: f64) -> Option<f64> {
    math::pct_change(price, high)
}

/// Open of the first bar in the latest bar's session
pub fn session_open(points: &[PricePoint], offset: FixedOffset) -> Option<f64> {
    let last_date = session_date(points.last()?, offset);

    points
        .iter()
        .rev()
        .take_while(|p| session_date(p, offset) == last_date)
        .last()
        .map(|p| p.open)
}

/// Change of the latest close versus the session open
pub fn session_change_pct(points: &[PricePoint], offset: FixedOffset) -> Option<f64> {
    let close = points.last()?.close;
    math::pct_change(close, session_open(points, offset)?)
}

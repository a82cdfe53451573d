use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// One OHLC bar as delivered by the market-data provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PricePoint {
    pub fn new(open: f64, high: f64, low: f64, close: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

/// Time-ordered bars for one symbol over one request window.
///
/// Timestamps are strictly increasing. The series may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    points: Vec<PricePoint>,
    /// Exchange offset from UTC in seconds; sessions are local calendar days
    #[serde(default)]
    utc_offset_secs: i32,
}

impl PriceSeries {
    /// Build a series, sorting by timestamp and dropping duplicate timestamps
    /// (the later bar wins).
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }
        Self {
            symbol: symbol.into(),
            points: deduped,
            utc_offset_secs: 0,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn with_utc_offset(mut self, seconds: i32) -> Self {
        self.utc_offset_secs = seconds;
        self
    }

    /// Exchange-local offset; out-of-range values fall back to UTC
    pub fn session_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxIndicator {
    pub value: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmaIndicator {
    pub value: f64,
    pub period: u32,
}

/// Per-symbol indicator values for one evaluation cycle.
///
/// Any value may be undefined when the series is too short for it; callers
/// must treat `None` as unknown, never as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub symbol: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adx: Option<AdxIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma: Option<SmaIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_sma_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pullback_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_change_pct: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl IndicatorSet {
    pub fn new(symbol: String, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol,
            price,
            rsi: None,
            adx: None,
            sma: None,
            recent_high: None,
            distance_from_sma_pct: None,
            pullback_pct: None,
            session_change_pct: None,
            timestamp,
        }
    }

    pub fn with_rsi(mut self, rsi: RsiIndicator) -> Self {
        self.rsi = Some(rsi);
        self
    }

    pub fn with_adx(mut self, adx: AdxIndicator) -> Self {
        self.adx = Some(adx);
        self
    }

    pub fn with_sma(mut self, sma: SmaIndicator, distance_pct: Option<f64>) -> Self {
        self.sma = Some(sma);
        self.distance_from_sma_pct = distance_pct;
        self
    }

    pub fn with_recent_high(mut self, high: f64, pullback_pct: Option<f64>) -> Self {
        self.recent_high = Some(high);
        self.pullback_pct = pullback_pct;
        self
    }

    pub fn with_session_change(mut self, change_pct: f64) -> Self {
        self.session_change_pct = Some(change_pct);
        self
    }

    pub fn rsi_value(&self) -> Option<f64> {
        self.rsi.map(|r| r.value)
    }

    pub fn adx_value(&self) -> Option<f64> {
        self.adx.map(|a| a.value)
    }

    pub fn sma_value(&self) -> Option<f64> {
        self.sma.map(|s| s.value)
    }
}

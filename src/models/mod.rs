//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;

pub use indicators::{
    AdxIndicator, IndicatorSet, PricePoint, PriceSeries, RsiIndicator, SmaIndicator,
};
pub use signal::{PullbackSeverity, Recommendation, SignalRecord, TrendStatus};

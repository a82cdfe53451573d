//! Trend indicators: SMA, ADX

pub mod sma;
pub mod adx;

pub use sma::*;
pub use adx::*;

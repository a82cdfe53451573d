//! Market data provider interface.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::HistoryWindow;
use crate::models::indicators::PriceSeries;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("market data request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("market data provider rejected {symbol}: {message}")]
    Upstream { symbol: String, message: String },
    #[error("malformed market data for {symbol}: {message}")]
    Decode { symbol: String, message: String },
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch a bounded OHLC history window for a symbol.
    ///
    /// An empty series is a valid answer (no data for the window).
    async fn get_history(
        &self,
        symbol: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, MarketDataError>;
}

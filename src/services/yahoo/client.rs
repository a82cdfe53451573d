use async_trait::async_trait;
use chrono::DateTime;
use tracing::debug;

use super::messages::{ChartResponse, ChartResult};
use crate::config::HistoryWindow;
use crate::models::indicators::{PricePoint, PriceSeries};
use crate::services::market_data::{MarketDataError, MarketDataProvider};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; tickerwatch/0.1)";

pub struct YahooChartProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

/// Zip the column arrays into bars, dropping rows with any null field
fn to_points(result: &ChartResult) -> Vec<PricePoint> {
    let Some(quote) = result.indicators.quote.first() else {
        return Vec::new();
    };

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let open = quote.open.get(i).copied().flatten()?;
            let high = quote.high.get(i).copied().flatten()?;
            let low = quote.low.get(i).copied().flatten()?;
            let close = quote.close.get(i).copied().flatten()?;
            let timestamp = DateTime::from_timestamp(ts, 0)?;
            Some(PricePoint::new(open, high, low, close, timestamp))
        })
        .collect()
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    async fn get_history(
        &self,
        symbol: &str,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, MarketDataError> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", window.range.as_str()), ("interval", window.interval.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: ChartResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(MarketDataError::Decode {
                    symbol: symbol.to_string(),
                    message: e.to_string(),
                });
            }
            Err(_) => {
                return Err(MarketDataError::Upstream {
                    symbol: symbol.to_string(),
                    message: format!("HTTP {}", status),
                });
            }
        };

        if let Some(error) = parsed.chart.error {
            return Err(MarketDataError::Upstream {
                symbol: symbol.to_string(),
                message: format!("{}: {}", error.code, error.description),
            });
        }

        let result = parsed.chart.result.as_ref().and_then(|results| results.first());
        let points = result.map(to_points).unwrap_or_default();
        let utc_offset = result
            .and_then(|r| r.meta.as_ref())
            .and_then(|meta| meta.gmtoffset)
            .unwrap_or(0);

        debug!(
            symbol = %symbol,
            range = %window.range,
            interval = %window.interval,
            count = points.len(),
            utc_offset,
            "YahooChartProvider: fetched {} bars for {}",
            points.len(),
            symbol
        );

        Ok(PriceSeries::new(symbol, points).with_utc_offset(utc_offset))
    }
}

//! Market snapshot builder: one evaluated record per symbol per refresh.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{HistoryWindow, IndicatorConfig};
use crate::indicators::compute_indicator_set;
use crate::metrics::Metrics;
use crate::models::signal::SignalRecord;
use crate::services::market_data::MarketDataProvider;
use crate::signals::engine::SignalEngine;

/// Why a symbol produced no record this cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    NoData,
    InsufficientHistory { points: usize, required: usize },
    ProviderError { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub enum SymbolOutcome {
    Evaluated(SignalRecord),
    Skipped(SkippedSymbol),
}

/// Read-only view of one refresh cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub generated_at: DateTime<Utc>,
    pub records: Vec<SignalRecord>,
    /// Record with the lowest pullback
    pub top_mover: Option<SignalRecord>,
    pub skipped: Vec<SkippedSymbol>,
}

impl MarketSnapshot {
    pub fn new(records: Vec<SignalRecord>, skipped: Vec<SkippedSymbol>) -> Self {
        let top_mover = top_mover(&records).cloned();
        Self {
            generated_at: Utc::now(),
            records,
            top_mover,
            skipped,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn record(&self, symbol: &str) -> Option<&SignalRecord> {
        self.records.iter().find(|r| r.symbol == symbol)
    }
}

/// Record with the lowest defined pullback
pub fn top_mover(records: &[SignalRecord]) -> Option<&SignalRecord> {
    records
        .iter()
        .filter_map(|r| r.pullback_pct().map(|p| (p, r)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, r)| r)
}

pub struct MarketSnapshotBuilder {
    provider: Arc<dyn MarketDataProvider>,
    engine: SignalEngine,
    indicators: IndicatorConfig,
    history: HistoryWindow,
    metrics: Option<Arc<Metrics>>,
}

impl MarketSnapshotBuilder {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        engine: SignalEngine,
        indicators: IndicatorConfig,
        history: HistoryWindow,
    ) -> Self {
        Self {
            provider,
            engine,
            indicators,
            history,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SignalEngine {
        &mut self.engine
    }

    /// Fetch and evaluate a single symbol. Never fails: problems become a skip.
    pub async fn evaluate_symbol(&self, symbol: &str) -> SymbolOutcome {
        let skipped = |reason| {
            SymbolOutcome::Skipped(SkippedSymbol {
                symbol: symbol.to_string(),
                reason,
            })
        };

        let series = match self.provider.get_history(symbol, &self.history).await {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Snapshot: market data unavailable for {}", symbol);
                return skipped(SkipReason::ProviderError {
                    message: e.to_string(),
                });
            }
        };

        if series.is_empty() {
            warn!(symbol = %symbol, "Snapshot: no data for {}, check the symbol suffix", symbol);
            return skipped(SkipReason::NoData);
        }

        let required = self.indicators.min_points();
        if series.len() < required {
            debug!(
                symbol = %symbol,
                count = series.len(),
                min = required,
                "Snapshot: not enough points ({} < {}) for {}",
                series.len(),
                required,
                symbol
            );
            return skipped(SkipReason::InsufficientHistory {
                points: series.len(),
                required,
            });
        }

        match compute_indicator_set(&series, &self.indicators) {
            Some(set) => SymbolOutcome::Evaluated(self.engine.evaluate(set)),
            None => skipped(SkipReason::NoData),
        }
    }

    /// Evaluate every symbol of the watchlist.
    ///
    /// Fetches run concurrently; results are merged in watchlist order once all
    /// of them have completed. A failing symbol never aborts the batch.
    pub async fn build(&self, watchlist: &[String]) -> MarketSnapshot {
        let start = Instant::now();
        let outcomes = join_all(watchlist.iter().map(|s| self.evaluate_symbol(s))).await;

        let mut records = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                SymbolOutcome::Evaluated(record) => records.push(record),
                SymbolOutcome::Skipped(skip) => skipped.push(skip),
            }
        }

        if let Some(ref metrics) = self.metrics {
            metrics.evaluation_cycles_total.inc();
            metrics.symbols_evaluated_total.inc_by(records.len() as u64);
            metrics.symbols_skipped_total.inc_by(skipped.len() as u64);
            metrics
                .evaluation_duration_seconds
                .observe(start.elapsed().as_secs_f64());
        }

        info!(
            evaluated = records.len(),
            skipped = skipped.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Snapshot: evaluated {} of {} symbols",
            records.len(),
            watchlist.len()
        );

        MarketSnapshot::new(records, skipped)
    }
}

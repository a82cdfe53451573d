//! Signal, indicator and alert parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::signal::Recommendation;

/// The six numeric thresholds consumed by the signal engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    /// Pullback (in %) from the recent high that qualifies as a dip
    pub buy_drop_pct: f64,
    /// RSI at or below which a dip counts as oversold
    pub buy_rsi_ceiling: f64,
    /// Minimum ADX for trend-confirmed buys
    pub min_adx: f64,
    /// Gain (in %) over the recent high that triggers a take-profit sell
    pub sell_gain_pct: f64,
    /// RSI above which the symbol is overbought
    pub sell_rsi_floor: f64,
    /// Distance (in %) below the SMA that counts as a breakdown
    pub breakdown_buffer_pct: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            buy_drop_pct: 5.0,
            buy_rsi_ceiling: 30.0,
            min_adx: 25.0,
            sell_gain_pct: 5.0,
            sell_rsi_floor: 70.0,
            breakdown_buffer_pct: 2.0,
        }
    }
}

/// Which decision policy turns an indicator set into a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalPolicy {
    /// Ordered rule chain over RSI/ADX/SMA distance
    #[default]
    Confluence,
    /// Binary dip-buy / take-profit gates
    Threshold,
}

impl fmt::Display for SignalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalPolicy::Confluence => f.write_str("confluence"),
            SignalPolicy::Threshold => f.write_str("threshold"),
        }
    }
}

impl FromStr for SignalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confluence" => Ok(SignalPolicy::Confluence),
            "threshold" => Ok(SignalPolicy::Threshold),
            other => Err(format!("unknown signal policy '{}'", other)),
        }
    }
}

/// Upper bound on the recent-high lookback, in trading sessions
pub const MAX_HIGH_LOOKBACK_DAYS: u32 = 365;

/// Indicator periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: u32,
    pub adx_period: u32,
    pub sma_period: u32,
    /// Trading sessions covered by the recent high
    pub high_lookback_days: u32,
}

impl IndicatorConfig {
    pub fn high_lookback_sessions(&self) -> usize {
        self.high_lookback_days as usize
    }

    /// Fewest points a series needs before it is evaluated at all
    pub fn min_points(&self) -> usize {
        (2 * self.adx_period as usize).max(self.rsi_period as usize + 1)
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            adx_period: 14,
            sma_period: 50,
            high_lookback_days: 3,
        }
    }
}

/// When an evaluated record is worth an outbound alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub triggers: Vec<Recommendation>,
    /// Also alert whenever the pullback severity reaches `Alert`
    #[serde(default)]
    pub on_drop: bool,
    pub score_threshold: u8,
    /// 0 disables de-duplication: every qualifying cycle alerts again
    pub cooldown_seconds: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            triggers: vec![Recommendation::Buy, Recommendation::StrongSell],
            on_drop: false,
            score_threshold: 7,
            cooldown_seconds: 0,
        }
    }
}

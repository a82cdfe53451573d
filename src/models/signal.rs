//! Signal output models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::indicators::IndicatorSet;

/// Categorical trading recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Hold,
    Watch,
    Buy,
    BuyRisky,
    Sell,
    SellAvoid,
    StrongSell,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Hold => "HOLD",
            Recommendation::Watch => "WATCH",
            Recommendation::Buy => "BUY",
            Recommendation::BuyRisky => "BUY_RISKY",
            Recommendation::Sell => "SELL",
            Recommendation::SellAvoid => "SELL_AVOID",
            Recommendation::StrongSell => "STRONG_SELL",
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, Recommendation::Buy | Recommendation::BuyRisky)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(
            self,
            Recommendation::Sell | Recommendation::SellAvoid | Recommendation::StrongSell
        )
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "HOLD" => Ok(Recommendation::Hold),
            "WATCH" => Ok(Recommendation::Watch),
            "BUY" => Ok(Recommendation::Buy),
            "BUY_RISKY" => Ok(Recommendation::BuyRisky),
            "SELL" => Ok(Recommendation::Sell),
            "SELL_AVOID" => Ok(Recommendation::SellAvoid),
            "STRONG_SELL" => Ok(Recommendation::StrongSell),
            other => Err(format!("unknown recommendation '{}'", other)),
        }
    }
}

/// Descriptive trend-strength label derived from ADX
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    Unknown,
    WeakChoppy,
    Building,
    Strong,
    SuperTrend,
}

impl TrendStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TrendStatus::Unknown => "unknown",
            TrendStatus::WeakChoppy => "weak/choppy",
            TrendStatus::Building => "building",
            TrendStatus::Strong => "strong",
            TrendStatus::SuperTrend => "super trend",
        }
    }
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How deep the pullback sits relative to the configured drop threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullbackSeverity {
    Safe,
    Warning,
    Alert,
}

/// One evaluated symbol for one refresh cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    pub symbol: String,
    pub price: f64,
    pub indicators: IndicatorSet,
    pub score: u8,
    pub recommendation: Recommendation,
    pub reason: String,
    pub trend_status: TrendStatus,
    pub severity: PullbackSeverity,
}

impl SignalRecord {
    pub fn pullback_pct(&self) -> Option<f64> {
        self.indicators.pullback_pct
    }
}

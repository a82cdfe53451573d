//! Recommendation policies
//!
//! Both policies read the same [`SignalInputs`]. Comparisons against an
//! undefined indicator are false, so missing data never fires a rule.

use crate::config::{SignalPolicy, SignalThresholds};
use crate::models::indicators::IndicatorSet;
use crate::models::signal::Recommendation;

/// Indicator values a policy decides on
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalInputs {
    pub price: f64,
    pub rsi: Option<f64>,
    pub adx: Option<f64>,
    pub sma: Option<f64>,
    pub distance_from_sma_pct: Option<f64>,
    pub recent_high: Option<f64>,
    pub pullback_pct: Option<f64>,
}

impl From<&IndicatorSet> for SignalInputs {
    fn from(set: &IndicatorSet) -> Self {
        Self {
            price: set.price,
            rsi: set.rsi_value(),
            adx: set.adx_value(),
            sma: set.sma_value(),
            distance_from_sma_pct: set.distance_from_sma_pct,
            recent_high: set.recent_high,
            pullback_pct: set.pullback_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub recommendation: Recommendation,
    pub reason: String,
}

impl Decision {
    fn new(recommendation: Recommendation, reason: &str) -> Self {
        Self {
            recommendation,
            reason: reason.to_string(),
        }
    }
}

pub trait DecisionPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn decide(&self, inputs: &SignalInputs, thresholds: &SignalThresholds) -> Decision;
}

fn lt(value: Option<f64>, bound: f64) -> bool {
    value.is_some_and(|v| v < bound)
}

fn le(value: Option<f64>, bound: f64) -> bool {
    value.is_some_and(|v| v <= bound)
}

fn gt(value: Option<f64>, bound: f64) -> bool {
    value.is_some_and(|v| v > bound)
}

fn ge(value: Option<f64>, bound: f64) -> bool {
    value.is_some_and(|v| v >= bound)
}

/// Ordered rule chain; later rules override earlier ones.
///
/// 1. HOLD
/// 2. ADX > min ADX, SMA distance > -2%, RSI < 40: BUY
/// 3. otherwise RSI < 30 and pullback < -5%: BUY_RISKY
/// 4. RSI > sell floor: SELL (overrides 2-3)
/// 5. otherwise ADX > 25 and SMA distance < -2%: SELL_AVOID
/// 6. SMA distance < -5% and ADX > 40: STRONG_SELL (overrides 5)
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfluencePolicy;

impl DecisionPolicy for ConfluencePolicy {
    fn name(&self) -> &'static str {
        "confluence"
    }

    fn decide(&self, inputs: &SignalInputs, thresholds: &SignalThresholds) -> Decision {
        let rsi = inputs.rsi;
        let adx = inputs.adx;
        let dist = inputs.distance_from_sma_pct;

        let mut decision = Decision::new(Recommendation::Hold, "neutral");

        if gt(adx, thresholds.min_adx) && gt(dist, -2.0) && lt(rsi, 40.0) {
            decision = Decision::new(Recommendation::Buy, "bullish pullback with trend support");
        } else if lt(rsi, 30.0) && lt(inputs.pullback_pct, -5.0) {
            decision = Decision::new(Recommendation::BuyRisky, "oversold mean-reversion");
        }

        if gt(rsi, thresholds.sell_rsi_floor) {
            decision = Decision::new(Recommendation::Sell, "overbought");
        } else {
            if gt(adx, 25.0) && lt(dist, -2.0) {
                decision = Decision::new(Recommendation::SellAvoid, "strong downtrend");
            }
            if lt(dist, -5.0) && gt(adx, 40.0) {
                decision = Decision::new(Recommendation::StrongSell, "high-intensity breakdown");
            }
        }

        decision
    }
}

/// Binary dip-buy / take-profit gates.
///
/// BUY needs the dip, the oversold RSI and a trending ADX; the dip without
/// trend confirmation is WATCH. SELL on a gain over the recent high, an
/// overbought RSI or an SMA breakdown, and it overrides BUY/WATCH.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdPolicy;

impl DecisionPolicy for ThresholdPolicy {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn decide(&self, inputs: &SignalInputs, thresholds: &SignalThresholds) -> Decision {
        let mut decision = Decision::new(Recommendation::Hold, "neutral");

        let dip = le(inputs.pullback_pct, -thresholds.buy_drop_pct)
            && le(inputs.rsi, thresholds.buy_rsi_ceiling);
        if dip {
            decision = if ge(inputs.adx, thresholds.min_adx) {
                Decision::new(Recommendation::Buy, "oversold dip with trend confirmation")
            } else {
                Decision::new(Recommendation::Watch, "oversold dip, trend too weak")
            };
        }

        let take_profit = inputs
            .recent_high
            .is_some_and(|high| inputs.price >= high * (1.0 + thresholds.sell_gain_pct / 100.0));
        let breakdown = inputs.sma.is_some_and(|sma| inputs.price < sma)
            && lt(inputs.distance_from_sma_pct, -thresholds.breakdown_buffer_pct);

        if take_profit {
            decision = Decision::new(Recommendation::Sell, "gain target reached");
        } else if ge(inputs.rsi, thresholds.sell_rsi_floor) {
            decision = Decision::new(Recommendation::Sell, "overbought");
        } else if breakdown {
            decision = Decision::new(Recommendation::Sell, "breakdown below SMA");
        }

        decision
    }
}

/// Resolve the configured policy
pub fn policy_for(policy: SignalPolicy) -> Box<dyn DecisionPolicy> {
    match policy {
        SignalPolicy::Confluence => Box::new(ConfluencePolicy),
        SignalPolicy::Threshold => Box::new(ThresholdPolicy),
    }
}

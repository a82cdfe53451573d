//! Signal engine: indicator set in, scored recommendation out.

use crate::config::{SignalPolicy, SignalThresholds};
use crate::models::indicators::IndicatorSet;
use crate::models::signal::SignalRecord;
use crate::signals::classification::{pullback_severity, trend_status};
use crate::signals::decision::{policy_for, DecisionPolicy, SignalInputs};
use crate::signals::scoring::confluence_score;

pub struct SignalEngine {
    policy: Box<dyn DecisionPolicy>,
    policy_kind: SignalPolicy,
    thresholds: SignalThresholds,
}

impl SignalEngine {
    pub fn new(policy: SignalPolicy, thresholds: SignalThresholds) -> Self {
        Self {
            policy: policy_for(policy),
            policy_kind: policy,
            thresholds,
        }
    }

    pub fn policy(&self) -> SignalPolicy {
        self.policy_kind
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    pub fn set_policy(&mut self, policy: SignalPolicy) {
        self.policy = policy_for(policy);
        self.policy_kind = policy;
    }

    pub fn set_thresholds(&mut self, thresholds: SignalThresholds) {
        self.thresholds = thresholds;
    }

    /// Produce exactly one record for one indicator set
    pub fn evaluate(&self, indicators: IndicatorSet) -> SignalRecord {
        let inputs = SignalInputs::from(&indicators);
        let decision = self.policy.decide(&inputs, &self.thresholds);
        let score = confluence_score(inputs.rsi, inputs.adx, inputs.distance_from_sma_pct);

        SignalRecord {
            symbol: indicators.symbol.clone(),
            price: indicators.price,
            score,
            recommendation: decision.recommendation,
            reason: decision.reason,
            trend_status: trend_status(inputs.adx),
            severity: pullback_severity(inputs.pullback_pct, self.thresholds.buy_drop_pct),
            indicators,
        }
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(SignalPolicy::default(), SignalThresholds::default())
    }
}

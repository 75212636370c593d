//! Monetization strategy generation.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The only strategy family produced today.
pub const DYNAMIC_PRICING: &str = "dynamic_pricing";

/// Price multiplier applied by generated strategies.
pub const ADJUSTMENT_FACTOR: f64 = 1.2;

/// Revenue threshold used when the market data does not provide one.
pub const DEFAULT_REVENUE_THRESHOLD: f64 = 1000.0;

/// Market inputs the generator looks at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketConditions {
    pub revenue_threshold: Option<f64>,
}

impl MarketConditions {
    /// Reads the conditions out of a collected payload, ignoring anything unusable.
    pub fn from_payload(data: &Value) -> Self {
        let revenue_threshold = data.get("revenue_threshold").and_then(Value::as_f64);
        Self { revenue_threshold }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParameters {
    pub adjustment_factor: f64,
    pub threshold: f64,
}

impl StrategyParameters {
    fn values(&self) -> [f64; 2] {
        [self.adjustment_factor, self.threshold]
    }
}

/// A generated pricing strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(rename = "type")]
    pub strategy_type: String,
    pub parameters: StrategyParameters,
    /// Price ratios relative to the current baseline, keyed by product or tier.
    #[serde(default)]
    pub pricing: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct StrategyGenerator;

impl StrategyGenerator {
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(skip(self))]
    pub fn generate_strategy(&self, conditions: &MarketConditions) -> Strategy {
        let threshold = conditions
            .revenue_threshold
            .unwrap_or(DEFAULT_REVENUE_THRESHOLD);

        debug!(
            "Generating {} strategy with threshold {}",
            DYNAMIC_PRICING, threshold
        );

        let mut pricing = BTreeMap::new();
        pricing.insert("adjustment_factor".to_string(), ADJUSTMENT_FACTOR);

        Strategy {
            strategy_type: DYNAMIC_PRICING.to_string(),
            parameters: StrategyParameters {
                adjustment_factor: ADJUSTMENT_FACTOR,
                threshold,
            },
            pricing,
        }
    }

    /// Checks the strategy is a known kind with no negative parameters.
    pub fn validate_strategy(&self, strategy: &Strategy) -> bool {
        if !strategy.strategy_type.contains(DYNAMIC_PRICING) {
            warn!("Unsupported strategy type: {}", strategy.strategy_type);
            return false;
        }
        if strategy.parameters.values().iter().any(|v| *v < 0.0) {
            warn!("Strategy has negative parameters: {:?}", strategy.parameters);
            return false;
        }
        true
    }
}

//! Trend analysis over collected market data and ethical checks on strategies.

use chrono::{DateTime, Utc};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::strategy::Strategy;

/// Highest price ratio a strategy may apply before it is considered unfair.
pub const MAX_PRICING_RATIO: f64 = 1.5;

/// Direction of the market between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub trend: Trend,
    pub timestamp: DateTime<Utc>,
}

/// The two readings the trend is computed from. Missing values count as zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketSnapshot {
    pub current_value: f64,
    pub previous_value: f64,
}

#[derive(Debug)]
pub enum AnalysisError {
    /// The payload is not a JSON object
    NotAnObject,
    /// A known field has the wrong type
    InvalidField(serde_json::Error),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::NotAnObject => write!(f, "Market data must be a JSON object"),
            AnalysisError::InvalidField(e) => write!(f, "Invalid market data: {}", e),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::InvalidField(e) => Some(e),
            AnalysisError::NotAnObject => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Compares the current reading with the previous one. A flat market is reported as down.
    pub fn analyze_market_trends(&self, data: &Value) -> Result<TrendReport, AnalysisError> {
        if !data.is_object() {
            return Err(AnalysisError::NotAnObject);
        }
        let snapshot = MarketSnapshot::deserialize(data).map_err(AnalysisError::InvalidField)?;

        let trend = if snapshot.current_value > snapshot.previous_value {
            Trend::Up
        } else {
            Trend::Down
        };

        Ok(TrendReport {
            trend,
            timestamp: Utc::now(),
        })
    }

    /// Rejects strategies without pricing or with any ratio above [`MAX_PRICING_RATIO`].
    pub fn validate_ethical_constraints(&self, strategy: &Strategy) -> bool {
        if strategy.pricing.is_empty() {
            return false;
        }
        if strategy
            .pricing
            .values()
            .any(|ratio| *ratio > MAX_PRICING_RATIO)
        {
            warn!("Pricing ratios exceed recommended thresholds");
            return false;
        }
        true
    }

    /// Runs the trend analysis, logging and swallowing failures.
    #[tracing::instrument(skip(self, data))]
    pub fn analyze_and_validate(&self, data: &Value) -> Option<TrendReport> {
        match self.analyze_market_trends(data) {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Analysis failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{MarketConditions, StrategyGenerator};
    use serde_json::json;

    #[test]
    fn test_rising_market_is_up() {
        let analyzer = TrendAnalyzer::new();
        let report = analyzer
            .analyze_market_trends(&json!({"current_value": 150, "previous_value": 140}))
            .unwrap();
        assert_eq!(report.trend, Trend::Up);
    }

    #[test]
    fn test_falling_or_flat_market_is_down() {
        let analyzer = TrendAnalyzer::new();
        let falling = analyzer
            .analyze_market_trends(&json!({"current_value": 100.5, "previous_value": 140}))
            .unwrap();
        assert_eq!(falling.trend, Trend::Down);

        let flat = analyzer
            .analyze_market_trends(&json!({"current_value": 7, "previous_value": 7}))
            .unwrap();
        assert_eq!(flat.trend, Trend::Down);
    }

    #[test]
    fn test_missing_values_default_to_zero() {
        let analyzer = TrendAnalyzer::new();
        let report = analyzer
            .analyze_market_trends(&json!({"current_value": 1}))
            .unwrap();
        assert_eq!(report.trend, Trend::Up);

        let report = analyzer.analyze_market_trends(&json!({})).unwrap();
        assert_eq!(report.trend, Trend::Down);
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        let analyzer = TrendAnalyzer::new();
        let result = analyzer.analyze_market_trends(&json!([1, 2, 3]));
        assert!(matches!(result, Err(AnalysisError::NotAnObject)));
    }

    #[test]
    fn test_wrongly_typed_field_is_rejected() {
        let analyzer = TrendAnalyzer::new();
        let result = analyzer.analyze_market_trends(&json!({"current_value": "high"}));
        assert!(matches!(result, Err(AnalysisError::InvalidField(_))));
    }

    #[test_log::test]
    fn test_analyze_and_validate_swallows_errors() {
        let analyzer = TrendAnalyzer::new();
        assert!(analyzer.analyze_and_validate(&json!("text")).is_none());
        assert!(
            analyzer
                .analyze_and_validate(&json!({"current_value": 2, "previous_value": 1}))
                .is_some()
        );
    }

    #[test]
    fn test_trend_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Trend::Up).unwrap(), json!("up"));
        assert_eq!(Trend::Down.to_string(), "down");
    }

    #[test]
    fn test_generated_strategy_passes_ethics() {
        let strategy = StrategyGenerator::new().generate_strategy(&MarketConditions::default());
        assert!(TrendAnalyzer::new().validate_ethical_constraints(&strategy));
    }

    #[test]
    fn test_ethics_rejects_missing_pricing() {
        let mut strategy = StrategyGenerator::new().generate_strategy(&MarketConditions::default());
        strategy.pricing.clear();
        assert!(!TrendAnalyzer::new().validate_ethical_constraints(&strategy));
    }

    #[test]
    fn test_ethics_rejects_excessive_ratio() {
        let mut strategy = StrategyGenerator::new().generate_strategy(&MarketConditions::default());
        strategy.pricing.insert("premium".to_string(), 1.6);
        assert!(!TrendAnalyzer::new().validate_ethical_constraints(&strategy));

        strategy.pricing.insert("premium".to_string(), 1.5);
        assert!(TrendAnalyzer::new().validate_ethical_constraints(&strategy));
    }
}

//! Collect, analyze and price in one pass.

use log::info;
use serde::Serialize;

use crate::analyzer::{TrendAnalyzer, TrendReport};
use crate::collector::{DataCollector, FetchError, ProcessedData};
use crate::strategy::{MarketConditions, Strategy, StrategyGenerator};

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub data: ProcessedData,
    /// `None` when the payload could not be analyzed
    pub trend: Option<TrendReport>,
    pub strategy: Strategy,
    pub strategy_valid: bool,
    pub ethically_valid: bool,
}

pub struct Pipeline {
    collector: DataCollector,
    analyzer: TrendAnalyzer,
    generator: StrategyGenerator,
}

impl Pipeline {
    pub fn new(collector: DataCollector) -> Self {
        Self {
            collector,
            analyzer: TrendAnalyzer::new(),
            generator: StrategyGenerator::new(),
        }
    }

    pub fn collector(&self) -> &DataCollector {
        &self.collector
    }

    /// Only collection failures abort the run; analysis and validation
    /// outcomes are recorded in the report.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<PipelineReport, FetchError> {
        let data = self.collector.collect_and_process().await?;

        let trend = self.analyzer.analyze_and_validate(&data.raw_data);
        let conditions = MarketConditions::from_payload(&data.raw_data);
        let strategy = self.generator.generate_strategy(&conditions);
        let strategy_valid = self.generator.validate_strategy(&strategy);
        let ethically_valid = self.analyzer.validate_ethical_constraints(&strategy);

        info!(
            "Pipeline finished: trend={}, strategy_valid={}, ethically_valid={}",
            trend
                .as_ref()
                .map(|t| t.trend.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            strategy_valid,
            ethically_valid
        );

        Ok(PipelineReport {
            data,
            trend,
            strategy,
            strategy_valid,
            ethically_valid,
        })
    }
}

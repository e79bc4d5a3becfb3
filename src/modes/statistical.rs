use crate::mode::{
    DataSource, MetricWeights, ModeCategory, ModeConfidence, SimulationMode, VarianceConfig,
};

/// The reference mode: default weights, default variance, no adjustment.
///
/// Every other mode is best understood as a delta against this one.
pub struct StatisticalMode;

impl SimulationMode for StatisticalMode {
    fn id(&self) -> &str {
        "statistical"
    }

    fn display_name(&self) -> &str {
        "Statistical"
    }

    fn description(&self) -> &str {
        "Efficiency-driven forecast using the full weighted metric model"
    }

    fn category(&self) -> ModeCategory {
        ModeCategory::Research
    }

    fn confidence(&self) -> ModeConfidence {
        ModeConfidence::StatisticallyValidated
    }

    fn weights(&self) -> MetricWeights {
        MetricWeights::defaults()
    }

    fn variance_config(&self) -> VarianceConfig {
        VarianceConfig::default()
    }

    fn data_sources(&self) -> Vec<DataSource> {
        vec![DataSource::HistoricalResults]
    }
}

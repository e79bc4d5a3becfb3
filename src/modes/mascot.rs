use crate::mode::{
    DataSource, MetricWeights, ModeCategory, ModeConfidence, SimContext, SimulationMode,
    VarianceConfig,
};
use crate::team::Team;

/// Who would win the fight? The metric model still anchors the forecast,
/// but mascot ferocity shifts it.
pub struct MascotMode;

const FEROCITY_SHIFT: f64 = 0.15;
const MYTHICAL_BONUS: f64 = 0.1;

fn fight_score(team: &Team) -> f64 {
    match &team.mascot {
        Some(mascot) => {
            let base = mascot.ferocity.clamp(0.0, 1.0);
            if mascot.mythical {
                base + MYTHICAL_BONUS
            } else {
                base
            }
        }
        // No mascot data: an unremarkable creature.
        None => 0.5,
    }
}

impl SimulationMode for MascotMode {
    fn id(&self) -> &str {
        "mascot-madness"
    }

    fn display_name(&self) -> &str {
        "Mascot Madness"
    }

    fn description(&self) -> &str {
        "Statistical forecast tilted by which mascot wins the fight"
    }

    fn category(&self) -> ModeCategory {
        ModeCategory::Entertainment
    }

    fn confidence(&self) -> ModeConfidence {
        ModeConfidence::Whimsical
    }

    fn weights(&self) -> MetricWeights {
        MetricWeights::defaults()
    }

    fn variance_config(&self) -> VarianceConfig {
        VarianceConfig {
            base_variance: 0.15,
            upset_multiplier: 1.2,
            ..VarianceConfig::default()
        }
    }

    fn adjust_probability(&self, base: f64, team1: &Team, team2: &Team, _ctx: &SimContext) -> f64 {
        let shift = (fight_score(team1) - fight_score(team2)) * FEROCITY_SHIFT;
        (base + shift).clamp(0.0, 1.0)
    }

    fn data_sources(&self) -> Vec<DataSource> {
        vec![DataSource::MascotData]
    }
}

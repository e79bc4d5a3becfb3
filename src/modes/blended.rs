use crate::bracket::Round;
use crate::error::{Result, SimError};
use crate::mode::{
    DataSource, MetricWeights, ModeCategory, ModeConfidence, ModeSimState, SimContext,
    SimulationMode, VarianceConfig,
};
use crate::team::Team;

/// Composite mode blending two or more components with fixed weights.
///
/// Weights are normalized at construction. Metric weights and variance
/// scalars are weight-averaged; round multipliers are not blended. The
/// probability adjuster is the exact weighted average of the component
/// adjusters.
pub struct BlendedMode {
    id: String,
    display_name: String,
    description: String,
    components: Vec<(Box<dyn SimulationMode>, f64)>,
}

impl std::fmt::Debug for BlendedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlendedMode")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("description", &self.description)
            .field("components", &self.components)
            .finish()
    }
}

struct BlendSimState(Vec<Option<ModeSimState>>);

impl BlendedMode {
    pub fn new(components: Vec<(Box<dyn SimulationMode>, f64)>) -> Result<Self> {
        if components.len() < 2 {
            return Err(SimError::InvalidMode(
                "a blend needs at least two component modes".to_string(),
            ));
        }
        if let Some((mode, w)) = components.iter().find(|(_, w)| *w < 0.0) {
            return Err(SimError::InvalidMode(format!(
                "component '{}' has negative weight {w}",
                mode.id()
            )));
        }
        let total: f64 = components.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(SimError::InvalidMode(
                "component weights sum to zero".to_string(),
            ));
        }

        let components: Vec<(Box<dyn SimulationMode>, f64)> = components
            .into_iter()
            .map(|(mode, w)| (mode, w / total))
            .collect();

        let ids: Vec<&str> = components.iter().map(|(m, _)| m.id()).collect();
        let names: Vec<&str> = components.iter().map(|(m, _)| m.display_name()).collect();
        Ok(BlendedMode {
            id: format!("blended:{}", ids.join("+")),
            display_name: names.join(" + "),
            description: format!("Weighted blend of {}", names.join(", ")),
            components,
        })
    }

    pub fn components(&self) -> impl Iterator<Item = (&dyn SimulationMode, f64)> {
        self.components.iter().map(|(m, w)| (m.as_ref(), *w))
    }
}

impl SimulationMode for BlendedMode {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> ModeCategory {
        let any_whimsical = self
            .components
            .iter()
            .any(|(m, _)| m.confidence() == ModeConfidence::Whimsical);
        if any_whimsical {
            return ModeCategory::Entertainment;
        }
        let all_research = self
            .components
            .iter()
            .all(|(m, _)| m.category() == ModeCategory::Research);
        if all_research {
            ModeCategory::Research
        } else {
            ModeCategory::Hybrid
        }
    }

    fn confidence(&self) -> ModeConfidence {
        let all_validated = self
            .components
            .iter()
            .all(|(m, _)| m.confidence() == ModeConfidence::StatisticallyValidated);
        if all_validated {
            ModeConfidence::StatisticallyValidated
        } else {
            ModeConfidence::Experimental
        }
    }

    fn weights(&self) -> MetricWeights {
        let mut blended = MetricWeights::new();
        for (mode, share) in &self.components {
            for (key, value) in mode.weights().iter() {
                blended.set(key, blended.get(key) + share * value);
            }
        }
        blended
    }

    fn variance_config(&self) -> VarianceConfig {
        let mut config = VarianceConfig {
            base_variance: 0.0,
            upset_multiplier: 0.0,
            live_state_weight: 0.0,
            seed_gap_sensitivity: 0.0,
            round_variance_multipliers: Default::default(),
        };
        for (mode, share) in &self.components {
            let c = mode.variance_config();
            config.base_variance += share * c.base_variance;
            config.upset_multiplier += share * c.upset_multiplier;
            config.live_state_weight += share * c.live_state_weight;
            config.seed_gap_sensitivity += share * c.seed_gap_sensitivity;
        }
        config
    }

    fn adjust_probability(&self, base: f64, team1: &Team, team2: &Team, ctx: &SimContext) -> f64 {
        self.components
            .iter()
            .map(|(mode, share)| share * mode.adjust_probability(base, team1, team2, ctx))
            .sum()
    }

    fn data_sources(&self) -> Vec<DataSource> {
        let mut sources = Vec::new();
        for (mode, _) in &self.components {
            for source in mode.data_sources() {
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
        }
        sources
    }

    fn initialize_sim_state(&self) -> Option<ModeSimState> {
        let states: Vec<Option<ModeSimState>> = self
            .components
            .iter()
            .map(|(mode, _)| mode.initialize_sim_state())
            .collect();
        if states.iter().all(Option::is_none) {
            None
        } else {
            Some(Box::new(BlendSimState(states)))
        }
    }

    fn on_game_complete(
        &self,
        winner: &Team,
        loser: &Team,
        round: Round,
        state: &mut ModeSimState,
    ) {
        if let Some(blend) = state.downcast_mut::<BlendSimState>() {
            for ((mode, _), child) in self.components.iter().zip(blend.0.iter_mut()) {
                if let Some(child_state) = child {
                    mode.on_game_complete(winner, loser, round, child_state);
                }
            }
        }
    }
}

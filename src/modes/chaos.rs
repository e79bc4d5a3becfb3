use crate::bracket::Round;
use crate::mode::{
    MetricWeights, ModeCategory, ModeConfidence, ModeSimState, SimContext, SimulationMode,
    VarianceConfig,
};
use crate::team::Team;

/// Upset-friendly mode: heavier outcome noise, late rounds get wilder, and
/// the favorite's edge is compressed before sampling.
pub struct ChaosMode;

/// Per-run record of the havoc this mode produced. One ledger per Monte
/// Carlo run; discarded when the run ends.
#[derive(Debug, Default)]
pub struct UpsetLedger {
    pub upsets: u32,
    pub biggest_seed_gap: u8,
}

impl SimulationMode for ChaosMode {
    fn id(&self) -> &str {
        "chaos"
    }

    fn display_name(&self) -> &str {
        "Chaos"
    }

    fn description(&self) -> &str {
        "Madness-maximizing forecast with inflated variance and live underdogs"
    }

    fn category(&self) -> ModeCategory {
        ModeCategory::Entertainment
    }

    fn confidence(&self) -> ModeConfidence {
        ModeConfidence::Experimental
    }

    fn weights(&self) -> MetricWeights {
        MetricWeights::defaults()
            .with("momentumScore", 0.5)
            .with("threePointRate", 0.3)
    }

    fn variance_config(&self) -> VarianceConfig {
        let mut config = VarianceConfig {
            base_variance: 0.22,
            upset_multiplier: 1.6,
            seed_gap_sensitivity: 0.4,
            ..VarianceConfig::default()
        };
        config
            .round_variance_multipliers
            .extend([
                (Round::SweetSixteen, 1.2),
                (Round::EliteEight, 1.3),
                (Round::FinalFour, 1.4),
                (Round::Championship, 1.5),
            ]);
        config
    }

    fn adjust_probability(
        &self,
        base: f64,
        _team1: &Team,
        _team2: &Team,
        _ctx: &SimContext,
    ) -> f64 {
        // Shave the favorite's edge before the sampler even sees it.
        0.5 + (base - 0.5) * 0.85
    }

    fn initialize_sim_state(&self) -> Option<ModeSimState> {
        Some(Box::new(UpsetLedger::default()))
    }

    fn on_game_complete(
        &self,
        winner: &Team,
        loser: &Team,
        _round: Round,
        state: &mut ModeSimState,
    ) {
        if winner.seed > loser.seed {
            if let Some(ledger) = state.downcast_mut::<UpsetLedger>() {
                ledger.upsets += 1;
                ledger.biggest_seed_gap = ledger.biggest_seed_gap.max(winner.seed - loser.seed);
            }
        }
    }
}

//! Built-in simulation modes.

mod blended;
mod chaos;
mod mascot;
mod statistical;

pub use blended::BlendedMode;
pub use chaos::{ChaosMode, UpsetLedger};
pub use mascot::MascotMode;
pub use statistical::StatisticalMode;

use crate::error::{Result, SimError};
use crate::mode::{register_mode, ModeFactory, SimulationMode};

const BUILTIN: [ModeFactory; 3] = [
    || Box::new(StatisticalMode) as Box<dyn SimulationMode>,
    || Box::new(ChaosMode) as Box<dyn SimulationMode>,
    || Box::new(MascotMode) as Box<dyn SimulationMode>,
];

/// Register every built-in mode. Call exactly once at startup, before the
/// first simulation is dispatched.
pub fn register_builtin_modes() -> Result<()> {
    for factory in BUILTIN {
        register_mode(factory)?;
    }
    Ok(())
}

/// Like [`register_builtin_modes`] but tolerant of modes that are already
/// present, for embedders (and tests) that cannot guarantee a single
/// initialization point.
pub fn ensure_builtin_modes() {
    for factory in BUILTIN {
        match register_mode(factory) {
            Ok(()) | Err(SimError::DuplicateModeRegistration(_)) => {}
            Err(err) => unreachable!("unexpected registration failure: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::create_mode;

    #[test]
    fn test_builtins_register_and_resolve() {
        ensure_builtin_modes();
        ensure_builtin_modes(); // second call is a no-op
        for id in ["statistical", "chaos", "mascot-madness"] {
            let mode = create_mode(id).unwrap();
            assert_eq!(mode.id(), id);
        }
    }

    #[test]
    fn test_mode_contract_universal() {
        ensure_builtin_modes();
        for id in ["statistical", "chaos", "mascot-madness"] {
            let mode = create_mode(id).unwrap();
            for (key, w) in mode.weights().iter() {
                assert!(w >= 0.0, "{id}: negative weight for {key}");
            }
            let config = mode.variance_config();
            assert!(config.base_variance > 0.0, "{id}: non-positive variance");
            assert!(config.upset_multiplier >= 0.0);
            assert!(config.live_state_weight >= 0.0);
            assert!(config.seed_gap_sensitivity >= 0.0);
            for (_, m) in &config.round_variance_multipliers {
                assert!(*m > 0.0);
            }
        }
    }

    #[test]
    fn test_adjusters_deterministic_and_bounded() {
        use crate::bracket::Round;
        use crate::mode::SimContext;
        use crate::team::{Region, Team};

        ensure_builtin_modes();
        let mut t1 = Team::new("a", "a", 3, Region::South);
        t1.metrics.adj_offensive_efficiency = 112.0;
        let t2 = Team::new("b", "b", 6, Region::South);
        let ctx = SimContext {
            round: Round::SweetSixteen,
            region: Some(Region::South),
            tournament_type: t1.tournament_type,
            games_played_by_team1: 2,
            games_played_by_team2: 2,
        };
        for id in ["statistical", "chaos", "mascot-madness"] {
            let mode = create_mode(id).unwrap();
            for base in [0.0, 0.1, 0.5, 0.93, 1.0] {
                let first = mode.adjust_probability(base, &t1, &t2, &ctx);
                let second = mode.adjust_probability(base, &t1, &t2, &ctx);
                assert_eq!(first, second, "{id}: adjust not deterministic");
                assert!((0.0..=1.0).contains(&first), "{id}: out of bounds");
            }
        }
    }
}

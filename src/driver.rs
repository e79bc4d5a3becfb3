use std::collections::HashMap;
use std::ops::Range;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::aggregate::{aggregate, TournamentSimulationResult};
use crate::bracket::Bracket;
use crate::constants::SIM_TARGET_MS_PER_1000_RUNS;
use crate::error::Result;
use crate::live::{LiveGameState, LiveStateBlender};
use crate::mode::{create_mode, SimulationMode};
use crate::overrides::OverridesMap;
use crate::team::Team;
use crate::tournament::{simulate_batch, CountMatrix};

/// Hardware concurrency minus one for the caller's thread, never below 1.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub simulation_count: u64,
    pub base_seed: u64,
    pub workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            simulation_count: 1000,
            base_seed: 0,
            workers: default_worker_count(),
        }
    }
}

/// Split `n` runs into up to `workers` contiguous chunks of global indices.
fn split_runs(n: u64, workers: u64) -> Vec<Range<u64>> {
    if n == 0 {
        return Vec::new();
    }
    let workers = workers.max(1).min(n);
    let chunk = n.div_ceil(workers);
    (0..workers)
        .map(|w| {
            let start = w * chunk;
            start..((start + chunk).min(n))
        })
        .filter(|r| !r.is_empty())
        .collect()
}

/// Simulate the tournament N times under the named mode and aggregate.
///
/// Runs split across a pinned-size worker pool; run `i` is always seeded
/// `base_seed + i` from its global index, so the counts depend only on
/// (bracket, teams, mode, N, base_seed) and never on the worker count.
///
/// A live snapshot, when provided, is blended over the bracket once, before
/// any worker starts; the blended view is immutable during simulation.
pub fn run_tournament_simulation(
    bracket: &Bracket,
    teams: &HashMap<String, Team>,
    mode_id: &str,
    config: &SimulationConfig,
    overrides: Option<&OverridesMap>,
    live_snapshot: Option<&HashMap<String, LiveGameState>>,
) -> Result<TournamentSimulationResult> {
    let started = Instant::now();
    // Resolve the mode up front so an unknown id fails before any work.
    let mode = create_mode(mode_id)?;
    let workers = config.workers.max(1);

    let blended;
    let sim_bracket: &Bracket = match live_snapshot {
        Some(snapshot) => {
            let blender = LiveStateBlender::new(bracket.clone());
            let result = blender.blend(snapshot);
            debug!(
                active = result.active_slot_ids.len(),
                completed = result.completed_slot_ids.len(),
                "blended live snapshot into bracket"
            );
            blended = result.bracket;
            &blended
        }
        None => bracket,
    };

    // One fresh mode instance per chunk; instances never cross workers.
    let jobs: Result<Vec<(Range<u64>, Box<dyn SimulationMode>)>> =
        split_runs(config.simulation_count, workers as u64)
            .into_iter()
            .map(|range| Ok((range, create_mode(mode_id)?)))
            .collect();
    let jobs = jobs?;

    let base_seed = config.base_seed;
    let run_all = || {
        jobs.into_par_iter()
            .map(|(range, mode)| {
                simulate_batch(sim_bracket, teams, mode.as_ref(), overrides, range, base_seed)
            })
            .reduce(CountMatrix::new, |mut merged, partial| {
                merged.merge(partial);
                merged
            })
    };
    let counts = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run_all),
        Err(err) => {
            warn!("could not build a pinned worker pool ({err}); using the global pool");
            run_all()
        }
    };

    let elapsed = started.elapsed();
    let target_ms =
        SIM_TARGET_MS_PER_1000_RUNS * config.simulation_count.div_ceil(1000).max(1);
    if elapsed.as_millis() as u64 > target_ms {
        warn!(
            runs = config.simulation_count,
            elapsed_ms = elapsed.as_millis() as u64,
            target_ms,
            "simulation batch exceeded its wall-clock target"
        );
    } else {
        debug!(
            runs = config.simulation_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "simulation batch complete"
        );
    }

    let tournament_type = teams
        .values()
        .next()
        .map(|t| t.tournament_type)
        .unwrap_or_default();
    Ok(aggregate(
        &counts,
        teams,
        mode.id(),
        mode.display_name(),
        tournament_type,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::Round;
    use crate::error::SimError;
    use crate::live::GameStatus;
    use crate::modes::ensure_builtin_modes;
    use crate::team::synthetic_field;

    fn setup() -> (Bracket, HashMap<String, Team>) {
        ensure_builtin_modes();
        let teams = synthetic_field();
        let bracket = Bracket::from_teams(&teams).unwrap();
        (bracket, teams)
    }

    #[test]
    fn test_split_runs_covers_everything() {
        assert_eq!(split_runs(10, 3), vec![0..4, 4..8, 8..10]);
        assert_eq!(split_runs(2, 8), vec![0..1, 1..2]);
        assert!(split_runs(0, 4).is_empty());
    }

    #[test]
    fn test_unknown_mode_is_client_error() {
        let (bracket, teams) = setup();
        let err = run_tournament_simulation(
            &bracket,
            &teams,
            "tarot-cards",
            &SimulationConfig::default(),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::UnknownMode { .. }));
    }

    #[test]
    fn test_total_runs_and_probability_mass() {
        let (bracket, teams) = setup();
        let config = SimulationConfig {
            simulation_count: 400,
            base_seed: 9,
            workers: 3,
        };
        let result =
            run_tournament_simulation(&bracket, &teams, "statistical", &config, None, None)
                .unwrap();
        assert_eq!(result.simulation_count, 400);
        let mass: f64 = result
            .teams
            .values()
            .map(|t| t.championship_probability)
            .sum();
        assert!((mass - 1.0).abs() < 1e-9, "championship mass {mass}");
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let (bracket, teams) = setup();
        let mut outcomes = Vec::new();
        for workers in [1, 2, 5] {
            let config = SimulationConfig {
                simulation_count: 250,
                base_seed: 12345,
                workers,
            };
            let result =
                run_tournament_simulation(&bracket, &teams, "statistical", &config, None, None)
                    .unwrap();
            let champs: Vec<(String, f64)> = result
                .teams
                .iter()
                .map(|(id, t)| (id.clone(), t.championship_probability))
                .collect();
            outcomes.push(champs);
        }
        assert_eq!(outcomes[0], outcomes[1]);
        assert_eq!(outcomes[1], outcomes[2]);
    }

    #[test]
    fn test_live_final_locks_simulated_outcome() {
        let (bracket, teams) = setup();
        let mut game = LiveGameState::new("upset", "south-16", "south-1", Round::RoundOf64);
        game.home_score = 81;
        game.away_score = 77;
        game.period = 2;
        game.time_remaining_secs = 0.0;
        game.status = GameStatus::Final;
        let mut snapshot = HashMap::new();
        snapshot.insert(game.game_id.clone(), game);

        let config = SimulationConfig {
            simulation_count: 120,
            base_seed: 4,
            workers: 2,
        };
        let result = run_tournament_simulation(
            &bracket,
            &teams,
            "statistical",
            &config,
            None,
            Some(&snapshot),
        )
        .unwrap();
        let upset_winner = &result.teams["south-16"];
        assert_eq!(upset_winner.round_probabilities[&Round::RoundOf32], 1.0);
        assert_eq!(
            result.teams["south-1"].round_probabilities[&Round::RoundOf32],
            0.0
        );
    }
}

//! bracket_core - Probabilistic tournament forecaster core.
//!
//! A deterministic, parallel Monte Carlo engine for a 68-team
//! single-elimination basketball bracket. The engine is a pure function of
//! (bracket, teams, mode, simulation count, seed, optional live snapshot):
//!
//! - a weighted logistic probability model over normalized metric
//!   differentials, with seed-gap and live-state blending ([`win_prob`]);
//! - pluggable simulation modes with a process-wide registry and a weighted
//!   blender ([`mode`], [`modes`]);
//! - a round-ordered bracket propagator with per-run state isolation
//!   ([`bracket`], [`tournament`]);
//! - count aggregation into advancement probabilities, rankings, and upset
//!   surprise ([`aggregate`]);
//! - a worker-pool driver whose results are independent of the worker count
//!   ([`driver`]).
//!
//! Everything external - HTTP fan-out, persistence, scoreboard polling,
//! CLI - consumes this crate and lives elsewhere.

pub mod aggregate;
pub mod bracket;
pub mod constants;
pub mod driver;
pub mod error;
pub mod live;
pub mod metrics;
pub mod mode;
pub mod modes;
pub mod overrides;
pub mod rng;
pub mod score;
pub mod team;
pub mod tournament;
pub mod win_prob;

pub use aggregate::{aggregate, ProjectedUpset, TeamSimResult, TournamentSimulationResult};
pub use bracket::{Bracket, BracketSlot, Round, ROUND_COUNT};
pub use driver::{default_worker_count, run_tournament_simulation, SimulationConfig};
pub use error::{Result, SimError};
pub use live::{BlendResult, GameStatus, LiveGameState, LiveStateBlender, ScoringRun, ShootingLine};
pub use metrics::{momentum_score, Metric};
pub use mode::{
    available_modes, create_mode, register_mode, DataSource, MetricWeights, ModeCategory,
    ModeConfidence, ModeFactory, ModeSimState, SimContext, SimulationMode, VarianceConfig,
};
pub use modes::{
    ensure_builtin_modes, register_builtin_modes, BlendedMode, ChaosMode, MascotMode,
    StatisticalMode,
};
pub use overrides::OverridesMap;
pub use rng::SimRng;
pub use score::{estimate_possessions, expected_scores, simulate_game_score};
pub use team::{
    validate_roster, CoachingProfile, MascotProfile, Region, Team, TeamMetrics, TournamentType,
};
pub use tournament::{simulate_batch, simulate_tournament, CountMatrix};
pub use win_prob::{
    apply_seed_gap, base_win_probability, blend_live_state, live_win_probability,
    matchup_win_probability, sample_outcome,
};

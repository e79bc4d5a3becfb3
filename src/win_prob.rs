use statrs::distribution::{ContinuousCDF, Normal};

use crate::bracket::Round;
use crate::constants::{
    LIVE_DECAY_GAMMA, LIVE_POSSESSION_STDDEV, LOGIT_SCALE, NOISE_LOGIT_SCALE, PROB_CEIL,
    PROB_FLOOR, REGULATION_SECS, SEED_GAP_BLEND, SEED_GAP_SCALE,
};
use crate::live::{GameStatus, LiveGameState};
use crate::metrics::Metric;
use crate::mode::{MetricWeights, SimContext, SimulationMode, VarianceConfig};
use crate::overrides::OverridesMap;
use crate::rng::SimRng;
use crate::team::Team;

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn std_normal_cdf(x: f64) -> f64 {
    let normal = Normal::new(0.0, 1.0).unwrap();
    normal.cdf(x)
}

/// Pre-game probability of `team1` beating `team2` under the given weights.
///
/// A weighted logistic over normalized metric differentials. Identical teams
/// land on 0.5 and `p(a, b) + p(b, a) = 1` because the logit negates exactly
/// when the teams swap.
pub fn base_win_probability(team1: &Team, team2: &Team, weights: &MetricWeights) -> f64 {
    let mut logit = 0.0;
    for metric in Metric::ALL {
        let weight = weights.get(metric.key());
        if weight == 0.0 {
            continue;
        }
        let mut diff = (metric.extract(&team1.metrics) - metric.extract(&team2.metrics))
            / metric.sigma();
        if metric.lower_is_better() {
            diff = -diff;
        }
        logit += weight * diff;
    }
    sigmoid(logit * LOGIT_SCALE)
}

/// Blend the model probability toward the seed-implied one.
///
/// Sensitivity 0 or equal seeds return `p` unchanged; sensitivity 1 gives
/// the seed-implied probability its full 15% share.
pub fn apply_seed_gap(p: f64, seed1: u8, seed2: u8, sensitivity: f64) -> f64 {
    if sensitivity == 0.0 || seed1 == seed2 {
        return p;
    }
    let seed_implied = sigmoid((seed2 as f64 - seed1 as f64) * SEED_GAP_SCALE);
    let share = SEED_GAP_BLEND * sensitivity;
    p * (1.0 - share) + seed_implied * share
}

/// Win probability implied purely by the current score and clock: the score
/// margin against the spread of the remaining possessions.
pub fn live_win_probability(game: &LiveGameState, team_id: &str) -> f64 {
    let margin = game.margin_for(team_id) as f64;
    let remaining_possessions = ((game.remaining_game_secs() / REGULATION_SECS) * 70.0).max(1.0);
    std_normal_cdf(margin / (remaining_possessions.sqrt() * LIVE_POSSESSION_STDDEV))
}

/// Blend a pre-game probability with the in-progress game state.
///
/// The live estimate takes over as the game clock runs down:
/// `alpha = (elapsed/total)^gamma`, scaled by the mode's live-state weight.
/// Finals are decided by the scoreboard; pre-game snapshots change nothing.
pub fn blend_live_state(
    base: f64,
    game: &LiveGameState,
    team_id: &str,
    live_state_weight: f64,
) -> f64 {
    match game.status {
        GameStatus::PreGame => base,
        GameStatus::Final => {
            let margin = game.margin_for(team_id);
            if margin > 0 {
                1.0
            } else if margin < 0 {
                0.0
            } else {
                0.5
            }
        }
        GameStatus::InProgress | GameStatus::Halftime => {
            let total = game.total_game_secs();
            let progress = (game.elapsed_secs() / total).clamp(0.0, 1.0);
            let alpha = (progress.powf(LIVE_DECAY_GAMMA) * live_state_weight).clamp(0.0, 1.0);
            alpha * live_win_probability(game, team_id) + (1.0 - alpha) * base
        }
    }
}

/// Sample a game outcome with mode-configured noise.
///
/// Noise is injected in logit space so it respects the probability scale,
/// then the upset multiplier compresses toward (or stretches away from) a
/// coin flip. Returns true when team1 wins.
pub fn sample_outcome(p: f64, config: &VarianceConfig, round: Round, rng: &mut SimRng) -> bool {
    let sigma_eff = config.base_variance * config.round_multiplier(round);
    let p = p.clamp(PROB_FLOOR, PROB_CEIL);
    let logit_p = (p / (1.0 - p)).ln();
    let noisy = sigmoid(logit_p + rng.next_gaussian() * sigma_eff * NOISE_LOGIT_SCALE);

    // multiplier > 1 compresses toward 0.5, < 1 stretches away; non-positive
    // values fall back to no compression.
    let m = if config.upset_multiplier > 0.0 {
        config.upset_multiplier
    } else {
        1.0
    };
    let stretched = noisy / m + 0.5 * (1.0 - 1.0 / m);
    let final_p = stretched.clamp(PROB_FLOOR, PROB_CEIL);
    debug_assert!((0.0..=1.0).contains(&final_p));
    rng.chance(final_p)
}

/// The full per-matchup pipeline: override or (base -> seed gap -> mode
/// adjust), then live blending, then the terminal clamp.
pub fn matchup_win_probability(
    team1: &Team,
    team2: &Team,
    mode: &dyn SimulationMode,
    weights: &MetricWeights,
    config: &VarianceConfig,
    ctx: &SimContext,
    live: Option<&LiveGameState>,
    overrides: Option<&OverridesMap>,
) -> f64 {
    let mut p = match overrides.and_then(|o| o.get(&team1.id, &team2.id)) {
        Some(manual) => manual,
        None => {
            let base = base_win_probability(team1, team2, weights);
            let seeded = apply_seed_gap(base, team1.seed, team2.seed, config.seed_gap_sensitivity);
            mode.adjust_probability(seeded, team1, team2, ctx)
                .clamp(0.0, 1.0)
        }
    };
    if let Some(game) = live {
        if game.involves(&team1.id, &team2.id) {
            p = blend_live_state(p, game, &team1.id, config.live_state_weight);
        }
    }
    debug_assert!((0.0..=1.0).contains(&p), "probability out of bounds: {p}");
    p.clamp(PROB_FLOOR, PROB_CEIL)
}

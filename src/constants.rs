use crate::bracket::Round;

/// D-I average efficiency (points per 100 possessions) used as the
/// defensive anchor in score estimation.
pub const D1_AVERAGE_EFFICIENCY: f64 = 100.0;

/// D-I average tempo (possessions per 40 minutes).
pub const D1_AVERAGE_TEMPO: f64 = 67.7;

/// Calibration scale applied to the weighted logit sum. Roughly one
/// weighted sigma of total differential maps to ~73% win probability.
pub const LOGIT_SCALE: f64 = 0.25;

/// Scale for the seed-implied probability: sigmoid((seed2 - seed1) * SCALE).
pub const SEED_GAP_SCALE: f64 = 0.18;

/// Maximum share of the blended probability the seed-implied term can take
/// (reached at sensitivity 1.0).
pub const SEED_GAP_BLEND: f64 = 0.15;

/// Time-decay exponent for live-state blending: alpha = (elapsed/total)^gamma.
pub const LIVE_DECAY_GAMMA: f64 = 0.7;

/// Per-possession score-margin deviation used by the live win-probability
/// estimate.
pub const LIVE_POSSESSION_STDDEV: f64 = 2.5;

/// Regulation game length in seconds (two 20-minute halves).
pub const REGULATION_SECS: f64 = 2400.0;

/// One half, in seconds.
pub const HALF_SECS: f64 = 1200.0;

/// One overtime period, in seconds.
pub const OVERTIME_SECS: f64 = 300.0;

/// Gaussian deviation of a sampled final score around its expectation.
pub const SCORE_STDDEV: f64 = 8.0;

/// Floor for any sampled final score.
pub const MIN_SCORE: i32 = 30;

/// Mean and deviation of per-team overtime scoring.
pub const OVERTIME_MEAN_POINTS: f64 = 7.0;
pub const OVERTIME_STDDEV_POINTS: f64 = 3.0;

/// Overtimes simulated before the tie is resolved by coin flip.
pub const MAX_OVERTIMES: u32 = 5;

/// Terminal clamp on every probability leaving the pipeline.
pub const PROB_FLOOR: f64 = 0.001;
pub const PROB_CEIL: f64 = 0.999;

/// Multiplier converting effective variance into logit-space noise.
pub const NOISE_LOGIT_SCALE: f64 = 4.0;

/// Soft wall-clock target for the parallel driver, per 1000 runs.
pub const SIM_TARGET_MS_PER_1000_RUNS: u64 = 2000;

/// Default metric weights. Every recognized metric key appears here; modes
/// compose off this table by overriding individual entries.
pub const DEFAULT_METRIC_WEIGHTS: [(&str, f64); 14] = [
    ("adjOffensiveEfficiency", 1.0),
    ("adjDefensiveEfficiency", 1.0),
    ("adjTempo", 0.05),
    ("strengthOfSchedule", 0.3),
    ("effectiveFGPct", 0.4),
    ("threePointRate", 0.1),
    ("threePointPct", 0.25),
    ("freeThrowRate", 0.1),
    ("freeThrowPct", 0.1),
    ("offensiveReboundPct", 0.2),
    ("defensiveReboundPct", 0.2),
    ("turnoverPct", 0.3),
    ("experienceRating", 0.15),
    ("momentumScore", 0.2),
];

/// Baseline variance config scalars.
pub const DEFAULT_BASE_VARIANCE: f64 = 0.08;
pub const DEFAULT_UPSET_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_LIVE_STATE_WEIGHT: f64 = 1.0;
pub const DEFAULT_SEED_GAP_SENSITIVITY: f64 = 1.0;

/// Historical advancement rates for the men's tournament, rows are seeds
/// 1..8, columns are reaching {R32, S16, E8, F4, title}. Seeds 9+ borrow
/// the seed-8 row.
const HISTORICAL_BASELINES: [[f64; 5]; 8] = [
    [0.99, 0.86, 0.69, 0.41, 0.23],
    [0.93, 0.64, 0.47, 0.21, 0.05],
    [0.86, 0.52, 0.25, 0.12, 0.04],
    [0.79, 0.47, 0.16, 0.10, 0.03],
    [0.65, 0.34, 0.07, 0.04, 0.01],
    [0.62, 0.30, 0.10, 0.03, 0.01],
    [0.61, 0.19, 0.07, 0.02, 0.01],
    [0.49, 0.10, 0.05, 0.02, 0.01],
];

/// Historical probability of a seed reaching the given round.
///
/// Rounds before the round of 32 return 1.0 (every bracketed team starts
/// there by convention).
pub fn historical_baseline(seed: u8, round: Round) -> f64 {
    let row = (seed.clamp(1, 8) - 1) as usize;
    let col = match round {
        Round::FirstFour | Round::RoundOf64 => return 1.0,
        Round::RoundOf32 => 0,
        Round::SweetSixteen => 1,
        Round::EliteEight => 2,
        Round::FinalFour => 3,
        Round::Championship => 4,
    };
    HISTORICAL_BASELINES[row][col]
}

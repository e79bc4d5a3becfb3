use std::any::Any;
use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::bracket::Round;
use crate::constants::{
    DEFAULT_BASE_VARIANCE, DEFAULT_LIVE_STATE_WEIGHT, DEFAULT_METRIC_WEIGHTS,
    DEFAULT_SEED_GAP_SENSITIVITY, DEFAULT_UPSET_MULTIPLIER,
};
use crate::error::{Result, SimError};
use crate::team::{Region, Team, TournamentType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeCategory {
    Research,
    Entertainment,
    Hybrid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeConfidence {
    StatisticallyValidated,
    Experimental,
    Whimsical,
}

/// External datasets a mode may declare it needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    MascotData,
    CoachingRatings,
    NbaDraftRankings,
    BettingLines,
    HistoricalResults,
    AiModel,
}

/// Mapping from metric key to non-negative weight.
///
/// Keys not recognized by the base probability model are carried but
/// ignored there.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricWeights(HashMap<String, f64>);

impl MetricWeights {
    pub fn new() -> Self {
        MetricWeights(HashMap::new())
    }

    /// The baseline weight table modes compose off.
    pub fn defaults() -> Self {
        let mut weights = MetricWeights::new();
        for (key, w) in DEFAULT_METRIC_WEIGHTS {
            weights.set(key, w);
        }
        weights
    }

    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, key: impl Into<String>, weight: f64) {
        self.0.insert(key.into(), weight);
    }

    /// Builder-style override, used when a mode tweaks the defaults.
    pub fn with(mut self, key: impl Into<String>, weight: f64) -> Self {
        self.set(key, weight);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome-noise configuration for a mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarianceConfig {
    pub base_variance: f64,
    pub upset_multiplier: f64,
    pub live_state_weight: f64,
    pub seed_gap_sensitivity: f64,
    /// Partial map; rounds not present use 1.0.
    #[serde(default)]
    pub round_variance_multipliers: HashMap<Round, f64>,
}

impl Default for VarianceConfig {
    fn default() -> Self {
        VarianceConfig {
            base_variance: DEFAULT_BASE_VARIANCE,
            upset_multiplier: DEFAULT_UPSET_MULTIPLIER,
            live_state_weight: DEFAULT_LIVE_STATE_WEIGHT,
            seed_gap_sensitivity: DEFAULT_SEED_GAP_SENSITIVITY,
            round_variance_multipliers: HashMap::new(),
        }
    }
}

impl VarianceConfig {
    pub fn round_multiplier(&self, round: Round) -> f64 {
        self.round_variance_multipliers
            .get(&round)
            .copied()
            .unwrap_or(1.0)
    }
}

/// Read-only per-game context handed to probability adjusters.
#[derive(Clone, Debug)]
pub struct SimContext {
    pub round: Round,
    /// `None` once the bracket converges past the regions.
    pub region: Option<Region>,
    pub tournament_type: TournamentType,
    pub games_played_by_team1: u32,
    pub games_played_by_team2: u32,
}

/// Opaque per-Monte-Carlo-run state a mode may opt into. Lives for exactly
/// one run and is never shared across runs or workers.
pub type ModeSimState = Box<dyn Any + Send>;

/// A pluggable simulation strategy.
///
/// `adjust_probability` must be deterministic: equal inputs produce equal
/// outputs and no randomness is available to it. Mode instances themselves
/// never carry per-run state; that lives in the opt-in `ModeSimState`.
pub trait SimulationMode: Send + Sync {
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn description(&self) -> &str;
    fn category(&self) -> ModeCategory;
    fn confidence(&self) -> ModeConfidence;

    fn weights(&self) -> MetricWeights;
    fn variance_config(&self) -> VarianceConfig;

    fn adjust_probability(
        &self,
        base: f64,
        _team1: &Team,
        _team2: &Team,
        _ctx: &SimContext,
    ) -> f64 {
        base
    }

    fn data_sources(&self) -> Vec<DataSource> {
        Vec::new()
    }

    fn initialize_sim_state(&self) -> Option<ModeSimState> {
        None
    }

    fn on_game_complete(
        &self,
        _winner: &Team,
        _loser: &Team,
        _round: Round,
        _state: &mut ModeSimState,
    ) {
    }
}

impl std::fmt::Debug for dyn SimulationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationMode").field("id", &self.id()).finish()
    }
}

pub type ModeFactory = fn() -> Box<dyn SimulationMode>;

static REGISTRY: Lazy<RwLock<HashMap<String, ModeFactory>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a mode factory under the id its instances report.
///
/// Registration happens once per id; a second attempt is an error. The
/// embedding runtime registers everything it needs before dispatching the
/// first simulation and the registry is read-only afterwards.
pub fn register_mode(factory: ModeFactory) -> Result<()> {
    let id = factory().id().to_string();
    let mut registry = REGISTRY.write().expect("mode registry lock poisoned");
    if registry.contains_key(&id) {
        return Err(SimError::DuplicateModeRegistration(id));
    }
    registry.insert(id, factory);
    Ok(())
}

/// Build a fresh instance of a registered mode.
pub fn create_mode(id: &str) -> Result<Box<dyn SimulationMode>> {
    let registry = REGISTRY.read().expect("mode registry lock poisoned");
    match registry.get(id) {
        Some(factory) => Ok(factory()),
        None => Err(SimError::UnknownMode {
            id: id.to_string(),
            available: sorted_ids(&registry),
        }),
    }
}

pub fn available_modes() -> Vec<String> {
    let registry = REGISTRY.read().expect("mode registry lock poisoned");
    sorted_ids(&registry)
}

fn sorted_ids(registry: &HashMap<String, ModeFactory>) -> Vec<String> {
    let mut ids: Vec<String> = registry.keys().cloned().collect();
    ids.sort();
    ids
}

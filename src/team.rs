use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// One of the four geographic brackets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    East,
    West,
    South,
    Midwest,
}

impl Region {
    /// Fixed ordering; also drives the Final Four pairing (East/West in one
    /// semifinal, South/Midwest in the other).
    pub const ALL: [Region; 4] = [Region::East, Region::West, Region::South, Region::Midwest];

    pub fn key(self) -> &'static str {
        match self {
            Region::East => "east",
            Region::West => "west",
            Region::South => "south",
            Region::Midwest => "midwest",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentType {
    Mens,
    Womens,
}

impl Default for TournamentType {
    fn default() -> Self {
        TournamentType::Mens
    }
}

/// Per-team statistical record.
///
/// Efficiency numbers are per 100 possessions; rate stats are fractions in
/// [0, 1]; height is in inches. Defaults are D-I midpoints so a partially
/// populated team still produces sane differentials.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMetrics {
    pub adj_offensive_efficiency: f64,
    pub adj_defensive_efficiency: f64,
    pub adj_tempo: f64,
    pub strength_of_schedule: f64,
    pub effective_fg_pct: f64,
    pub turnover_pct: f64,
    pub offensive_rebound_pct: f64,
    pub defensive_rebound_pct: f64,
    pub free_throw_rate: f64,
    pub free_throw_pct: f64,
    pub three_point_rate: f64,
    pub three_point_pct: f64,
    pub steal_pct: f64,
    pub avg_height: f64,
    pub bench_minutes_pct: f64,
    pub experience_rating: f64,
    pub wins: u32,
    pub losses: u32,
    pub conference_wins: u32,
    pub conference_losses: u32,
    pub last_10_wins: u32,
    pub last_10_losses: u32,
    pub win_streak: u32,
}

impl Default for TeamMetrics {
    fn default() -> Self {
        TeamMetrics {
            adj_offensive_efficiency: 100.0,
            adj_defensive_efficiency: 100.0,
            adj_tempo: 67.7,
            strength_of_schedule: 0.0,
            effective_fg_pct: 0.50,
            turnover_pct: 0.18,
            offensive_rebound_pct: 0.29,
            defensive_rebound_pct: 0.71,
            free_throw_rate: 0.32,
            free_throw_pct: 0.72,
            three_point_rate: 0.38,
            three_point_pct: 0.34,
            steal_pct: 0.09,
            avg_height: 77.0,
            bench_minutes_pct: 0.30,
            experience_rating: 1.8,
            wins: 15,
            losses: 15,
            conference_wins: 9,
            conference_losses: 9,
            last_10_wins: 5,
            last_10_losses: 5,
            win_streak: 0,
        }
    }
}

impl TeamMetrics {
    pub fn last_10_win_pct(&self) -> f64 {
        let games = self.last_10_wins + self.last_10_losses;
        if games == 0 {
            0.5
        } else {
            self.last_10_wins as f64 / games as f64
        }
    }
}

/// Flavor data consumed by the whimsical modes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MascotProfile {
    pub nickname: String,
    /// 0..1, how scary the mascot is.
    pub ferocity: f64,
    pub mythical: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoachingProfile {
    pub name: String,
    pub tournament_appearances: u32,
    pub career_win_pct: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: String,
    /// 1..16 within the region; 1 is best.
    pub seed: u8,
    pub region: Region,
    pub conference: String,
    #[serde(default)]
    pub tournament_type: TournamentType,
    #[serde(default)]
    pub metrics: TeamMetrics,
    #[serde(default)]
    pub mascot: Option<MascotProfile>,
    #[serde(default)]
    pub coaching: Option<CoachingProfile>,
}

impl Team {
    /// Minimal constructor used throughout the tests; everything not passed
    /// takes the D-I midpoint defaults.
    pub fn new(id: impl Into<String>, name: impl Into<String>, seed: u8, region: Region) -> Self {
        let id = id.into();
        let name = name.into();
        Team {
            short_name: name.clone(),
            id,
            name,
            seed,
            region,
            conference: String::new(),
            tournament_type: TournamentType::Mens,
            metrics: TeamMetrics::default(),
            mascot: None,
            coaching: None,
        }
    }
}

/// Validate the 64-team field: exactly four regions, each holding seeds
/// 1..16 exactly once.
pub fn validate_roster(teams: &HashMap<String, Team>) -> Result<()> {
    if teams.len() != 64 {
        return Err(SimError::InvalidRoster(format!(
            "expected 64 teams, found {}",
            teams.len()
        )));
    }
    for region in Region::ALL {
        let mut seen = [false; 16];
        for team in teams.values().filter(|t| t.region == region) {
            if !(1..=16).contains(&team.seed) {
                return Err(SimError::InvalidRoster(format!(
                    "team '{}' has seed {} outside 1..16",
                    team.id, team.seed
                )));
            }
            let slot = (team.seed - 1) as usize;
            if seen[slot] {
                return Err(SimError::InvalidRoster(format!(
                    "duplicate seed {} in region {}",
                    team.seed,
                    region.key()
                )));
            }
            seen[slot] = true;
        }
        if seen.iter().any(|s| !s) {
            return Err(SimError::InvalidRoster(format!(
                "region {} does not hold seeds 1..16",
                region.key()
            )));
        }
    }
    Ok(())
}

/// Synthetic 64-team field with default metrics, shared by the unit tests.
#[cfg(test)]
pub(crate) fn synthetic_field() -> HashMap<String, Team> {
    let mut teams = HashMap::new();
    for region in Region::ALL {
        for seed in 1..=16u8 {
            let id = format!("{}-{}", region.key(), seed);
            teams.insert(id.clone(), Team::new(id.clone(), id, seed, region));
        }
    }
    teams
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_field_passes() {
        assert!(validate_roster(&synthetic_field()).is_ok());
    }

    #[test]
    fn test_wrong_count_fails() {
        let mut teams = synthetic_field();
        teams.remove("east-7");
        assert!(matches!(
            validate_roster(&teams),
            Err(SimError::InvalidRoster(_))
        ));
    }

    #[test]
    fn test_duplicate_seed_fails() {
        let mut teams = synthetic_field();
        teams.get_mut("east-7").unwrap().seed = 8;
        assert!(validate_roster(&teams).is_err());
    }

    #[test]
    fn test_last_10_pct_handles_empty() {
        let mut m = TeamMetrics::default();
        m.last_10_wins = 0;
        m.last_10_losses = 0;
        assert_eq!(m.last_10_win_pct(), 0.5);
        m.last_10_wins = 8;
        m.last_10_losses = 2;
        assert!((m.last_10_win_pct() - 0.8).abs() < 1e-12);
    }
}

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bracket::Round;
use crate::constants::historical_baseline;
use crate::team::{Region, Team, TournamentType};
use crate::tournament::CountMatrix;

/// Rounds whose reach probability contributes to expected wins: winning a
/// game means reaching the next round.
const WIN_ROUNDS: [Round; 5] = [
    Round::RoundOf32,
    Round::SweetSixteen,
    Round::EliteEight,
    Round::FinalFour,
    Round::Championship,
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TeamSimResult {
    pub team_id: String,
    pub team_name: String,
    pub seed: u8,
    pub region: Region,
    /// Probability of reaching each round. First Four and round of 64 are
    /// 1.0 by convention; every bracketed team starts there.
    pub round_probabilities: BTreeMap<Round, f64>,
    pub championship_probability: f64,
    pub expected_wins: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectedUpset {
    pub team_id: String,
    pub team_name: String,
    pub seed: u8,
    pub round: Round,
    pub probability: f64,
    pub historical_baseline: f64,
    /// Simulated advancement probability minus the historical baseline.
    pub surprise: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentSimulationResult {
    pub mode_id: String,
    pub mode_name: String,
    pub tournament_type: TournamentType,
    pub timestamp: DateTime<Utc>,
    pub simulation_count: u64,
    pub teams: BTreeMap<String, TeamSimResult>,
    pub most_likely_final_four: Vec<String>,
    pub most_likely_champion: Option<String>,
    pub biggest_projected_upset: Option<ProjectedUpset>,
    /// Population standard deviation of championship probabilities; low
    /// values mean the title odds are spread thin.
    pub volatility_index: f64,
}

/// Convert merged count matrices into per-team probabilities and the derived
/// rankings.
pub fn aggregate(
    counts: &CountMatrix,
    teams: &HashMap<String, Team>,
    mode_id: &str,
    mode_name: &str,
    tournament_type: TournamentType,
) -> TournamentSimulationResult {
    let n = counts.runs.max(1) as f64;

    let mut results: BTreeMap<String, TeamSimResult> = BTreeMap::new();
    for team in teams.values() {
        let mut round_probabilities = BTreeMap::new();
        for round in Round::ORDER {
            let p = match round {
                Round::FirstFour | Round::RoundOf64 => 1.0,
                _ => counts.reach(&team.id, round) as f64 / n,
            };
            round_probabilities.insert(round, p);
        }
        let championship_probability = counts.champion_count(&team.id) as f64 / n;
        let expected_wins: f64 = WIN_ROUNDS
            .iter()
            .map(|&round| counts.reach(&team.id, round) as f64 / n)
            .sum();
        results.insert(
            team.id.clone(),
            TeamSimResult {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                seed: team.seed,
                region: team.region,
                round_probabilities,
                championship_probability,
                expected_wins,
            },
        );
    }

    let most_likely_final_four = most_likely_final_four(counts, &results, n);
    let most_likely_champion = most_likely_champion(counts, &results);
    let biggest_projected_upset = biggest_projected_upset(counts, teams, n);
    let volatility_index = volatility(&results);

    TournamentSimulationResult {
        mode_id: mode_id.to_string(),
        mode_name: mode_name.to_string(),
        tournament_type,
        timestamp: Utc::now(),
        simulation_count: counts.runs,
        teams: results,
        most_likely_final_four,
        most_likely_champion,
        biggest_projected_upset,
        volatility_index,
    }
}

fn most_likely_final_four(
    counts: &CountMatrix,
    results: &BTreeMap<String, TeamSimResult>,
    n: f64,
) -> Vec<String> {
    let mut ranked: Vec<(&str, f64, f64, u8)> = results
        .values()
        .map(|r| {
            let ff = counts.reach(&r.team_id, Round::FinalFour) as f64 / n;
            (r.team_id.as_str(), ff, r.championship_probability, r.seed)
        })
        .collect();
    // Final Four probability, then title probability, then the better seed.
    // The BTreeMap walk already fixed id order, so ties are deterministic.
    ranked.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then(b.2.total_cmp(&a.2))
            .then(a.3.cmp(&b.3))
    });
    ranked.into_iter().take(4).map(|(id, ..)| id.to_string()).collect()
}

fn most_likely_champion(
    counts: &CountMatrix,
    results: &BTreeMap<String, TeamSimResult>,
) -> Option<String> {
    results
        .values()
        .map(|r| (counts.champion_count(&r.team_id), r))
        .max_by(|(ca, a), (cb, b)| ca.cmp(cb).then(b.seed.cmp(&a.seed)))
        .filter(|(count, _)| *count > 0)
        .map(|(_, r)| r.team_id.clone())
}

fn biggest_projected_upset(
    counts: &CountMatrix,
    teams: &HashMap<String, Team>,
    n: f64,
) -> Option<ProjectedUpset> {
    let mut best: Option<ProjectedUpset> = None;
    // Walk ids in sorted order so equal surprises resolve the same way on
    // every run.
    let mut ids: Vec<&String> = teams.keys().collect();
    ids.sort();
    for id in ids {
        let team = &teams[id];
        if team.seed < 9 {
            continue;
        }
        for &round in &WIN_ROUNDS {
            let probability = counts.reach(&team.id, round) as f64 / n;
            if probability < 0.01 {
                continue;
            }
            let baseline = historical_baseline(team.seed, round);
            let surprise = probability - baseline;
            if best.as_ref().map_or(true, |b| surprise > b.surprise) {
                best = Some(ProjectedUpset {
                    team_id: team.id.clone(),
                    team_name: team.name.clone(),
                    seed: team.seed,
                    round,
                    probability,
                    historical_baseline: baseline,
                    surprise,
                });
            }
        }
    }
    best
}

fn volatility(results: &BTreeMap<String, TeamSimResult>) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let n = results.len() as f64;
    let mean = results
        .values()
        .map(|r| r.championship_probability)
        .sum::<f64>()
        / n;
    let variance = results
        .values()
        .map(|r| (r.championship_probability - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bracket::{Bracket, Round};
use crate::constants::{HALF_SECS, OVERTIME_SECS, REGULATION_SECS};
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    PreGame,
    InProgress,
    Halftime,
    Final,
}

/// Shooting counters for one half.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootingLine {
    pub fg_made: u16,
    pub fg_attempted: u16,
    pub three_made: u16,
    pub three_attempted: u16,
    pub ft_made: u16,
    pub ft_attempted: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRun {
    pub team_id: String,
    pub points: u8,
}

/// Snapshot of a game as reported by the external scoreboard feed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiveGameState {
    pub game_id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub round: Round,
    pub home_score: i32,
    pub away_score: i32,
    /// 1 or 2 in regulation; 3+ are overtime periods.
    pub period: u8,
    /// Seconds left in the current period.
    pub time_remaining_secs: f64,
    #[serde(default)]
    pub possession_team_id: Option<String>,
    #[serde(default)]
    pub home_fouls: u8,
    #[serde(default)]
    pub away_fouls: u8,
    #[serde(default)]
    pub home_bonus: bool,
    #[serde(default)]
    pub away_bonus: bool,
    #[serde(default)]
    pub home_shooting: [ShootingLine; 2],
    #[serde(default)]
    pub away_shooting: [ShootingLine; 2],
    #[serde(default)]
    pub last_run: Option<ScoringRun>,
    #[serde(default)]
    pub home_timeouts: u8,
    #[serde(default)]
    pub away_timeouts: u8,
    pub status: GameStatus,
    pub last_updated: DateTime<Utc>,
}

impl LiveGameState {
    pub fn new(
        game_id: impl Into<String>,
        home_team_id: impl Into<String>,
        away_team_id: impl Into<String>,
        round: Round,
    ) -> Self {
        LiveGameState {
            game_id: game_id.into(),
            home_team_id: home_team_id.into(),
            away_team_id: away_team_id.into(),
            round,
            home_score: 0,
            away_score: 0,
            period: 1,
            time_remaining_secs: HALF_SECS,
            possession_team_id: None,
            home_fouls: 0,
            away_fouls: 0,
            home_bonus: false,
            away_bonus: false,
            home_shooting: [ShootingLine::default(); 2],
            away_shooting: [ShootingLine::default(); 2],
            last_run: None,
            home_timeouts: 4,
            away_timeouts: 4,
            status: GameStatus::PreGame,
            last_updated: Utc::now(),
        }
    }

    /// Whether this game is between exactly these two teams, in either order.
    pub fn involves(&self, team_a: &str, team_b: &str) -> bool {
        (self.home_team_id == team_a && self.away_team_id == team_b)
            || (self.home_team_id == team_b && self.away_team_id == team_a)
    }

    /// Total scheduled game time given the current period: 40 regulation
    /// minutes plus 5 per overtime.
    pub fn total_game_secs(&self) -> f64 {
        let overtimes = self.period.saturating_sub(2) as f64;
        REGULATION_SECS + overtimes * OVERTIME_SECS
    }

    /// Seconds left across the current and any future regulation periods.
    pub fn remaining_game_secs(&self) -> f64 {
        if self.period <= 2 {
            let future_halves = (2 - self.period) as f64;
            self.time_remaining_secs + future_halves * HALF_SECS
        } else {
            self.time_remaining_secs
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.total_game_secs() - self.remaining_game_secs()).max(0.0)
    }

    /// Score margin from the given team's perspective.
    pub fn margin_for(&self, team_id: &str) -> i32 {
        if self.home_team_id == team_id {
            self.home_score - self.away_score
        } else {
            self.away_score - self.home_score
        }
    }

    /// The team currently ahead, if any.
    pub fn leader(&self) -> Option<&str> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(self.home_team_id.as_str()),
            std::cmp::Ordering::Less => Some(self.away_team_id.as_str()),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Result of blending a live snapshot over the base bracket.
#[derive(Clone, Debug)]
pub struct BlendResult {
    pub bracket: Bracket,
    pub active_slot_ids: Vec<String>,
    pub completed_slot_ids: Vec<String>,
}

/// Attaches live game snapshots to bracket slots and locks completed
/// results so later blends can never overwrite them.
///
/// `blend` is pure: the same base bracket and snapshot always produce the
/// same view. Only `lock_result` mutates the base.
pub struct LiveStateBlender {
    base: Bracket,
    locked: HashSet<String>,
}

impl LiveStateBlender {
    pub fn new(base: Bracket) -> Self {
        LiveStateBlender {
            base,
            locked: HashSet::new(),
        }
    }

    pub fn base(&self) -> &Bracket {
        &self.base
    }

    pub fn locked_slot_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.locked.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Produce a fresh bracket view with the snapshot applied.
    ///
    /// Games are matched to slots by team-set equality; a live game whose
    /// teams match no slot has no effect. Matching walks games in game-id
    /// order so the result never depends on snapshot map ordering.
    pub fn blend(&self, snapshot: &HashMap<String, LiveGameState>) -> BlendResult {
        let mut bracket = self.base.clone();
        let mut games: Vec<&LiveGameState> = snapshot.values().collect();
        games.sort_by(|a, b| a.game_id.cmp(&b.game_id));

        let mut active_slot_ids = Vec::new();
        let mut completed_slot_ids = Vec::new();

        for idx in 0..bracket.slots().len() {
            let slot = &bracket.slots()[idx];
            if self.locked.contains(&slot.slot_id) {
                continue;
            }
            let (Some(t1), Some(t2)) = (slot.team1_id.clone(), slot.team2_id.clone()) else {
                continue;
            };
            let Some(game) = games.iter().find(|g| g.involves(&t1, &t2)) else {
                continue;
            };
            let slot_id = slot.slot_id.clone();

            match game.status {
                GameStatus::Final => match game.leader() {
                    Some(winner) => {
                        let winner = winner.to_string();
                        bracket.attach_live_game(&slot_id, (*game).clone()).ok();
                        // The winner is a participant by the matching rule.
                        bracket.set_winner(&slot_id, &winner).ok();
                        completed_slot_ids.push(slot_id);
                    }
                    None => {
                        warn!(
                            game_id = game.game_id.as_str(),
                            "final live game is tied; leaving slot undecided"
                        );
                        bracket.attach_live_game(&slot_id, (*game).clone()).ok();
                    }
                },
                GameStatus::InProgress | GameStatus::Halftime => {
                    bracket.attach_live_game(&slot_id, (*game).clone()).ok();
                    active_slot_ids.push(slot_id);
                }
                GameStatus::PreGame => {
                    bracket.attach_live_game(&slot_id, (*game).clone()).ok();
                }
            }
        }

        BlendResult {
            bracket,
            active_slot_ids,
            completed_slot_ids,
        }
    }

    /// Permanently record a result on the base bracket and propagate the
    /// winner into the downstream slot. Locked slots pass through every
    /// subsequent blend untouched.
    pub fn lock_result(&mut self, slot_id: &str, winner_id: &str) -> Result<()> {
        self.base.set_winner(slot_id, winner_id)?;
        self.locked.insert(slot_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::Bracket;
    use crate::team::synthetic_field;

    fn blender() -> LiveStateBlender {
        LiveStateBlender::new(Bracket::from_teams(&synthetic_field()).unwrap())
    }

    fn final_game(home: &str, away: &str, home_score: i32, away_score: i32) -> LiveGameState {
        let mut g = LiveGameState::new(format!("{home}@{away}"), home, away, Round::RoundOf64);
        g.home_score = home_score;
        g.away_score = away_score;
        g.period = 2;
        g.time_remaining_secs = 0.0;
        g.status = GameStatus::Final;
        g
    }

    #[test]
    fn test_blend_completes_final_games() {
        let blender = blender();
        let mut snapshot = HashMap::new();
        let game = final_game("east-16", "east-1", 58, 74);
        snapshot.insert(game.game_id.clone(), game);

        let result = blender.blend(&snapshot);
        assert_eq!(result.completed_slot_ids, vec!["east-r64-g1".to_string()]);
        assert!(result.active_slot_ids.is_empty());
        let slot = result.bracket.slot("east-r64-g1").unwrap();
        assert_eq!(slot.winner_id.as_deref(), Some("east-1"));
        // Winner propagated into the round-of-32 view.
        assert_eq!(
            result.bracket.slot("east-r32-g1").unwrap().team1_id.as_deref(),
            Some("east-1")
        );
    }

    #[test]
    fn test_blend_attaches_in_progress() {
        let blender = blender();
        let mut game = final_game("east-8", "east-9", 40, 38);
        game.status = GameStatus::InProgress;
        game.time_remaining_secs = 600.0;
        let mut snapshot = HashMap::new();
        snapshot.insert(game.game_id.clone(), game);

        let result = blender.blend(&snapshot);
        assert_eq!(result.active_slot_ids, vec!["east-r64-g2".to_string()]);
        let slot = result.bracket.slot("east-r64-g2").unwrap();
        assert!(slot.winner_id.is_none());
        assert!(slot.live_game.is_some());
    }

    #[test]
    fn test_blend_is_idempotent() {
        let blender = blender();
        let mut snapshot = HashMap::new();
        let game = final_game("west-5", "west-12", 61, 66);
        snapshot.insert(game.game_id.clone(), game);

        let a = blender.blend(&snapshot);
        let b = blender.blend(&snapshot);
        assert_eq!(a.completed_slot_ids, b.completed_slot_ids);
        assert_eq!(a.active_slot_ids, b.active_slot_ids);
        for (sa, sb) in a.bracket.slots().iter().zip(b.bracket.slots()) {
            assert_eq!(sa.winner_id, sb.winner_id);
        }
    }

    #[test]
    fn test_locked_slot_survives_contradicting_blend() {
        let mut blender = blender();
        blender.lock_result("east-r64-g1", "east-1").unwrap();

        // Snapshot claims the 16 seed won; the locked result must hold.
        let mut snapshot = HashMap::new();
        let game = final_game("east-16", "east-1", 90, 50);
        snapshot.insert(game.game_id.clone(), game);

        let result = blender.blend(&snapshot);
        assert!(result.completed_slot_ids.is_empty());
        assert_eq!(
            result.bracket.slot("east-r64-g1").unwrap().winner_id.as_deref(),
            Some("east-1")
        );
        assert_eq!(
            result.bracket.slot("east-r32-g1").unwrap().team1_id.as_deref(),
            Some("east-1")
        );
    }

    #[test]
    fn test_unmatched_live_game_ignored() {
        let blender = blender();
        let mut snapshot = HashMap::new();
        // Teams from different regions never share a round-of-64 slot.
        let game = final_game("east-1", "west-1", 80, 70);
        snapshot.insert(game.game_id.clone(), game);

        let result = blender.blend(&snapshot);
        assert!(result.completed_slot_ids.is_empty());
        assert!(result.active_slot_ids.is_empty());
    }

    #[test]
    fn test_clock_accounting() {
        let mut g = LiveGameState::new("g", "h", "a", Round::SweetSixteen);
        g.period = 1;
        g.time_remaining_secs = 300.0;
        assert_eq!(g.total_game_secs(), 2400.0);
        assert_eq!(g.remaining_game_secs(), 1500.0);
        assert_eq!(g.elapsed_secs(), 900.0);

        g.period = 3; // first overtime
        g.time_remaining_secs = 120.0;
        assert_eq!(g.total_game_secs(), 2700.0);
        assert_eq!(g.remaining_game_secs(), 120.0);
        assert_eq!(g.elapsed_secs(), 2580.0);
    }
}

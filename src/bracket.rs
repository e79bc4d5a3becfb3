use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::live::LiveGameState;
use crate::team::{Region, Team};

/// Tournament stages in playing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Round {
    #[serde(rename = "first-four")]
    FirstFour,
    #[serde(rename = "round-of-64")]
    RoundOf64,
    #[serde(rename = "round-of-32")]
    RoundOf32,
    #[serde(rename = "sweet-sixteen")]
    SweetSixteen,
    #[serde(rename = "elite-eight")]
    EliteEight,
    #[serde(rename = "final-four")]
    FinalFour,
    #[serde(rename = "championship")]
    Championship,
}

impl Round {
    /// Playing order walked by the propagator.
    pub const ORDER: [Round; 7] = [
        Round::FirstFour,
        Round::RoundOf64,
        Round::RoundOf32,
        Round::SweetSixteen,
        Round::EliteEight,
        Round::FinalFour,
        Round::Championship,
    ];

    /// Round index: first-four is -1, round-of-64 is 0, championship is 5.
    pub fn index(self) -> i8 {
        match self {
            Round::FirstFour => -1,
            Round::RoundOf64 => 0,
            Round::RoundOf32 => 1,
            Round::SweetSixteen => 2,
            Round::EliteEight => 3,
            Round::FinalFour => 4,
            Round::Championship => 5,
        }
    }

    /// Zero-based position in [`Round::ORDER`], used for count-matrix rows.
    pub fn counting_index(self) -> usize {
        (self.index() + 1) as usize
    }

    pub fn next(self) -> Option<Round> {
        let idx = self.counting_index();
        Round::ORDER.get(idx + 1).copied()
    }

    pub fn key(self) -> &'static str {
        match self {
            Round::FirstFour => "first-four",
            Round::RoundOf64 => "round-of-64",
            Round::RoundOf32 => "round-of-32",
            Round::SweetSixteen => "sweet-sixteen",
            Round::EliteEight => "elite-eight",
            Round::FinalFour => "final-four",
            Round::Championship => "championship",
        }
    }
}

/// Number of rounds tracked by the count matrices.
pub const ROUND_COUNT: usize = Round::ORDER.len();

/// Intra-region round-of-64 pairings, in game order.
pub const R64_PAIRINGS: [(u8, u8); 8] =
    [(1, 16), (8, 9), (5, 12), (4, 13), (6, 11), (3, 14), (7, 10), (2, 15)];

/// A node in the single-elimination graph.
///
/// Round-of-64 slots carry their teams from construction; later rounds are
/// filled exclusively by winner advancement. `next_slot_id` edges define the
/// feeder graph: the lower-ordered feeder of a slot fills `team1_id`, the
/// higher fills `team2_id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BracketSlot {
    pub slot_id: String,
    pub round: Round,
    /// `None` for the Final Four and championship slots.
    pub region: Option<Region>,
    #[serde(default)]
    pub team1_id: Option<String>,
    #[serde(default)]
    pub team2_id: Option<String>,
    #[serde(default)]
    pub winner_id: Option<String>,
    #[serde(default)]
    pub next_slot_id: Option<String>,
    #[serde(default)]
    pub live_game: Option<LiveGameState>,
}

impl BracketSlot {
    pub fn new(slot_id: impl Into<String>, round: Round, region: Option<Region>) -> Self {
        BracketSlot {
            slot_id: slot_id.into(),
            round,
            region,
            team1_id: None,
            team2_id: None,
            winner_id: None,
            next_slot_id: None,
            live_game: None,
        }
    }

    pub fn has_team(&self, team_id: &str) -> bool {
        self.team1_id.as_deref() == Some(team_id) || self.team2_id.as_deref() == Some(team_id)
    }
}

/// The validated bracket graph.
///
/// Slot order is the construction order and every per-round walk iterates it,
/// so simulation order never depends on hash-map iteration.
#[derive(Clone, Debug)]
pub struct Bracket {
    slots: Vec<BracketSlot>,
    index: HashMap<String, usize>,
    /// slot id -> which side of its next slot it feeds (0 = team1, 1 = team2).
    feeder_pos: HashMap<String, u8>,
    by_round: [Vec<usize>; ROUND_COUNT],
    championship: usize,
}

impl Bracket {
    /// Build the standard 63-slot bracket from a validated 64-team field.
    pub fn from_teams(teams: &HashMap<String, Team>) -> Result<Bracket> {
        crate::team::validate_roster(teams)?;

        let mut by_seed: HashMap<(Region, u8), &str> = HashMap::new();
        for team in teams.values() {
            by_seed.insert((team.region, team.seed), team.id.as_str());
        }

        let mut slots = Vec::with_capacity(63);
        for region in Region::ALL {
            let key = region.key();
            for (g, (s1, s2)) in R64_PAIRINGS.iter().enumerate() {
                let g = g + 1;
                let mut slot =
                    BracketSlot::new(format!("{key}-r64-g{g}"), Round::RoundOf64, Some(region));
                slot.team1_id = Some(by_seed[&(region, *s1)].to_string());
                slot.team2_id = Some(by_seed[&(region, *s2)].to_string());
                slot.next_slot_id = Some(format!("{key}-r32-g{}", g.div_ceil(2)));
                slots.push(slot);
            }
            for g in 1..=4usize {
                let mut slot =
                    BracketSlot::new(format!("{key}-r32-g{g}"), Round::RoundOf32, Some(region));
                slot.next_slot_id = Some(format!("{key}-s16-g{}", g.div_ceil(2)));
                slots.push(slot);
            }
            for g in 1..=2usize {
                let mut slot =
                    BracketSlot::new(format!("{key}-s16-g{g}"), Round::SweetSixteen, Some(region));
                slot.next_slot_id = Some(format!("{key}-e8"));
                slots.push(slot);
            }
            let mut e8 = BracketSlot::new(format!("{key}-e8"), Round::EliteEight, Some(region));
            e8.next_slot_id = Some(match region {
                Region::East | Region::West => "final-four-g1".to_string(),
                Region::South | Region::Midwest => "final-four-g2".to_string(),
            });
            slots.push(e8);
        }
        for g in 1..=2usize {
            let mut ff = BracketSlot::new(format!("final-four-g{g}"), Round::FinalFour, None);
            ff.next_slot_id = Some("championship".to_string());
            slots.push(ff);
        }
        slots.push(BracketSlot::new("championship", Round::Championship, None));

        Bracket::from_slots(slots)
    }

    /// Validate an externally supplied slot list and index it.
    pub fn from_slots(slots: Vec<BracketSlot>) -> Result<Bracket> {
        if slots.is_empty() {
            return Err(SimError::InvalidBracket("no slots".to_string()));
        }

        let mut index = HashMap::with_capacity(slots.len());
        for (i, slot) in slots.iter().enumerate() {
            if index.insert(slot.slot_id.clone(), i).is_some() {
                return Err(SimError::InvalidBracket(format!(
                    "duplicate slot id '{}'",
                    slot.slot_id
                )));
            }
        }

        // Feeder edges. Requiring every edge to step to the following round
        // makes cycles impossible by construction.
        let mut feeder_pos: HashMap<String, u8> = HashMap::new();
        let mut feeder_count: HashMap<&str, u8> = HashMap::new();
        for slot in &slots {
            let Some(next_id) = slot.next_slot_id.as_deref() else {
                if slot.round != Round::Championship {
                    return Err(SimError::InvalidBracket(format!(
                        "slot '{}' has no next slot",
                        slot.slot_id
                    )));
                }
                continue;
            };
            let Some(&next_idx) = index.get(next_id) else {
                return Err(SimError::InvalidBracket(format!(
                    "slot '{}' advances to unknown slot '{}'",
                    slot.slot_id, next_id
                )));
            };
            if slot.round.next() != Some(slots[next_idx].round) {
                return Err(SimError::InvalidBracket(format!(
                    "slot '{}' ({}) advances to '{}' ({}), expected the following round",
                    slot.slot_id,
                    slot.round.key(),
                    next_id,
                    slots[next_idx].round.key()
                )));
            }
            let count = feeder_count.entry(next_id).or_insert(0);
            if *count >= 2 {
                return Err(SimError::InvalidBracket(format!(
                    "slot '{next_id}' has more than two feeders"
                )));
            }
            feeder_pos.insert(slot.slot_id.clone(), *count);
            *count += 1;
        }

        // Every slot past the round of 64 is filled by advancement and needs
        // both feeders. Round-of-64 slots may have at most one (a First Four
        // winner filling an open side).
        for slot in &slots {
            let fed = feeder_count.get(slot.slot_id.as_str()).copied().unwrap_or(0);
            match slot.round {
                Round::FirstFour => {}
                Round::RoundOf64 => {
                    if fed > 1 {
                        return Err(SimError::InvalidBracket(format!(
                            "round-of-64 slot '{}' has {} feeders",
                            slot.slot_id, fed
                        )));
                    }
                }
                _ => {
                    if fed != 2 {
                        return Err(SimError::InvalidBracket(format!(
                            "slot '{}' has {} feeders, expected 2",
                            slot.slot_id, fed
                        )));
                    }
                }
            }
        }

        let main_slots = slots
            .iter()
            .filter(|s| s.round != Round::FirstFour)
            .count();
        if main_slots != 63 {
            return Err(SimError::InvalidBracket(format!(
                "expected 63 regional/final-four/championship slots, found {main_slots}"
            )));
        }
        for region in Region::ALL {
            let n = slots
                .iter()
                .filter(|s| s.round != Round::FirstFour && s.region == Some(region))
                .count();
            if n != 15 {
                return Err(SimError::InvalidBracket(format!(
                    "region {} has {} slots, expected 15",
                    region.key(),
                    n
                )));
            }
        }

        let championships: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.round == Round::Championship)
            .map(|(i, _)| i)
            .collect();
        let championship = match championships.as_slice() {
            [only] => *only,
            _ => {
                return Err(SimError::InvalidBracket(format!(
                    "expected exactly one championship slot, found {}",
                    championships.len()
                )))
            }
        };

        let mut by_round: [Vec<usize>; ROUND_COUNT] = Default::default();
        for (i, slot) in slots.iter().enumerate() {
            by_round[slot.round.counting_index()].push(i);
        }

        Ok(Bracket {
            slots,
            index,
            feeder_pos,
            by_round,
            championship,
        })
    }

    pub fn slots(&self) -> &[BracketSlot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: &str) -> Option<&BracketSlot> {
        self.index.get(slot_id).map(|&i| &self.slots[i])
    }

    pub fn slot_index(&self, slot_id: &str) -> Option<usize> {
        self.index.get(slot_id).copied()
    }

    /// Which side of its next slot this slot feeds, if any.
    pub fn feeder_position(&self, slot_id: &str) -> Option<u8> {
        self.feeder_pos.get(slot_id).copied()
    }

    /// Slot indices for a round, in construction order.
    pub fn round_slots(&self, round: Round) -> &[usize] {
        &self.by_round[round.counting_index()]
    }

    pub fn championship_index(&self) -> usize {
        self.championship
    }

    /// Record a winner on a working copy of the slot list and advance it
    /// into the feeder position of the next slot.
    pub fn advance_winner(&self, slots: &mut [BracketSlot], slot_idx: usize, winner_id: &str) {
        slots[slot_idx].winner_id = Some(winner_id.to_string());
        let Some(next_id) = slots[slot_idx].next_slot_id.clone() else {
            return;
        };
        let Some(next_idx) = self.slot_index(&next_id) else {
            return;
        };
        // Round-of-64 slots carry teams from construction; a First Four
        // winner takes whichever side the bracket left open. Everywhere else
        // the feeder order decides.
        if slots[next_idx].round == Round::RoundOf64 {
            if slots[next_idx].team1_id.is_none() {
                slots[next_idx].team1_id = Some(winner_id.to_string());
            } else {
                slots[next_idx].team2_id = Some(winner_id.to_string());
            }
            return;
        }
        match self.feeder_position(&slots[slot_idx].slot_id) {
            Some(0) => slots[next_idx].team1_id = Some(winner_id.to_string()),
            Some(_) => slots[next_idx].team2_id = Some(winner_id.to_string()),
            None => {}
        }
    }

    /// Attach a live snapshot to a slot.
    pub fn attach_live_game(&mut self, slot_id: &str, game: LiveGameState) -> Result<()> {
        let idx = self
            .slot_index(slot_id)
            .ok_or_else(|| SimError::UnknownSlot(slot_id.to_string()))?;
        self.slots[idx].live_game = Some(game);
        Ok(())
    }

    /// Permanently record a winner on this bracket (used when locking live
    /// results). The winner must be one of the slot's participants.
    pub fn set_winner(&mut self, slot_id: &str, winner_id: &str) -> Result<()> {
        let idx = self
            .slot_index(slot_id)
            .ok_or_else(|| SimError::UnknownSlot(slot_id.to_string()))?;
        if !self.slots[idx].has_team(winner_id) {
            return Err(SimError::InvalidWinner {
                slot: slot_id.to_string(),
                team: winner_id.to_string(),
            });
        }
        let mut slots = std::mem::take(&mut self.slots);
        self.advance_winner(&mut slots, idx, winner_id);
        self.slots = slots;
        Ok(())
    }
}

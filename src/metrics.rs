use crate::team::TeamMetrics;

/// The metrics recognized by the base probability model.
///
/// Each carries an empirical D-I standard deviation used to normalize raw
/// differentials before weighting. Unknown weight keys are simply ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    AdjOffensiveEfficiency,
    AdjDefensiveEfficiency,
    AdjTempo,
    StrengthOfSchedule,
    EffectiveFgPct,
    ThreePointRate,
    ThreePointPct,
    FreeThrowRate,
    FreeThrowPct,
    OffensiveReboundPct,
    DefensiveReboundPct,
    TurnoverPct,
    ExperienceRating,
    MomentumScore,
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::AdjOffensiveEfficiency,
        Metric::AdjDefensiveEfficiency,
        Metric::AdjTempo,
        Metric::StrengthOfSchedule,
        Metric::EffectiveFgPct,
        Metric::ThreePointRate,
        Metric::ThreePointPct,
        Metric::FreeThrowRate,
        Metric::FreeThrowPct,
        Metric::OffensiveReboundPct,
        Metric::DefensiveReboundPct,
        Metric::TurnoverPct,
        Metric::ExperienceRating,
        Metric::MomentumScore,
    ];

    /// Weight-map key for this metric.
    pub fn key(self) -> &'static str {
        match self {
            Metric::AdjOffensiveEfficiency => "adjOffensiveEfficiency",
            Metric::AdjDefensiveEfficiency => "adjDefensiveEfficiency",
            Metric::AdjTempo => "adjTempo",
            Metric::StrengthOfSchedule => "strengthOfSchedule",
            Metric::EffectiveFgPct => "effectiveFGPct",
            Metric::ThreePointRate => "threePointRate",
            Metric::ThreePointPct => "threePointPct",
            Metric::FreeThrowRate => "freeThrowRate",
            Metric::FreeThrowPct => "freeThrowPct",
            Metric::OffensiveReboundPct => "offensiveReboundPct",
            Metric::DefensiveReboundPct => "defensiveReboundPct",
            Metric::TurnoverPct => "turnoverPct",
            Metric::ExperienceRating => "experienceRating",
            Metric::MomentumScore => "momentumScore",
        }
    }

    /// Empirical D-I standard deviation.
    pub fn sigma(self) -> f64 {
        match self {
            Metric::AdjOffensiveEfficiency => 8.0,
            Metric::AdjDefensiveEfficiency => 8.0,
            Metric::AdjTempo => 4.0,
            Metric::StrengthOfSchedule => 4.0,
            Metric::EffectiveFgPct => 0.035,
            Metric::ThreePointRate => 0.06,
            Metric::ThreePointPct => 0.035,
            Metric::FreeThrowRate => 0.08,
            Metric::FreeThrowPct => 0.06,
            Metric::OffensiveReboundPct => 0.04,
            Metric::DefensiveReboundPct => 0.04,
            Metric::TurnoverPct => 0.03,
            Metric::ExperienceRating => 0.6,
            Metric::MomentumScore => 0.5,
        }
    }

    /// Metrics where a smaller value is the better one; their differentials
    /// are negated before weighting.
    pub fn lower_is_better(self) -> bool {
        matches!(
            self,
            Metric::AdjDefensiveEfficiency | Metric::TurnoverPct
        )
    }

    pub fn extract(self, m: &TeamMetrics) -> f64 {
        match self {
            Metric::AdjOffensiveEfficiency => m.adj_offensive_efficiency,
            Metric::AdjDefensiveEfficiency => m.adj_defensive_efficiency,
            Metric::AdjTempo => m.adj_tempo,
            Metric::StrengthOfSchedule => m.strength_of_schedule,
            Metric::EffectiveFgPct => m.effective_fg_pct,
            Metric::ThreePointRate => m.three_point_rate,
            Metric::ThreePointPct => m.three_point_pct,
            Metric::FreeThrowRate => m.free_throw_rate,
            Metric::FreeThrowPct => m.free_throw_pct,
            Metric::OffensiveReboundPct => m.offensive_rebound_pct,
            Metric::DefensiveReboundPct => m.defensive_rebound_pct,
            Metric::TurnoverPct => m.turnover_pct,
            Metric::ExperienceRating => m.experience_rating,
            Metric::MomentumScore => momentum_score(m),
        }
    }
}

/// Derived momentum: recent form around .500 plus a capped streak bonus.
pub fn momentum_score(m: &TeamMetrics) -> f64 {
    let streak_bonus = (m.win_streak as f64 * 0.03).clamp(0.0, 0.15);
    2.0 * (m.last_10_win_pct() - 0.5) + streak_bonus
}

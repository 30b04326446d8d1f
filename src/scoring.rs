use rayon::prelude::*;

use crate::aggregate::PlayerMetrics;

/// Multipliers applied to each metric. Card weights are negative, so they
/// are added like the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub goals: f64,
    pub assists: f64,
    pub ambidextrous: f64,
    pub height: f64,
    pub european: f64,
    pub contract: f64,
    pub yellow_cards: f64,
    pub red_cards: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            goals: 5.0,
            assists: 3.0,
            ambidextrous: 2.0,
            height: 1.0,
            european: 1.0,
            contract: 0.5,
            yellow_cards: -1.0,
            red_cards: -5.0,
        }
    }
}

impl ScoringWeights {
    pub fn gem_score(&self, m: &PlayerMetrics) -> f64 {
        m.goals_p90 * self.goals
            + m.assists_p90 * self.assists
            + m.ambi_bonus * self.ambidextrous
            + m.height_bonus * self.height
            + m.euro_bonus * self.european
            + m.contract_bonus * self.contract
            + m.yellows_p90 * self.yellow_cards
            + m.reds_p90 * self.red_cards
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPlayer {
    pub metrics: PlayerMetrics,
    pub gem_score: f64,
}

impl ScoredPlayer {
    pub fn player_id(&self) -> u64 {
        self.metrics.player_id
    }
}

pub fn score_all(metrics: &[PlayerMetrics], weights: &ScoringWeights) -> Vec<ScoredPlayer> {
    metrics
        .par_iter()
        .map(|m| ScoredPlayer {
            metrics: *m,
            gem_score: weights.gem_score(m),
        })
        .collect()
}

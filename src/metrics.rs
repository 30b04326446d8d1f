use std::collections::HashMap;

use rayon::prelude::*;

use crate::dataset::{AppearanceIndex, AppearanceRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRates {
    pub player_id: u64,
    pub total_goals: i64,
    pub total_assists: i64,
    pub total_minutes: i64,
    pub goals_p90: f64,
    pub assists_p90: f64,
}

pub fn per_90(count: f64, minutes: i64) -> f64 {
    if minutes <= 0 {
        return 0.0;
    }
    let rate = count / minutes as f64 * 90.0;
    if rate.is_finite() { rate } else { 0.0 }
}

pub fn normalize_player(player_id: u64, rows: &[&AppearanceRecord]) -> NormalizedRates {
    let mut total_goals = 0i64;
    let mut total_assists = 0i64;
    let mut total_minutes = 0i64;
    for row in rows {
        total_goals += row.goals.unwrap_or(0);
        total_assists += row.assists.unwrap_or(0);
        total_minutes += row.minutes_played.unwrap_or(0);
    }
    NormalizedRates {
        player_id,
        total_goals,
        total_assists,
        total_minutes,
        goals_p90: per_90(total_goals as f64, total_minutes),
        assists_p90: per_90(total_assists as f64, total_minutes),
    }
}

pub fn normalize_all(index: &AppearanceIndex<'_>) -> HashMap<u64, NormalizedRates> {
    index
        .par_iter()
        .map(|(player_id, rows)| (*player_id, normalize_player(*player_id, rows)))
        .collect()
}

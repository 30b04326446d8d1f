use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;

use crate::dataset::{AppearanceIndex, PlayerRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityRules {
    pub position: String,
    pub min_age: i64,
    pub max_age: i64,
    /// Oldest age counted in the junior cohort.
    pub junior_max_age: i64,
    pub min_minutes_per_year: f64,
    /// Union the junior cohort into the eligible set without the minutes gate.
    pub include_juniors: bool,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            position: "Attack".to_string(),
            min_age: 16,
            max_age: 23,
            junior_max_age: 18,
            min_minutes_per_year: 450.0,
            include_juniors: false,
        }
    }
}

impl EligibilityRules {
    pub fn meets_minutes(&self, average_minutes_per_year: f64) -> bool {
        average_minutes_per_year >= self.min_minutes_per_year
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeCohort {
    Junior,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub player_id: u64,
    pub age: i64,
    pub cohort: AgeCohort,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EligiblePlayer {
    pub player_id: u64,
    pub age: i64,
    pub total_minutes_played: i64,
    pub distinct_years_active: usize,
    pub average_minutes_per_year: f64,
}

pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i64 {
    let days = (today - date_of_birth).num_days();
    (days as f64 / 365.25).floor() as i64
}

pub fn select_candidates(
    players: &[PlayerRecord],
    rules: &EligibilityRules,
    today: NaiveDate,
) -> Vec<Candidate> {
    players
        .iter()
        .filter(|p| p.position.as_deref() == Some(rules.position.as_str()))
        .filter_map(|p| {
            let age = age_on(p.date_of_birth?, today);
            if age < rules.min_age || age > rules.max_age {
                return None;
            }
            let cohort = if age <= rules.junior_max_age {
                AgeCohort::Junior
            } else {
                AgeCohort::Senior
            };
            Some(Candidate {
                player_id: p.player_id,
                age,
                cohort,
            })
        })
        .collect()
}

pub fn playing_time(candidate: &Candidate, index: &AppearanceIndex<'_>) -> Option<EligiblePlayer> {
    let rows = index.get(&candidate.player_id)?;
    if rows.is_empty() {
        return None;
    }
    let total_minutes_played: i64 = rows.iter().map(|r| r.minutes_played.unwrap_or(0)).sum();
    let years: HashSet<i32> = rows
        .iter()
        .filter_map(|r| r.date.map(|d| d.year()))
        .collect();
    let distinct_years_active = years.len();
    let average_minutes_per_year = if distinct_years_active == 0 {
        0.0
    } else {
        total_minutes_played as f64 / distinct_years_active as f64
    };
    Some(EligiblePlayer {
        player_id: candidate.player_id,
        age: candidate.age,
        total_minutes_played,
        distinct_years_active,
        average_minutes_per_year,
    })
}

/// Candidates that average at least the configured minutes per active year.
/// Players with no dated appearance have no active year and never qualify on
/// minutes. Juniors bypass the gate only when `include_juniors` is set.
pub fn eligible_players(
    candidates: &[Candidate],
    index: &AppearanceIndex<'_>,
    rules: &EligibilityRules,
) -> Vec<EligiblePlayer> {
    let mut out: Vec<EligiblePlayer> = candidates
        .par_iter()
        .filter_map(|c| {
            let summary = playing_time(c, index)?;
            let qualifies = (summary.distinct_years_active > 0
                && rules.meets_minutes(summary.average_minutes_per_year))
                || (rules.include_juniors && c.cohort == AgeCohort::Junior);
            qualifies.then_some(summary)
        })
        .collect();
    out.sort_by_key(|e| e.player_id);
    out
}

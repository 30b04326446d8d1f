use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::bonus::{self, BonusRules};
use crate::dataset::{AppearanceIndex, PlayerRecord};
use crate::eligibility::EligiblePlayer;
use crate::metrics::NormalizedRates;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerMetrics {
    pub player_id: u64,
    pub goals_p90: f64,
    pub assists_p90: f64,
    pub yellows_p90: f64,
    pub reds_p90: f64,
    pub euro_bonus: f64,
    pub ambi_bonus: f64,
    pub height_bonus: f64,
    pub contract_bonus: f64,
}

pub struct AggregateInputs<'a> {
    pub players: &'a HashMap<u64, &'a PlayerRecord>,
    pub rates: &'a HashMap<u64, NormalizedRates>,
    pub appearances: &'a AppearanceIndex<'a>,
    pub rules: &'a BonusRules,
    pub today: NaiveDate,
}

/// Collapse one player's appearance rows into a metrics row. Bonus fields are
/// constant across a player's rows, so their mean is the constant itself; the
/// card rates are averaged over rows. Players missing a biographical record,
/// normalized rates, or appearances are dropped.
pub fn aggregate_player(eligible: &EligiblePlayer, inputs: &AggregateInputs<'_>) -> Option<PlayerMetrics> {
    let player = inputs.players.get(&eligible.player_id)?;
    let rates = inputs.rates.get(&eligible.player_id)?;
    let rows = inputs.appearances.get(&eligible.player_id)?;
    if rows.is_empty() {
        return None;
    }

    let (yellows_p90, reds_p90) = bonus::card_rates(rows, rates.total_minutes);
    let european = bonus::european_appearances(rows, inputs.rules);

    Some(PlayerMetrics {
        player_id: eligible.player_id,
        goals_p90: rates.goals_p90,
        assists_p90: rates.assists_p90,
        yellows_p90,
        reds_p90,
        euro_bonus: f64::from(bonus::euro_bonus(european, inputs.rules)),
        ambi_bonus: f64::from(bonus::ambi_bonus(player.foot)),
        height_bonus: f64::from(bonus::height_bonus(
            player.sub_position.as_deref(),
            player.height_in_cm,
            inputs.rules,
        )),
        contract_bonus: f64::from(bonus::contract_bonus(
            player.contract_expiration_date,
            inputs.today,
            inputs.rules,
        )),
    })
}

pub fn aggregate_all(eligible: &[EligiblePlayer], inputs: &AggregateInputs<'_>) -> Vec<PlayerMetrics> {
    let mut out: Vec<PlayerMetrics> = eligible
        .par_iter()
        .filter_map(|e| aggregate_player(e, inputs))
        .collect();
    out.sort_by_key(|m| m.player_id);
    out
}

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dataset::PlayerRecord;
use crate::scoring::ScoredPlayer;

/// Final table row, in export column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub player_id: u64,
    pub goals_p90: f64,
    pub assists_p90: f64,
    pub yellows_p90: f64,
    pub reds_p90: f64,
    pub euro_bonus: f64,
    pub ambi_bonus: f64,
    pub height_bonus: f64,
    pub contract_bonus: f64,
    pub gem_score: f64,
    pub market_value_in_eur: f64,
    pub market_value_log: f64,
    pub name: String,
    pub sub_position: String,
    pub age: i64,
    pub height_in_cm: f64,
    pub image_url: String,
    pub current_club_name: String,
    pub url: String,
    pub date: String,
}

/// Display-only lookup for the leading players.
#[derive(Debug, Clone, PartialEq)]
pub struct TopPlayerDetail {
    pub rank: usize,
    pub player_id: u64,
    pub name: String,
    pub current_club_name: String,
    pub sub_position: String,
    pub age: i64,
    pub market_value_in_eur: f64,
    pub gem_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub gem_score: f64,
    pub market_value_log: f64,
}

/// Highest score first; equal scores by ascending player id.
pub fn rank_order(a: &ScoredPlayer, b: &ScoredPlayer) -> Ordering {
    b.gem_score
        .total_cmp(&a.gem_score)
        .then_with(|| a.player_id().cmp(&b.player_id()))
}

pub fn rank(scored: &mut [ScoredPlayer]) {
    scored.sort_by(rank_order);
}

pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// ln(value + 1). Missing or out-of-domain values map to 0.
pub fn market_value_log(value: Option<f64>) -> f64 {
    value.map(|v| sanitize((v + 1.0).ln())).unwrap_or(0.0)
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn top_details(
    ranked: &[ScoredPlayer],
    n: usize,
    players: &HashMap<u64, &PlayerRecord>,
    ages: &HashMap<u64, i64>,
) -> Vec<TopPlayerDetail> {
    ranked
        .iter()
        .take(n)
        .enumerate()
        .map(|(idx, scored)| {
            let player = players.get(&scored.player_id());
            TopPlayerDetail {
                rank: idx + 1,
                player_id: scored.player_id(),
                name: player.map(|p| text(&p.name)).unwrap_or_default(),
                current_club_name: player.map(|p| text(&p.current_club_name)).unwrap_or_default(),
                sub_position: player.map(|p| text(&p.sub_position)).unwrap_or_default(),
                age: ages.get(&scored.player_id()).copied().unwrap_or(0),
                market_value_in_eur: player
                    .and_then(|p| p.market_value_in_eur)
                    .map(sanitize)
                    .unwrap_or(0.0),
                gem_score: sanitize(scored.gem_score),
            }
        })
        .collect()
}

/// Attach descriptive fields and the run date to every ranked player.
pub fn build_export_rows(
    ranked: &[ScoredPlayer],
    players: &HashMap<u64, &PlayerRecord>,
    ages: &HashMap<u64, i64>,
    run_date: NaiveDate,
) -> Vec<ExportRow> {
    let date = run_date.format("%Y-%m-%d").to_string();
    ranked
        .iter()
        .map(|scored| {
            let m = &scored.metrics;
            let player = players.get(&m.player_id);
            let market_value = player.and_then(|p| p.market_value_in_eur);
            ExportRow {
                player_id: m.player_id,
                goals_p90: sanitize(m.goals_p90),
                assists_p90: sanitize(m.assists_p90),
                yellows_p90: sanitize(m.yellows_p90),
                reds_p90: sanitize(m.reds_p90),
                euro_bonus: sanitize(m.euro_bonus),
                ambi_bonus: sanitize(m.ambi_bonus),
                height_bonus: sanitize(m.height_bonus),
                contract_bonus: sanitize(m.contract_bonus),
                gem_score: sanitize(scored.gem_score),
                market_value_in_eur: market_value.map(sanitize).unwrap_or(0.0),
                market_value_log: market_value_log(market_value),
                name: player.map(|p| text(&p.name)).unwrap_or_default(),
                sub_position: player.map(|p| text(&p.sub_position)).unwrap_or_default(),
                age: ages.get(&m.player_id).copied().unwrap_or(0),
                height_in_cm: player
                    .and_then(|p| p.height_in_cm)
                    .map(sanitize)
                    .unwrap_or(0.0),
                image_url: player.map(|p| text(&p.image_url)).unwrap_or_default(),
                current_club_name: player.map(|p| text(&p.current_club_name)).unwrap_or_default(),
                url: player.map(|p| text(&p.url)).unwrap_or_default(),
                date: date.clone(),
            }
        })
        .collect()
}

pub fn scatter_points(rows: &[ExportRow]) -> Vec<ScatterPoint> {
    rows.iter()
        .map(|row| ScatterPoint {
            gem_score: row.gem_score,
            market_value_log: row.market_value_log,
        })
        .collect()
}

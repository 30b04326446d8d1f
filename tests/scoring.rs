mod common;

use std::collections::HashMap;

use gem_scout::aggregate::{AggregateInputs, PlayerMetrics, aggregate_player};
use gem_scout::bonus::BonusRules;
use gem_scout::dataset::{Foot, PlayerRecord, index_by_player};
use gem_scout::eligibility::EligiblePlayer;
use gem_scout::metrics::normalize_all;
use gem_scout::ranking::rank;
use gem_scout::scoring::{ScoredPlayer, ScoringWeights, score_all};

use common::{appearance, date, player};

fn metrics(player_id: u64) -> PlayerMetrics {
    PlayerMetrics {
        player_id,
        goals_p90: 1.0,
        assists_p90: 0.5,
        yellows_p90: 0.2,
        reds_p90: 0.0,
        euro_bonus: 1.0,
        ambi_bonus: 0.0,
        height_bonus: 1.0,
        contract_bonus: 1.0,
    }
}

#[test]
fn default_weights_match_reference_example() {
    let score = ScoringWeights::default().gem_score(&metrics(1));
    assert!((score - 8.8).abs() < 1e-9, "got {score}");
}

#[test]
fn weights_are_tunable_without_touching_metrics() {
    let weights = ScoringWeights {
        goals: 1.0,
        assists: 0.0,
        ambidextrous: 0.0,
        height: 0.0,
        european: 0.0,
        contract: 0.0,
        yellow_cards: 0.0,
        red_cards: -10.0,
    };
    let mut m = metrics(1);
    m.reds_p90 = 0.1;
    assert!((weights.gem_score(&m) - 0.0).abs() < 1e-12);
}

#[test]
fn score_can_be_negative() {
    let m = PlayerMetrics {
        player_id: 1,
        goals_p90: 0.0,
        assists_p90: 0.0,
        yellows_p90: 0.5,
        reds_p90: 0.2,
        euro_bonus: 0.0,
        ambi_bonus: 0.0,
        height_bonus: 0.0,
        contract_bonus: 0.0,
    };
    let scored = score_all(&[m], &ScoringWeights::default());
    assert!((scored[0].gem_score + 1.5).abs() < 1e-12);
}

#[test]
fn ranking_breaks_ties_by_player_id() {
    let mut scored = vec![
        ScoredPlayer { metrics: metrics(30), gem_score: 2.0 },
        ScoredPlayer { metrics: metrics(20), gem_score: 5.0 },
        ScoredPlayer { metrics: metrics(10), gem_score: 2.0 },
        ScoredPlayer { metrics: metrics(40), gem_score: 7.5 },
        ScoredPlayer { metrics: metrics(5), gem_score: 2.0 },
    ];
    rank(&mut scored);
    let ids: Vec<u64> = scored.iter().map(|s| s.player_id()).collect();
    assert_eq!(ids, vec![40, 20, 5, 10, 30]);
}

#[test]
fn aggregate_combines_rates_and_bonuses_per_player() {
    let today = date("2025-06-30");
    let mut record: PlayerRecord = player(1, "2004-01-15", "Attack", "Centre-Forward");
    record.foot = Some(Foot::Both);
    record.height_in_cm = Some(186.0);
    record.contract_expiration_date = Some(date("2025-12-31"));

    let mut rows = Vec::new();
    for week in 0..10 {
        let on = today - chrono::Duration::days(7 * (week + 1));
        let mut row = appearance(1, &on.format("%Y-%m-%d").to_string(), "CL", 90);
        row.goals = Some(if week % 2 == 0 { 1 } else { 0 });
        row.yellow_cards = Some(if week == 0 { 1 } else { 0 });
        rows.push(row);
    }
    let index = index_by_player(&rows);
    let rates = normalize_all(&index);
    let players: HashMap<u64, &PlayerRecord> = HashMap::from([(1, &record)]);
    let rules = BonusRules::default();
    let inputs = AggregateInputs {
        players: &players,
        rates: &rates,
        appearances: &index,
        rules: &rules,
        today,
    };
    let eligible = EligiblePlayer {
        player_id: 1,
        age: 21,
        total_minutes_played: 900,
        distinct_years_active: 1,
        average_minutes_per_year: 900.0,
    };

    let m = aggregate_player(&eligible, &inputs).expect("player should aggregate");
    assert!((m.goals_p90 - 0.5).abs() < 1e-12);
    assert_eq!(m.assists_p90, 0.0);
    // One yellow over 900 minutes is 0.1 per 90 on that row, averaged over 10 rows.
    assert!((m.yellows_p90 - 0.01).abs() < 1e-12);
    assert_eq!(m.euro_bonus, 1.0);
    assert_eq!(m.ambi_bonus, 1.0);
    assert_eq!(m.height_bonus, 1.0);
    assert_eq!(m.contract_bonus, 1.0);

    let missing = EligiblePlayer { player_id: 2, ..eligible };
    assert!(aggregate_player(&missing, &inputs).is_none());
}

mod common;

use gem_scout::dataset::index_by_player;
use gem_scout::metrics::{normalize_all, normalize_player, per_90};

use common::appearance;

#[test]
fn per_90_scales_to_a_full_match() {
    assert!((per_90(2.0, 180) - 1.0).abs() < 1e-12);
    assert!((per_90(1.0, 45) - 2.0).abs() < 1e-12);
}

#[test]
fn zero_minutes_yield_zero_not_nan() {
    assert_eq!(per_90(3.0, 0), 0.0);
    assert_eq!(per_90(0.0, 0), 0.0);
    assert_eq!(per_90(1.0, -10), 0.0);
}

#[test]
fn player_with_no_recorded_minutes_has_zero_rates() {
    let mut a = appearance(9, "2024-01-01", "GB1", 0);
    a.goals = Some(1);
    let mut b = appearance(9, "2024-01-08", "GB1", 0);
    b.minutes_played = None;
    b.assists = Some(2);
    let rows = vec![a, b];
    let index = index_by_player(&rows);
    let rates = normalize_player(9, &index[&9]);
    assert_eq!(rates.total_minutes, 0);
    assert_eq!(rates.goals_p90, 0.0);
    assert_eq!(rates.assists_p90, 0.0);
    assert!(rates.goals_p90.is_finite());
}

#[test]
fn null_counts_are_treated_as_zero_in_totals() {
    let mut a = appearance(1, "2024-01-01", "GB1", 90);
    a.goals = Some(2);
    a.assists = Some(1);
    let mut b = appearance(1, "2024-01-08", "GB1", 90);
    b.goals = None;
    b.assists = None;
    let mut c = appearance(2, "2024-01-08", "GB1", 30);
    c.goals = Some(1);
    let rows = vec![a, b, c];

    let rates = normalize_all(&index_by_player(&rows));
    assert_eq!(rates.len(), 2);

    let first = rates[&1];
    assert_eq!(first.total_goals, 2);
    assert_eq!(first.total_assists, 1);
    assert_eq!(first.total_minutes, 180);
    assert!((first.goals_p90 - 1.0).abs() < 1e-12);
    assert!((first.assists_p90 - 0.5).abs() < 1e-12);

    let second = rates[&2];
    assert!((second.goals_p90 - 3.0).abs() < 1e-12);
}

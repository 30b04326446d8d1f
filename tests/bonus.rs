mod common;

use gem_scout::bonus::{
    BonusRules, ambi_bonus, card_rates, contract_bonus, euro_bonus, european_appearances,
    height_bonus,
};
use gem_scout::dataset::{AppearanceRecord, Foot};

use common::{appearance, date};

fn rows_in(competitions: &[&str]) -> Vec<AppearanceRecord> {
    competitions
        .iter()
        .map(|c| appearance(1, "2024-01-01", c, 90))
        .collect()
}

#[test]
fn euro_bonus_needs_ten_european_appearances() {
    let rules = BonusRules::default();

    let mut comps = vec!["CL"; 5];
    comps.extend(["EL", "ELQ", "ECLQ", "CLQ"]);
    comps.extend(["GB1", "ES1", "FAC"]);
    let nine = rows_in(&comps);
    let refs: Vec<&AppearanceRecord> = nine.iter().collect();
    assert_eq!(european_appearances(&refs, &rules), 9);
    assert_eq!(euro_bonus(9, &rules), 0);

    comps.push("UCOL");
    let ten = rows_in(&comps);
    let refs: Vec<&AppearanceRecord> = ten.iter().collect();
    assert_eq!(european_appearances(&refs, &rules), 10);
    assert_eq!(euro_bonus(10, &rules), 1);
}

#[test]
fn every_listed_code_counts_as_european() {
    let rules = BonusRules::default();
    for code in ["EL", "ELQ", "ECLQ", "CL", "CLQ", "USC", "UCOL"] {
        assert!(rules.is_european(code), "{code} should be european");
    }
    assert!(!rules.is_european("GB1"));
    assert!(!rules.is_european("cl"));
}

#[test]
fn euro_bonus_is_zero_without_european_rows() {
    let rules = BonusRules::default();
    let mut missing = appearance(1, "2024-01-01", "GB1", 90);
    missing.competition_id = None;
    let rows = vec![missing];
    let refs: Vec<&AppearanceRecord> = rows.iter().collect();
    assert_eq!(euro_bonus(european_appearances(&refs, &rules), &rules), 0);
}

#[test]
fn ambi_bonus_only_for_both_feet() {
    assert_eq!(ambi_bonus(Some(Foot::Both)), 1);
    assert_eq!(ambi_bonus(Some(Foot::Left)), 0);
    assert_eq!(ambi_bonus(Some(Foot::Right)), 0);
    assert_eq!(ambi_bonus(None), 0);
}

#[test]
fn height_bonus_excludes_wingers_regardless_of_height() {
    let rules = BonusRules::default();
    assert_eq!(height_bonus(Some("Right Winger"), Some(200.0), &rules), 0);
    assert_eq!(height_bonus(Some("Left Winger"), Some(195.0), &rules), 0);
    assert_eq!(height_bonus(Some("Centre-Forward"), Some(183.0), &rules), 1);
    assert_eq!(height_bonus(Some("Second Striker"), Some(182.5), &rules), 1);
}

#[test]
fn height_bonus_requires_strictly_above_threshold_and_known_values() {
    let rules = BonusRules::default();
    assert_eq!(height_bonus(Some("Centre-Forward"), Some(182.0), &rules), 0);
    assert_eq!(height_bonus(Some("Centre-Forward"), None, &rules), 0);
    assert_eq!(height_bonus(None, Some(190.0), &rules), 0);
}

#[test]
fn contract_bonus_window_includes_expired_contracts() {
    let rules = BonusRules::default();
    let today = date("2025-06-30");
    assert_eq!(contract_bonus(Some(date("2026-06-29")), today, &rules), 1); // 364 days
    assert_eq!(contract_bonus(Some(date("2026-06-30")), today, &rules), 0); // 365 days
    assert_eq!(contract_bonus(Some(date("2025-06-30")), today, &rules), 1);
    assert_eq!(contract_bonus(Some(date("2024-01-01")), today, &rules), 1);
    assert_eq!(contract_bonus(None, today, &rules), 0);
}

#[test]
fn card_rates_average_row_rates_over_appearances() {
    let mut booked = appearance(1, "2024-01-01", "GB1", 90);
    booked.yellow_cards = Some(1);
    let mut sent_off = appearance(1, "2024-01-08", "GB1", 90);
    sent_off.red_cards = Some(1);
    sent_off.yellow_cards = None;
    let rows = vec![booked, sent_off];
    let refs: Vec<&AppearanceRecord> = rows.iter().collect();

    let (yellows, reds) = card_rates(&refs, 180);
    assert!((yellows - 0.25).abs() < 1e-12);
    assert!((reds - 0.25).abs() < 1e-12);

    let (yellows, reds) = card_rates(&refs, 0);
    assert_eq!((yellows, reds), (0.0, 0.0));
    assert_eq!(card_rates(&[], 90), (0.0, 0.0));
}

use chrono::NaiveDate;

use crate::dataset::{AppearanceRecord, Foot};
use crate::metrics::per_90;

pub const EUROPEAN_COMPETITIONS: [&str; 7] = ["EL", "ELQ", "ECLQ", "CL", "CLQ", "USC", "UCOL"];

#[derive(Debug, Clone, PartialEq)]
pub struct BonusRules {
    pub european_competitions: Vec<String>,
    pub min_european_appearances: usize,
    /// Sub-positions that never earn the height bonus.
    pub winger_sub_positions: Vec<String>,
    pub height_threshold_cm: f64,
    /// Contract bonus applies when fewer than this many days remain.
    pub contract_window_days: i64,
}

impl Default for BonusRules {
    fn default() -> Self {
        Self {
            european_competitions: EUROPEAN_COMPETITIONS.iter().map(|s| s.to_string()).collect(),
            min_european_appearances: 10,
            winger_sub_positions: vec!["Right Winger".to_string(), "Left Winger".to_string()],
            height_threshold_cm: 182.0,
            contract_window_days: 365,
        }
    }
}

impl BonusRules {
    pub fn is_european(&self, competition_id: &str) -> bool {
        self.european_competitions.iter().any(|c| c == competition_id)
    }
}

pub fn european_appearances(rows: &[&AppearanceRecord], rules: &BonusRules) -> usize {
    rows.iter()
        .filter(|r| r.competition_id.as_deref().is_some_and(|c| rules.is_european(c)))
        .count()
}

pub fn euro_bonus(european_appearances: usize, rules: &BonusRules) -> u8 {
    u8::from(european_appearances >= rules.min_european_appearances)
}

pub fn ambi_bonus(foot: Option<Foot>) -> u8 {
    u8::from(foot == Some(Foot::Both))
}

pub fn height_bonus(sub_position: Option<&str>, height_in_cm: Option<f64>, rules: &BonusRules) -> u8 {
    let (Some(sub_position), Some(height)) = (sub_position, height_in_cm) else {
        return 0;
    };
    let winger = rules.winger_sub_positions.iter().any(|w| w == sub_position);
    u8::from(!winger && height > rules.height_threshold_cm)
}

/// Already-expired contracts count as expiring (negative day difference).
pub fn contract_bonus(expiration: Option<NaiveDate>, today: NaiveDate, rules: &BonusRules) -> u8 {
    let Some(expiration) = expiration else {
        return 0;
    };
    u8::from((expiration - today).num_days() < rules.contract_window_days)
}

/// Yellow and red card rates for one player: the mean over appearance rows of
/// each row's cards scaled by the player's total minutes.
pub fn card_rates(rows: &[&AppearanceRecord], total_minutes: i64) -> (f64, f64) {
    if rows.is_empty() {
        return (0.0, 0.0);
    }
    let mut yellows = 0.0;
    let mut reds = 0.0;
    for row in rows {
        yellows += per_90(row.yellow_cards.unwrap_or(0) as f64, total_minutes);
        reds += per_90(row.red_cards.unwrap_or(0) as f64, total_minutes);
    }
    let n = rows.len() as f64;
    (yellows / n, reds / n)
}

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Local, NaiveDate};

use crate::bonus::BonusRules;
use crate::dataset::parse_date;
use crate::eligibility::EligibilityRules;
use crate::error::ConfigError;
use crate::scoring::ScoringWeights;

const DEFAULT_DATA_DIR: &str = "data/raw";
const DEFAULT_OUTPUT_PATH: &str = "data/final/final_df.csv";
const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSettings {
    /// Reference "today" for ages, contract windows and the export stamp.
    pub run_date: NaiveDate,
    pub top_n: usize,
    pub weights: ScoringWeights,
    pub eligibility: EligibilityRules,
    pub bonus: BonusRules,
}

impl ScoringSettings {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            run_date,
            top_n: DEFAULT_TOP_N,
            weights: ScoringWeights::default(),
            eligibility: EligibilityRules::default(),
            bonus: BonusRules::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_path: PathBuf,
    pub xlsx_path: Option<PathBuf>,
    pub threads: Option<usize>,
    pub upload: bool,
    pub scoring: ScoringSettings,
}

impl PipelineConfig {
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Flags win over environment values, which win over defaults.
    pub fn resolve(
        args: &[String],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let setting = |flag: &str, env_key: &str| -> Option<(String, String)> {
            if let Some(v) = arg_value(args, flag) {
                return Some((flag.to_string(), v));
            }
            lookup(env_key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (env_key.to_string(), v.trim().to_string()))
        };

        let data_dir = setting("--data-dir", "GEM_DATA_DIR")
            .map(|(_, v)| PathBuf::from(v))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let output_path = setting("--out", "GEM_OUTPUT_PATH")
            .map(|(_, v)| PathBuf::from(v))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));
        let xlsx_path = setting("--xlsx", "GEM_XLSX_PATH").map(|(_, v)| PathBuf::from(v));

        let run_date = match setting("--run-date", "GEM_RUN_DATE") {
            Some((key, raw)) => parse_date(&raw).ok_or(ConfigError::Invalid { key, value: raw })?,
            None => Local::now().date_naive(),
        };

        let mut scoring = ScoringSettings::new(run_date);
        if let Some((key, raw)) = setting("--top", "GEM_TOP_N") {
            scoring.top_n = parse_value(&key, &raw)?;
        }
        scoring.eligibility.include_juniors = has_flag(args, "--include-juniors")
            || parse_env_flag(&lookup, "GEM_INCLUDE_JUNIORS")?;
        scoring.weights = weights_from_lookup(&lookup)?;

        let threads = match setting("--threads", "GEM_THREADS") {
            Some((key, raw)) => Some(parse_value::<usize>(&key, &raw)?.max(1)),
            None => None,
        };

        Ok(Self {
            data_dir,
            output_path,
            xlsx_path,
            threads,
            upload: has_flag(args, "--upload"),
            scoring,
        })
    }
}

pub fn weights_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<ScoringWeights, ConfigError> {
    let mut weights = ScoringWeights::default();
    let slots: [(&str, &mut f64); 8] = [
        ("GEM_WEIGHT_GOALS", &mut weights.goals),
        ("GEM_WEIGHT_ASSISTS", &mut weights.assists),
        ("GEM_WEIGHT_AMBI", &mut weights.ambidextrous),
        ("GEM_WEIGHT_HEIGHT", &mut weights.height),
        ("GEM_WEIGHT_EURO", &mut weights.european),
        ("GEM_WEIGHT_CONTRACT", &mut weights.contract),
        ("GEM_WEIGHT_YELLOW", &mut weights.yellow_cards),
        ("GEM_WEIGHT_RED", &mut weights.red_cards),
    ];
    for (key, slot) in slots {
        let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let value: f64 = parse_value(key, &raw)?;
        if !value.is_finite() {
            return Err(ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            });
        }
        *slot = value;
    }
    Ok(weights)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn parse_env_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
    }
}

pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

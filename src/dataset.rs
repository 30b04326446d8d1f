use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::LoadError;

pub const PLAYERS_FILE: &str = "players.csv";
pub const APPEARANCES_FILE: &str = "appearances.csv";
pub const VALUATIONS_FILE: &str = "player_valuations.csv";
pub const GAME_EVENTS_FILE: &str = "game_events.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Foot {
    Left,
    Right,
    Both,
}

impl Foot {
    pub fn parse(raw: &str) -> Option<Foot> {
        match raw.trim() {
            "left" => Some(Foot::Left),
            "right" => Some(Foot::Right),
            "both" => Some(Foot::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player_id: u64,
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub position: Option<String>,
    pub sub_position: Option<String>,
    pub foot: Option<Foot>,
    pub height_in_cm: Option<f64>,
    pub contract_expiration_date: Option<NaiveDate>,
    pub current_club_name: Option<String>,
    pub market_value_in_eur: Option<f64>,
    pub image_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppearanceRecord {
    pub player_id: u64,
    pub date: Option<NaiveDate>,
    pub competition_id: Option<String>,
    pub goals: Option<i64>,
    pub assists: Option<i64>,
    pub minutes_played: Option<i64>,
    pub yellow_cards: Option<i64>,
    pub red_cards: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationRecord {
    pub player_id: u64,
    pub date: Option<NaiveDate>,
    pub market_value_in_eur: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameEventRecord {
    pub game_id: Option<u64>,
    pub player_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub minute: Option<i64>,
    pub event_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub players: Vec<PlayerRecord>,
    pub appearances: Vec<AppearanceRecord>,
    pub valuations: Vec<ValuationRecord>,
    pub game_events: Vec<GameEventRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableReport {
    pub rows: usize,
    /// Rows dropped entirely (unreadable record, missing key, duplicate key).
    pub skipped: usize,
    /// Individual values present in the file that failed to parse and were nulled.
    pub malformed_values: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadReport {
    pub players: TableReport,
    pub appearances: TableReport,
    pub valuations: TableReport,
    pub game_events: TableReport,
}

// ---------------------------------------------------------------------------
// Raw CSV rows. Everything is text so one bad cell nulls a value instead of
// rejecting the whole record.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(default)]
    player_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date_of_birth: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    sub_position: Option<String>,
    #[serde(default)]
    foot: Option<String>,
    #[serde(default)]
    height_in_cm: Option<String>,
    #[serde(default)]
    contract_expiration_date: Option<String>,
    #[serde(default)]
    current_club_name: Option<String>,
    #[serde(default)]
    market_value_in_eur: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAppearance {
    #[serde(default)]
    player_id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    competition_id: Option<String>,
    #[serde(default)]
    goals: Option<String>,
    #[serde(default)]
    assists: Option<String>,
    #[serde(default)]
    minutes_played: Option<String>,
    #[serde(default)]
    yellow_cards: Option<String>,
    #[serde(default)]
    red_cards: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValuation {
    #[serde(default)]
    player_id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    market_value_in_eur: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGameEvent {
    #[serde(default)]
    game_id: Option<String>,
    #[serde(default)]
    player_id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    minute: Option<String>,
    #[serde(default, rename = "type")]
    event_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Accepts `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Integer text, or float text with no fractional part ("3.0").
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
        Some(v as i64)
    } else {
        None
    }
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Default)]
struct Coercer {
    malformed: usize,
}

impl Coercer {
    fn coerce<T>(&mut self, raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let s = non_empty(raw)?;
        let parsed = parse(s);
        if parsed.is_none() {
            self.malformed += 1;
        }
        parsed
    }

    fn date(&mut self, raw: Option<&str>) -> Option<NaiveDate> {
        self.coerce(raw, parse_date)
    }

    fn float(&mut self, raw: Option<&str>) -> Option<f64> {
        self.coerce(raw, parse_float)
    }

    fn int(&mut self, raw: Option<&str>) -> Option<i64> {
        self.coerce(raw, parse_int)
    }

    fn count(&mut self, raw: Option<&str>) -> Option<i64> {
        self.coerce(raw, |s| parse_int(s).filter(|v| *v >= 0))
    }

    fn id(&mut self, raw: Option<&str>) -> Option<u64> {
        self.coerce(raw, parse_id)
    }

    fn foot(&mut self, raw: Option<&str>) -> Option<Foot> {
        self.coerce(raw, Foot::parse)
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    parse_int(raw).and_then(|v| u64::try_from(v).ok())
}

fn text(raw: Option<String>) -> Option<String> {
    non_empty(raw.as_deref()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

pub fn read_players<R: Read>(rdr: R) -> Result<(Vec<PlayerRecord>, TableReport), csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut report = TableReport::default();
    let mut coercer = Coercer::default();
    let mut seen = HashSet::new();
    let mut players = Vec::new();

    for result in reader.deserialize::<RawPlayer>() {
        report.rows += 1;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed players row: {e}");
                report.skipped += 1;
                continue;
            }
        };
        let Some(player_id) = coercer.id(raw.player_id.as_deref()) else {
            warn!("skipping players row without a usable player_id");
            report.skipped += 1;
            continue;
        };
        if !seen.insert(player_id) {
            warn!("duplicate player_id {player_id}, keeping first occurrence");
            report.skipped += 1;
            continue;
        }
        players.push(PlayerRecord {
            player_id,
            name: text(raw.name),
            date_of_birth: coercer.date(raw.date_of_birth.as_deref()),
            position: text(raw.position),
            sub_position: text(raw.sub_position),
            foot: coercer.foot(raw.foot.as_deref()),
            height_in_cm: coercer.float(raw.height_in_cm.as_deref()),
            contract_expiration_date: coercer.date(raw.contract_expiration_date.as_deref()),
            current_club_name: text(raw.current_club_name),
            market_value_in_eur: coercer.float(raw.market_value_in_eur.as_deref()),
            image_url: text(raw.image_url),
            url: text(raw.url),
        });
    }

    report.malformed_values = coercer.malformed;
    Ok((players, report))
}

pub fn read_appearances<R: Read>(
    rdr: R,
) -> Result<(Vec<AppearanceRecord>, TableReport), csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut report = TableReport::default();
    let mut coercer = Coercer::default();
    let mut appearances = Vec::new();

    for result in reader.deserialize::<RawAppearance>() {
        report.rows += 1;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed appearances row: {e}");
                report.skipped += 1;
                continue;
            }
        };
        let Some(player_id) = coercer.id(raw.player_id.as_deref()) else {
            report.skipped += 1;
            continue;
        };
        appearances.push(AppearanceRecord {
            player_id,
            date: coercer.date(raw.date.as_deref()),
            competition_id: text(raw.competition_id),
            goals: coercer.count(raw.goals.as_deref()),
            assists: coercer.count(raw.assists.as_deref()),
            minutes_played: coercer.count(raw.minutes_played.as_deref()),
            yellow_cards: coercer.count(raw.yellow_cards.as_deref()),
            red_cards: coercer.count(raw.red_cards.as_deref()),
        });
    }

    if report.skipped > 0 {
        warn!("{} appearances rows skipped", report.skipped);
    }
    report.malformed_values = coercer.malformed;
    Ok((appearances, report))
}

pub fn read_valuations<R: Read>(
    rdr: R,
) -> Result<(Vec<ValuationRecord>, TableReport), csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut report = TableReport::default();
    let mut coercer = Coercer::default();
    let mut valuations = Vec::new();

    for result in reader.deserialize::<RawValuation>() {
        report.rows += 1;
        let Ok(raw) = result else {
            report.skipped += 1;
            continue;
        };
        let Some(player_id) = coercer.id(raw.player_id.as_deref()) else {
            report.skipped += 1;
            continue;
        };
        valuations.push(ValuationRecord {
            player_id,
            date: coercer.date(raw.date.as_deref()),
            market_value_in_eur: coercer.float(raw.market_value_in_eur.as_deref()),
        });
    }

    report.malformed_values = coercer.malformed;
    Ok((valuations, report))
}

pub fn read_game_events<R: Read>(
    rdr: R,
) -> Result<(Vec<GameEventRecord>, TableReport), csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut report = TableReport::default();
    let mut coercer = Coercer::default();
    let mut events = Vec::new();

    for result in reader.deserialize::<RawGameEvent>() {
        report.rows += 1;
        let Ok(raw) = result else {
            report.skipped += 1;
            continue;
        };
        events.push(GameEventRecord {
            game_id: coercer.id(raw.game_id.as_deref()),
            player_id: coercer.id(raw.player_id.as_deref()),
            date: coercer.date(raw.date.as_deref()),
            minute: coercer.int(raw.minute.as_deref()),
            event_type: text(raw.event_type),
        });
    }

    report.malformed_values = coercer.malformed;
    Ok((events, report))
}

// ---------------------------------------------------------------------------
// Path-based loaders
// ---------------------------------------------------------------------------

fn load_table<T>(
    dir: &Path,
    file_name: &str,
    read: impl FnOnce(File) -> Result<(Vec<T>, TableReport), csv::Error>,
) -> Result<(Vec<T>, TableReport), LoadError> {
    let path = dir.join(file_name);
    let file = File::open(&path).map_err(|e| LoadError::io(&path, e))?;
    let (rows, report) = read(file).map_err(|e| LoadError::csv(&path, e))?;
    info!(
        "loaded {file_name}: {} rows kept of {}, {} skipped, {} malformed values",
        rows.len(),
        report.rows,
        report.skipped,
        report.malformed_values
    );
    Ok((rows, report))
}

/// Load the four raw tables from `dir`. The whole load fails if any file is
/// missing or unreadable; individual bad values are nulled and counted.
pub fn load_dataset(dir: &Path) -> Result<(Dataset, LoadReport), LoadError> {
    let (players, players_report) = load_table(dir, PLAYERS_FILE, read_players)?;
    let (appearances, appearances_report) =
        load_table(dir, APPEARANCES_FILE, read_appearances)?;
    let (valuations, valuations_report) = load_table(dir, VALUATIONS_FILE, read_valuations)?;
    let (game_events, game_events_report) =
        load_table(dir, GAME_EVENTS_FILE, read_game_events)?;

    if players.is_empty() {
        return Err(LoadError::Validation(format!(
            "{PLAYERS_FILE} produced zero valid rows"
        )));
    }
    if appearances.is_empty() {
        return Err(LoadError::Validation(format!(
            "{APPEARANCES_FILE} produced zero valid rows"
        )));
    }

    Ok((
        Dataset {
            players,
            appearances,
            valuations,
            game_events,
        },
        LoadReport {
            players: players_report,
            appearances: appearances_report,
            valuations: valuations_report,
            game_events: game_events_report,
        },
    ))
}

pub type AppearanceIndex<'a> = HashMap<u64, Vec<&'a AppearanceRecord>>;

pub fn index_by_player(appearances: &[AppearanceRecord]) -> AppearanceIndex<'_> {
    let mut index: AppearanceIndex<'_> = HashMap::new();
    for row in appearances {
        index.entry(row.player_id).or_default().push(row);
    }
    index
}

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use gem_scout::dataset::{AppearanceRecord, Foot, PlayerRecord};

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

pub fn player(player_id: u64, date_of_birth: &str, position: &str, sub_position: &str) -> PlayerRecord {
    PlayerRecord {
        player_id,
        name: Some(format!("Player {player_id}")),
        date_of_birth: Some(date(date_of_birth)),
        position: Some(position.to_string()),
        sub_position: Some(sub_position.to_string()),
        foot: Some(Foot::Right),
        height_in_cm: Some(178.0),
        contract_expiration_date: Some(date("2030-06-30")),
        current_club_name: Some("Test FC".to_string()),
        market_value_in_eur: Some(1_000_000.0),
        image_url: None,
        url: None,
    }
}

pub fn appearance(player_id: u64, on: &str, competition: &str, minutes: i64) -> AppearanceRecord {
    AppearanceRecord {
        player_id,
        date: Some(date(on)),
        competition_id: Some(competition.to_string()),
        goals: Some(0),
        assists: Some(0),
        minutes_played: Some(minutes),
        yellow_cards: Some(0),
        red_cards: Some(0),
    }
}

/// Fresh scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gem_scout_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

pub const PLAYERS_HEADER: &str = "player_id,name,last_season,date_of_birth,sub_position,position,foot,height_in_cm,contract_expiration_date,current_club_name,market_value_in_eur,image_url,url";
pub const APPEARANCES_HEADER: &str = "appearance_id,game_id,player_id,date,competition_id,yellow_cards,red_cards,goals,assists,minutes_played";

/// Writes the four source tables. Valuations and game events get a couple of
/// placeholder rows since they do not feed the score.
pub fn write_dataset(dir: &Path, players: &[String], appearances: &[String]) {
    let mut players_csv = String::from(PLAYERS_HEADER);
    for row in players {
        players_csv.push('\n');
        players_csv.push_str(row);
    }
    let mut appearances_csv = String::from(APPEARANCES_HEADER);
    for row in appearances {
        appearances_csv.push('\n');
        appearances_csv.push_str(row);
    }
    fs::write(dir.join("players.csv"), players_csv).expect("write players");
    fs::write(dir.join("appearances.csv"), appearances_csv).expect("write appearances");
    fs::write(
        dir.join("player_valuations.csv"),
        "player_id,date,market_value_in_eur,current_club_id\n1,2024-01-01,4000000,10\n2,2024-01-01,900000,11\n",
    )
    .expect("write valuations");
    fs::write(
        dir.join("game_events.csv"),
        "game_event_id,date,game_id,minute,type,club_id,player_id\nabc,2024-03-01,100,12,Goals,10,1\n",
    )
    .expect("write game events");
}

/// `count` appearance rows, one per week starting on `start`.
pub fn appearance_rows(
    first_id: u64,
    player_id: u64,
    start: &str,
    count: usize,
    competition: &str,
    minutes: i64,
    goals_every: usize,
) -> Vec<String> {
    let start = date(start);
    (0..count)
        .map(|i| {
            let on = start + chrono::Duration::days(7 * i as i64);
            let goals = if goals_every > 0 && i % goals_every == 0 { 1 } else { 0 };
            format!(
                "{}_{},{},{},{},{},0,0,{},0,{}",
                first_id,
                i,
                first_id + i as u64,
                player_id,
                on.format("%Y-%m-%d"),
                competition,
                goals,
                minutes
            )
        })
        .collect()
}

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::AppConfig;
use crate::dataset;
use crate::http::{fetch_json_cached, http_client};
use crate::records::{FixtureRecord, PlayerGameweekRecord, PlayerRecord, TeamRecord};

const FPL_API_BASE: &str = "https://fantasy.premierleague.com/api";

/// Players whose status marks them as unavailable/removed from the game.
const STATUS_UNAVAILABLE: &str = "u";

#[derive(Debug, Clone)]
pub struct RefreshSummary {
    pub players: usize,
    pub teams: usize,
    pub fixtures: usize,
    pub gameweek_rows: usize,
}

/// Fetch the three FPL endpoints sequentially and persist the four source
/// tables as CSV. One request at a time, no retry; the first failure
/// propagates to the caller.
pub fn refresh_all(config: &AppConfig) -> Result<RefreshSummary> {
    let client = http_client(config.http_timeout_secs)?;
    let max_age = Duration::from_secs(config.cache_max_age_secs);

    let bootstrap = fetch_json_cached(client, &format!("{FPL_API_BASE}/bootstrap-static/"), max_age)
        .context("bootstrap-static request failed")?;
    let players = parse_bootstrap_players(&bootstrap)?;
    let teams = parse_bootstrap_teams(&bootstrap)?;

    let fixtures_body = fetch_json_cached(client, &format!("{FPL_API_BASE}/fixtures/"), max_age)
        .context("fixtures request failed")?;
    let fixtures = parse_fixtures_json(&fixtures_body)?;

    let mut gameweeks = Vec::new();
    for player in &players {
        let url = format!("{FPL_API_BASE}/element-summary/{}/", player.id);
        let body = fetch_json_cached(client, &url, max_age)
            .with_context(|| format!("element-summary request failed for player {}", player.id))?;
        let history = parse_element_history_json(&body)
            .with_context(|| format!("invalid element-summary json for player {}", player.id))?;
        gameweeks.extend(history);
    }

    let paths = config.data_paths();
    dataset::save_table(&paths.players, &players)?;
    dataset::save_table(&paths.teams, &teams)?;
    dataset::save_table(&paths.fixtures, &fixtures)?;
    dataset::save_table(&paths.players_gw, &gameweeks)?;

    Ok(RefreshSummary {
        players: players.len(),
        teams: teams.len(),
        fixtures: fixtures.len(),
        gameweek_rows: gameweeks.len(),
    })
}

/// Active players from the bootstrap-static payload. Players flagged
/// unavailable are dropped, matching what the dashboard can select.
pub fn parse_bootstrap_players(raw: &str) -> Result<Vec<PlayerRecord>> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid bootstrap json")?;
    let elements = v
        .get("elements")
        .and_then(|x| x.as_array())
        .context("bootstrap json has no elements array")?;

    let mut out = Vec::new();
    for item in elements {
        let status = item
            .get("status")
            .and_then(|x| x.as_str())
            .unwrap_or_default();
        if status == STATUS_UNAVAILABLE {
            continue;
        }
        if let Some(p) = parse_player(item, status) {
            out.push(p);
        }
    }
    Ok(out)
}

pub fn parse_bootstrap_teams(raw: &str) -> Result<Vec<TeamRecord>> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid bootstrap json")?;
    let teams = v
        .get("teams")
        .and_then(|x| x.as_array())
        .context("bootstrap json has no teams array")?;

    let mut out = Vec::new();
    for item in teams {
        if let Some(t) = parse_team(item) {
            out.push(t);
        }
    }
    Ok(out)
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<FixtureRecord>> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid fixtures json")?;
    let fixtures = v.as_array().context("fixtures json is not an array")?;

    let mut out = Vec::new();
    for item in fixtures {
        if let Some(f) = parse_fixture(item) {
            out.push(f);
        }
    }
    Ok(out)
}

/// Per-gameweek rows from an element-summary payload's `history` array.
pub fn parse_element_history_json(raw: &str) -> Result<Vec<PlayerGameweekRecord>> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid element-summary json")?;
    let history = v
        .get("history")
        .and_then(|x| x.as_array())
        .context("element-summary json has no history array")?;

    let mut out = Vec::new();
    for item in history {
        if let Some(row) = parse_history_row(item) {
            out.push(row);
        }
    }
    Ok(out)
}

fn parse_player(v: &Value, status: &str) -> Option<PlayerRecord> {
    Some(PlayerRecord {
        id: u32_field(v, "id")?,
        web_name: v.get("web_name")?.as_str()?.to_string(),
        status: status.to_string(),
        element_type: u32_field(v, "element_type")? as u8,
        team_code: u32_field(v, "team_code")?,
        now_cost: u32_field(v, "now_cost")?,
        total_points: i32_field(v, "total_points")?,
        points_per_game: f64_field(v, "points_per_game").unwrap_or(0.0),
        influence: f64_field(v, "influence").unwrap_or(0.0),
        creativity: f64_field(v, "creativity").unwrap_or(0.0),
        threat: f64_field(v, "threat").unwrap_or(0.0),
        ict_index: f64_field(v, "ict_index").unwrap_or(0.0),
    })
}

fn parse_team(v: &Value) -> Option<TeamRecord> {
    Some(TeamRecord {
        id: u32_field(v, "id")?,
        code: u32_field(v, "code")?,
        name: v.get("name")?.as_str()?.to_string(),
        short_name: v.get("short_name")?.as_str()?.to_string(),
        strength: u32_field(v, "strength").unwrap_or(0),
    })
}

fn parse_fixture(v: &Value) -> Option<FixtureRecord> {
    Some(FixtureRecord {
        event: u32_field(v, "event"),
        team_h: u32_field(v, "team_h")?,
        team_a: u32_field(v, "team_a")?,
        team_h_difficulty: u32_field(v, "team_h_difficulty")?,
        team_a_difficulty: u32_field(v, "team_a_difficulty")?,
        team_h_score: u32_field(v, "team_h_score"),
        team_a_score: u32_field(v, "team_a_score"),
        kickoff_time: v
            .get("kickoff_time")
            .and_then(|x| x.as_str())
            .map(|s| s.to_string()),
        finished: v.get("finished").and_then(|x| x.as_bool()).unwrap_or(false),
    })
}

fn parse_history_row(v: &Value) -> Option<PlayerGameweekRecord> {
    Some(PlayerGameweekRecord {
        element: u32_field(v, "element")?,
        round: u32_field(v, "round")?,
        total_points: i32_field(v, "total_points")?,
        minutes: u32_field(v, "minutes").unwrap_or(0),
        goals_scored: u32_field(v, "goals_scored").unwrap_or(0),
        assists: u32_field(v, "assists").unwrap_or(0),
        clean_sheets: u32_field(v, "clean_sheets").unwrap_or(0),
    })
}

fn u32_field(v: &Value, key: &str) -> Option<u32> {
    v.get(key)?.as_u64().map(|n| n as u32)
}

fn i32_field(v: &Value, key: &str) -> Option<i32> {
    v.get(key)?.as_i64().map(|n| n as i32)
}

// FPL serves its rate metrics as decimal strings ("5.5"), so accept either
// a number or a parseable string.
fn f64_field(v: &Value, key: &str) -> Option<f64> {
    let value = v.get(key)?;
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    value.as_str().and_then(|s| s.trim().parse::<f64>().ok())
}

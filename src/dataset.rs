use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PrepError;
use crate::records::columns;
use crate::records::{FixtureRecord, PlayerGameweekRecord, PlayerRecord, TeamRecord};

/// CSV boundary: each table is delimited text with a header row. Loads
/// validate path and required columns once; rows come back fully typed.
pub fn load_players(path: &Path) -> Result<Vec<PlayerRecord>, PrepError> {
    load_table(path, "players", &columns::players::REQUIRED)
}

pub fn load_players_gw(path: &Path) -> Result<Vec<PlayerGameweekRecord>, PrepError> {
    load_table(path, "players_gw", &columns::players_gw::REQUIRED)
}

pub fn load_teams(path: &Path) -> Result<Vec<TeamRecord>, PrepError> {
    load_table(path, "teams", &columns::teams::REQUIRED)
}

pub fn load_fixtures(path: &Path) -> Result<Vec<FixtureRecord>, PrepError> {
    load_table(path, "fixtures", &columns::fixtures::REQUIRED)
}

fn load_table<T: DeserializeOwned>(
    path: &Path,
    table: &'static str,
    required: &[&str],
) -> Result<Vec<T>, PrepError> {
    if !path.exists() {
        return Err(PrepError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PrepError::Schema {
            table,
            columns: missing,
        });
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<T>() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Write a table as CSV with a header row. Writes to a sibling tmp file and
/// renames over the target so readers never observe a half-written table.
pub fn save_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), PrepError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_players(&dir.path().join("players.csv")).unwrap_err();
        assert!(matches!(err, PrepError::MissingInput { .. }));
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players_gw.csv");
        fs::write(&path, "element,round\n1,1\n").unwrap();
        let err = load_players_gw(&path).unwrap_err();
        match err {
            PrepError::Schema { table, columns } => {
                assert_eq!(table, "players_gw");
                assert!(columns.contains(&"total_points".to_string()));
                assert!(!columns.contains(&"round".to_string()));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn save_then_load_round_trips_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.csv");
        let rows = vec![FixtureRecord {
            event: None,
            team_h: 3,
            team_a: 7,
            team_h_difficulty: 2,
            team_a_difficulty: 4,
            team_h_score: Some(1),
            team_a_score: None,
            kickoff_time: Some("2026-08-15T14:00:00Z".to_string()),
            finished: true,
        }];
        save_table(&path, &rows).unwrap();
        let loaded = load_fixtures(&path).unwrap();
        assert_eq!(loaded, rows);
    }
}

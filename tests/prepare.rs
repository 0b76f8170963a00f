use std::path::Path;

use fpl_terminal::config::DataPaths;
use fpl_terminal::error::PrepError;
use fpl_terminal::prepare;
use fpl_terminal::records::Position;

fn fixture_paths() -> DataPaths {
    DataPaths::from_dir(Path::new("tests/fixtures"))
}

#[test]
fn load_all_builds_all_four_tables() {
    let tables = prepare::load_all(&fixture_paths()).unwrap();
    assert!(!tables.performance.is_empty());
    assert!(!tables.cost_performance.is_empty());
    assert!(!tables.ict.is_empty());
    assert!(!tables.fixture_difficulty.is_empty());
}

#[test]
fn performance_groups_and_joins() {
    let tables = prepare::load_all(&fixture_paths()).unwrap();
    let rows = &tables.performance;

    // 7 source rows, but player 3's double gameweek collapses into one.
    assert_eq!(rows.len(), 6);

    // Ordered by (gameweek, player id).
    let gameweeks: Vec<u32> = rows.iter().map(|r| r.gameweek).collect();
    assert_eq!(gameweeks, vec![1, 1, 1, 1, 2, 2]);

    let raya = rows
        .iter()
        .find(|r| r.player_name.as_deref() == Some("Raya") && r.gameweek == 1)
        .unwrap();
    assert_eq!(raya.total_points, 9);
    assert_eq!(raya.minutes, 180);
    assert_eq!(raya.clean_sheets, 2);

    // Player 99 has no match in the players table.
    let orphan = rows.iter().find(|r| r.player_name.is_none()).unwrap();
    assert_eq!(orphan.total_points, 7);
}

#[test]
fn cost_performance_maps_team_and_position() {
    let tables = prepare::load_all(&fixture_paths()).unwrap();
    let rows = &tables.cost_performance;
    assert_eq!(rows.len(), 5);

    let salah = rows.iter().find(|r| r.web_name == "Salah").unwrap();
    assert_eq!(salah.team_name.as_deref(), Some("Liverpool"));
    assert_eq!(salah.position, Some(Position::MID));
    assert_eq!(salah.now_cost, 130);

    // Unknown element_type and team_code both degrade to None.
    let mystery = rows.iter().find(|r| r.web_name == "Mystery").unwrap();
    assert_eq!(mystery.team_name, None);
    assert_eq!(mystery.position, None);
}

#[test]
fn fixture_difficulty_doubles_rows_and_sorts_unscheduled_first() {
    let tables = prepare::load_all(&fixture_paths()).unwrap();
    let rows = &tables.fixture_difficulty;

    // 3 fixtures produce 6 directional rows.
    assert_eq!(rows.len(), 6);

    // Unscheduled fixtures sort ahead of any gameweek.
    assert_eq!(rows[0].event, None);
    assert_eq!(rows[1].event, None);
    assert_eq!(rows[2].event, Some(1));

    // Each fixture's two rows swap the team/difficulty pairs.
    let home_first = rows
        .iter()
        .find(|r| r.event == Some(2) && r.first_team_name.as_deref() == Some("Arsenal"))
        .unwrap();
    let away_first = rows
        .iter()
        .find(|r| r.event == Some(2) && r.first_team_name.as_deref() == Some("Liverpool"))
        .unwrap();
    assert_eq!(home_first.first_team_difficulty, away_first.second_team_difficulty);
    assert_eq!(home_first.second_team_difficulty, away_first.first_team_difficulty);
    assert_eq!(home_first.second_team_name.as_deref(), Some("Liverpool"));
    assert_eq!(away_first.second_team_name.as_deref(), Some("Arsenal"));
}

#[test]
fn transforms_are_idempotent_over_reload() {
    let first = prepare::load_all(&fixture_paths()).unwrap();
    let second = prepare::load_all(&fixture_paths()).unwrap();
    assert_eq!(first.performance, second.performance);
    assert_eq!(first.cost_performance, second.cost_performance);
    assert_eq!(first.ict, second.ict);
    assert_eq!(first.fixture_difficulty, second.fixture_difficulty);
}

#[test]
fn missing_table_reports_its_path() {
    let paths = DataPaths::from_dir(Path::new("tests/does_not_exist"));
    let err = prepare::load_all(&paths).unwrap_err();
    match err {
        PrepError::MissingInput { path } => {
            assert!(path.starts_with("tests/does_not_exist"));
        }
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

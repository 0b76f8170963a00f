use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::config::DataPaths;
use crate::dataset;
use crate::error::PrepError;
use crate::records::{
    CostPerformanceRow, FixtureDifficultyRow, FixtureRecord, IctRow, PerformanceRow,
    PlayerGameweekRecord, PlayerRecord, Position, TeamRecord,
};

/// All four derived tables, built fresh from one set of source tables.
#[derive(Debug, Clone, Default)]
pub struct DerivedTables {
    pub performance: Vec<PerformanceRow>,
    pub cost_performance: Vec<CostPerformanceRow>,
    pub ict: Vec<IctRow>,
    pub fixture_difficulty: Vec<FixtureDifficultyRow>,
}

pub fn load_all(paths: &DataPaths) -> Result<DerivedTables, PrepError> {
    Ok(DerivedTables {
        performance: load_performance_by_gameweek(&paths.players_gw, &paths.players)?,
        cost_performance: load_cost_vs_performance(&paths.players, &paths.teams)?,
        ict: load_ict_breakdown(&paths.players)?,
        fixture_difficulty: load_fixtures_difficulty(&paths.fixtures, &paths.teams)?,
    })
}

/// Player performance by gameweek: group the gameweek table by
/// (round, element), sum the stat fields within each group, then left-join
/// the players table to attach names. A player with several partial entries
/// for the same round collapses into one row.
///
/// Output is ordered by (gameweek, element), so re-running on unchanged
/// input yields an identical table.
pub fn performance_by_gameweek(
    gameweeks: &[PlayerGameweekRecord],
    players: &[PlayerRecord],
) -> Vec<PerformanceRow> {
    #[derive(Default)]
    struct Totals {
        total_points: i32,
        minutes: u32,
        goals_scored: u32,
        assists: u32,
        clean_sheets: u32,
    }

    let mut groups: BTreeMap<(u32, u32), Totals> = BTreeMap::new();
    for gw in gameweeks {
        let entry = groups.entry((gw.round, gw.element)).or_default();
        entry.total_points += gw.total_points;
        entry.minutes += gw.minutes;
        entry.goals_scored += gw.goals_scored;
        entry.assists += gw.assists;
        entry.clean_sheets += gw.clean_sheets;
    }

    let names: HashMap<u32, &str> = players
        .iter()
        .map(|p| (p.id, p.web_name.as_str()))
        .collect();

    groups
        .into_iter()
        .map(|((round, element), totals)| PerformanceRow {
            gameweek: round,
            player_name: names.get(&element).map(|name| name.to_string()),
            total_points: totals.total_points,
            minutes: totals.minutes,
            goals_scored: totals.goals_scored,
            assists: totals.assists,
            clean_sheets: totals.clean_sheets,
        })
        .collect()
}

pub fn load_performance_by_gameweek(
    players_gw_path: &Path,
    players_path: &Path,
) -> Result<Vec<PerformanceRow>, PrepError> {
    let gameweeks = dataset::load_players_gw(players_gw_path)?;
    let players = dataset::load_players(players_path)?;
    Ok(performance_by_gameweek(&gameweeks, &players))
}

/// Player cost vs. performance: left-join players to teams on
/// team_code = code and map element_type codes onto positions. Unknown team
/// codes and position codes survive as None, never a failure.
pub fn cost_vs_performance(
    players: &[PlayerRecord],
    teams: &[TeamRecord],
) -> Vec<CostPerformanceRow> {
    let team_names: HashMap<u32, &str> =
        teams.iter().map(|t| (t.code, t.name.as_str())).collect();

    players
        .iter()
        .map(|p| CostPerformanceRow {
            web_name: p.web_name.clone(),
            now_cost: p.now_cost,
            total_points: p.total_points,
            points_per_game: p.points_per_game,
            team_name: team_names.get(&p.team_code).map(|name| name.to_string()),
            position: Position::from_element_type(p.element_type),
        })
        .collect()
}

pub fn load_cost_vs_performance(
    players_path: &Path,
    teams_path: &Path,
) -> Result<Vec<CostPerformanceRow>, PrepError> {
    let players = dataset::load_players(players_path)?;
    let teams = dataset::load_teams(teams_path)?;
    Ok(cost_vs_performance(&players, &teams))
}

/// ICT index breakdown: a straight projection of the four metric columns.
pub fn ict_breakdown(players: &[PlayerRecord]) -> Vec<IctRow> {
    players
        .iter()
        .map(|p| IctRow {
            web_name: p.web_name.clone(),
            influence: p.influence,
            creativity: p.creativity,
            threat: p.threat,
            ict_index: p.ict_index,
        })
        .collect()
}

pub fn load_ict_breakdown(players_path: &Path) -> Result<Vec<IctRow>, PrepError> {
    let players = dataset::load_players(players_path)?;
    Ok(ict_breakdown(&players))
}

/// Fixture difficulty ratings: join team identity onto both sides of every
/// fixture, then emit two directional rows per fixture (home-as-first
/// followed by away-as-first) and stable-sort the lot by event. Unscheduled
/// fixtures keep a null event and sort first.
pub fn fixtures_difficulty(
    fixtures: &[FixtureRecord],
    teams: &[TeamRecord],
) -> Vec<FixtureDifficultyRow> {
    let identity: HashMap<u32, (&str, &str)> = teams
        .iter()
        .map(|t| (t.id, (t.name.as_str(), t.short_name.as_str())))
        .collect();
    let name_of = |id: u32| identity.get(&id).map(|(name, _)| name.to_string());
    let short_of = |id: u32| identity.get(&id).map(|(_, short)| short.to_string());

    let mut rows = Vec::with_capacity(fixtures.len() * 2);
    for f in fixtures {
        rows.push(FixtureDifficultyRow {
            event: f.event,
            first_team_name: name_of(f.team_h),
            first_team_short_name: short_of(f.team_h),
            first_team_difficulty: f.team_h_difficulty,
            second_team_name: name_of(f.team_a),
            second_team_short_name: short_of(f.team_a),
            second_team_difficulty: f.team_a_difficulty,
        });
    }
    for f in fixtures {
        rows.push(FixtureDifficultyRow {
            event: f.event,
            first_team_name: name_of(f.team_a),
            first_team_short_name: short_of(f.team_a),
            first_team_difficulty: f.team_a_difficulty,
            second_team_name: name_of(f.team_h),
            second_team_short_name: short_of(f.team_h),
            second_team_difficulty: f.team_h_difficulty,
        });
    }

    // Stable: ties keep the home-perspective-then-away-perspective order.
    rows.sort_by_key(|row| row.event);
    rows
}

pub fn load_fixtures_difficulty(
    fixtures_path: &Path,
    teams_path: &Path,
) -> Result<Vec<FixtureDifficultyRow>, PrepError> {
    let fixtures = dataset::load_fixtures(fixtures_path)?;
    let teams = dataset::load_teams(teams_path)?;
    Ok(fixtures_difficulty(&fixtures, &teams))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, name: &str) -> PlayerRecord {
        PlayerRecord {
            id,
            web_name: name.to_string(),
            status: "a".to_string(),
            element_type: 3,
            team_code: 1,
            now_cost: 50,
            total_points: 0,
            points_per_game: 0.0,
            influence: 0.0,
            creativity: 0.0,
            threat: 0.0,
            ict_index: 0.0,
        }
    }

    fn gw(element: u32, round: u32, points: i32, minutes: u32) -> PlayerGameweekRecord {
        PlayerGameweekRecord {
            element,
            round,
            total_points: points,
            minutes,
            goals_scored: 0,
            assists: 0,
            clean_sheets: 0,
        }
    }

    fn team(id: u32, code: u32, name: &str, short: &str) -> TeamRecord {
        TeamRecord {
            id,
            code,
            name: name.to_string(),
            short_name: short.to_string(),
            strength: 3,
        }
    }

    fn fixture(event: Option<u32>, home: u32, away: u32, h_fdr: u32, a_fdr: u32) -> FixtureRecord {
        FixtureRecord {
            event,
            team_h: home,
            team_a: away,
            team_h_difficulty: h_fdr,
            team_a_difficulty: a_fdr,
            team_h_score: None,
            team_a_score: None,
            kickoff_time: None,
            finished: false,
        }
    }

    #[test]
    fn performance_sums_partial_gameweek_entries() {
        // A double gameweek gives a player two entries for the same round.
        let gameweeks = vec![gw(1, 3, 6, 90), gw(1, 3, 2, 45), gw(2, 3, 1, 10)];
        let players = vec![player(1, "Saka"), player(2, "Haaland")];

        let rows = performance_by_gameweek(&gameweeks, &players);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_name.as_deref(), Some("Saka"));
        assert_eq!(rows[0].total_points, 8);
        assert_eq!(rows[0].minutes, 135);
        assert_eq!(rows[1].player_name.as_deref(), Some("Haaland"));
    }

    #[test]
    fn performance_row_count_is_distinct_round_element_pairs() {
        let gameweeks = vec![gw(1, 1, 2, 90), gw(1, 2, 3, 90), gw(2, 1, 4, 90), gw(1, 1, 1, 5)];
        let rows = performance_by_gameweek(&gameweeks, &[]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn performance_unmatched_player_keeps_null_name() {
        let rows = performance_by_gameweek(&[gw(99, 1, 5, 90)], &[player(1, "Saka")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_name, None);
    }

    #[test]
    fn performance_single_row_scenario() {
        let gameweeks = vec![PlayerGameweekRecord {
            element: 1,
            round: 1,
            total_points: 5,
            minutes: 90,
            goals_scored: 1,
            assists: 0,
            clean_sheets: 1,
        }];
        let rows = performance_by_gameweek(&gameweeks, &[player(1, "A")]);
        assert_eq!(
            rows,
            vec![PerformanceRow {
                gameweek: 1,
                player_name: Some("A".to_string()),
                total_points: 5,
                minutes: 90,
                goals_scored: 1,
                assists: 0,
                clean_sheets: 1,
            }]
        );
    }

    #[test]
    fn cost_rows_map_positions_and_team_names() {
        let mut keeper = player(1, "Raya");
        keeper.element_type = 1;
        keeper.team_code = 3;
        let mut oddball = player(2, "Mystery");
        oddball.element_type = 9;
        oddball.team_code = 99;

        let teams = vec![team(1, 3, "Arsenal", "ARS")];
        let rows = cost_vs_performance(&[keeper, oddball], &teams);

        assert_eq!(rows[0].position, Some(Position::GK));
        assert_eq!(rows[0].team_name.as_deref(), Some("Arsenal"));
        assert_eq!(rows[1].position, None);
        assert_eq!(rows[1].team_name, None);
    }

    #[test]
    fn ict_breakdown_is_a_projection() {
        let mut p = player(1, "Palmer");
        p.influence = 10.5;
        p.creativity = 20.0;
        p.threat = 30.0;
        p.ict_index = 6.1;
        let rows = ict_breakdown(&[p]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].web_name, "Palmer");
        assert_eq!(rows[0].influence, 10.5);
        assert_eq!(rows[0].ict_index, 6.1);
    }

    #[test]
    fn fixtures_double_row_count_and_symmetry() {
        let teams = vec![team(1, 10, "Arsenal", "ARS"), team(2, 20, "Chelsea", "CHE")];
        let fixtures = vec![fixture(Some(2), 1, 2, 4, 3), fixture(Some(1), 2, 1, 2, 5)];

        let rows = fixtures_difficulty(&fixtures, &teams);
        assert_eq!(rows.len(), 4);

        // Sorted ascending by event.
        let events: Vec<Option<u32>> = rows.iter().map(|r| r.event).collect();
        assert_eq!(events, vec![Some(1), Some(1), Some(2), Some(2)]);

        // Paired rows mirror each other's difficulties.
        let gw2: Vec<&FixtureDifficultyRow> = rows.iter().filter(|r| r.event == Some(2)).collect();
        let home = gw2
            .iter()
            .find(|r| r.first_team_name.as_deref() == Some("Arsenal"))
            .unwrap();
        let away = gw2
            .iter()
            .find(|r| r.first_team_name.as_deref() == Some("Chelsea"))
            .unwrap();
        assert_eq!(home.first_team_difficulty, away.second_team_difficulty);
        assert_eq!(home.second_team_difficulty, away.first_team_difficulty);
        assert_eq!(home.second_team_short_name.as_deref(), Some("CHE"));
    }

    #[test]
    fn fixtures_sort_is_stable_with_null_events_first() {
        let teams = vec![team(1, 10, "Arsenal", "ARS"), team(2, 20, "Chelsea", "CHE")];
        let fixtures = vec![fixture(Some(1), 1, 2, 3, 3), fixture(None, 2, 1, 2, 2)];

        let rows = fixtures_difficulty(&fixtures, &teams);
        assert_eq!(rows[0].event, None);
        assert_eq!(rows[1].event, None);
        // Home perspective precedes away perspective on ties.
        assert_eq!(rows[0].first_team_name.as_deref(), Some("Chelsea"));
        assert_eq!(rows[1].first_team_name.as_deref(), Some("Arsenal"));
    }

    #[test]
    fn transforms_are_idempotent_on_unchanged_input() {
        let gameweeks = vec![gw(1, 1, 2, 90), gw(2, 1, 7, 90), gw(1, 2, 3, 60)];
        let players = vec![player(1, "Saka"), player(2, "Haaland")];
        let teams = vec![team(1, 10, "Arsenal", "ARS"), team(2, 20, "Chelsea", "CHE")];
        let fixtures = vec![fixture(Some(1), 1, 2, 3, 2)];

        assert_eq!(
            performance_by_gameweek(&gameweeks, &players),
            performance_by_gameweek(&gameweeks, &players)
        );
        assert_eq!(
            cost_vs_performance(&players, &teams),
            cost_vs_performance(&players, &teams)
        );
        assert_eq!(ict_breakdown(&players), ict_breakdown(&players));
        assert_eq!(
            fixtures_difficulty(&fixtures, &teams),
            fixtures_difficulty(&fixtures, &teams)
        );
    }
}

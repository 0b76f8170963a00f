use serde::{Deserialize, Serialize};

/// Column names each source table must carry. The CSV boundary checks these
/// once per load; everything downstream works on typed records.
pub mod columns {
    pub mod players {
        pub const REQUIRED: [&str; 12] = [
            "id",
            "web_name",
            "status",
            "element_type",
            "team_code",
            "now_cost",
            "total_points",
            "points_per_game",
            "influence",
            "creativity",
            "threat",
            "ict_index",
        ];
    }

    pub mod players_gw {
        pub const REQUIRED: [&str; 7] = [
            "element",
            "round",
            "total_points",
            "minutes",
            "goals_scored",
            "assists",
            "clean_sheets",
        ];
    }

    pub mod teams {
        pub const REQUIRED: [&str; 4] = ["id", "code", "name", "short_name"];
    }

    pub mod fixtures {
        pub const REQUIRED: [&str; 5] = [
            "event",
            "team_h",
            "team_a",
            "team_h_difficulty",
            "team_a_difficulty",
        ];
    }
}

/// Pitch position, mapped bijectively from FPL element_type codes 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    GK,
    DEF,
    MID,
    FWD,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::GK, Position::DEF, Position::MID, Position::FWD];

    pub fn from_element_type(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::GK),
            2 => Some(Position::DEF),
            3 => Some(Position::MID),
            4 => Some(Position::FWD),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::DEF => "DEF",
            Position::MID => "MID",
            Position::FWD => "FWD",
        }
    }
}

/// One player's season-to-date attributes from the bootstrap-static feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: u32,
    pub web_name: String,
    pub status: String,
    pub element_type: u8,
    pub team_code: u32,
    /// Cost in 0.1M units, as served by the API.
    pub now_cost: u32,
    pub total_points: i32,
    pub points_per_game: f64,
    pub influence: f64,
    pub creativity: f64,
    pub threat: f64,
    pub ict_index: f64,
}

/// One player's stats in one gameweek, from the element-summary history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameweekRecord {
    /// Player id ("element" in the API).
    pub element: u32,
    /// Gameweek number.
    pub round: u32,
    pub total_points: i32,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
}

/// One club's identity and strength attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: u32,
    pub code: u32,
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub strength: u32,
}

/// One scheduled match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    /// Gameweek; absent for fixtures not yet scheduled into a round.
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: u32,
    pub team_a_difficulty: u32,
    #[serde(default)]
    pub team_h_score: Option<u32>,
    #[serde(default)]
    pub team_a_score: Option<u32>,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub finished: bool,
}

/// Derived: one player's aggregated stats in one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    pub gameweek: u32,
    /// None when the player id had no match in the players table.
    pub player_name: Option<String>,
    pub total_points: i32,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
}

/// Derived: one player's cost/points/team/position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPerformanceRow {
    pub web_name: String,
    pub now_cost: u32,
    pub total_points: i32,
    pub points_per_game: f64,
    pub team_name: Option<String>,
    pub position: Option<Position>,
}

/// Derived: one player's influence/creativity/threat/index metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IctRow {
    pub web_name: String,
    pub influence: f64,
    pub creativity: f64,
    pub threat: f64,
    pub ict_index: f64,
}

/// Derived: one directional view of a fixture. Every fixture contributes two
/// of these (home-as-first and away-as-first), so each team appears as
/// "first_team" for every fixture it plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDifficultyRow {
    pub event: Option<u32>,
    pub first_team_name: Option<String>,
    pub first_team_short_name: Option<String>,
    pub first_team_difficulty: u32,
    pub second_team_name: Option<String>,
    pub second_team_short_name: Option<String>,
    pub second_team_difficulty: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_codes_map_bijectively() {
        assert_eq!(Position::from_element_type(1), Some(Position::GK));
        assert_eq!(Position::from_element_type(2), Some(Position::DEF));
        assert_eq!(Position::from_element_type(3), Some(Position::MID));
        assert_eq!(Position::from_element_type(4), Some(Position::FWD));
        assert_eq!(Position::from_element_type(0), None);
        assert_eq!(Position::from_element_type(5), None);
    }

    #[test]
    fn position_labels_are_stable() {
        let labels: Vec<&str> = Position::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["GK", "DEF", "MID", "FWD"]);
    }
}

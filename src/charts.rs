use std::collections::BTreeMap;

use crate::error::PrepError;
use crate::records::{
    CostPerformanceRow, FixtureDifficultyRow, IctRow, PerformanceRow, Position,
};

pub const AVERAGE_SERIES: &str = "Average";

pub const ICT_CATEGORIES: [&str; 4] = ["influence", "creativity", "threat", "ict_index"];

/// Factor applied to the metric maximum to pad the radar chart's radial axis.
pub const RADAR_AXIS_HEADROOM: f64 = 1.2;

pub type Rgb = (u8, u8, u8);

/// Fixed two-stop color scale for the difficulty heatmap, low -> high.
pub const FDR_SCALE: ColorScale = ColorScale {
    low: (0x00, 0xDF, 0xA2),
    high: (0xFF, 0x00, 0x60),
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub low: Rgb,
    pub high: Rgb,
}

impl ColorScale {
    /// Linear sample at t in [0, 1].
    pub fn sample(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        (
            lerp(self.low.0, self.high.0),
            lerp(self.low.1, self.high.1),
            lerp(self.low.2, self.high.2),
        )
    }
}

pub fn position_color(position: Option<Position>) -> Rgb {
    match position {
        Some(Position::GK) => (0xF2, 0xC9, 0x4C),
        Some(Position::DEF) => (0x4C, 0xB9, 0xF2),
        Some(Position::MID) => (0x6B, 0xE5, 0x85),
        Some(Position::FWD) => (0xF2, 0x6B, 0x8A),
        None => (0x88, 0x88, 0x88),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    /// (gameweek, total_points) pairs, ascending by gameweek.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub cost: u32,
    pub total_points: i32,
    pub position: Option<Position>,
    pub color: Rgb,
    pub player: String,
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarTrace {
    pub name: String,
    /// One value per ICT_CATEGORIES entry.
    pub values: [f64; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    pub title: String,
    pub categories: [&'static str; 4],
    pub traces: Vec<RadarTrace>,
    pub radial_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapCell {
    pub event: Option<u32>,
    pub team: String,
    pub difficulty: u32,
    /// Opponent short name, shown as hover text.
    pub opponent: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub cells: Vec<HeatmapCell>,
    pub scale: ColorScale,
}

/// Line chart of total points per gameweek for up to two selected players
/// plus an "Average" series over all players.
///
/// A selected name with no rows contributes an empty series rather than an
/// error; selection cursors in the shell can only point at known names, so
/// a miss here is benign.
pub fn performance_line_chart(
    player1: Option<&str>,
    player2: Option<&str>,
    rows: &[PerformanceRow],
) -> Result<LineChart, PrepError> {
    if rows.is_empty() {
        return Err(PrepError::EmptyTable {
            table: "performance",
        });
    }

    let mut series = Vec::new();
    for selected in [player1, player2].into_iter().flatten() {
        let points: Vec<(f64, f64)> = rows
            .iter()
            .filter(|row| row.player_name.as_deref() == Some(selected))
            .map(|row| (row.gameweek as f64, row.total_points as f64))
            .collect();
        series.push(LineSeries {
            name: selected.to_string(),
            points,
        });
    }

    let mut by_gameweek: BTreeMap<u32, (i64, u32)> = BTreeMap::new();
    for row in rows {
        let entry = by_gameweek.entry(row.gameweek).or_insert((0, 0));
        entry.0 += row.total_points as i64;
        entry.1 += 1;
    }
    series.push(LineSeries {
        name: AVERAGE_SERIES.to_string(),
        points: by_gameweek
            .into_iter()
            .map(|(gw, (sum, count))| (gw as f64, sum as f64 / count as f64))
            .collect(),
    });

    Ok(LineChart {
        title: "Player Performance by Gameweek".to_string(),
        x_label: "Gameweek".to_string(),
        y_label: "Total Points".to_string(),
        series,
    })
}

/// Conjunctive filters for the cost-vs-performance scatter. Budget keeps
/// rows with now_cost <= the selected ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScatterFilter<'a> {
    pub team: Option<&'a str>,
    pub position: Option<Position>,
    pub max_cost: Option<u32>,
}

pub fn cost_scatter_chart(
    filter: ScatterFilter<'_>,
    rows: &[CostPerformanceRow],
) -> Result<ScatterChart, PrepError> {
    if rows.is_empty() {
        return Err(PrepError::EmptyTable {
            table: "cost_performance",
        });
    }

    let points: Vec<ScatterPoint> = rows
        .iter()
        .filter(|row| match filter.team {
            Some(team) => row.team_name.as_deref() == Some(team),
            None => true,
        })
        .filter(|row| match filter.position {
            Some(position) => row.position == Some(position),
            None => true,
        })
        .filter(|row| match filter.max_cost {
            Some(ceiling) => row.now_cost <= ceiling,
            None => true,
        })
        .map(|row| ScatterPoint {
            cost: row.now_cost,
            total_points: row.total_points,
            position: row.position,
            color: position_color(row.position),
            player: row.web_name.clone(),
            team: row.team_name.clone(),
        })
        .collect();

    if points.is_empty() {
        return Err(PrepError::NoMatch);
    }

    Ok(ScatterChart {
        title: "Player Cost vs. Performance".to_string(),
        x_label: "Cost (in 0.1M)".to_string(),
        y_label: "Total Points".to_string(),
        points,
    })
}

/// Budget dropdown steps: ascending multiples of `bucket` covering every
/// now_cost in the table. The bucket width is configuration, not a literal.
pub fn budget_steps(rows: &[CostPerformanceRow], bucket: u32) -> Vec<u32> {
    let bucket = bucket.max(1);
    let Some(min) = rows.iter().map(|row| row.now_cost).min() else {
        return Vec::new();
    };
    let max = rows.iter().map(|row| row.now_cost).max().unwrap_or(min);

    let first = min.div_ceil(bucket) * bucket;
    let last = max.div_ceil(bucket) * bucket;
    (first..=last).step_by(bucket as usize).collect()
}

/// Radar chart of the four ICT metrics: one trace per selected player, or a
/// single column-wise "Average" trace when neither selector is set. Unlike
/// the line chart, a selected name with no row is a hard error.
pub fn ict_radar_chart(
    player1: Option<&str>,
    player2: Option<&str>,
    rows: &[IctRow],
) -> Result<RadarChart, PrepError> {
    if rows.is_empty() {
        return Err(PrepError::EmptyTable { table: "ict" });
    }

    let mut traces = Vec::new();
    for selected in [player1, player2].into_iter().flatten() {
        let row = rows
            .iter()
            .find(|row| row.web_name == selected)
            .ok_or_else(|| PrepError::PlayerNotFound {
                name: selected.to_string(),
            })?;
        traces.push(RadarTrace {
            name: selected.to_string(),
            values: metric_values(row),
        });
    }

    if traces.is_empty() {
        let n = rows.len() as f64;
        let mut sums = [0.0f64; 4];
        for row in rows {
            for (sum, value) in sums.iter_mut().zip(metric_values(row)) {
                *sum += value;
            }
        }
        traces.push(RadarTrace {
            name: AVERAGE_SERIES.to_string(),
            values: sums.map(|sum| sum / n),
        });
    }

    let metric_max = rows
        .iter()
        .flat_map(metric_values)
        .fold(0.0f64, f64::max);

    let title = if player1.is_some() || player2.is_some() {
        "ICT Index Comparison"
    } else {
        "Average ICT Index"
    };

    Ok(RadarChart {
        title: title.to_string(),
        categories: ICT_CATEGORIES,
        traces,
        radial_max: metric_max * RADAR_AXIS_HEADROOM,
    })
}

fn metric_values(row: &IctRow) -> [f64; 4] {
    [row.influence, row.creativity, row.threat, row.ict_index]
}

/// Heatmap of fixture difficulty: x = gameweek, y = first team,
/// z = that team's difficulty, opponent short name as hover text.
pub fn fixture_heatmap(rows: &[FixtureDifficultyRow]) -> Result<HeatmapChart, PrepError> {
    if rows.is_empty() {
        return Err(PrepError::EmptyTable {
            table: "fixture_difficulty",
        });
    }

    let cells = rows
        .iter()
        .map(|row| HeatmapCell {
            event: row.event,
            team: row
                .first_team_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            difficulty: row.first_team_difficulty,
            opponent: row
                .second_team_short_name
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Ok(HeatmapChart {
        title: "Fixtures Difficulty Rating by Gameweek".to_string(),
        x_label: "Gameweek".to_string(),
        y_label: "Team".to_string(),
        cells,
        scale: FDR_SCALE,
    })
}

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Local};

use crate::charts::{self, ScatterFilter};
use crate::config::AppConfig;
use crate::error::PrepError;
use crate::prepare::{self, DerivedTables};
use crate::records::Position;

const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Performance,
    CostScatter,
    IctRadar,
    FixtureHeatmap,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Performance => "Performance by Gameweek",
            View::CostScatter => "Cost vs. Performance",
            View::IctRadar => "ICT Index",
            View::FixtureHeatmap => "Fixture Difficulty",
        }
    }
}

/// Which filter widget the j/k keys currently adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    PlayerOne,
    PlayerTwo,
    Team,
    Position,
    Budget,
}

impl Selector {
    pub fn label(self) -> &'static str {
        match self {
            Selector::PlayerOne => "Player 1",
            Selector::PlayerTwo => "Player 2",
            Selector::Team => "Team",
            Selector::Position => "Position",
            Selector::Budget => "Max cost",
        }
    }
}

fn selectors_for(view: View) -> &'static [Selector] {
    match view {
        View::Performance | View::IctRadar => &[Selector::PlayerOne, Selector::PlayerTwo],
        View::CostScatter => &[Selector::Team, Selector::Position, Selector::Budget],
        View::FixtureHeatmap => &[],
    }
}

pub struct AppState {
    pub view: View,
    pub focus: usize,

    pub tables: DerivedTables,
    /// Distinct player names in the performance table, sorted.
    pub perf_names: Vec<String>,
    /// Player names in the ICT table, input order.
    pub ict_names: Vec<String>,
    /// Distinct team names in the cost table, sorted.
    pub team_names: Vec<String>,
    pub budget_steps: Vec<u32>,

    // Dropdown cursors; None means "no filter" / "no selection".
    pub perf_sel1: Option<usize>,
    pub perf_sel2: Option<usize>,
    pub ict_sel1: Option<usize>,
    pub ict_sel2: Option<usize>,
    pub team_sel: Option<usize>,
    pub position_sel: Option<Position>,
    pub budget_sel: Option<usize>,

    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub last_refresh: Option<DateTime<Local>>,
    pub load_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: View::Performance,
            focus: 0,
            tables: DerivedTables::default(),
            perf_names: Vec::new(),
            ict_names: Vec::new(),
            team_names: Vec::new(),
            budget_steps: Vec::new(),
            perf_sel1: None,
            perf_sel2: None,
            ict_sel1: None,
            ict_sel2: None,
            team_sel: None,
            position_sel: None,
            budget_sel: None,
            logs: VecDeque::new(),
            help_overlay: false,
            last_refresh: None,
            load_error: None,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    /// Rebuild the derived tables and selector domains from the CSV tables.
    pub fn load_tables(&mut self, config: &AppConfig) -> Result<(), PrepError> {
        let tables = prepare::load_all(&config.data_paths())?;

        self.perf_names = tables
            .performance
            .iter()
            .filter_map(|row| row.player_name.clone())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        self.ict_names = tables.ict.iter().map(|row| row.web_name.clone()).collect();
        self.team_names = tables
            .cost_performance
            .iter()
            .filter_map(|row| row.team_name.clone())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        self.budget_steps = charts::budget_steps(&tables.cost_performance, config.cost_bucket);
        self.tables = tables;

        // Old cursors may point past the new domains.
        self.perf_sel1 = clamp_cursor(self.perf_sel1, self.perf_names.len());
        self.perf_sel2 = clamp_cursor(self.perf_sel2, self.perf_names.len());
        self.ict_sel1 = clamp_cursor(self.ict_sel1, self.ict_names.len());
        self.ict_sel2 = clamp_cursor(self.ict_sel2, self.ict_names.len());
        self.team_sel = clamp_cursor(self.team_sel, self.team_names.len());
        self.budget_sel = clamp_cursor(self.budget_sel, self.budget_steps.len());
        self.load_error = None;
        Ok(())
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.focus = 0;
        }
    }

    pub fn active_selectors(&self) -> &'static [Selector] {
        selectors_for(self.view)
    }

    pub fn focused_selector(&self) -> Option<Selector> {
        self.active_selectors().get(self.focus).copied()
    }

    pub fn cycle_focus(&mut self) {
        let len = self.active_selectors().len();
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    /// Step the focused dropdown forward or backward. Every dropdown cycles
    /// through None (no selection) and each domain entry in turn.
    pub fn step_selection(&mut self, forward: bool) {
        let Some(selector) = self.focused_selector() else {
            return;
        };
        match selector {
            Selector::PlayerOne => match self.view {
                View::Performance => {
                    self.perf_sel1 = step_cursor(self.perf_sel1, self.perf_names.len(), forward)
                }
                _ => self.ict_sel1 = step_cursor(self.ict_sel1, self.ict_names.len(), forward),
            },
            Selector::PlayerTwo => match self.view {
                View::Performance => {
                    self.perf_sel2 = step_cursor(self.perf_sel2, self.perf_names.len(), forward)
                }
                _ => self.ict_sel2 = step_cursor(self.ict_sel2, self.ict_names.len(), forward),
            },
            Selector::Team => {
                self.team_sel = step_cursor(self.team_sel, self.team_names.len(), forward)
            }
            Selector::Position => self.position_sel = step_position(self.position_sel, forward),
            Selector::Budget => {
                self.budget_sel = step_cursor(self.budget_sel, self.budget_steps.len(), forward)
            }
        }
    }

    pub fn clear_selections(&mut self) {
        match self.view {
            View::Performance => {
                self.perf_sel1 = None;
                self.perf_sel2 = None;
            }
            View::IctRadar => {
                self.ict_sel1 = None;
                self.ict_sel2 = None;
            }
            View::CostScatter => {
                self.team_sel = None;
                self.position_sel = None;
                self.budget_sel = None;
            }
            View::FixtureHeatmap => {}
        }
    }

    pub fn perf_player1(&self) -> Option<&str> {
        self.perf_sel1.map(|i| self.perf_names[i].as_str())
    }

    pub fn perf_player2(&self) -> Option<&str> {
        self.perf_sel2.map(|i| self.perf_names[i].as_str())
    }

    pub fn ict_player1(&self) -> Option<&str> {
        self.ict_sel1.map(|i| self.ict_names[i].as_str())
    }

    pub fn ict_player2(&self) -> Option<&str> {
        self.ict_sel2.map(|i| self.ict_names[i].as_str())
    }

    pub fn scatter_filter(&self) -> ScatterFilter<'_> {
        ScatterFilter {
            team: self.team_sel.map(|i| self.team_names[i].as_str()),
            position: self.position_sel,
            max_cost: self.budget_sel.map(|i| self.budget_steps[i]),
        }
    }

    pub fn refresh_age(&self) -> Option<String> {
        let at = self.last_refresh?;
        let mins = Local::now().signed_duration_since(at).num_minutes();
        Some(if mins < 1 {
            "just now".to_string()
        } else {
            format!("{mins}m ago")
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_cursor(cursor: Option<usize>, len: usize) -> Option<usize> {
    cursor.filter(|&i| i < len)
}

fn step_cursor(cursor: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if forward {
        match cursor {
            None => Some(0),
            Some(i) if i + 1 < len => Some(i + 1),
            Some(_) => None,
        }
    } else {
        match cursor {
            None => Some(len - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        }
    }
}

fn step_position(current: Option<Position>, forward: bool) -> Option<Position> {
    let idx = current.and_then(|p| Position::ALL.iter().position(|&q| q == p));
    let next = step_cursor(idx, Position::ALL.len(), forward);
    next.map(|i| Position::ALL[i])
}

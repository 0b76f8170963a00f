use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset,
    GraphType, Paragraph};

use fpl_terminal::charts::{self, HeatmapChart, LineChart, RadarChart, Rgb, ScatterChart};
use fpl_terminal::config::AppConfig;
use fpl_terminal::error::PrepError;
use fpl_terminal::fpl_api;
use fpl_terminal::records::Position;
use fpl_terminal::state::{AppState, View};

const SERIES_COLORS: [Color; 3] = [Color::Cyan, Color::Magenta, Color::Yellow];

struct App {
    state: AppState,
    config: AppConfig,
    should_quit: bool,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(),
            config,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_view(View::Performance),
            KeyCode::Char('2') => self.state.set_view(View::CostScatter),
            KeyCode::Char('3') => self.state.set_view(View::IctRadar),
            KeyCode::Char('4') => self.state.set_view(View::FixtureHeatmap),
            KeyCode::Tab => self.state.cycle_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.state.step_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.state.step_selection(false),
            KeyCode::Char('c') => self.state.clear_selections(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_from_api(),
            KeyCode::Char('o') => self.reload_from_disk(true),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    /// Fetch the FPL endpoints (blocking, sequential), rewrite the CSV
    /// tables, then rebuild the derived tables.
    fn refresh_from_api(&mut self) {
        self.state.push_log("[INFO] Fetching FPL data...");
        match fpl_api::refresh_all(&self.config) {
            Ok(summary) => {
                self.state.push_log(format!(
                    "[INFO] Fetched {} players, {} teams, {} fixtures, {} gameweek rows",
                    summary.players, summary.teams, summary.fixtures, summary.gameweek_rows
                ));
                self.state.last_refresh = Some(Local::now());
                self.reload_from_disk(false);
            }
            Err(err) => self.state.push_log(format!("[ERROR] Fetch failed: {err:#}")),
        }
    }

    fn reload_from_disk(&mut self, announce: bool) {
        match self.state.load_tables(&self.config) {
            Ok(()) => {
                if announce {
                    self.state.push_log("[INFO] Tables reloaded from disk");
                }
            }
            Err(err) => {
                self.state.load_error = Some(err.to_string());
                self.state.push_log(format!("[WARN] Table load failed: {err}"));
            }
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(AppConfig::from_env());
    app.reload_from_disk(false);
    if app.state.load_error.is_some() {
        app.state
            .push_log("[INFO] No local tables yet; press r to fetch from the FPL API");
    }

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    let selectors = Paragraph::new(selector_text(&app.state));
    frame.render_widget(selectors, chunks[1]);

    match app.state.view {
        View::Performance => render_performance(frame, chunks[2], &app.state),
        View::CostScatter => render_cost_scatter(frame, chunks[2], &app.state),
        View::IctRadar => render_ict_radar(frame, chunks[2], &app.state),
        View::FixtureHeatmap => render_fixture_heatmap(frame, chunks[2], &app.state),
    }

    let log_line = app
        .state
        .logs
        .back()
        .map(String::as_str)
        .unwrap_or_default();
    let log = Paragraph::new(log_line).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(log, chunks[3]);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let refresh = state
        .refresh_age()
        .map(|age| format!(" | data {age}"))
        .unwrap_or_default();
    format!("FPL TERMINAL | {}{refresh}", state.view.title())
}

fn selector_text(state: &AppState) -> Line<'static> {
    let mut spans: Vec<Span> = Vec::new();
    for (i, selector) in state.active_selectors().iter().enumerate() {
        let value = match selector {
            fpl_terminal::state::Selector::PlayerOne => match state.view {
                View::Performance => state.perf_player1().unwrap_or("-").to_string(),
                _ => state.ict_player1().unwrap_or("-").to_string(),
            },
            fpl_terminal::state::Selector::PlayerTwo => match state.view {
                View::Performance => state.perf_player2().unwrap_or("-").to_string(),
                _ => state.ict_player2().unwrap_or("-").to_string(),
            },
            fpl_terminal::state::Selector::Team => state
                .team_sel
                .map(|i| state.team_names[i].clone())
                .unwrap_or_else(|| "-".to_string()),
            fpl_terminal::state::Selector::Position => state
                .position_sel
                .map(|p| p.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
            fpl_terminal::state::Selector::Budget => state
                .budget_sel
                .map(|i| format!("{:.1}M", state.budget_steps[i] as f64 / 10.0))
                .unwrap_or_else(|| "-".to_string()),
        };

        let style = if i == state.focus {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!("{}: {value}", selector.label()), style));
    }
    if spans.is_empty() {
        spans.push(Span::styled(
            "No filters on this view",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn footer_text() -> &'static str {
    "1-4 Views | Tab Focus | j/k/↑/↓ Select | c Clear | r Refresh | o Reload | ? Help | q Quit"
}

fn render_chart_error(frame: &mut Frame, area: Rect, err: &PrepError) {
    // A failed builder surfaces as a visible error pane, never a blank.
    let text = format!("Chart unavailable\n\n{err}");
    let pane = Paragraph::new(text)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Error").borders(Borders::ALL));
    frame.render_widget(pane, area);
}

fn render_performance(frame: &mut Frame, area: Rect, state: &AppState) {
    let chart = charts::performance_line_chart(
        state.perf_player1(),
        state.perf_player2(),
        &state.tables.performance,
    );
    match chart {
        Ok(chart) => render_line_chart(frame, area, &chart),
        Err(err) => render_chart_error(frame, area, &err),
    }
}

fn render_line_chart(frame: &mut Frame, area: Rect, chart: &LineChart) {
    let all_points: Vec<(f64, f64)> = chart
        .series
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .collect();
    let (x_min, x_max) = axis_bounds(all_points.iter().map(|p| p.0), 1.0, 38.0);
    let (_, y_max) = axis_bounds(all_points.iter().map(|p| p.1), 0.0, 10.0);

    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            Dataset::default()
                .name(series.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(&series.points)
        })
        .collect();

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(chart.title.clone())
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title(chart.x_label.clone())
                .bounds([x_min, x_max])
                .labels(bounds_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.clone())
                .bounds([0.0, y_max])
                .labels(bounds_labels(0.0, y_max)),
        );
    frame.render_widget(widget, area);
}

fn render_cost_scatter(frame: &mut Frame, area: Rect, state: &AppState) {
    let chart = charts::cost_scatter_chart(state.scatter_filter(), &state.tables.cost_performance);
    match chart {
        Ok(chart) => render_scatter_chart(frame, area, &chart),
        Err(err) => render_chart_error(frame, area, &err),
    }
}

fn render_scatter_chart(frame: &mut Frame, area: Rect, chart: &ScatterChart) {
    // One dataset per position bucket so the legend shows the color mapping.
    let mut buckets: Vec<(Option<Position>, Rgb, Vec<(f64, f64)>)> = Vec::new();
    for point in &chart.points {
        let slot = buckets.iter_mut().find(|(pos, _, _)| *pos == point.position);
        let data = (point.cost as f64, point.total_points as f64);
        match slot {
            Some((_, _, points)) => points.push(data),
            None => buckets.push((point.position, point.color, vec![data])),
        }
    }

    let (x_min, x_max) = axis_bounds(chart.points.iter().map(|p| p.cost as f64), 35.0, 150.0);
    let (_, y_max) = axis_bounds(chart.points.iter().map(|p| p.total_points as f64), 0.0, 10.0);

    let datasets: Vec<Dataset> = buckets
        .iter()
        .map(|(position, color, points)| {
            let name = position.map(|p| p.label()).unwrap_or("N/A");
            Dataset::default()
                .name(name)
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Rgb(color.0, color.1, color.2)))
                .data(points)
        })
        .collect();

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!("{} ({} players)", chart.title, chart.points.len()))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title(chart.x_label.clone())
                .bounds([x_min, x_max])
                .labels(bounds_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.clone())
                .bounds([0.0, y_max])
                .labels(bounds_labels(0.0, y_max)),
        );
    frame.render_widget(widget, area);
}

fn render_ict_radar(frame: &mut Frame, area: Rect, state: &AppState) {
    let chart =
        charts::ict_radar_chart(state.ict_player1(), state.ict_player2(), &state.tables.ict);
    match chart {
        Ok(chart) => render_radar_chart(frame, area, &chart),
        Err(err) => render_chart_error(frame, area, &err),
    }
}

/// The radar's four axes render as grouped bars, one group per metric.
fn render_radar_chart(frame: &mut Frame, area: Rect, chart: &RadarChart) {
    // Bar values are integers; keep one decimal of precision.
    let scale = 10.0;
    let mut widget = BarChart::default()
        .block(
            Block::default()
                .title(chart.title.clone())
                .borders(Borders::ALL),
        )
        .bar_width(9)
        .bar_gap(1)
        .group_gap(3)
        .max((chart.radial_max * scale) as u64);

    for (ci, category) in chart.categories.iter().enumerate() {
        let bars: Vec<Bar> = chart
            .traces
            .iter()
            .enumerate()
            .map(|(ti, trace)| {
                Bar::default()
                    .value((trace.values[ci] * scale) as u64)
                    .text_value(format!("{:.1}", trace.values[ci]))
                    .label(truncated(&trace.name, 9).into())
                    .style(Style::default().fg(SERIES_COLORS[ti % SERIES_COLORS.len()]))
            })
            .collect();
        widget = widget.data(BarGroup::default().label((*category).into()).bars(&bars));
    }

    frame.render_widget(widget, area);
}

fn render_fixture_heatmap(frame: &mut Frame, area: Rect, state: &AppState) {
    match charts::fixture_heatmap(&state.tables.fixture_difficulty) {
        Ok(chart) => render_heatmap_chart(frame, area, &chart),
        Err(err) => render_chart_error(frame, area, &err),
    }
}

fn render_heatmap_chart(frame: &mut Frame, area: Rect, chart: &HeatmapChart) {
    let block = Block::default()
        .title(chart.title.clone())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < NAME_WIDTH + CELL_WIDTH || inner.height < 3 {
        return;
    }

    let teams: BTreeSet<&str> = chart.cells.iter().map(|c| c.team.as_str()).collect();
    let events: BTreeSet<Option<u32>> = chart.cells.iter().map(|c| c.event).collect();
    let cells: BTreeMap<(&str, Option<u32>), (u32, &str)> = chart
        .cells
        .iter()
        .map(|c| ((c.team.as_str(), c.event), (c.difficulty, c.opponent.as_str())))
        .collect();

    let z_min = chart.cells.iter().map(|c| c.difficulty).min().unwrap_or(0);
    let z_max = chart.cells.iter().map(|c| c.difficulty).max().unwrap_or(0);

    const NAME_WIDTH: u16 = 16;
    const CELL_WIDTH: u16 = 6;
    let max_cols = ((inner.width - NAME_WIDTH) / CELL_WIDTH) as usize;
    let visible_events: Vec<Option<u32>> = events.into_iter().take(max_cols).collect();

    // Column header: gameweek numbers.
    let mut header = format!("{:<width$}", chart.y_label, width = NAME_WIDTH as usize);
    for event in &visible_events {
        let label = match event {
            Some(gw) => format!("GW{gw}"),
            None => "?".to_string(),
        };
        header.push_str(&format!("{label:<width$}", width = CELL_WIDTH as usize));
    }
    frame.render_widget(
        Paragraph::new(header).style(Style::default().add_modifier(Modifier::BOLD)),
        Rect {
            height: 1,
            ..inner
        },
    );

    let max_rows = inner.height.saturating_sub(1) as usize;
    for (row_idx, team) in teams.iter().take(max_rows).enumerate() {
        let y = inner.y + 1 + row_idx as u16;
        frame.render_widget(
            Paragraph::new(truncated(team, NAME_WIDTH as usize - 1)),
            Rect {
                x: inner.x,
                y,
                width: NAME_WIDTH,
                height: 1,
            },
        );

        for (col_idx, event) in visible_events.iter().enumerate() {
            let x = inner.x + NAME_WIDTH + (col_idx as u16) * CELL_WIDTH;
            let Some((difficulty, opponent)) = cells.get(&(*team, *event)) else {
                continue;
            };
            let t = if z_max > z_min {
                (*difficulty - z_min) as f64 / (z_max - z_min) as f64
            } else {
                0.5
            };
            let (r, g, b) = chart.scale.sample(t);
            let cell = Paragraph::new(format!("{difficulty} {opponent:<3}"))
                .style(Style::default().fg(Color::Black).bg(Color::Rgb(r, g, b)));
            let cell_area = Rect {
                x,
                y,
                width: CELL_WIDTH - 1,
                height: 1,
            }
            .intersection(inner);
            frame.render_widget(cell, cell_area);
        }
    }
}

fn axis_bounds(values: impl Iterator<Item = f64>, default_min: f64, default_max: f64) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (default_min, default_max);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    (min, max + (max - min) * 0.05)
}

fn bounds_labels(min: f64, max: f64) -> Vec<Span<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Span::raw(format!("{min:.0}")),
        Span::raw(format!("{mid:.0}")),
        Span::raw(format!("{max:.0}")),
    ]
}

fn truncated(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "FPL Terminal - Help",
        "",
        "Views:",
        "  1            Performance by gameweek (line)",
        "  2            Cost vs. performance (scatter)",
        "  3            ICT index (radar)",
        "  4            Fixture difficulty (heatmap)",
        "",
        "Filters:",
        "  Tab          Next filter",
        "  j/k or ↑/↓   Step the focused filter",
        "  c            Clear filters on this view",
        "",
        "Data:",
        "  r            Fetch from the FPL API and reload",
        "  o            Reload tables from disk",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

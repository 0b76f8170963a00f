use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fpl_terminal::charts::{self, ScatterFilter};
use fpl_terminal::prepare;
use fpl_terminal::records::{
    FixtureRecord, PlayerGameweekRecord, PlayerRecord, TeamRecord,
};

const PLAYERS: u32 = 600;
const GAMEWEEKS: u32 = 38;
const TEAMS: u32 = 20;

fn sample_players() -> Vec<PlayerRecord> {
    (1..=PLAYERS)
        .map(|id| PlayerRecord {
            id,
            web_name: format!("Player{id}"),
            status: "a".to_string(),
            element_type: (id % 4 + 1) as u8,
            team_code: id % TEAMS + 1,
            now_cost: 40 + id % 110,
            total_points: (id % 250) as i32,
            points_per_game: (id % 90) as f64 / 10.0,
            influence: (id % 1500) as f64,
            creativity: (id % 1200) as f64,
            threat: (id % 1700) as f64,
            ict_index: (id % 400) as f64,
        })
        .collect()
}

fn sample_gameweeks() -> Vec<PlayerGameweekRecord> {
    let mut rows = Vec::with_capacity((PLAYERS * GAMEWEEKS) as usize);
    for round in 1..=GAMEWEEKS {
        for element in 1..=PLAYERS {
            rows.push(PlayerGameweekRecord {
                element,
                round,
                total_points: ((element + round) % 16) as i32,
                minutes: 90,
                goals_scored: element % 3,
                assists: round % 2,
                clean_sheets: (element + round) % 2,
            });
        }
    }
    rows
}

fn sample_teams() -> Vec<TeamRecord> {
    (1..=TEAMS)
        .map(|id| TeamRecord {
            id,
            code: id,
            name: format!("Team {id}"),
            short_name: format!("T{id:02}"),
            strength: 2 + id % 4,
        })
        .collect()
}

fn sample_fixtures() -> Vec<FixtureRecord> {
    let mut rows = Vec::new();
    for event in 1..=GAMEWEEKS {
        for pair in 0..TEAMS / 2 {
            let home = (event + pair) % TEAMS + 1;
            let away = (event + pair + TEAMS / 2) % TEAMS + 1;
            rows.push(FixtureRecord {
                event: Some(event),
                team_h: home,
                team_a: away,
                team_h_difficulty: 1 + (home + event) % 5,
                team_a_difficulty: 1 + (away + event) % 5,
                team_h_score: None,
                team_a_score: None,
                kickoff_time: None,
                finished: false,
            });
        }
    }
    rows
}

fn bench_transforms(c: &mut Criterion) {
    let players = sample_players();
    let gameweeks = sample_gameweeks();
    let teams = sample_teams();
    let fixtures = sample_fixtures();

    c.bench_function("performance_by_gameweek_full_season", |b| {
        b.iter(|| {
            black_box(prepare::performance_by_gameweek(
                black_box(&gameweeks),
                black_box(&players),
            ))
        })
    });

    c.bench_function("cost_vs_performance", |b| {
        b.iter(|| {
            black_box(prepare::cost_vs_performance(
                black_box(&players),
                black_box(&teams),
            ))
        })
    });

    c.bench_function("fixtures_difficulty_full_season", |b| {
        b.iter(|| {
            black_box(prepare::fixtures_difficulty(
                black_box(&fixtures),
                black_box(&teams),
            ))
        })
    });
}

fn bench_charts(c: &mut Criterion) {
    let players = sample_players();
    let gameweeks = sample_gameweeks();
    let teams = sample_teams();

    let performance = prepare::performance_by_gameweek(&gameweeks, &players);
    let cost_performance = prepare::cost_vs_performance(&players, &teams);

    c.bench_function("performance_line_chart", |b| {
        b.iter(|| {
            black_box(charts::performance_line_chart(
                black_box(Some("Player1")),
                black_box(Some("Player2")),
                black_box(&performance),
            ))
        })
    });

    c.bench_function("cost_scatter_chart_filtered", |b| {
        let filter = ScatterFilter {
            team: Some("Team 1"),
            position: None,
            max_cost: Some(100),
        };
        b.iter(|| {
            black_box(charts::cost_scatter_chart(
                black_box(filter),
                black_box(&cost_performance),
            ))
        })
    });
}

criterion_group!(benches, bench_transforms, bench_charts);
criterion_main!(benches);

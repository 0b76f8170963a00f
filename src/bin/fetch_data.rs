use anyhow::Result;

use fpl_terminal::config::AppConfig;
use fpl_terminal::fpl_api;

/// Standalone fetch: pull the FPL endpoints and write the four CSV tables,
/// without starting the dashboard.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    println!("Fetching FPL data into {}", config.data_dir.display());

    let summary = fpl_api::refresh_all(&config)?;

    println!("Fetch complete");
    println!("Players: {}", summary.players);
    println!("Teams: {}", summary.teams);
    println!("Fixtures: {}", summary.fixtures);
    println!("Gameweek rows: {}", summary.gameweek_rows);

    Ok(())
}

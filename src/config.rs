use std::env;
use std::path::{Path, PathBuf};

pub const PLAYERS_CSV: &str = "players.csv";
pub const PLAYERS_GW_CSV: &str = "players_gw.csv";
pub const TEAMS_CSV: &str = "teams.csv";
pub const FIXTURES_CSV: &str = "fixtures.csv";

/// Locations of the four persisted source tables. Built once and passed
/// down; the transforms never read paths from process-wide state.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub players: PathBuf,
    pub players_gw: PathBuf,
    pub teams: PathBuf,
    pub fixtures: PathBuf,
}

impl DataPaths {
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            players: dir.join(PLAYERS_CSV),
            players_gw: dir.join(PLAYERS_GW_CSV),
            teams: dir.join(TEAMS_CSV),
            fixtures: dir.join(FIXTURES_CSV),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Width of the budget dropdown buckets, in 0.1M cost units.
    pub cost_bucket: u32,
    pub http_timeout_secs: u64,
    /// How long a cached API response stays fresh before a refetch.
    pub cache_max_age_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("FPL_DATA_DIR")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let cost_bucket = env::var("FPL_COST_BUCKET")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(5)
            .max(1);
        let http_timeout_secs = env::var("FPL_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(10)
            .max(1);
        let cache_max_age_secs = env::var("FPL_CACHE_MAX_AGE_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(15 * 60);
        Self {
            data_dir,
            cost_bucket,
            http_timeout_secs,
            cache_max_age_secs,
        }
    }

    pub fn data_paths(&self) -> DataPaths {
        DataPaths::from_dir(&self.data_dir)
    }
}

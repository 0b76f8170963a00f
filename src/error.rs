use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the data-preparation and chart-building layers.
///
/// None of these are recovered locally: transforms and chart builders fail
/// outright and the caller decides how to surface the condition.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("missing input table: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("table '{table}' is missing required columns: {}", columns.join(", "))]
    Schema {
        table: &'static str,
        columns: Vec<String>,
    },

    #[error("table '{table}' has no rows")]
    EmptyTable { table: &'static str },

    #[error("no rows match the selected filters")]
    NoMatch,

    #[error("player '{name}' not found")]
    PlayerNotFound { name: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

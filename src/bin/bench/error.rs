use std::path::PathBuf;

use saw_engine::plan::ConfigError;
use saw_engine::SawError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Estimator(#[from] SawError),

    #[error(transparent)]
    Plan(#[from] ConfigError),

    #[error("failed to write report '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

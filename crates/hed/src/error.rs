//! CLI error types.

use hed_config::ConfigError;
use hed_posts::PostError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Posts(#[from] PostError),

    #[error("Invalid legacy export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Server(String),
}

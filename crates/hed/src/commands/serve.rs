//! `hed serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use hed_config::{CliSettings, Config};
use hed_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover hed.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file (overrides config).
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable verbose output (request and store logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            database: self.database,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        config.require_auth()?;

        if let Some(path) = &config.config_path {
            output.status(Tone::Plain, &format!("Config: {}", path.display()));
        }
        let summary = [
            format!(
                "Starting server on {}:{}",
                config.server.host, config.server.port
            ),
            format!("Database: {}", config.database_resolved.path.display()),
            format!(
                "Uploads: {} -> {}",
                config.uploads_resolved.dir.display(),
                config.uploads_resolved.base_url
            ),
        ];
        for line in &summary {
            output.status(Tone::Plain, line);
        }

        std::fs::create_dir_all(&config.uploads_resolved.dir)?;

        run_server(server_config_from_config(&config))
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

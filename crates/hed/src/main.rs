//! Health Equity Dashboard CLI.
//!
//! Provides commands for:
//! - `serve`: Start the dashboard server
//! - `render`: Render a post body file to HTML
//! - `migrate`: Import a legacy JSON export into the post database

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{MigrateArgs, RenderArgs, ServeArgs};
use error::CliError;
use output::{Output, Tone};

/// Health Equity Dashboard.
#[derive(Parser)]
#[command(name = "hed", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server.
    Serve(ServeArgs),
    /// Render a post body file to HTML on stdout.
    Render(RenderArgs),
    /// Import legacy posts from a JSON export.
    Migrate(MigrateArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let verbose = match &cli.command {
        Commands::Serve(args) => args.verbose,
        Commands::Migrate(args) => args.verbose,
        Commands::Render(_) => false,
    };
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => block_on(args.execute()),
        Commands::Render(args) => args.execute(),
        Commands::Migrate(args) => block_on(args.execute()),
    };

    if let Err(err) = result {
        output.status(Tone::Failed, &format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn block_on<F>(future: F) -> Result<(), CliError>
where
    F: Future<Output = Result<(), CliError>>,
{
    tokio::runtime::Runtime::new()?.block_on(future)
}

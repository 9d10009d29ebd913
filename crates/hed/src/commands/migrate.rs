//! `hed migrate` command implementation.
//!
//! Imports the JSON export of the old document store. Each record is
//! normalized to the current markup and inserted with a fresh id; records
//! that fail are reported and skipped.

use std::path::PathBuf;

use clap::Args;
use hed_config::{CliSettings, Config};
use hed_posts::{LegacyPost, PostStore};

use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the migrate command.
#[derive(Args)]
pub(crate) struct MigrateArgs {
    /// JSON file holding an array of legacy post records.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover hed.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config).
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Outcome of an import run.
#[derive(Debug, Default, PartialEq, Eq)]
struct MigrateReport {
    imported: usize,
    failed: Vec<String>,
}

impl MigrateArgs {
    /// Execute the migrate command.
    ///
    /// # Errors
    ///
    /// Returns an error if the export cannot be read or parsed, or the
    /// database cannot be opened.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            database: self.database,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let records = read_export(&self.file)?;
        output.status(
            Tone::Plain,
            &format!(
                "Importing {} records into {}",
                records.len(),
                config.database_resolved.path.display()
            ),
        );

        let store = PostStore::connect(&config.database_resolved.path).await?;
        store.migrate().await?;

        let report = import_all(&store, &records).await;
        for label in &report.failed {
            output.status(Tone::Skipped, &format!("Skipped: {label}"));
        }
        output.status(
            Tone::Done,
            &format!("Imported {} of {} posts", report.imported, records.len()),
        );

        Ok(())
    }
}

fn read_export(path: &std::path::Path) -> Result<Vec<LegacyPost>, CliError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn import_all(store: &PostStore, records: &[LegacyPost]) -> MigrateReport {
    let mut report = MigrateReport::default();
    for record in records {
        match store.import_legacy(record).await {
            Ok(post) => {
                tracing::info!(id = post.id, source = %record.label(), "Imported post");
                report.imported += 1;
            }
            Err(e) => {
                tracing::warn!(source = %record.label(), error = %e, "Failed to import post");
                report.failed.push(format!("{}: {e}", record.label()));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const EXPORT: &str = r#"[
        {
            "id": "abc",
            "title": "March",
            "content": ["<h2>Intro</h2>", "<p>Text ![Image]$$0-1$$</p>"],
            "images": {"0-1": "http://x/a.png"},
            "createdAt": 1700000000000
        },
        {
            "title": "",
            "content": "lost"
        },
        {
            "title": "April",
            "content": "Plain [Image]",
            "images": ["http://x/b.png"]
        }
    ]"#;

    #[test]
    fn test_read_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, EXPORT).unwrap();

        let records = read_export(&path).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].title, "March");
    }

    #[test]
    fn test_read_export_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"{"title": "x"}"#).unwrap();

        assert!(matches!(read_export(&path), Err(CliError::Json(_))));
    }

    #[tokio::test]
    async fn test_import_all_skips_invalid_records() {
        let store = PostStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        let records: Vec<LegacyPost> = serde_json::from_str(EXPORT).unwrap();

        let report = import_all(&store, &records).await;

        assert_eq!(report.imported, 2);
        assert_eq!(report.failed.len(), 1);

        let posts = store.list().await.unwrap();
        assert_eq!(posts.len(), 2);
        let march = posts.iter().find(|p| p.title == "March").unwrap();
        assert_eq!(march.images, vec!["http://x/a.png".to_owned()]);
        assert!(march.body.starts_with("## Intro"));
        assert!(march.body.contains("[Image]"));
    }
}

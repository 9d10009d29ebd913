//! `hed render` command implementation.
//!
//! Renders a post body file the same way the server does, for checking
//! markup without running the dashboard.

use std::path::PathBuf;

use clap::Args;
use hed_markup::{ImageTable, RenderOptions, render_with};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Post body file in dashboard markup.
    file: PathBuf,

    /// Image URL for the next `[Image]` placeholder (repeatable, in order).
    #[arg(long = "image", value_name = "URL")]
    images: Vec<String>,

    /// Append images no placeholder claimed as a gallery.
    #[arg(long)]
    gallery: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or stdout is closed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let text = std::fs::read_to_string(&self.file)?;
        let html = self.render(&text);
        Output::new().markup(&html)?;
        Ok(())
    }

    fn render(&self, text: &str) -> String {
        let table = ImageTable::ordered(&self.images);
        render_with(
            text,
            &table,
            RenderOptions {
                gallery: self.gallery,
            },
        )
    }
}

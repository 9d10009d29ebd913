//! Lightweight markup renderer for dashboard posts.
//!
//! Post bodies are plain text with a handful of line-level rules and inline
//! image placeholders. This crate turns such a body plus its [`ImageTable`]
//! into an HTML fragment, and converts fragments back into editable text.
//!
//! # Syntax
//!
//! | Source          | Output                         |
//! |-----------------|--------------------------------|
//! | `# Text`        | `<h1>`                         |
//! | `## Text`       | `<h2>`                         |
//! | `### Text`      | `<h3>`                         |
//! | `**Text**`      | `<strong>`                     |
//! | `- Text`        | list item                      |
//! | `-- Text`       | nested list item               |
//! | `[Image]`       | next image from the table      |
//! | `![Image]$$k$$` | image stored under key `k`     |
//!
//! # Example
//!
//! ```
//! use hed_markup::{ImageTable, render};
//!
//! let images = ImageTable::ordered(["http://x/1.png"]);
//! let html = render("# Hi\n\n- **a**\n- b\n[Image]", &images);
//!
//! assert!(html.starts_with("<h1>Hi</h1><ul>"));
//! assert!(html.contains(r#"src="http://x/1.png""#));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! text ──► sections ──► line rules ──► lists ──► bold ──► images ──► paragraphs
//!                       (rules.rs)     (blocks.rs)        (images.rs) (blocks.rs)
//! ```

mod blocks;
mod editable;
mod images;
mod legacy;
mod render;
mod rules;
mod util;

pub use editable::{Editable, PLACEHOLDER, Splice, insert_placeholder, placeholder_count, to_editable};
pub use images::{ImageEntry, ImageResolver, ImageTable};
pub use legacy::normalize_paragraphs;
pub use render::{PREVIEW_CHARS, RenderOptions, preview, render, render_with, sections};

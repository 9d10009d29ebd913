//! Render entry points.

use crate::blocks::{assemble, coalesce_lists, emphasize_lines, resolve_images};
use crate::images::{ImageResolver, ImageTable};
use crate::rules::{classify, placeholder_around};
use crate::util::escape_attr;

/// Number of characters shown in list previews.
pub const PREVIEW_CHARS: usize = 150;

/// Rendering options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderOptions {
    /// Append images no placeholder claimed as a trailing gallery grid.
    pub gallery: bool,
}

impl RenderOptions {
    /// Enable the trailing gallery.
    #[must_use]
    pub fn with_gallery(mut self) -> Self {
        self.gallery = true;
        self
    }
}

/// Render a post body with default options.
///
/// # Example
///
/// ```
/// use hed_markup::{ImageTable, render};
///
/// let html = render("### Title", &ImageTable::new());
/// assert_eq!(html, "<h3>Title</h3>");
/// ```
#[must_use]
pub fn render(text: &str, images: &ImageTable) -> String {
    render_with(text, images, RenderOptions::default())
}

/// Render a post body.
///
/// Each section is rendered on its own and the results are concatenated.
/// Image entries are shared across sections and consumed in document order.
#[must_use]
pub fn render_with(text: &str, images: &ImageTable, options: RenderOptions) -> String {
    let mut resolver = images.resolver();
    let mut out = String::with_capacity(text.len() * 2);

    for section in sections(text) {
        out.push_str(&render_section(section, &mut resolver));
    }

    if options.gallery {
        push_gallery(&resolver, &mut out);
    }

    out
}

/// Render a truncated body for list views.
///
/// At most `max_chars` characters are kept; `...` marks a cut. A cut that
/// would split a placeholder token drops the whole token instead.
#[must_use]
pub fn preview(text: &str, images: &ImageTable, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let cut = placeholder_around(text, idx).map_or(idx, |range| range.start);
            render(&format!("{}...", &text[..cut]), images)
        }
        None => render(text, images),
    }
}

/// Split a body into sections at top-level (`# `) headings.
///
/// Text before the first heading forms its own section. Sections keep their
/// trailing newlines so concatenating them yields the input.
#[must_use]
pub fn sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if offset > start && line.starts_with("# ") {
            sections.push(&text[start..offset]);
            start = offset;
        }
        offset += line.len();
    }
    if start < text.len() {
        sections.push(&text[start..]);
    }

    sections
}

fn render_section(section: &str, resolver: &mut ImageResolver<'_>) -> String {
    let lines = section.lines().map(classify).collect();
    let lines = coalesce_lists(lines);
    let lines = emphasize_lines(lines);
    let lines = resolve_images(lines, resolver);
    assemble(lines)
}

fn push_gallery(resolver: &ImageResolver<'_>, out: &mut String) {
    let mut remaining = resolver.remaining().peekable();
    if remaining.peek().is_none() {
        return;
    }

    out.push_str(r#"<div class="post-gallery">"#);
    for (idx, url) in remaining.enumerate() {
        out.push_str(&format!(
            r#"<img src="{}" alt="Gallery image {}" loading="lazy">"#,
            escape_attr(url),
            idx + 1
        ));
    }
    out.push_str("</div>");
}

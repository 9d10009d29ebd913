//! Editor round trip: markup back to placeholder text, and placeholder splicing.
//!
//! The edit form works on plain text with `[Image]` tokens and a parallel
//! list of image URLs. The Nth token owns the Nth URL, so every operation
//! here inserts or removes both together.

use std::sync::LazyLock;

use regex::Regex;

use crate::images::ImageTable;
use crate::render::render;
use crate::rules::{PLACEHOLDER as PLACEHOLDER_PATTERN, Placeholder, placeholder_around};
use crate::util::{byte_offset, unescape};

/// Canonical placeholder token.
pub const PLACEHOLDER: &str = "[Image]";

/// What gets spliced into the text for a new image: the token on its own line.
const PLACEHOLDER_INSERT: &str = "\n[Image]\n";

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").unwrap());

static SRC_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bsrc\s*=\s*"([^"]*)""#).unwrap());

static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bclass\s*=\s*"([^"]*)""#).unwrap());

/// Placeholder-bearing text plus its ordered images.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Editable {
    /// Body text with placeholder tokens.
    pub text: String,
    /// Image URLs in placeholder order.
    pub images: Vec<String>,
}

/// Result of splicing a placeholder into text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Splice {
    /// Text with the placeholder inserted.
    pub text: String,
    /// Cursor position (in characters) just past the inserted placeholder.
    pub cursor: usize,
}

impl Editable {
    /// Create from text and images.
    #[must_use]
    pub fn new(text: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            text: text.into(),
            images,
        }
    }

    /// Ordinal image table for rendering.
    #[must_use]
    pub fn table(&self) -> ImageTable {
        ImageTable::ordered(self.images.iter().cloned())
    }

    /// Render the current text.
    #[must_use]
    pub fn render(&self) -> String {
        render(&self.text, &self.table())
    }

    /// Insert an image at character offset `offset`.
    ///
    /// The placeholder goes into the text and the URL into the image list at
    /// the slot matching the number of placeholders before `offset`. Returns
    /// the new cursor offset.
    pub fn insert_image(&mut self, offset: usize, url: impl Into<String>) -> usize {
        let byte = insertion_point(&self.text, offset);
        let ordinal = placeholder_count(&self.text[..byte]).min(self.images.len());

        let splice = insert_placeholder(&self.text, offset);
        self.text = splice.text;
        self.images.insert(ordinal, url.into());

        splice.cursor
    }

    /// Remove the `ordinal`-th placeholder and its image.
    ///
    /// Returns the removed URL, or `None` if there is no such placeholder.
    pub fn remove_image(&mut self, ordinal: usize) -> Option<String> {
        let range = PLACEHOLDER_PATTERN
            .captures_iter(&self.text)
            .filter(|caps| Placeholder::from_captures(caps) == Placeholder::Ordinal)
            .nth(ordinal)?
            .get(0)?
            .range();
        self.text.replace_range(range, "");

        (ordinal < self.images.len()).then(|| self.images.remove(ordinal))
    }
}

/// Splice the placeholder token into `text` at character offset `offset`.
///
/// Offsets past the end are clamped, and an offset inside an existing token
/// moves to the end of that token. The returned cursor is the insertion
/// point plus the length of the inserted token.
///
/// # Example
///
/// ```
/// use hed_markup::insert_placeholder;
///
/// let splice = insert_placeholder("ab", 1);
/// assert_eq!(splice.text, "a\n[Image]\nb");
/// assert_eq!(splice.cursor, 10);
/// ```
#[must_use]
pub fn insert_placeholder(text: &str, offset: usize) -> Splice {
    let byte = insertion_point(text, offset);

    let mut out = String::with_capacity(text.len() + PLACEHOLDER_INSERT.len());
    out.push_str(&text[..byte]);
    out.push_str(PLACEHOLDER_INSERT);
    out.push_str(&text[byte..]);

    let cursor = text[..byte].chars().count() + PLACEHOLDER_INSERT.chars().count();
    Splice { text: out, cursor }
}

/// Byte position for a splice at character `offset`, never inside a token.
fn insertion_point(text: &str, offset: usize) -> usize {
    let byte = byte_offset(text, offset);
    placeholder_around(text, byte).map_or(byte, |range| range.end)
}

/// Count ordinal placeholders in `text`.
#[must_use]
pub fn placeholder_count(text: &str) -> usize {
    PLACEHOLDER_PATTERN
        .captures_iter(text)
        .filter(|caps| Placeholder::from_captures(caps) == Placeholder::Ordinal)
        .count()
}

/// Convert rendered or stored markup back into editable text.
///
/// Every image tag becomes a `[Image]` line and its `src` joins the image
/// list in order; images inside a gallery are listed without a placeholder.
/// Headings, list items, bold and line breaks turn back into their source
/// syntax and entities are decoded. Tags the renderer never emits are
/// dropped, keeping their text.
#[must_use]
pub fn to_editable(markup: &str) -> Editable {
    let mut writer = EditableWriter::default();
    let mut last = 0;

    for caps in TAG.captures_iter(markup) {
        let Some(found) = caps.get(0) else {
            continue;
        };
        writer.text(&markup[last..found.start()]);
        last = found.end();

        let closing = !caps[1].is_empty();
        writer.tag(&caps[2].to_ascii_lowercase(), &caps[3], closing);
    }
    writer.text(&markup[last..]);

    writer.finish()
}

#[derive(Default)]
struct EditableWriter {
    text: String,
    images: Vec<String>,
    div_depth: usize,
    /// Div depth of the open gallery, 0 when outside one.
    gallery_depth: usize,
}

impl EditableWriter {
    fn in_gallery(&self) -> bool {
        self.gallery_depth > 0
    }

    fn text(&mut self, raw: &str) {
        if self.in_gallery() || raw.is_empty() {
            return;
        }
        let decoded = unescape(raw);
        if self.text.is_empty() || self.text.ends_with('\n') {
            self.text.push_str(decoded.trim_start_matches([' ', '\t']));
        } else {
            self.text.push_str(&decoded);
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let len = self.text.trim_end_matches([' ', '\t']).len();
        self.text.truncate(len);
    }

    fn tag(&mut self, name: &str, attrs: &str, closing: bool) {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.block_break();
                if !closing {
                    let level = name[1..].parse().unwrap_or(1);
                    self.text.push_str(&"#".repeat(level));
                    self.text.push(' ');
                }
            }
            "p" | "ul" | "ol" => self.block_break(),
            "li" => {
                self.line_break();
                if !closing {
                    let nested = attr(&CLASS_ATTR, attrs)
                        .is_some_and(|class| class.split_whitespace().any(|c| c == "nested"));
                    self.text.push_str(if nested { "-- " } else { "- " });
                }
            }
            "strong" | "b" => self.text.push_str("**"),
            "br" => self.text.push('\n'),
            "div" if closing => {
                if self.gallery_depth == self.div_depth {
                    self.gallery_depth = 0;
                }
                self.div_depth = self.div_depth.saturating_sub(1);
                self.block_break();
            }
            "div" => {
                self.div_depth += 1;
                let gallery = attr(&CLASS_ATTR, attrs)
                    .is_some_and(|class| class.split_whitespace().any(|c| c == "post-gallery"));
                if gallery && !self.in_gallery() {
                    self.gallery_depth = self.div_depth;
                }
                self.block_break();
            }
            "img" => {
                let Some(src) = attr(&SRC_ATTR, attrs) else {
                    return;
                };
                let src = unescape(&src).into_owned();
                if !self.in_gallery() {
                    self.line_break();
                    self.text.push_str(PLACEHOLDER);
                    self.text.push('\n');
                }
                self.images.push(src);
            }
            _ => {}
        }
    }

    fn line_break(&mut self) {
        self.trim_trailing_spaces();
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }

    fn block_break(&mut self) {
        self.trim_trailing_spaces();
        if self.text.is_empty() {
            return;
        }
        while !self.text.ends_with("\n\n") {
            self.text.push('\n');
        }
    }

    fn finish(self) -> Editable {
        Editable {
            text: self.text.trim_matches('\n').trim_end().to_owned(),
            images: self.images,
        }
    }
}

fn attr(pattern: &Regex, attrs: &str) -> Option<String> {
    pattern.captures(attrs).map(|caps| caps[1].to_owned())
}

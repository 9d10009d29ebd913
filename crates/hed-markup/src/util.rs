//! Shared escaping and offset helpers.

use std::borrow::Cow;

/// Escape user text for use inside element content.
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Escape a value for use inside a double-quoted attribute.
pub(crate) fn escape_attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Decode HTML entities back to plain text.
pub(crate) fn unescape(text: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(text)
}

/// Convert a character offset into a byte offset, clamped to the text length.
pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx)
}

/// Image block markup for a resolved placeholder.
pub(crate) fn image_block(url: &str) -> String {
    format!(
        r#"<div class="post-image"><img src="{}" alt="Content image" loading="lazy"></div>"#,
        escape_attr(url)
    )
}

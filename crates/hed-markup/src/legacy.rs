//! Folding historical paragraph-list bodies into the editable shape.

use std::collections::HashSet;

use crate::editable::{Editable, to_editable};
use crate::images::ImageTable;
use crate::rules::{PLACEHOLDER, Placeholder};
use crate::util::escape_attr;

/// Normalize a list of stored paragraphs and their keyed image map.
///
/// Keyed placeholders become image tags for their URL (unknown keys vanish,
/// as they do when rendering) and every paragraph is then converted with
/// [`to_editable`]. Paragraphs are joined by a blank line. Table entries no
/// paragraph referenced are appended to the image list so none is lost.
///
/// # Example
///
/// ```
/// use hed_markup::{ImageTable, normalize_paragraphs};
///
/// let table = ImageTable::keyed([("0-1", "http://x/a.png")]);
/// let editable = normalize_paragraphs(&["Intro ![Image]$$0-1$$", "Next"], &table);
///
/// assert_eq!(editable.text, "Intro\n[Image]\n\nNext");
/// assert_eq!(editable.images, vec!["http://x/a.png"]);
/// ```
#[must_use]
pub fn normalize_paragraphs<S: AsRef<str>>(paragraphs: &[S], table: &ImageTable) -> Editable {
    let mut used = HashSet::new();
    let mut blocks = Vec::with_capacity(paragraphs.len());
    let mut images = Vec::new();

    for paragraph in paragraphs {
        let markup = inline_keyed(paragraph.as_ref(), table, &mut used);
        let editable = to_editable(&markup);
        if editable.text.is_empty() && editable.images.is_empty() {
            continue;
        }
        blocks.push(editable.text);
        images.extend(editable.images);
    }

    images.extend(
        table
            .entries()
            .iter()
            .filter(|entry| entry.key.as_ref().is_none_or(|key| !used.contains(key)))
            .map(|entry| entry.url.clone()),
    );

    Editable {
        text: blocks.join("\n\n"),
        images,
    }
}

/// Replace keyed placeholders with `<img>` tags, recording the keys used.
///
/// Ordinal tokens are left in place for [`to_editable`] to keep as text.
fn inline_keyed(paragraph: &str, table: &ImageTable, used: &mut HashSet<String>) -> String {
    PLACEHOLDER
        .replace_all(paragraph, |caps: &regex::Captures<'_>| {
            match Placeholder::from_captures(caps) {
                Placeholder::Keyed(key) => match table.get(key) {
                    Some(url) => {
                        used.insert(key.to_owned());
                        format!(r#"<img src="{}">"#, escape_attr(url))
                    }
                    None => String::new(),
                },
                Placeholder::Ordinal => caps[0].to_owned(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_keyed_placeholders_become_ordinal() {
        let table = ImageTable::keyed([("0-1", "a"), ("1-1", "b")]);
        let editable = normalize_paragraphs(
            &["# Title", "![Image]$$0-1$$", "text ![Image]$$1-1$$ more"],
            &table,
        );
        assert_eq!(editable.text, "# Title\n\n[Image]\n\ntext\n[Image]\nmore");
        assert_eq!(editable.images, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_key_dropped() {
        let table = ImageTable::keyed([("0-1", "a")]);
        let editable = normalize_paragraphs(&["x ![Image]$$9-9$$"], &table);
        assert_eq!(editable.text, "x");
        assert_eq!(editable.images, vec!["a"]);
    }

    #[test]
    fn test_unreferenced_entries_appended() {
        let table = ImageTable::keyed([("0-2", "b"), ("0-1", "a"), ("2-1", "c")]);
        let editable = normalize_paragraphs(&["![Image]$$0-2$$"], &table);
        assert_eq!(editable.images, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_raw_img_tags_in_paragraphs() {
        let table = ImageTable::new();
        let editable = normalize_paragraphs(
            &[r#"<img src="http://x/a.png" alt="">"#, "after"],
            &table,
        );
        assert_eq!(editable.text, "[Image]\n\nafter");
        assert_eq!(editable.images, vec!["http://x/a.png"]);
    }

    #[test]
    fn test_empty_paragraphs_skipped() {
        let editable = normalize_paragraphs(&["one", "", "  ", "two"], &ImageTable::new());
        assert_eq!(editable.text, "one\n\ntwo");
    }

    #[test]
    fn test_entities_decoded() {
        let editable = normalize_paragraphs(&["a &amp; b"], &ImageTable::new());
        assert_eq!(editable.text, "a & b");
    }

    #[test]
    fn test_result_renders_same_images_in_order() {
        let table = ImageTable::keyed([("0-1", "a"), ("1-1", "b")]);
        let editable = normalize_paragraphs(&["![Image]$$1-1$$", "![Image]$$0-1$$"], &table);
        let html = editable.render();
        let b = html.find(r#"src="b""#).unwrap();
        let a = html.find(r#"src="a""#).unwrap();
        assert!(b < a);
    }
}

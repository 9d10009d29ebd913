//! Block assembly: lists, image splicing and paragraphs.

use crate::images::ImageResolver;
use crate::rules::{PLACEHOLDER, Placeholder, emphasize};
use crate::util::image_block;

/// A processed source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Line {
    /// Empty or whitespace-only line; ends a paragraph.
    Blank,
    /// Running text, wrapped into paragraphs.
    Text(String),
    /// List item awaiting its `<ul>`.
    Item(String),
    /// Block-level markup passed through unwrapped.
    Block(String),
}

/// Wrap runs of consecutive list items in a single `<ul>`.
pub(crate) fn coalesce_lists(lines: Vec<Line>) -> Vec<Line> {
    let mut out = Vec::with_capacity(lines.len());
    let mut list = String::new();

    for line in lines {
        if let Line::Item(item) = line {
            list.push_str(&item);
            continue;
        }
        if !list.is_empty() {
            out.push(Line::Block(format!("<ul>{list}</ul>")));
            list.clear();
        }
        out.push(line);
    }
    if !list.is_empty() {
        out.push(Line::Block(format!("<ul>{list}</ul>")));
    }

    out
}

/// Apply bold spans to text and block lines.
pub(crate) fn emphasize_lines(lines: Vec<Line>) -> Vec<Line> {
    lines
        .into_iter()
        .map(|line| match line {
            Line::Text(text) => Line::Text(emphasize(&text)),
            Line::Item(item) => Line::Item(emphasize(&item)),
            Line::Block(block) => Line::Block(emphasize(&block)),
            Line::Blank => Line::Blank,
        })
        .collect()
}

/// Resolve placeholders in document order.
///
/// In running text an image splits the line: the text before and after stays
/// text and the image becomes its own block. Inside block markup the image is
/// spliced in place. Unresolved placeholders disappear.
pub(crate) fn resolve_images(lines: Vec<Line>, resolver: &mut ImageResolver<'_>) -> Vec<Line> {
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        match line {
            Line::Text(text) if PLACEHOLDER.is_match(&text) => {
                split_text(&text, resolver, &mut out);
            }
            Line::Block(block) if PLACEHOLDER.is_match(&block) => {
                out.push(Line::Block(splice_block(&block, resolver)));
            }
            other => out.push(other),
        }
    }

    out
}

fn resolve(placeholder: Placeholder<'_>, resolver: &mut ImageResolver<'_>) -> Option<String> {
    let url = match placeholder {
        Placeholder::Ordinal => resolver.next_ordinal(),
        Placeholder::Keyed(key) => resolver.by_key(key),
    }?;
    Some(image_block(url))
}

fn split_text(text: &str, resolver: &mut ImageResolver<'_>, out: &mut Vec<Line>) {
    let mut pending = String::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(found) = caps.get(0) else {
            continue;
        };
        pending.push_str(&text[last..found.start()]);
        last = found.end();

        if let Some(image) = resolve(Placeholder::from_captures(&caps), resolver) {
            push_text(&pending, out);
            pending.clear();
            out.push(Line::Block(image));
        }
    }
    pending.push_str(&text[last..]);
    push_text(&pending, out);
}

fn push_text(text: &str, out: &mut Vec<Line>) {
    let text = text.trim();
    if !text.is_empty() {
        out.push(Line::Text(text.to_owned()));
    }
}

fn splice_block(block: &str, resolver: &mut ImageResolver<'_>) -> String {
    PLACEHOLDER
        .replace_all(block, |caps: &regex::Captures<'_>| {
            resolve(Placeholder::from_captures(caps), resolver).unwrap_or_default()
        })
        .into_owned()
}

/// Group text lines into paragraphs and emit the final markup.
///
/// Blank lines end a paragraph, lines inside one are joined with `<br />`,
/// and block lines close any open paragraph before being emitted as-is.
pub(crate) fn assemble(lines: Vec<Line>) -> String {
    let mut out = String::new();
    let mut paragraph: Vec<String> = Vec::new();

    for line in lines {
        match line {
            Line::Blank => flush_paragraph(&mut paragraph, &mut out),
            Line::Text(text) => paragraph.push(text),
            Line::Item(block) | Line::Block(block) => {
                flush_paragraph(&mut paragraph, &mut out);
                out.push_str(&block);
            }
        }
    }
    flush_paragraph(&mut paragraph, &mut out);

    out
}

fn flush_paragraph(paragraph: &mut Vec<String>, out: &mut String) {
    if paragraph.is_empty() {
        return;
    }
    out.push_str("<p>");
    out.push_str(&paragraph.join("<br />"));
    out.push_str("</p>");
    paragraph.clear();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::images::ImageTable;

    fn text(s: &str) -> Line {
        Line::Text(s.to_owned())
    }

    fn item(s: &str) -> Line {
        Line::Item(format!("<li>{s}</li>"))
    }

    #[test]
    fn test_coalesce_adjacent_items() {
        let lines = coalesce_lists(vec![item("a"), item("b")]);
        assert_eq!(
            lines,
            vec![Line::Block("<ul><li>a</li><li>b</li></ul>".to_owned())]
        );
    }

    #[test]
    fn test_coalesce_separated_items_form_two_lists() {
        let lines = coalesce_lists(vec![item("a"), text("x"), item("b")]);
        assert_eq!(
            lines,
            vec![
                Line::Block("<ul><li>a</li></ul>".to_owned()),
                text("x"),
                Line::Block("<ul><li>b</li></ul>".to_owned()),
            ]
        );
    }

    #[test]
    fn test_coalesce_blank_line_splits_lists() {
        let lines = coalesce_lists(vec![item("a"), Line::Blank, item("b")]);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_split_text_around_image() {
        let table = ImageTable::ordered(["u"]);
        let mut resolver = table.resolver();
        let lines = resolve_images(vec![text("before [Image] after")], &mut resolver);
        assert_eq!(
            lines,
            vec![
                text("before"),
                Line::Block(image_block("u")),
                text("after"),
            ]
        );
    }

    #[test]
    fn test_unresolved_placeholder_disappears() {
        let table = ImageTable::new();
        let mut resolver = table.resolver();
        let lines = resolve_images(vec![text("[Image]")], &mut resolver);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_unresolved_placeholder_keeps_surrounding_text_together() {
        let table = ImageTable::new();
        let mut resolver = table.resolver();
        let lines = resolve_images(vec![text("a [Image] b")], &mut resolver);
        assert_eq!(lines, vec![text("a  b")]);
    }

    #[test]
    fn test_image_in_block_is_spliced() {
        let table = ImageTable::ordered(["u"]);
        let mut resolver = table.resolver();
        let lines = resolve_images(
            vec![Line::Block("<ul><li>[Image]</li></ul>".to_owned())],
            &mut resolver,
        );
        assert_eq!(
            lines,
            vec![Line::Block(format!("<ul><li>{}</li></ul>", image_block("u")))]
        );
    }

    #[test]
    fn test_assemble_single_paragraph() {
        assert_eq!(assemble(vec![text("a"), text("b")]), "<p>a<br />b</p>");
    }

    #[test]
    fn test_assemble_blank_splits_paragraphs() {
        assert_eq!(
            assemble(vec![text("a"), Line::Blank, text("b")]),
            "<p>a</p><p>b</p>"
        );
    }

    #[test]
    fn test_assemble_block_not_wrapped() {
        assert_eq!(
            assemble(vec![
                Line::Block("<h1>T</h1>".to_owned()),
                text("a"),
                Line::Block("<ul></ul>".to_owned()),
            ]),
            "<h1>T</h1><p>a</p><ul></ul>"
        );
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(assemble(Vec::new()), "");
        assert_eq!(assemble(vec![Line::Blank, Line::Blank]), "");
    }
}

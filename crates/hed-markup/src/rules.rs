//! Line-level transform rules.
//!
//! Rules are tried in order and the first match wins. Headings go from the
//! most specific prefix to the least (`###`, `##`, `#`) and bullets put the
//! nested prefix and the bold variants first, so a shorter rule never claims
//! a line meant for a longer one.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::blocks::Line;
use crate::util::escape_text;

/// What a matching rule turns its line into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RuleKind {
    Heading(u8),
    Item { nested: bool, bold: bool },
}

struct LineRule {
    pattern: Regex,
    kind: RuleKind,
}

impl LineRule {
    fn new(pattern: &str, kind: RuleKind) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            kind,
        }
    }

    fn apply(&self, caps: &Captures<'_>) -> Line {
        let content = caps.get(1).map_or("", |m| m.as_str()).trim_end();
        match self.kind {
            RuleKind::Heading(level) => Line::Block(format!("<h{level}>{content}</h{level}>")),
            RuleKind::Item { nested, bold } => {
                let open = if nested { r#"<li class="nested">"# } else { "<li>" };
                if bold {
                    let rest = caps.get(2).map_or("", |m| m.as_str()).trim_end();
                    Line::Item(format!("{open}<strong>{content}</strong>{rest}</li>"))
                } else {
                    Line::Item(format!("{open}{content}</li>"))
                }
            }
        }
    }
}

static LINE_RULES: LazyLock<Vec<LineRule>> = LazyLock::new(|| {
    vec![
        LineRule::new(r"^### (.*)$", RuleKind::Heading(3)),
        LineRule::new(r"^## (.*)$", RuleKind::Heading(2)),
        LineRule::new(r"^# (.*)$", RuleKind::Heading(1)),
        LineRule::new(
            r"^-- \*\*(.+?)\*\*(.*)$",
            RuleKind::Item {
                nested: true,
                bold: true,
            },
        ),
        LineRule::new(
            r"^-- (.*)$",
            RuleKind::Item {
                nested: true,
                bold: false,
            },
        ),
        LineRule::new(
            r"^- \*\*(.+?)\*\*(.*)$",
            RuleKind::Item {
                nested: false,
                bold: true,
            },
        ),
        LineRule::new(
            r"^- (.*)$",
            RuleKind::Item {
                nested: false,
                bold: false,
            },
        ),
    ]
});

/// Paired bold markers.
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

/// Image placeholders. The keyed alternative comes first so its embedded
/// `[Image]` is never taken for an ordinal token.
pub(crate) static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[Image\]\$\$([^$\s]+)\$\$|\[Image(?: #\d+)?\]").unwrap()
});

/// A placeholder occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placeholder<'t> {
    /// `[Image]` or `[Image #N]`.
    Ordinal,
    /// `![Image]$$KEY$$`.
    Keyed(&'t str),
}

impl<'t> Placeholder<'t> {
    pub(crate) fn from_captures(caps: &Captures<'t>) -> Self {
        match caps.get(1) {
            Some(key) => Self::Keyed(key.as_str()),
            None => Self::Ordinal,
        }
    }
}

/// Byte range of the placeholder token that `byte` falls strictly inside.
pub(crate) fn placeholder_around(text: &str, byte: usize) -> Option<Range<usize>> {
    PLACEHOLDER
        .find_iter(text)
        .map(|found| found.range())
        .take_while(|range| range.start < byte)
        .find(|range| byte < range.end)
}

/// Classify one raw source line, escaping its text.
pub(crate) fn classify(raw: &str) -> Line {
    if raw.trim().is_empty() {
        return Line::Blank;
    }

    let escaped = escape_text(raw);
    for rule in LINE_RULES.iter() {
        if let Some(caps) = rule.pattern.captures(&escaped) {
            return rule.apply(&caps);
        }
    }
    Line::Text(escaped.into_owned())
}

/// Replace paired `**` markers with `<strong>`. Unpaired markers stay literal.
pub(crate) fn emphasize(text: &str) -> String {
    BOLD.replace_all(text, "<strong>$1</strong>").into_owned()
}

//! Terminal output for `hed` commands.
//!
//! Status lines go to stderr, colored by [`Tone`]. Rendered markup is the
//! only thing written to stdout, so `hed render post.txt > post.html` works.

use console::{Style, Term};

/// How a status line is colored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Done,
    Skipped,
    Failed,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Done => Style::new().green(),
            Self::Skipped => Style::new().yellow(),
            Self::Failed => Style::new().red().bold(),
        }
    }
}

pub(crate) struct Output {
    status: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
        }
    }

    /// Write a status line. Failures to write to the terminal are ignored.
    pub(crate) fn status(&self, tone: Tone, msg: &str) {
        let _ = self
            .status
            .write_line(&tone.style().apply_to(msg).to_string());
    }

    /// Write rendered markup to stdout.
    pub(crate) fn markup(&self, html: &str) -> std::io::Result<()> {
        Term::stdout().write_line(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tone_adds_no_styling() {
        let plain = Tone::Plain.style().force_styling(true);
        let failed = Tone::Failed.style().force_styling(true);
        assert_eq!(plain.apply_to("x").to_string(), "x");
        assert_ne!(failed.apply_to("x").to_string(), "x");
    }
}

//! Positioned diagnostics and the display-boundary helpers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single lint finding, anchored at a half-open byte range of the
/// analyzed source. Never mutated after creation.
///
/// Identity for deduplication is the `(message, start, end)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub fix_hint: String,
    pub severity: Severity,
    pub start: usize,
    pub end: usize,
}

impl Diagnostic {
    pub fn warning(
        message: impl Into<String>,
        fix_hint: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            message: message.into(),
            fix_hint: fix_hint.into(),
            severity: Severity::Warning,
            start,
            end,
        }
    }

    pub fn error(
        message: impl Into<String>,
        fix_hint: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            message: message.into(),
            fix_hint: fix_hint.into(),
            severity: Severity::Error,
            start,
            end,
        }
    }

    /// Synthetic diagnostic wrapping a parser rejection; spans no usable
    /// range. The engine itself is never invoked on unparseable input.
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::error(
            format!("Syntax error: {}", message.into()),
            "fix the syntax error before linting",
            0,
            0,
        )
    }

    /// Deduplication identity.
    pub fn key(&self) -> (&str, usize, usize) {
        (self.message.as_str(), self.start, self.end)
    }

    /// A well-formed anchor: `start <= end`.
    pub fn has_valid_range(&self) -> bool {
        self.start <= self.end
    }
}

/// Consumption-boundary filter: drop diagnostics with inverted ranges and
/// order the rest by start offset for highlighting. Emission order is
/// discovery order and carries no ordering guarantee.
pub fn for_display(diagnostics: &[Diagnostic]) -> Vec<Diagnostic> {
    let mut out: Vec<Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.has_valid_range())
        .cloned()
        .collect();
    out.sort_by_key(|d| (d.start, d.end));
    out
}

/// Resolve a byte offset to a 1-indexed `(line, column)` pair.
///
/// Offsets past the end of the source clamp to the last position.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_identity_is_message_and_range() {
        let a = Diagnostic::warning("Missing semicolon", "add one", 8, 9);
        let b = Diagnostic::warning("Missing semicolon", "add one", 8, 9);
        let c = Diagnostic::warning("Missing semicolon", "add one", 12, 13);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_for_display_sorts_and_filters() {
        let valid_late = Diagnostic::warning("late", "", 20, 21);
        let inverted = Diagnostic {
            message: "inverted".into(),
            fix_hint: String::new(),
            severity: Severity::Error,
            start: 9,
            end: 3,
        };
        let valid_early = Diagnostic::error("early", "", 2, 5);

        let shown = for_display(&[valid_late.clone(), inverted, valid_early.clone()]);
        assert_eq!(shown, vec![valid_early, valid_late]);
    }

    #[test]
    fn test_line_col() {
        let source = "let a = 1;\nlet b = 2;\n";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 4), (1, 5));
        assert_eq!(line_col(source, 11), (2, 1));
        assert_eq!(line_col(source, 15), (2, 5));
        // Past-the-end clamps instead of panicking.
        assert_eq!(line_col(source, 500), (3, 1));
    }

    #[test]
    fn test_json_shape() {
        let d = Diagnostic::error("Undeclared variable: 'y'", "declare it", 12, 13);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["start"], 12);
        assert_eq!(json["end"], 13);
    }
}

//! Typed error handling for scriptlint.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scriptlint operations.
///
/// This provides typed errors that library consumers can match on,
/// unlike opaque `anyhow::Error` types.
#[derive(Error, Debug)]
pub enum ScriptlintError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Syntax error when parsing JavaScript source
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        message: String,
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
        /// Byte offset into the source
        offset: usize,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Fix/regeneration errors
    #[error("Fix error: {message}")]
    Fix { message: String },

    /// History store errors
    #[error("History error: {message}")]
    History { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScriptlintError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error at a byte offset, with line/column resolved
    /// against the source being parsed.
    pub fn parse_at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = crate::diagnostic::line_col(source, offset);
        Self::Parse {
            message: message.into(),
            line,
            column,
            offset,
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a fix error.
    pub fn fix(message: impl Into<String>) -> Self {
        Self::Fix {
            message: message.into(),
        }
    }

    /// Create a history error.
    pub fn history(message: impl Into<String>) -> Self {
        Self::History {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (can continue with other files).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Config { .. })
    }
}

/// Convenience type alias for scriptlint results.
pub type ScriptlintResult<T> = Result<T, ScriptlintError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> ScriptlintResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> ScriptlintResult<T> {
        self.map_err(|e| ScriptlintError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_location() {
        let source = "let a = 1;\nlet b = @;";
        let err = ScriptlintError::parse_at(source, 19, "unexpected character");
        if let ScriptlintError::Parse { line, column, .. } = &err {
            assert_eq!(*line, 2);
            assert_eq!(*column, 9);
        } else {
            panic!("Expected Parse error");
        }
        assert!(err.to_string().contains("unexpected character"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(ScriptlintError::parse_at("x", 0, "bad").is_recoverable());
        assert!(ScriptlintError::config("/a/scriptlint.toml", "bad key").is_recoverable());
        assert!(!ScriptlintError::fix("span out of range").is_recoverable());
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let lint_result = result.with_path("/missing/file.js");
        assert!(lint_result.is_err());
    }
}

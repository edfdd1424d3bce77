//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use scriptlint_core::prelude::*;
//! ```
//!
//! This provides the most commonly needed types for script analysis
//! without polluting the namespace with rarely-used items.

// Core analysis types
pub use crate::ast::{DeclKind, Node, Span};
pub use crate::diagnostic::{Diagnostic, Severity};
pub use crate::error::{ScriptlintError, ScriptlintResult};

// Parsing
pub use crate::parse::parse_program;

// Linting
pub use crate::lint::{lint, RuleConfig};

// Scope tracking
pub use crate::scope::ScopeStack;

// File scanning
pub use crate::scan::{gather_js_files, gather_js_files_with_excludes};

// Configuration
pub use crate::config::{load_config, ScriptlintConfig};

// Builder API
pub use crate::builder::{LintResult, Linter};

// Fix functionality
#[cfg(feature = "fix")]
pub use crate::fix::{fix, FixOutcome};

// Lint history
#[cfg(feature = "history")]
pub use crate::history::{HistoryEntry, LintHistory};

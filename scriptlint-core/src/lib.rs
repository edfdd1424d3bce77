//! scriptlint-core: scope-aware static analysis library for JavaScript sources
//!
//! This library provides modular components for parsing, linting, and
//! auto-fixing JavaScript code.
//!
//! # Features
//!
//! - **Missing semicolons**: Flag statements without a trailing `;`
//! - **Undeclared variables**: Flag identifiers never brought into scope
//! - **Unused variables**: Flag declarations that are never read
//! - **Scope tracking**: Nested function and block scopes over a
//!   builtin-seeded global frame
//! - **Auto-fix**: Append terminators and drop unused declarations,
//!   regenerating source from the tree
//! - **Lint history**: Bounded on-disk record of past runs with
//!   change detection
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use scriptlint_core::prelude::*;
//!
//! let result = Linter::new()
//!     .unused_variables(false)
//!     .analyze("let x = 1\nconsole.log(x);")?;
//!
//! for d in &result.diagnostics {
//!     println!("{}: {}", d.severity, d.message);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`lexer`]: Hand-written tokenizer over raw bytes
//! - [`parse`]: Recursive-descent parser producing the [`ast::Node`] tree
//! - [`scope`]: Scope stack with builtin globals and declaration positions
//! - [`lint`]: Rule engine producing [`diagnostic::Diagnostic`]s
//! - [`fix`]: Auto-fix planning and application
//! - [`history`]: Bounded lint history store
//! - [`scan`]: Parallel file discovery
//! - [`builder`]: Fluent builder API for configuration
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `fix` (default): Enable auto-fix functionality
//! - `history` (default): Enable the on-disk lint history store

// Core modules (always available)
pub mod ast;
pub mod builder;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod lexer;
pub mod lint;
pub mod logging;
pub mod parse;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod scope;

// Feature-gated modules
#[cfg(feature = "fix")]
pub mod fix;
#[cfg(feature = "fix")]
mod generate;

#[cfg(feature = "history")]
pub mod history;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{IoResultExt, ScriptlintError, ScriptlintResult};

// Builder API
pub use builder::{LintResult, Linter};

// Syntax tree
pub use ast::{DeclKind, Node, Span};

// Configuration
pub use config::{load_config, HistoryConfig, OutputConfig, ScriptlintConfig};

// Diagnostics
pub use diagnostic::{line_col, Diagnostic, Severity};

// Lexing and parsing
pub use lexer::{tokenize, Token, TokenKind};
pub use parse::parse_program;

// Linting
pub use lint::{lint, RuleConfig};

// Logging
pub use logging::{init_structured_logging, log_error, log_info, log_warn};

// Reporting
pub use report::{print_json, print_plain, render_plain};

// File scanning
pub use scan::{gather_js_files, gather_js_files_with_excludes};

// Scope tracking
pub use scope::{ScopeStack, BUILTIN_GLOBALS};

// Feature-gated re-exports
#[cfg(feature = "fix")]
pub use fix::{fix, FixOutcome};

#[cfg(feature = "history")]
pub use history::{HistoryEntry, LintHistory, DEFAULT_HISTORY_LIMIT};

//! Builder pattern API for running the linter.
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

use crate::diagnostic::{Diagnostic, Severity};
use crate::error::ScriptlintResult;
use crate::lint::{lint, RuleConfig};
use crate::parse::parse_program;
#[cfg(feature = "history")]
use std::path::PathBuf;

/// Builder for configuring and running analysis.
#[derive(Debug, Clone, Default)]
pub struct Linter {
    rules: RuleConfig,
    #[cfg(feature = "history")]
    history: Option<(PathBuf, usize)>,
}

impl Linter {
    /// A linter with all rules enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole rule configuration.
    pub fn with_rules(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Enable or disable the missing-semicolon rule.
    pub fn missing_semicolon(mut self, enabled: bool) -> Self {
        self.rules.missing_semicolon = enabled;
        self
    }

    /// Enable or disable the undeclared-variable rule.
    pub fn undeclared_variables(mut self, enabled: bool) -> Self {
        self.rules.undeclared_variables = enabled;
        self
    }

    /// Enable or disable the unused-variable rule.
    pub fn unused_variables(mut self, enabled: bool) -> Self {
        self.rules.unused_variables = enabled;
        self
    }

    /// The effective rule configuration.
    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Record each run's `(source, diagnostics)` snapshot to the history
    /// store at `path`, keeping the most recent `limit` entries.
    #[cfg(feature = "history")]
    pub fn with_history(mut self, path: impl Into<PathBuf>, limit: usize) -> Self {
        self.history = Some((path.into(), limit));
        self
    }

    /// Parse and lint `source`. Fails only when the parser rejects the
    /// input; findings are ordinary output, and zero findings is a
    /// successful clean result.
    pub fn analyze(&self, source: &str) -> ScriptlintResult<LintResult> {
        let program = parse_program(source)?;
        let diagnostics = lint(&program, source, &self.rules);
        #[cfg(feature = "history")]
        self.record_history(source, &diagnostics)?;
        Ok(LintResult { diagnostics })
    }

    /// Like [`Linter::analyze`], but a parser rejection becomes a single
    /// synthetic error diagnostic spanning no usable range.
    pub fn analyze_lenient(&self, source: &str) -> LintResult {
        match self.analyze(source) {
            Ok(result) => result,
            Err(e) => LintResult {
                diagnostics: vec![Diagnostic::syntax_error(e.to_string())],
            },
        }
    }

    /// Parse, lint, and rewrite `source` to remove fixable problems.
    /// The diagnostics in the outcome reflect the pre-fix tree.
    #[cfg(feature = "fix")]
    pub fn fix(&self, source: &str) -> ScriptlintResult<crate::fix::FixOutcome> {
        let program = parse_program(source)?;
        let outcome = crate::fix::fix(&program, source, &self.rules);
        #[cfg(feature = "history")]
        self.record_history(source, &outcome.diagnostics)?;
        Ok(outcome)
    }

    #[cfg(feature = "history")]
    fn record_history(&self, source: &str, diagnostics: &[Diagnostic]) -> ScriptlintResult<()> {
        if let Some((path, limit)) = &self.history {
            let mut store = crate::history::LintHistory::load(path.clone(), *limit)?;
            store.record(source, diagnostics)?;
        }
        Ok(())
    }
}

/// Result of one analysis call.
#[derive(Debug, Clone)]
pub struct LintResult {
    /// Findings in discovery order, already deduplicated.
    pub diagnostics: Vec<Diagnostic>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_toggles() {
        let linter = Linter::new().missing_semicolon(false);
        let result = linter.analyze("let x = 1\nconsole.log(x)").unwrap();
        assert!(result.is_clean(), "got {:?}", result.diagnostics);
    }

    #[test]
    fn test_counts() {
        let result = Linter::new().analyze("let dead = 1\nconsole.log(ghost);").unwrap();
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warning_count(), 2);
        assert!(!result.is_clean());
    }

    #[test]
    fn test_lenient_analysis_wraps_parse_failure() {
        let result = Linter::new().analyze_lenient("let = 1;");
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.starts_with("Syntax error:"));
        assert_eq!(
            (result.diagnostics[0].start, result.diagnostics[0].end),
            (0, 0)
        );
    }

    #[cfg(feature = "fix")]
    #[test]
    fn test_builder_fix() {
        let outcome = Linter::new().fix("console.log(1)").unwrap();
        assert_eq!(outcome.fixed_source, "console.log(1);");
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_with_history_records_runs() {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir()
            .join("scriptlint_builder_tests")
            .join(format!("history_{}_{}.json", timestamp, id));
        std::fs::remove_file(&path).ok();

        let linter = Linter::new().with_history(&path, 5);
        linter.analyze("console.log(ghost);").unwrap();
        // Identical findings are fingerprint-skipped, not re-recorded.
        linter.analyze("console.log(ghost);").unwrap();
        linter.analyze("let x = 1;\nconsole.log(x);").unwrap();

        let store = crate::history::LintHistory::load(&path, 5).unwrap();
        assert_eq!(store.entries().len(), 2);
        assert_eq!(store.entries()[0].diagnostics.len(), 1);
        assert!(store.entries()[1].diagnostics.is_empty());

        std::fs::remove_file(&path).ok();
    }
}

//! The fix/regeneration pipeline.
//!
//! Re-derives the fixable facts from the tree itself rather than consuming
//! the rule engine's diagnostic list: which statements lack a terminator,
//! and which declared names are never referenced. Undeclared-variable
//! findings have no safe mechanical fix and stay report-only.
//!
//! The caller's tree is never mutated. The derived [`FixPlan`] is applied
//! at serialization time by the generator; if generation fails the
//! pipeline degrades to returning the pre-fix diagnostics with the source
//! unchanged, never a partially rewritten result.

use crate::ast::{Node, Span};
use crate::diagnostic::Diagnostic;
use crate::generate::generate;
use crate::lint::{lint, missing_terminator, unused_names, RuleConfig};
use std::collections::HashSet;

/// Result of a fix run. `diagnostics` reflect the pre-fix tree, so
/// error-severity findings may still describe `fixed_source`.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub fixed_source: String,
}

/// Rewrite annotations derived from one classification pass: statement
/// spans that get a terminator appended on serialization, and binding
/// names whose declarators are dropped.
#[derive(Debug, Default)]
pub(crate) struct FixPlan {
    pub(crate) append_terminator: HashSet<Span>,
    pub(crate) drop_bindings: HashSet<String>,
}

impl FixPlan {
    pub(crate) fn build(program: &Node, source: &str, rules: &RuleConfig) -> Self {
        let mut plan = Self::default();
        if rules.missing_semicolon {
            collect_terminator_spans(program, None, source, &mut plan.append_terminator);
        }
        if rules.unused_variables {
            plan.drop_bindings = unused_names(program)
                .into_iter()
                .map(|(name, _)| name)
                .collect();
        }
        plan
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.append_terminator.is_empty() && self.drop_bindings.is_empty()
    }
}

fn collect_terminator_spans(
    node: &Node,
    parent: Option<&Node>,
    source: &str,
    out: &mut HashSet<Span>,
) {
    if let Some(span) = missing_terminator(node, parent, source) {
        out.insert(span);
    }
    for child in node.children() {
        collect_terminator_spans(child, Some(node), source, out);
    }
}

/// Lint `program`, then rewrite it according to the enabled rules and
/// regenerate source text.
pub fn fix(program: &Node, source: &str, rules: &RuleConfig) -> FixOutcome {
    let diagnostics = lint(program, source, rules);
    let plan = FixPlan::build(program, source, rules);

    if plan.is_empty() {
        return FixOutcome {
            diagnostics,
            fixed_source: source.to_string(),
        };
    }

    match generate(program, source, &plan) {
        Ok(fixed_source) => FixOutcome {
            diagnostics,
            fixed_source,
        },
        Err(e) => {
            tracing::warn!(error = %e, "fix generation failed, returning original source");
            FixOutcome {
                diagnostics,
                fixed_source: source.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_program;

    fn fix_source(source: &str) -> FixOutcome {
        let program = parse_program(source).unwrap();
        fix(&program, source, &RuleConfig::default())
    }

    #[test]
    fn test_appends_missing_terminators() {
        let outcome = fix_source("let x = 1\nconsole.log(x)");
        assert_eq!(outcome.fixed_source, "let x = 1;\nconsole.log(x);");
        assert_eq!(outcome.diagnostics.len(), 2);
    }

    #[test]
    fn test_unused_declaration_removed_entirely() {
        let outcome = fix_source("let z = 5;");
        assert_eq!(outcome.fixed_source, "");
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].message, "Unused variable: 'z'");
    }

    #[test]
    fn test_partially_unused_declaration_list_filtered() {
        let outcome = fix_source("let kept = 1, gone = 2;\nconsole.log(kept);");
        assert_eq!(outcome.fixed_source, "let kept = 1;\nconsole.log(kept);");
    }

    #[test]
    fn test_undeclared_variables_are_report_only() {
        let outcome = fix_source("console.log(mystery);");
        assert_eq!(outcome.fixed_source, "console.log(mystery);");
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(
            outcome.diagnostics[0].message,
            "Undeclared variable: 'mystery'"
        );
    }

    #[test]
    fn test_clean_source_passes_through_verbatim() {
        let source = "let a = 1;\n\n\nconsole.log(a);\n";
        let outcome = fix_source(source);
        // Empty plan: original text survives byte for byte, odd spacing
        // included.
        assert_eq!(outcome.fixed_source, source);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_rewrite_inside_function_body() {
        let outcome = fix_source("function f() { let u = 1; return 2; }\nconsole.log(f());");
        assert!(!outcome.fixed_source.contains("let u"));
        assert!(outcome.fixed_source.contains("return 2;"));
        // The rewritten body must still parse.
        assert!(parse_program(&outcome.fixed_source).is_ok());
    }

    #[test]
    fn test_disabled_rules_do_not_rewrite() {
        let source = "let dead = 1\nconsole.log(live);";
        let program = parse_program(source).unwrap();
        let outcome = fix(&program, source, &RuleConfig::none());
        assert_eq!(outcome.fixed_source, source);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_filtered_declaration_honors_disabled_terminator_rule() {
        let rules = RuleConfig {
            missing_semicolon: false,
            ..RuleConfig::default()
        };
        let source = "let keep = 1, gone = 2\nconsole.log(keep)";
        let program = parse_program(source).unwrap();
        let outcome = fix(&program, source, &rules);
        // The rebuilt declaration must not gain a terminator the rule
        // was told not to enforce.
        assert_eq!(outcome.fixed_source, "let keep = 1\nconsole.log(keep)");
    }

    #[test]
    fn test_fix_reaches_fixed_point_in_one_pass() {
        let first = fix_source("let x = 1\nlet gone = 2;\nconsole.log(x)");
        let second = fix_source(&first.fixed_source);
        assert_eq!(second.fixed_source, first.fixed_source);
        assert!(second
            .diagnostics
            .iter()
            .all(|d| !d.message.starts_with("Missing semicolon")
                && !d.message.starts_with("Unused variable")));
    }
}

//! The diagnostic rule engine.
//!
//! A single pre-order depth-first walk carries the current parent node and
//! applies three rules at each node, in order: missing terminator,
//! undeclared reference, declaration bookkeeping. Scope brackets wrap the
//! recursion into function and block bodies so scope lifetime matches
//! lexical nesting exactly. A second, independent walk derives the
//! used-name set for the unused-variable rule.
//!
//! Disabling a rule suppresses its diagnostics only; scope bookkeeping the
//! other rules depend on always runs.

use crate::ast::{Node, Span};
use crate::diagnostic::Diagnostic;
use crate::scope::ScopeStack;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which of the three rules emit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub missing_semicolon: bool,
    pub undeclared_variables: bool,
    pub unused_variables: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            missing_semicolon: true,
            undeclared_variables: true,
            unused_variables: true,
        }
    }
}

impl RuleConfig {
    /// All rules disabled; useful as a starting point for tests and
    /// builders.
    pub fn none() -> Self {
        Self {
            missing_semicolon: false,
            undeclared_variables: false,
            unused_variables: false,
        }
    }
}

/// Analyze a parsed program against `source` and return the deduplicated
/// diagnostic list in discovery order.
///
/// The tree is borrowed for the duration of the call and never mutated;
/// every call owns its own scope stack and maps.
pub fn lint(program: &Node, source: &str, rules: &RuleConfig) -> Vec<Diagnostic> {
    let mut pass = LintPass {
        source,
        rules,
        scopes: ScopeStack::new(),
        diagnostics: Vec::new(),
        seen: HashSet::new(),
    };
    pass.walk(program, None);

    if rules.unused_variables {
        for (name, span) in unused_names(program) {
            pass.push(Diagnostic::warning(
                format!("Unused variable: '{name}'"),
                "remove the unused declaration",
                span.start,
                span.end,
            ));
        }
    }

    pass.diagnostics
}

struct LintPass<'a> {
    source: &'a str,
    rules: &'a RuleConfig,
    scopes: ScopeStack,
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<(String, usize, usize)>,
}

impl<'a> LintPass<'a> {
    fn push(&mut self, diagnostic: Diagnostic) {
        let key = (
            diagnostic.message.clone(),
            diagnostic.start,
            diagnostic.end,
        );
        if self.seen.insert(key) {
            self.diagnostics.push(diagnostic);
        }
    }

    fn walk(&mut self, node: &Node, parent: Option<&Node>) {
        self.check_missing_terminator(node, parent);
        self.check_identifier_reference(node, parent);

        // Rule 3: declarator bindings register the bound name's own span,
        // not the declarator's full range.
        if let Node::VariableDeclarator { id, .. } = node {
            if let Some((name, span)) = id.as_identifier() {
                self.scopes.declare(name, span);
            }
        }

        match node {
            Node::FunctionDeclaration {
                id, params, body, ..
            } => {
                // The function's own name lives in the enclosing scope so
                // siblings and recursive calls can see it.
                if let Some((name, span)) = id.as_identifier() {
                    self.scopes.declare(name, span);
                }
                self.scopes.enter_scope();
                self.declare_params(params);
                for param in params {
                    self.walk(param, Some(node));
                }
                self.walk(body, Some(node));
                self.scopes.exit_scope();
            }
            Node::FunctionExpression {
                id, params, body, ..
            } => {
                // A named function expression is only visible inside its
                // own scope.
                self.scopes.enter_scope();
                if let Some(id) = id {
                    if let Some((name, span)) = id.as_identifier() {
                        self.scopes.declare(name, span);
                    }
                    self.walk(id, Some(node));
                }
                self.declare_params(params);
                for param in params {
                    self.walk(param, Some(node));
                }
                self.walk(body, Some(node));
                self.scopes.exit_scope();
            }
            Node::ArrowFunction { params, body, .. } => {
                self.scopes.enter_scope();
                self.declare_params(params);
                for param in params {
                    self.walk(param, Some(node));
                }
                self.walk(body, Some(node));
                self.scopes.exit_scope();
            }
            Node::Block { body, .. } => {
                self.scopes.enter_scope();
                for statement in body {
                    self.walk(statement, Some(node));
                }
                self.scopes.exit_scope();
            }
            _ => {
                for child in node.children() {
                    self.walk(child, Some(node));
                }
            }
        }
    }

    /// Parameters become visible before the body is traversed.
    fn declare_params(&mut self, params: &[Node]) {
        for param in params {
            if let Some((name, span)) = param.as_identifier() {
                self.scopes.declare(name, span);
            }
        }
    }

    fn check_missing_terminator(&mut self, node: &Node, parent: Option<&Node>) {
        if !self.rules.missing_semicolon {
            return;
        }
        if let Some(span) = missing_terminator(node, parent, self.source) {
            self.push(Diagnostic::warning(
                "Missing semicolon",
                "add a `;` at the end of the statement",
                span.end.saturating_sub(1),
                span.end,
            ));
        }
    }

    fn check_identifier_reference(&mut self, node: &Node, parent: Option<&Node>) {
        if !is_reference_position(node, parent) {
            return;
        }
        let Some((name, span)) = node.as_identifier() else {
            return;
        };
        if !self.scopes.is_declared(name) && self.rules.undeclared_variables {
            self.push(Diagnostic::error(
                format!("Undeclared variable: '{name}'"),
                "declare the variable with `let`, `const`, or `var`",
                span.start,
                span.end,
            ));
        }
    }
}

/// Rule 1 test, shared with the fix pipeline: the statement span when a
/// terminator-requiring statement lacks one. Statements in a for-loop
/// header are exempt.
pub(crate) fn missing_terminator(
    node: &Node,
    parent: Option<&Node>,
    source: &str,
) -> Option<Span> {
    if !node.requires_terminator() {
        return None;
    }
    if matches!(parent, Some(Node::ForStatement { .. })) {
        return None;
    }
    // Unsliceable spans are skipped rather than aborting the batch.
    let text = node.span().slice(source)?;
    if text.trim_end().ends_with(';') {
        None
    } else {
        Some(node.span())
    }
}

/// Whether `node` is an identifier read, as opposed to a declaration
/// target, the property-name side of a static member access, or a
/// non-computed object-literal key.
pub(crate) fn is_reference_position(node: &Node, parent: Option<&Node>) -> bool {
    if !matches!(node, Node::Identifier { .. }) {
        return false;
    }
    match parent {
        Some(Node::VariableDeclarator { id, .. }) => !std::ptr::eq(id.as_ref(), node),
        Some(Node::Member {
            property, computed, ..
        }) => *computed || !std::ptr::eq(property.as_ref(), node),
        Some(Node::Property { key, computed, .. }) => {
            *computed || !std::ptr::eq(key.as_ref(), node)
        }
        _ => true,
    }
}

/// Whether `node` is the name of a function declaration or a named
/// function expression.
fn is_function_name(node: &Node, parent: Option<&Node>) -> bool {
    match parent {
        Some(Node::FunctionDeclaration { id, .. }) => std::ptr::eq(id.as_ref(), node),
        Some(Node::FunctionExpression { id: Some(id), .. }) => std::ptr::eq(id.as_ref(), node),
        _ => false,
    }
}

/// Second, independent walk: accumulate every identifier reference that is
/// neither a declaration target nor a function name.
pub(crate) fn collect_used_names(
    node: &Node,
    parent: Option<&Node>,
    used: &mut HashSet<String>,
) {
    if let Node::Identifier { name, .. } = node {
        if is_reference_position(node, parent) && !is_function_name(node, parent) {
            used.insert(name.clone());
        }
    }
    for child in node.children() {
        collect_used_names(child, Some(node), used);
    }
}

/// Re-derive the unused declarations of `program` from scratch: a
/// declarations-only walk with the same scope discipline as the rule
/// engine, then the used-name sweep. Function names are exempt; builtins
/// never appear. Sorted by declaration start for deterministic output.
pub(crate) fn unused_names(program: &Node) -> Vec<(String, Span)> {
    let mut declarations = DeclarationPass {
        scopes: ScopeStack::new(),
        function_names: HashSet::new(),
    };
    declarations.walk(program);

    let mut used = HashSet::new();
    collect_used_names(program, None, &mut used);

    let mut unused: Vec<(String, Span)> = declarations
        .scopes
        .positions()
        .iter()
        .filter(|(name, _)| {
            !used.contains(*name)
                && !ScopeStack::is_builtin(name)
                && !declarations.function_names.contains(*name)
        })
        .map(|(name, span)| (name.clone(), *span))
        .collect();
    unused.sort_by_key(|(_, span)| span.start);
    unused
}

/// Declarations-only traversal with the rule engine's scope bracketing.
struct DeclarationPass {
    scopes: ScopeStack,
    function_names: HashSet<String>,
}

impl DeclarationPass {
    fn walk(&mut self, node: &Node) {
        if let Node::VariableDeclarator { id, .. } = node {
            if let Some((name, span)) = id.as_identifier() {
                self.scopes.declare(name, span);
            }
        }
        match node {
            Node::FunctionDeclaration {
                id, params, body, ..
            } => {
                if let Some((name, span)) = id.as_identifier() {
                    self.scopes.declare(name, span);
                    self.function_names.insert(name.to_string());
                }
                self.scopes.enter_scope();
                self.declare_params(params);
                self.walk(body);
                self.scopes.exit_scope();
            }
            Node::FunctionExpression {
                id, params, body, ..
            } => {
                self.scopes.enter_scope();
                if let Some(id) = id {
                    if let Some((name, span)) = id.as_identifier() {
                        self.scopes.declare(name, span);
                        self.function_names.insert(name.to_string());
                    }
                }
                self.declare_params(params);
                self.walk(body);
                self.scopes.exit_scope();
            }
            Node::ArrowFunction { params, body, .. } => {
                self.scopes.enter_scope();
                self.declare_params(params);
                self.walk(body);
                self.scopes.exit_scope();
            }
            Node::Block { body, .. } => {
                self.scopes.enter_scope();
                for statement in body {
                    self.walk(statement);
                }
                self.scopes.exit_scope();
            }
            _ => {
                for child in node.children() {
                    self.walk(child);
                }
            }
        }
    }

    fn declare_params(&mut self, params: &[Node]) {
        for param in params {
            if let Some((name, span)) = param.as_identifier() {
                self.scopes.declare(name, span);
            }
        }
    }
}

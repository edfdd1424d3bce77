//! Tree-to-text generation for the fix pipeline.
//!
//! Subtrees with no rewrites are emitted as verbatim slices of the
//! original source; only nodes whose subtree carries a [`FixPlan`]
//! annotation are recomposed structurally. Terminator annotations become
//! literal appended text here, at serialization time.

use crate::ast::{Node, Span};
use crate::error::{ScriptlintError, ScriptlintResult};
use crate::fix::FixPlan;

/// Serialize `program` applying `plan`. Errors only when a node's span
/// cannot be resolved against `source`; the caller degrades to the
/// original text in that case.
pub(crate) fn generate(program: &Node, source: &str, plan: &FixPlan) -> ScriptlintResult<String> {
    let Node::Program { body, .. } = program else {
        return Err(ScriptlintError::fix("generator expects a program root"));
    };
    let generator = Generator { source, plan };
    let mut parts = Vec::new();
    for statement in body {
        if let Some(text) = generator.gen_statement(statement)? {
            parts.push(text);
        }
    }
    let mut out = parts.join("\n");
    if source.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

struct Generator<'a> {
    source: &'a str,
    plan: &'a FixPlan,
}

impl<'a> Generator<'a> {
    fn slice(&self, node: &Node) -> ScriptlintResult<&'a str> {
        let span = node.span();
        span.slice(self.source).ok_or_else(|| {
            ScriptlintError::fix(format!(
                "node span [{}, {}) does not map into the source",
                span.start, span.end
            ))
        })
    }

    fn needs_terminator(&self, node: &Node) -> bool {
        node.requires_terminator() && self.plan.append_terminator.contains(&node.span())
    }

    fn binding_dropped(&self, declarator: &Node) -> bool {
        match declarator {
            Node::VariableDeclarator { id, .. } => id
                .as_identifier()
                .is_some_and(|(name, _)| self.plan.drop_bindings.contains(name)),
            _ => false,
        }
    }

    /// Whether this subtree carries any rewrite annotation.
    fn has_rewrites(&self, node: &Node) -> bool {
        if self.needs_terminator(node) {
            return true;
        }
        if let Node::VariableDeclaration { declarations, .. } = node {
            if declarations.iter().any(|d| self.binding_dropped(d)) {
                return true;
            }
        }
        node.children().into_iter().any(|c| self.has_rewrites(c))
    }

    /// Serialize a statement; `None` means the statement is dropped from
    /// its container.
    fn gen_statement(&self, node: &Node) -> ScriptlintResult<Option<String>> {
        if matches!(node, Node::VariableDeclaration { .. }) {
            return self.gen_variable_declaration(node, true);
        }
        let children_rewritten = node.children().into_iter().any(|c| self.has_rewrites(c));
        if !children_rewritten {
            let mut text = self.slice(node)?.to_string();
            if self.needs_terminator(node) {
                text.push(';');
            }
            return Ok(Some(text));
        }
        Ok(Some(self.gen(node)?))
    }

    /// A statement position that must not be left empty (for-loop body,
    /// if-branch) falls back to an empty statement when dropped.
    fn gen_statement_or_empty(&self, node: &Node) -> ScriptlintResult<String> {
        Ok(self.gen_statement(node)?.unwrap_or_else(|| ";".to_string()))
    }

    fn gen_variable_declaration(
        &self,
        node: &Node,
        with_terminator: bool,
    ) -> ScriptlintResult<Option<String>> {
        let Node::VariableDeclaration {
            kind, declarations, ..
        } = node
        else {
            return Err(ScriptlintError::fix("expected a variable declaration"));
        };

        let kept: Vec<&Node> = declarations
            .iter()
            .filter(|d| !self.binding_dropped(d))
            .collect();
        if kept.is_empty() {
            // Filtering emptied the list: the whole statement goes.
            return Ok(None);
        }

        let rewritten = kept.len() != declarations.len()
            || declarations.iter().any(|d| self.has_rewrites(d));
        if !rewritten {
            let mut text = self.slice(node)?.to_string();
            if with_terminator && self.needs_terminator(node) {
                text.push(';');
            }
            return Ok(Some(text));
        }

        let mut parts = Vec::new();
        for declarator in &kept {
            parts.push(self.gen(declarator)?);
        }
        let mut text = format!("{} {}", kind.keyword(), parts.join(", "));
        if with_terminator {
            // Mirror the source: a terminator appears only when the
            // original statement carried one or the plan adds one.
            let had_terminator = self.slice(node)?.trim_end().ends_with(';');
            if had_terminator || self.needs_terminator(node) {
                text.push(';');
            }
        }
        Ok(Some(text))
    }

    /// Serialize any node, recomposing structurally only where the
    /// subtree carries rewrites.
    fn gen(&self, node: &Node) -> ScriptlintResult<String> {
        if !self.has_rewrites(node) {
            return Ok(self.slice(node)?.to_string());
        }

        match node {
            Node::Program { body, .. } => {
                let mut parts = Vec::new();
                for statement in body {
                    if let Some(text) = self.gen_statement(statement)? {
                        parts.push(text);
                    }
                }
                Ok(parts.join("\n"))
            }
            Node::Block { body, .. } => {
                let mut parts = Vec::new();
                for statement in body {
                    if let Some(text) = self.gen_statement(statement)? {
                        parts.push(text);
                    }
                }
                if parts.is_empty() {
                    Ok("{}".to_string())
                } else {
                    Ok(format!("{{\n{}\n}}", parts.join("\n")))
                }
            }
            Node::VariableDeclaration { .. } => Ok(self
                .gen_variable_declaration(node, true)?
                .unwrap_or_default()),
            Node::VariableDeclarator { id, init, .. } => {
                let id_text = self.slice(id)?;
                match init {
                    Some(init) => Ok(format!("{} = {}", id_text, self.gen(init)?)),
                    None => Ok(id_text.to_string()),
                }
            }
            Node::FunctionDeclaration {
                id, params, body, ..
            } => Ok(format!(
                "function {}({}) {}",
                self.slice(id)?,
                self.gen_params(params)?,
                self.gen(body)?
            )),
            Node::FunctionExpression {
                id, params, body, ..
            } => {
                let name = match id {
                    Some(id) => format!(" {}", self.slice(id)?),
                    None => String::new(),
                };
                Ok(format!(
                    "function{}({}) {}",
                    name,
                    self.gen_params(params)?,
                    self.gen(body)?
                ))
            }
            Node::ArrowFunction { params, body, .. } => Ok(format!(
                "({}) => {}",
                self.gen_params(params)?,
                self.gen(body)?
            )),
            Node::ExpressionStatement {
                expression, ..
            } => {
                let had_terminator = self
                    .slice(node)?
                    .trim_end()
                    .ends_with(';');
                let mut text = self.gen(expression)?;
                if had_terminator || self.needs_terminator(node) {
                    text.push(';');
                }
                Ok(text)
            }
            Node::ReturnStatement { argument, .. } => {
                let had_terminator = self.slice(node)?.trim_end().ends_with(';');
                let mut text = match argument {
                    Some(argument) => format!("return {}", self.gen(argument)?),
                    None => "return".to_string(),
                };
                if had_terminator || self.needs_terminator(node) {
                    text.push(';');
                }
                Ok(text)
            }
            Node::IfStatement {
                test,
                consequent,
                alternate,
                ..
            } => {
                let mut text = format!(
                    "if ({}) {}",
                    self.gen(test)?,
                    self.gen_statement_or_empty(consequent)?
                );
                if let Some(alternate) = alternate {
                    text.push_str(&format!(
                        " else {}",
                        self.gen_statement_or_empty(alternate)?
                    ));
                }
                Ok(text)
            }
            Node::ForStatement {
                init,
                test,
                update,
                body,
                ..
            } => {
                let init_text = match init.as_deref() {
                    Some(decl @ Node::VariableDeclaration { .. }) => self
                        .gen_variable_declaration(decl, false)?
                        .unwrap_or_default(),
                    Some(expr) => self.gen(expr)?,
                    None => String::new(),
                };
                let test_text = match test {
                    Some(test) => self.gen(test)?,
                    None => String::new(),
                };
                let update_text = match update {
                    Some(update) => self.gen(update)?,
                    None => String::new(),
                };
                Ok(format!(
                    "for ({}; {}; {}) {}",
                    init_text,
                    test_text,
                    update_text,
                    self.gen_statement_or_empty(body)?
                ))
            }
            Node::Call {
                callee, arguments, ..
            } => {
                let mut parts = Vec::new();
                for argument in arguments {
                    parts.push(self.gen(argument)?);
                }
                Ok(format!("{}({})", self.gen(callee)?, parts.join(", ")))
            }
            Node::Member {
                object,
                property,
                computed,
                ..
            } => {
                if *computed {
                    Ok(format!("{}[{}]", self.gen(object)?, self.gen(property)?))
                } else {
                    Ok(format!("{}.{}", self.gen(object)?, self.slice(property)?))
                }
            }
            Node::ObjectLiteral { properties, .. } => {
                let mut parts = Vec::new();
                for property in properties {
                    parts.push(self.gen(property)?);
                }
                if parts.is_empty() {
                    Ok("{}".to_string())
                } else {
                    Ok(format!("{{ {} }}", parts.join(", ")))
                }
            }
            Node::Property {
                key,
                value,
                computed,
                ..
            } => {
                let key_text = if *computed {
                    format!("[{}]", self.gen(key)?)
                } else {
                    self.slice(key)?.to_string()
                };
                Ok(format!("{}: {}", key_text, self.gen(value)?))
            }
            Node::ArrayLiteral { elements, .. } => {
                let mut parts = Vec::new();
                for element in elements {
                    parts.push(self.gen(element)?);
                }
                Ok(format!("[{}]", parts.join(", ")))
            }
            Node::Assignment {
                op, target, value, ..
            } => Ok(format!(
                "{} {} {}",
                self.gen(target)?,
                op,
                self.gen(value)?
            )),
            Node::Binary {
                op, left, right, ..
            } => Ok(format!(
                "{} {} {}",
                self.gen(left)?,
                op,
                self.gen(right)?
            )),
            Node::Unary { op, argument, .. } => {
                let separator = if op.chars().all(|c| c.is_ascii_alphabetic()) {
                    " "
                } else {
                    ""
                };
                Ok(format!("{}{}{}", op, separator, self.gen(argument)?))
            }
            Node::Update {
                op,
                prefix,
                argument,
                ..
            } => {
                if *prefix {
                    Ok(format!("{}{}", op, self.gen(argument)?))
                } else {
                    Ok(format!("{}{}", self.gen(argument)?, op))
                }
            }
            Node::Identifier { .. } | Node::Literal { .. } | Node::Other { .. } => {
                Ok(self.slice(node)?.to_string())
            }
        }
    }

    fn gen_params(&self, params: &[Node]) -> ScriptlintResult<String> {
        let mut parts = Vec::new();
        for param in params {
            parts.push(self.slice(param)?.to_string());
        }
        Ok(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_program;
    use std::collections::HashSet;

    fn plan_with_drops(names: &[&str]) -> FixPlan {
        FixPlan {
            append_terminator: HashSet::new(),
            drop_bindings: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_plan_is_identity_per_statement() {
        let source = "let a = 1;\nconsole.log(a);";
        let program = parse_program(source).unwrap();
        let plan = FixPlan::default();
        assert_eq!(generate(&program, source, &plan).unwrap(), source);
    }

    #[test]
    fn test_terminator_applied_at_serialization() {
        let source = "console.log(1)";
        let program = parse_program(source).unwrap();
        let mut plan = FixPlan::default();
        plan.append_terminator.insert(Span::new(0, 14));
        assert_eq!(
            generate(&program, source, &plan).unwrap(),
            "console.log(1);"
        );
    }

    #[test]
    fn test_declaration_list_rebuilt_from_kept_bindings() {
        let source = "let a = 1, b = 2, c = 3;";
        let program = parse_program(source).unwrap();
        let out = generate(&program, source, &plan_with_drops(&["b"])).unwrap();
        assert_eq!(out, "let a = 1, c = 3;");
    }

    #[test]
    fn test_rebuilt_declaration_keeps_missing_terminator() {
        // No terminator in the source and none in the plan: the rebuilt
        // list must not invent one.
        let source = "let keep = 1, gone = 2\nconsole.log(keep);";
        let program = parse_program(source).unwrap();
        let out = generate(&program, source, &plan_with_drops(&["gone"])).unwrap();
        assert_eq!(out, "let keep = 1\nconsole.log(keep);");
    }

    #[test]
    fn test_emptied_declaration_dropped_from_block() {
        let source = "function f() { let u = 1; return 0; }";
        let program = parse_program(source).unwrap();
        let out = generate(&program, source, &plan_with_drops(&["u"])).unwrap();
        assert!(!out.contains("let"));
        assert!(out.contains("return 0;"));
        assert!(parse_program(&out).is_ok());
    }

    #[test]
    fn test_for_init_regenerated_without_terminator() {
        let source = "for (let i = 0, u = 9; i < 3; i++) { console.log(i); }";
        let program = parse_program(source).unwrap();
        let out = generate(&program, source, &plan_with_drops(&["u"])).unwrap();
        assert!(out.starts_with("for (let i = 0; i < 3; i++)"));
        assert!(parse_program(&out).is_ok());
    }

    #[test]
    fn test_unchanged_sibling_statements_keep_original_text() {
        let source = "let keep = compute( 1 ,2 );\nlet u = 0;\nconsole.log(keep);";
        let program = parse_program(source).unwrap();
        let out = generate(&program, source, &plan_with_drops(&["u"])).unwrap();
        // Quirky spacing in untouched statements survives verbatim.
        assert!(out.contains("compute( 1 ,2 )"));
        assert!(!out.contains("let u"));
    }
}

//! Syntax tree for the JavaScript subset scriptlint understands.
//!
//! Every node is a variant of the closed [`Node`] sum type and carries a
//! half-open byte [`Span`] into the exact source string it was parsed from.
//! The [`Node::Other`] catch-all keeps the tree generically walkable for
//! node kinds no rule cares about (empty statements, parenthesized groups).

use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` byte range into the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice the spanned text out of `source`, if the span is in bounds
    /// and on character boundaries.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        if self.start > self.end || self.end > source.len() {
            return None;
        }
        source.get(self.start..self.end)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Declaration keyword of a variable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

impl DeclKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Let => "let",
            Self::Const => "const",
            Self::Var => "var",
        }
    }
}

/// A node in the syntax tree.
///
/// Spans of statement nodes include a trailing `;` when the source has one;
/// the missing-terminator rule depends on that.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program {
        body: Vec<Node>,
        span: Span,
    },
    VariableDeclaration {
        kind: DeclKind,
        declarations: Vec<Node>,
        span: Span,
    },
    VariableDeclarator {
        id: Box<Node>,
        init: Option<Box<Node>>,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    FunctionDeclaration {
        id: Box<Node>,
        params: Vec<Node>,
        body: Box<Node>,
        span: Span,
    },
    FunctionExpression {
        id: Option<Box<Node>>,
        params: Vec<Node>,
        body: Box<Node>,
        span: Span,
    },
    ArrowFunction {
        params: Vec<Node>,
        body: Box<Node>,
        span: Span,
    },
    Block {
        body: Vec<Node>,
        span: Span,
    },
    ExpressionStatement {
        expression: Box<Node>,
        span: Span,
    },
    ReturnStatement {
        argument: Option<Box<Node>>,
        span: Span,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
        span: Span,
    },
    ForStatement {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
        span: Span,
    },
    Call {
        callee: Box<Node>,
        arguments: Vec<Node>,
        span: Span,
    },
    Member {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
        span: Span,
    },
    ObjectLiteral {
        properties: Vec<Node>,
        span: Span,
    },
    Property {
        key: Box<Node>,
        value: Box<Node>,
        computed: bool,
        span: Span,
    },
    ArrayLiteral {
        elements: Vec<Node>,
        span: Span,
    },
    Assignment {
        op: String,
        target: Box<Node>,
        value: Box<Node>,
        span: Span,
    },
    Binary {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    Unary {
        op: String,
        argument: Box<Node>,
        span: Span,
    },
    Update {
        op: String,
        prefix: bool,
        argument: Box<Node>,
        span: Span,
    },
    /// Number, string, boolean or null literal. The text is recovered
    /// through the span; rules never look inside.
    Literal {
        span: Span,
    },
    /// Catch-all for node kinds no rule inspects. Still yields its
    /// children so generic recursion covers the whole tree.
    Other {
        children: Vec<Node>,
        span: Span,
    },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Program { span, .. }
            | Node::VariableDeclaration { span, .. }
            | Node::VariableDeclarator { span, .. }
            | Node::Identifier { span, .. }
            | Node::FunctionDeclaration { span, .. }
            | Node::FunctionExpression { span, .. }
            | Node::ArrowFunction { span, .. }
            | Node::Block { span, .. }
            | Node::ExpressionStatement { span, .. }
            | Node::ReturnStatement { span, .. }
            | Node::IfStatement { span, .. }
            | Node::ForStatement { span, .. }
            | Node::Call { span, .. }
            | Node::Member { span, .. }
            | Node::ObjectLiteral { span, .. }
            | Node::Property { span, .. }
            | Node::ArrayLiteral { span, .. }
            | Node::Assignment { span, .. }
            | Node::Binary { span, .. }
            | Node::Unary { span, .. }
            | Node::Update { span, .. }
            | Node::Literal { span }
            | Node::Other { span, .. } => *span,
        }
    }

    pub(crate) fn set_span(&mut self, new: Span) {
        match self {
            Node::Program { span, .. }
            | Node::VariableDeclaration { span, .. }
            | Node::VariableDeclarator { span, .. }
            | Node::Identifier { span, .. }
            | Node::FunctionDeclaration { span, .. }
            | Node::FunctionExpression { span, .. }
            | Node::ArrowFunction { span, .. }
            | Node::Block { span, .. }
            | Node::ExpressionStatement { span, .. }
            | Node::ReturnStatement { span, .. }
            | Node::IfStatement { span, .. }
            | Node::ForStatement { span, .. }
            | Node::Call { span, .. }
            | Node::Member { span, .. }
            | Node::ObjectLiteral { span, .. }
            | Node::Property { span, .. }
            | Node::ArrayLiteral { span, .. }
            | Node::Assignment { span, .. }
            | Node::Binary { span, .. }
            | Node::Unary { span, .. }
            | Node::Update { span, .. }
            | Node::Literal { span }
            | Node::Other { span, .. } => *span = new,
        }
    }

    /// The declared children of this node, in source order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Program { body, .. } | Node::Block { body, .. } => body.iter().collect(),
            Node::VariableDeclaration { declarations, .. } => declarations.iter().collect(),
            Node::VariableDeclarator { id, init, .. } => {
                let mut out: Vec<&Node> = vec![id];
                if let Some(init) = init {
                    out.push(init);
                }
                out
            }
            Node::Identifier { .. } | Node::Literal { .. } => Vec::new(),
            Node::FunctionDeclaration {
                id, params, body, ..
            } => {
                let mut out: Vec<&Node> = vec![id.as_ref()];
                out.extend(params.iter());
                out.push(body);
                out
            }
            Node::FunctionExpression {
                id, params, body, ..
            } => {
                let mut out: Vec<&Node> = Vec::new();
                if let Some(id) = id {
                    out.push(id);
                }
                out.extend(params.iter());
                out.push(body);
                out
            }
            Node::ArrowFunction { params, body, .. } => {
                let mut out: Vec<&Node> = params.iter().collect();
                out.push(body);
                out
            }
            Node::ExpressionStatement { expression, .. } => vec![expression],
            Node::ReturnStatement { argument, .. } => {
                argument.iter().map(|a| a.as_ref()).collect()
            }
            Node::IfStatement {
                test,
                consequent,
                alternate,
                ..
            } => {
                let mut out: Vec<&Node> = vec![test, consequent];
                if let Some(alt) = alternate {
                    out.push(alt);
                }
                out
            }
            Node::ForStatement {
                init,
                test,
                update,
                body,
                ..
            } => {
                let mut out: Vec<&Node> = Vec::new();
                for part in [init, test, update].into_iter().flatten() {
                    out.push(part);
                }
                out.push(body);
                out
            }
            Node::Call {
                callee, arguments, ..
            } => {
                let mut out: Vec<&Node> = vec![callee];
                out.extend(arguments.iter());
                out
            }
            Node::Member {
                object, property, ..
            } => vec![object, property],
            Node::ObjectLiteral { properties, .. } => properties.iter().collect(),
            Node::Property { key, value, .. } => vec![key, value],
            Node::ArrayLiteral { elements, .. } => elements.iter().collect(),
            Node::Assignment { target, value, .. } => vec![target, value],
            Node::Binary { left, right, .. } => vec![left, right],
            Node::Unary { argument, .. } | Node::Update { argument, .. } => vec![argument],
            Node::Other { children, .. } => children.iter().collect(),
        }
    }

    /// The name and span when this node is an identifier.
    pub fn as_identifier(&self) -> Option<(&str, Span)> {
        match self {
            Node::Identifier { name, span } => Some((name.as_str(), *span)),
            _ => None,
        }
    }

    /// Whether this node is a statement kind that requires a trailing
    /// terminator when it stands on its own.
    pub fn requires_terminator(&self) -> bool {
        matches!(
            self,
            Node::ExpressionStatement { .. }
                | Node::VariableDeclaration { .. }
                | Node::ReturnStatement { .. }
        )
    }
}

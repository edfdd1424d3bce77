//! Recursive-descent parser for the JavaScript subset.
//!
//! Statements do not need a trailing `;` (catching the missing ones is the
//! linter's job), but when one is present the statement span includes it.
//! Binary expressions use precedence climbing; arrow functions are
//! disambiguated from parenthesized expressions with a bounded token
//! lookahead.

use crate::ast::{DeclKind, Node, Span};
use crate::error::{ScriptlintError, ScriptlintResult};
use crate::lexer::{tokenize, Keyword, Token, TokenKind};

/// Parse a whole source string into a [`Node::Program`].
pub fn parse_program(source: &str) -> ScriptlintResult<Node> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let mut body = Vec::new();
    while !parser.peek().is_eof() {
        body.push(parser.parse_statement()?);
    }
    Ok(Node::Program {
        body,
        span: Span::new(0, source.len()),
    })
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek().kind, TokenKind::Keyword(k) if k == kw)
    }

    fn eat(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> ScriptlintResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ScriptlintError {
        ScriptlintError::parse_at(self.source, self.peek().span.start, message)
    }

    // ── Statements ──────────────────────────────────────────────────

    fn parse_statement(&mut self) -> ScriptlintResult<Node> {
        match &self.peek().kind {
            TokenKind::Keyword(Keyword::Let)
            | TokenKind::Keyword(Keyword::Const)
            | TokenKind::Keyword(Keyword::Var) => self.parse_variable_declaration(true),
            TokenKind::Keyword(Keyword::Function) => self.parse_function(true),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Semicolon => {
                let token = self.advance();
                // Empty statement; no rule inspects it.
                Ok(Node::Other {
                    children: Vec::new(),
                    span: token.span,
                })
            }
            _ => {
                let expression = self.parse_expression()?;
                let mut span = expression.span();
                if let Some(semi) = self.eat(&TokenKind::Semicolon) {
                    span.end = semi.span.end;
                }
                Ok(Node::ExpressionStatement {
                    expression: Box::new(expression),
                    span,
                })
            }
        }
    }

    fn parse_variable_declaration(&mut self, consume_semicolon: bool) -> ScriptlintResult<Node> {
        let keyword = self.advance();
        let kind = match keyword.kind {
            TokenKind::Keyword(Keyword::Let) => DeclKind::Let,
            TokenKind::Keyword(Keyword::Const) => DeclKind::Const,
            TokenKind::Keyword(Keyword::Var) => DeclKind::Var,
            _ => return Err(self.error_here("expected declaration keyword")),
        };

        let mut declarations = Vec::new();
        loop {
            let id = self.parse_identifier("binding name")?;
            let mut span = id.span();
            let init = if self.eat(&TokenKind::Assign).is_some() {
                let init = self.parse_assignment()?;
                span.end = init.span().end;
                Some(Box::new(init))
            } else {
                None
            };
            declarations.push(Node::VariableDeclarator {
                id: Box::new(id),
                init,
                span,
            });
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }

        let mut span = Span::new(
            keyword.span.start,
            declarations.last().map(|d| d.span().end).unwrap_or(keyword.span.end),
        );
        if consume_semicolon {
            if let Some(semi) = self.eat(&TokenKind::Semicolon) {
                span.end = semi.span.end;
            }
        }
        Ok(Node::VariableDeclaration {
            kind,
            declarations,
            span,
        })
    }

    fn parse_function(&mut self, is_declaration: bool) -> ScriptlintResult<Node> {
        let keyword = self.advance();
        let id = if matches!(self.peek().kind, TokenKind::Ident(_)) {
            Some(self.parse_identifier("function name")?)
        } else if is_declaration {
            return Err(self.error_here("expected function name"));
        } else {
            None
        };

        self.expect(&TokenKind::LParen, "`(`")?;
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        let span = Span::new(keyword.span.start, body.span().end);

        if is_declaration {
            // `id` is always present on this path.
            let id = id.ok_or_else(|| self.error_here("expected function name"))?;
            Ok(Node::FunctionDeclaration {
                id: Box::new(id),
                params,
                body: Box::new(body),
                span,
            })
        } else {
            Ok(Node::FunctionExpression {
                id: id.map(Box::new),
                params,
                body: Box::new(body),
                span,
            })
        }
    }

    /// Comma-separated identifiers up to and including the closing paren.
    fn parse_param_list(&mut self) -> ScriptlintResult<Vec<Node>> {
        let mut params = Vec::new();
        if self.eat(&TokenKind::RParen).is_some() {
            return Ok(params);
        }
        loop {
            params.push(self.parse_identifier("parameter name")?);
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "`)`")?;
        Ok(params)
    }

    fn parse_return(&mut self) -> ScriptlintResult<Node> {
        let keyword = self.advance();
        let mut span = keyword.span;

        let argument = if self.at(&TokenKind::Semicolon)
            || self.at(&TokenKind::RBrace)
            || self.peek().is_eof()
        {
            None
        } else {
            let argument = self.parse_expression()?;
            span.end = argument.span().end;
            Some(Box::new(argument))
        };
        if let Some(semi) = self.eat(&TokenKind::Semicolon) {
            span.end = semi.span.end;
        }
        Ok(Node::ReturnStatement { argument, span })
    }

    fn parse_for(&mut self) -> ScriptlintResult<Node> {
        let keyword = self.advance();
        self.expect(&TokenKind::LParen, "`(`")?;

        let init = if self.at(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.peek().kind,
            TokenKind::Keyword(Keyword::Let)
                | TokenKind::Keyword(Keyword::Const)
                | TokenKind::Keyword(Keyword::Var)
        ) {
            Some(Box::new(self.parse_variable_declaration(false)?))
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(&TokenKind::Semicolon, "`;` after for-loop initializer")?;

        let test = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(&TokenKind::Semicolon, "`;` after for-loop condition")?;

        let update = if self.at(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(&TokenKind::RParen, "`)`")?;

        let body = self.parse_statement()?;
        let span = Span::new(keyword.span.start, body.span().end);
        Ok(Node::ForStatement {
            init,
            test,
            update,
            body: Box::new(body),
            span,
        })
    }

    fn parse_if(&mut self) -> ScriptlintResult<Node> {
        let keyword = self.advance();
        self.expect(&TokenKind::LParen, "`(`")?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "`)`")?;
        let consequent = self.parse_statement()?;
        let mut span = Span::new(keyword.span.start, consequent.span().end);

        let alternate = if self.at_keyword(Keyword::Else) {
            self.advance();
            let alternate = self.parse_statement()?;
            span.end = alternate.span().end;
            Some(Box::new(alternate))
        } else {
            None
        };
        Ok(Node::IfStatement {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate,
            span,
        })
    }

    fn parse_block(&mut self) -> ScriptlintResult<Node> {
        let lbrace = self.expect(&TokenKind::LBrace, "`{`")?;
        let mut body = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.peek().is_eof() {
                return Err(self.error_here("unclosed block, expected `}`"));
            }
            body.push(self.parse_statement()?);
        }
        let rbrace = self.advance();
        Ok(Node::Block {
            body,
            span: Span::new(lbrace.span.start, rbrace.span.end),
        })
    }

    // ── Expressions ─────────────────────────────────────────────────

    fn parse_expression(&mut self) -> ScriptlintResult<Node> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ScriptlintResult<Node> {
        let target = self.parse_binary(0)?;
        let op = match self.peek().kind {
            TokenKind::Assign => "=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::StarAssign => "*=",
            TokenKind::SlashAssign => "/=",
            _ => return Ok(target),
        };
        if !matches!(target, Node::Identifier { .. } | Node::Member { .. }) {
            return Err(self.error_here("invalid assignment target"));
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = Span::new(target.span().start, value.span().end);
        Ok(Node::Assignment {
            op: op.to_string(),
            target: Box::new(target),
            value: Box::new(value),
            span,
        })
    }

    fn binary_op(&self) -> Option<(&'static str, u8)> {
        Some(match self.peek().kind {
            TokenKind::OrOr => ("||", 1),
            TokenKind::AndAnd => ("&&", 2),
            TokenKind::EqEq => ("==", 3),
            TokenKind::EqEqEq => ("===", 3),
            TokenKind::NotEq => ("!=", 3),
            TokenKind::NotEqEq => ("!==", 3),
            TokenKind::Lt => ("<", 4),
            TokenKind::Gt => (">", 4),
            TokenKind::Le => ("<=", 4),
            TokenKind::Ge => (">=", 4),
            TokenKind::Plus => ("+", 5),
            TokenKind::Minus => ("-", 5),
            TokenKind::Star => ("*", 6),
            TokenKind::Slash => ("/", 6),
            TokenKind::Percent => ("%", 6),
            _ => return None,
        })
    }

    fn parse_binary(&mut self, min_prec: u8) -> ScriptlintResult<Node> {
        let mut left = self.parse_unary()?;
        while let Some((op, prec)) = self.binary_op() {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            let span = Span::new(left.span().start, right.span().end);
            left = Node::Binary {
                op: op.to_string(),
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ScriptlintResult<Node> {
        let op = match self.peek().kind {
            TokenKind::Not => Some("!"),
            TokenKind::Minus => Some("-"),
            TokenKind::Plus => Some("+"),
            TokenKind::Keyword(Keyword::Typeof) => Some("typeof"),
            _ => None,
        };
        if let Some(op) = op {
            let token = self.advance();
            let argument = self.parse_unary()?;
            let span = Span::new(token.span.start, argument.span().end);
            return Ok(Node::Unary {
                op: op.to_string(),
                argument: Box::new(argument),
                span,
            });
        }

        if matches!(
            self.peek().kind,
            TokenKind::PlusPlus | TokenKind::MinusMinus
        ) {
            let token = self.advance();
            let op = if token.kind == TokenKind::PlusPlus { "++" } else { "--" };
            let argument = self.parse_unary()?;
            let span = Span::new(token.span.start, argument.span().end);
            return Ok(Node::Update {
                op: op.to_string(),
                prefix: true,
                argument: Box::new(argument),
                span,
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ScriptlintResult<Node> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek().kind {
                TokenKind::LParen => {
                    self.advance();
                    let mut arguments = Vec::new();
                    if !self.at(&TokenKind::RParen) {
                        loop {
                            arguments.push(self.parse_assignment()?);
                            if self.eat(&TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                    }
                    let rparen = self.expect(&TokenKind::RParen, "`)`")?;
                    let span = Span::new(expr.span().start, rparen.span.end);
                    expr = Node::Call {
                        callee: Box::new(expr),
                        arguments,
                        span,
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_identifier("property name")?;
                    let span = Span::new(expr.span().start, property.span().end);
                    expr = Node::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: false,
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let property = self.parse_expression()?;
                    let rbracket = self.expect(&TokenKind::RBracket, "`]`")?;
                    let span = Span::new(expr.span().start, rbracket.span.end);
                    expr = Node::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: true,
                        span,
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let token = self.advance();
                    let op = if token.kind == TokenKind::PlusPlus { "++" } else { "--" };
                    let span = Span::new(expr.span().start, token.span.end);
                    expr = Node::Update {
                        op: op.to_string(),
                        prefix: false,
                        argument: Box::new(expr),
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ScriptlintResult<Node> {
        match &self.peek().kind {
            TokenKind::Ident(_) => {
                let id = self.parse_identifier("identifier")?;
                if self.at(&TokenKind::Arrow) {
                    return self.parse_arrow_body(vec![id.clone()], id.span().start);
                }
                Ok(id)
            }
            TokenKind::Number
            | TokenKind::Str
            | TokenKind::Keyword(Keyword::True)
            | TokenKind::Keyword(Keyword::False)
            | TokenKind::Keyword(Keyword::Null) => {
                let token = self.advance();
                Ok(Node::Literal { span: token.span })
            }
            TokenKind::Keyword(Keyword::Function) => self.parse_function(false),
            TokenKind::LParen => {
                if self.paren_starts_arrow() {
                    let lparen = self.advance();
                    let params = self.parse_param_list()?;
                    self.parse_arrow_body(params, lparen.span.start)
                } else {
                    let lparen = self.advance();
                    let mut expr = self.parse_expression()?;
                    let rparen = self.expect(&TokenKind::RParen, "`)`")?;
                    // Widen the span over the parens so source slices keep
                    // the grouping.
                    expr.set_span(Span::new(lparen.span.start, rparen.span.end));
                    Ok(expr)
                }
            }
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::LBracket => self.parse_array_literal(),
            _ => Err(self.error_here("unexpected token in expression")),
        }
    }

    /// Lookahead: does the `(` at the cursor open an arrow-function
    /// parameter list? True when the matching `)` is followed by `=>`.
    fn paren_starts_arrow(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0usize;
        loop {
            let token = self.nth(n);
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.nth(n + 1).kind == TokenKind::Arrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
    }

    fn parse_arrow_body(&mut self, params: Vec<Node>, start: usize) -> ScriptlintResult<Node> {
        self.expect(&TokenKind::Arrow, "`=>`")?;
        let body = if self.at(&TokenKind::LBrace) {
            self.parse_block()?
        } else {
            self.parse_assignment()?
        };
        let span = Span::new(start, body.span().end);
        Ok(Node::ArrowFunction {
            params,
            body: Box::new(body),
            span,
        })
    }

    fn parse_object_literal(&mut self) -> ScriptlintResult<Node> {
        let lbrace = self.advance();
        let mut properties = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            let (key, computed, key_start) = match &self.peek().kind {
                TokenKind::Ident(_) => {
                    let key = self.parse_identifier("property key")?;
                    let start = key.span().start;
                    (key, false, start)
                }
                TokenKind::Str | TokenKind::Number => {
                    let token = self.advance();
                    (Node::Literal { span: token.span }, false, token.span.start)
                }
                TokenKind::LBracket => {
                    let lbracket = self.advance();
                    let key = self.parse_assignment()?;
                    self.expect(&TokenKind::RBracket, "`]`")?;
                    (key, true, lbracket.span.start)
                }
                _ => return Err(self.error_here("expected property key")),
            };
            self.expect(&TokenKind::Colon, "`:` after property key")?;
            let value = self.parse_assignment()?;
            let span = Span::new(key_start, value.span().end);
            properties.push(Node::Property {
                key: Box::new(key),
                value: Box::new(value),
                computed,
                span,
            });
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        let rbrace = self.expect(&TokenKind::RBrace, "`}`")?;
        Ok(Node::ObjectLiteral {
            properties,
            span: Span::new(lbrace.span.start, rbrace.span.end),
        })
    }

    fn parse_array_literal(&mut self) -> ScriptlintResult<Node> {
        let lbracket = self.advance();
        let mut elements = Vec::new();
        while !self.at(&TokenKind::RBracket) {
            elements.push(self.parse_assignment()?);
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        let rbracket = self.expect(&TokenKind::RBracket, "`]`")?;
        Ok(Node::ArrayLiteral {
            elements,
            span: Span::new(lbracket.span.start, rbracket.span.end),
        })
    }

    fn parse_identifier(&mut self, what: &str) -> ScriptlintResult<Node> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let token = self.advance();
                Ok(Node::Identifier {
                    name,
                    span: token.span,
                })
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_body(source: &str) -> Vec<Node> {
        match parse_program(source).unwrap() {
            Node::Program { body, .. } => body,
            other => panic!("expected program, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_span_includes_semicolon() {
        let body = program_body("let x = 1;");
        assert_eq!(body[0].span(), Span::new(0, 10));

        let body = program_body("let x = 1");
        assert_eq!(body[0].span(), Span::new(0, 9));
    }

    #[test]
    fn test_declarator_id_span_is_the_name_only() {
        let body = program_body("let value = 40 + 2;");
        let Node::VariableDeclaration { declarations, .. } = &body[0] else {
            panic!("expected declaration");
        };
        let Node::VariableDeclarator { id, init, .. } = &declarations[0] else {
            panic!("expected declarator");
        };
        assert_eq!(id.as_identifier().unwrap(), ("value", Span::new(4, 9)));
        assert!(matches!(init.as_deref(), Some(Node::Binary { .. })));
    }

    #[test]
    fn test_function_declaration_shape() {
        let body = program_body("function add(a, b) { return a + b; }");
        let Node::FunctionDeclaration { id, params, body, .. } = &body[0] else {
            panic!("expected function declaration");
        };
        assert_eq!(id.as_identifier().unwrap().0, "add");
        assert_eq!(params.len(), 2);
        assert!(matches!(body.as_ref(), Node::Block { .. }));
    }

    #[test]
    fn test_member_access_computed_flag() {
        let body = program_body("obj.field; obj[key];");
        let Node::ExpressionStatement { expression, .. } = &body[0] else {
            panic!()
        };
        assert!(matches!(expression.as_ref(), Node::Member { computed: false, .. }));
        let Node::ExpressionStatement { expression, .. } = &body[1] else {
            panic!()
        };
        assert!(matches!(expression.as_ref(), Node::Member { computed: true, .. }));
    }

    #[test]
    fn test_arrow_functions() {
        let body = program_body("let f = x => x + 1; let g = (a, b) => { return a; };");
        for stmt in &body {
            let Node::VariableDeclaration { declarations, .. } = stmt else {
                panic!()
            };
            let Node::VariableDeclarator { init, .. } = &declarations[0] else {
                panic!()
            };
            assert!(matches!(init.as_deref(), Some(Node::ArrowFunction { .. })));
        }
    }

    #[test]
    fn test_parenthesized_expression_keeps_grouping_span() {
        let source = "let y = (1 + 2) * 3;";
        let body = program_body(source);
        let Node::VariableDeclaration { declarations, .. } = &body[0] else {
            panic!()
        };
        let Node::VariableDeclarator { init, .. } = &declarations[0] else {
            panic!()
        };
        let Some(Node::Binary { left, .. }) = init.as_deref() else {
            panic!("expected binary init");
        };
        assert_eq!(left.span().slice(source), Some("(1 + 2)"));
    }

    #[test]
    fn test_for_statement_with_declaration_init() {
        let body = program_body("for (let i = 0; i < 10; i++) { work(i); }");
        let Node::ForStatement { init, test, update, .. } = &body[0] else {
            panic!("expected for statement");
        };
        assert!(matches!(init.as_deref(), Some(Node::VariableDeclaration { .. })));
        assert!(matches!(test.as_deref(), Some(Node::Binary { .. })));
        assert!(matches!(update.as_deref(), Some(Node::Update { prefix: false, .. })));
    }

    #[test]
    fn test_object_literal_keys() {
        let body = program_body("let o = { plain: 1, 'quoted': 2, [dynamic]: 3 };");
        let Node::VariableDeclaration { declarations, .. } = &body[0] else {
            panic!()
        };
        let Node::VariableDeclarator { init, .. } = &declarations[0] else {
            panic!()
        };
        let Some(Node::ObjectLiteral { properties, .. }) = init.as_deref() else {
            panic!("expected object literal");
        };
        assert_eq!(properties.len(), 3);
        assert!(matches!(&properties[0], Node::Property { computed: false, .. }));
        assert!(matches!(&properties[2], Node::Property { computed: true, .. }));
    }

    #[test]
    fn test_parse_error_carries_position() {
        let err = parse_program("let = 1;").unwrap_err();
        let ScriptlintError::Parse { line, column, .. } = err else {
            panic!("expected parse error");
        };
        assert_eq!(line, 1);
        assert_eq!(column, 5);
    }

    #[test]
    fn test_unclosed_block_rejected() {
        assert!(parse_program("function f() { let a = 1;").is_err());
    }
}

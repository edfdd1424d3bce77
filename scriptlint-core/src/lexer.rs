//! Hand-written lexer for the JavaScript subset.
//!
//! Produces tokens with exact byte spans; comments and whitespace are
//! skipped. Works on raw bytes: multi-byte UTF-8 sequences can only occur
//! inside string literals and comments, where bytes are skipped verbatim.

use crate::ast::Span;
use crate::error::{ScriptlintError, ScriptlintResult};

/// Reserved words the parser dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Let,
    Const,
    Var,
    Function,
    Return,
    For,
    If,
    Else,
    True,
    False,
    Null,
    Typeof,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "let" => Self::Let,
            "const" => Self::Const,
            "var" => Self::Var,
            "function" => Self::Function,
            "return" => Self::Return,
            "for" => Self::For,
            "if" => Self::If,
            "else" => Self::Else,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            "typeof" => Self::Typeof,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    Number,
    Str,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Arrow,

    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    Gt,
    Le,
    Ge,
    AndAnd,
    OrOr,
    Not,

    PlusPlus,
    MinusMinus,

    Eof,
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Tokenize the entire source, appending a final [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> ScriptlintResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Line comment
        if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        // Block comment
        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            let start = i;
            i += 2;
            loop {
                if i + 1 >= bytes.len() {
                    return Err(ScriptlintError::parse_at(
                        source,
                        start,
                        "unterminated block comment",
                    ));
                }
                if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }

        let start = i;

        if is_ident_start(b) {
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            let word = &source[start..i];
            let kind = match Keyword::from_word(word) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Ident(word.to_string()),
            };
            tokens.push(Token::new(kind, Span::new(start, i)));
            continue;
        }

        if b.is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i < bytes.len()
                && bytes[i] == b'.'
                && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())
            {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            tokens.push(Token::new(TokenKind::Number, Span::new(start, i)));
            continue;
        }

        if b == b'"' || b == b'\'' {
            let quote = b;
            i += 1;
            loop {
                match bytes.get(i) {
                    None => {
                        return Err(ScriptlintError::parse_at(
                            source,
                            start,
                            "unterminated string literal",
                        ))
                    }
                    Some(&c) if c == b'\\' => i += 2,
                    Some(&c) if c == quote => {
                        i += 1;
                        break;
                    }
                    Some(&c) if c == b'\n' => {
                        return Err(ScriptlintError::parse_at(
                            source,
                            start,
                            "unterminated string literal",
                        ))
                    }
                    Some(_) => i += 1,
                }
            }
            tokens.push(Token::new(TokenKind::Str, Span::new(start, i)));
            continue;
        }

        // Punctuation and operators, longest match first.
        let rest = &bytes[i..];
        let (kind, len) = match rest {
            [b'=', b'=', b'=', ..] => (TokenKind::EqEqEq, 3),
            [b'!', b'=', b'=', ..] => (TokenKind::NotEqEq, 3),
            [b'=', b'=', ..] => (TokenKind::EqEq, 2),
            [b'!', b'=', ..] => (TokenKind::NotEq, 2),
            [b'=', b'>', ..] => (TokenKind::Arrow, 2),
            [b'<', b'=', ..] => (TokenKind::Le, 2),
            [b'>', b'=', ..] => (TokenKind::Ge, 2),
            [b'&', b'&', ..] => (TokenKind::AndAnd, 2),
            [b'|', b'|', ..] => (TokenKind::OrOr, 2),
            [b'+', b'+', ..] => (TokenKind::PlusPlus, 2),
            [b'-', b'-', ..] => (TokenKind::MinusMinus, 2),
            [b'+', b'=', ..] => (TokenKind::PlusAssign, 2),
            [b'-', b'=', ..] => (TokenKind::MinusAssign, 2),
            [b'*', b'=', ..] => (TokenKind::StarAssign, 2),
            [b'/', b'=', ..] => (TokenKind::SlashAssign, 2),
            [b'(', ..] => (TokenKind::LParen, 1),
            [b')', ..] => (TokenKind::RParen, 1),
            [b'{', ..] => (TokenKind::LBrace, 1),
            [b'}', ..] => (TokenKind::RBrace, 1),
            [b'[', ..] => (TokenKind::LBracket, 1),
            [b']', ..] => (TokenKind::RBracket, 1),
            [b',', ..] => (TokenKind::Comma, 1),
            [b';', ..] => (TokenKind::Semicolon, 1),
            [b':', ..] => (TokenKind::Colon, 1),
            [b'.', ..] => (TokenKind::Dot, 1),
            [b'=', ..] => (TokenKind::Assign, 1),
            [b'+', ..] => (TokenKind::Plus, 1),
            [b'-', ..] => (TokenKind::Minus, 1),
            [b'*', ..] => (TokenKind::Star, 1),
            [b'/', ..] => (TokenKind::Slash, 1),
            [b'%', ..] => (TokenKind::Percent, 1),
            [b'<', ..] => (TokenKind::Lt, 1),
            [b'>', ..] => (TokenKind::Gt, 1),
            [b'!', ..] => (TokenKind::Not, 1),
            _ => {
                return Err(ScriptlintError::parse_at(
                    source,
                    i,
                    format!("unexpected character {:?}", source[i..].chars().next()),
                ))
            }
        };
        tokens.push(Token::new(kind, Span::new(i, i + len)));
        i += len;
    }

    tokens.push(Token::new(
        TokenKind::Eof,
        Span::new(source.len(), source.len()),
    ));
    Ok(tokens)
}

//! Lexer token types

use std::fmt;

/// Token kinds of the configuration language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Int,
    Float,
    String,

    // Delimiters
    Eq,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,

    Identifier,

    // Special
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Eq => "'='",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Identifier => "identifier",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

/// Source location span. `start..end` are byte offsets, `line` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
        }
    }
}

/// A token with its kind, the source text it covers and its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Contents of a string token without its quotes. Escapes are kept as
    /// written; an unterminated string loses its opening quote and, if input
    /// ended right after a backslash, that dangling backslash too.
    pub fn string_contents(&self) -> &'a str {
        let body = self.text.strip_prefix('"').unwrap_or(self.text);
        match scan_body(body) {
            BodyEnd::Quote(end) => &body[..end],
            BodyEnd::DanglingEscape => &body[..body.len() - 1],
            BodyEnd::Input => body,
        }
    }
}

/// Where scanning a string body stopped.
enum BodyEnd {
    /// At the first unescaped quote, at this byte offset.
    Quote(usize),
    /// At end of input, with the last byte a lone backslash.
    DanglingEscape,
    Input,
}

fn scan_body(body: &str) -> BodyEnd {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return BodyEnd::Quote(i),
            b'\\' if i + 1 == bytes.len() => return BodyEnd::DanglingEscape,
            b'\\' => i += 2,
            _ => i += 1,
        }
    }
    BodyEnd::Input
}

/// Whether `s` reads back unchanged once wrapped in quotes: no unescaped
/// `"` and no trailing lone backslash.
pub fn is_quotable(s: &str) -> bool {
    matches!(scan_body(s), BodyEnd::Input)
}

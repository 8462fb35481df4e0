//! Lexer implementation

use super::token::*;

/// Whitespace as understood by the C locale `isspace`.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Lexer for the configuration language.
///
/// Scans bytes but only ever stops on ASCII delimiters or end of input, so
/// every token text is a valid `&str` slice of the source.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    /// Line the read cursor is currently on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Tokenize the entire source into a vector of tokens, ending with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token from the source. Never fails; past the end of the
    /// buffer every call yields `Eof`.
    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let line = self.line;

        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(b'{') => self.single(TokenKind::LBrace),
            Some(b'}') => self.single(TokenKind::RBrace),
            Some(b'[') => self.single(TokenKind::LBracket),
            Some(b']') => self.single(TokenKind::RBracket),
            Some(b',') => self.single(TokenKind::Comma),
            Some(b'=') => self.single(TokenKind::Eq),
            Some(b'"') => self.scan_string(),
            Some(b'.') => self.scan_number(TokenKind::Float),
            Some(c) if c.is_ascii_digit() => self.scan_number(TokenKind::Int),
            Some(_) => self.scan_identifier(),
        };

        Token {
            kind,
            text: &self.source[start..self.pos],
            span: Span {
                start,
                end: self.pos,
                line,
            },
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// Scan a quoted string. Escapes are skipped over, not interpreted, and a
    /// missing closing quote ends the string at end of input.
    fn scan_string(&mut self) -> TokenKind {
        self.pos += 1; // opening quote

        while let Some(c) = self.peek() {
            match c {
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        if escaped == b'\n' {
                            self.line += 1;
                        }
                        self.pos += 1;
                    }
                }
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }

        TokenKind::String
    }

    /// Scan a number. A single `.` makes it a float; a second `.` ends it.
    fn scan_number(&mut self, mut kind: TokenKind) -> TokenKind {
        self.pos += 1;

        while let Some(c) = self.peek() {
            if c == b'.' {
                if kind == TokenKind::Float {
                    break;
                }
                kind = TokenKind::Float;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.pos += 1;
        }

        kind
    }

    /// Scan a bare identifier: everything up to whitespace, `#` or `=`.
    fn scan_identifier(&mut self) -> TokenKind {
        while let Some(c) = self.peek() {
            if is_space(c) || c == b'#' || c == b'=' {
                break;
            }
            self.pos += 1;
        }

        TokenKind::Identifier
    }

    /// Skip whitespace and `#` line comments, counting newlines.
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if c == b'#' {
                while let Some(c) = self.peek() {
                    if c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if is_space(c) {
                if c == b'\n' {
                    self.line += 1;
                }
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }
}

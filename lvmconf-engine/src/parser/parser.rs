//! Recursive-descent parser
//!
//! ```text
//! file    := section*
//! section := IDENTIFIER ( '{' section* '}' | '=' value )
//! value   := '[' type (','? type)* ','? ']' | type
//! type    := INT | FLOAT | STRING
//! ```

use crate::arena::{NodeBody, NodeId, Scalar, ValueRun};
use crate::error::{ConfigError, ConfigResult};
use crate::lexer::*;
use crate::tree::ConfigTree;

/// Deepest section nesting accepted before the parser gives up.
pub const MAX_NESTING: usize = 512;

/// Parser for the configuration language.
///
/// Builds straight into the arena of the tree it owns; a failed parse drops
/// the tree along with everything allocated so far.
pub struct Parser<'a> {
    pub(crate) tokens: Vec<Token<'a>>,
    pub(crate) pos: usize,
    tree: ConfigTree,
}

impl<'a> Parser<'a> {
    /// Create a new parser from a vector of tokens.
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self::with_tree(tokens, ConfigTree::new())
    }

    /// Create a parser that builds into `tree` (normally an empty one with a
    /// pre-sized arena).
    pub fn with_tree(mut tokens: Vec<Token<'a>>, tree: ConfigTree) -> Self {
        if tokens.last().map_or(true, |t| !t.is_eof()) {
            let span = tokens.last().map_or_else(Span::default, |t| Span {
                start: t.span.end,
                end: t.span.end,
                line: t.span.line,
            });
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: "",
                span,
            });
        }
        Self {
            tokens,
            pos: 0,
            tree,
        }
    }

    /// Parse the whole token stream into a tree.
    pub fn parse(mut self) -> ConfigResult<ConfigTree> {
        while !self.is_at_end() {
            self.parse_section(None, 0)?;
        }
        Ok(self.tree)
    }

    /// `section := IDENTIFIER ( '{' section* '}' | '=' value )`
    fn parse_section(&mut self, parent: Option<NodeId>, depth: usize) -> ConfigResult<()> {
        if depth >= MAX_NESTING {
            return Err(self.error("sections nested too deeply"));
        }

        let name = self.expect(TokenKind::Identifier)?.text;
        let id = self.tree.arena.alloc_node();
        let span = self.tree.arena.alloc_str(name);
        let record = self.tree.arena.node_mut(id);
        record.name = span;
        record.depth = depth;

        if self.check(TokenKind::LBrace) {
            self.advance();
            while !self.check(TokenKind::RBrace) {
                self.parse_section(Some(id), depth + 1)?;
            }
            self.expect(TokenKind::RBrace)?;
        } else {
            self.expect(TokenKind::Eq)?;
            let run = self.parse_value()?;
            self.tree.arena.node_mut(id).body = NodeBody::Leaf(run);
        }

        self.tree.attach(parent, id);
        Ok(())
    }

    /// `value := '[' type (','? type)* ','? ']' | type`
    fn parse_value(&mut self) -> ConfigResult<ValueRun> {
        let mark = self.tree.arena.begin_run();

        if self.check(TokenKind::LBracket) {
            self.advance();
            while !self.check(TokenKind::RBracket) {
                self.parse_type()?;
                self.optional_comma();
            }
            let run = self.tree.arena.finish_run(mark);
            if run.len() == 0 {
                return Err(self.error("expected a value"));
            }
            self.expect(TokenKind::RBracket)?;
            Ok(run)
        } else {
            self.parse_type()?;
            Ok(self.tree.arena.finish_run(mark))
        }
    }

    /// `type := INT | FLOAT | STRING`
    fn parse_type(&mut self) -> ConfigResult<()> {
        let token = *self.current();
        let scalar = match token.kind {
            TokenKind::Int => match token.text.parse::<i64>() {
                Ok(i) => Scalar::Int(i),
                Err(_) => return Err(self.error("integer literal out of range")),
            },
            // A bare "." is the only float token Rust refuses; it reads as 0.
            TokenKind::Float => match token.text.parse::<f64>().unwrap_or(0.0) {
                f if f.is_finite() => Scalar::Float(f),
                _ => return Err(self.error("float literal out of range")),
            },
            TokenKind::String => {
                Scalar::Str(self.tree.arena.alloc_str(token.string_contents()))
            }
            _ => return Err(self.error("expected a value")),
        };

        self.tree.arena.push_value(scalar);
        self.advance();
        Ok(())
    }

    pub(crate) fn current(&self) -> &Token<'a> {
        &self.tokens[self.pos]
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ConfigResult<Token<'a>> {
        if self.check(kind) {
            let token = *self.current();
            self.advance();
            Ok(token)
        } else {
            Err(self.error("unexpected token"))
        }
    }

    pub(crate) fn optional_comma(&mut self) {
        if self.check(TokenKind::Comma) {
            self.advance();
        }
    }

    pub(crate) fn error(&self, msg: &str) -> ConfigError {
        ConfigError::Syntax {
            line: self.current().span.line,
            message: msg.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Value;

    fn parse(source: &str) -> ConfigResult<ConfigTree> {
        Parser::new(Lexer::new(source).tokenize()).parse()
    }

    fn syntax_line(result: ConfigResult<ConfigTree>) -> Option<usize> {
        match result {
            Err(ConfigError::Syntax { line, .. }) => Some(line),
            _ => None,
        }
    }

    #[test]
    fn test_parse_empty_file() -> ConfigResult<()> {
        let tree = parse("")?;
        assert!(tree.is_empty());
        let tree = parse("# nothing here\n\n")?;
        assert!(tree.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_scalars() -> ConfigResult<()> {
        let tree = parse("i = 42\nf = 1.5\ns = \"text\"\n")?;
        let values: Vec<(&str, Option<Value>)> =
            tree.roots().map(|n| (n.name(), n.first_value())).collect();
        assert_eq!(
            values,
            vec![
                ("i", Some(Value::Int(42))),
                ("f", Some(Value::Float(1.5))),
                ("s", Some(Value::Str("text"))),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_nested_sections() -> ConfigResult<()> {
        let tree = parse("a { b { c = 1 } d = 2 } e { }")?;
        let a = tree.roots().next().expect("root a");
        assert_eq!(a.name(), "a");
        let names: Vec<&str> = a.children().map(|n| n.name()).collect();
        assert_eq!(names, vec!["b", "d"]);
        let c = a.child("b").and_then(|b| b.child("c")).expect("a/b/c");
        assert_eq!(c.first_value(), Some(Value::Int(1)));

        let e = tree.roots().nth(1).expect("root e");
        assert!(e.is_section());
        assert_eq!(e.children().count(), 0);
        Ok(())
    }

    #[test]
    fn test_parse_array_forms() -> ConfigResult<()> {
        let tree = parse("a = [1, 2, 3]\nb = [1 2 3]\nc = [1, 2, 3,]\nd = [\"x\", 0.5, 7]")?;
        let mut roots = tree.roots();
        let expected = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        for _ in 0..3 {
            let leaf = roots.next().expect("array leaf");
            assert_eq!(leaf.values().collect::<Vec<_>>(), expected);
        }
        let mixed = roots.next().expect("mixed leaf");
        assert_eq!(
            mixed.values().collect::<Vec<_>>(),
            vec![Value::Str("x"), Value::Float(0.5), Value::Int(7)]
        );
        Ok(())
    }

    #[test]
    fn test_empty_array_rejected() {
        assert_eq!(syntax_line(parse("k = []")), Some(1));
        assert_eq!(syntax_line(parse("a = 1\nk = [\n]")), Some(3));
    }

    #[test]
    fn test_bad_commas_rejected() {
        assert!(parse("k = [,1]").is_err());
        assert!(parse("k = [1,,2]").is_err());
        assert!(parse("k = ,").is_err());
    }

    #[test]
    fn test_missing_value_rejected() {
        let err = parse("k =").expect_err("missing value");
        assert_eq!(err.to_string(), "Parse error at line 1: expected a value");
    }

    #[test]
    fn test_negative_numbers_are_identifiers() {
        // '-' does not start a number, so this is not a value.
        assert!(parse("k = -1").is_err());
    }

    #[test]
    fn test_unexpected_token_line() {
        let source = "global {\n  a = 1\n  = 2\n}\n";
        let err = parse(source).expect_err("stray '='");
        assert_eq!(err.to_string(), "Parse error at line 3: unexpected token");
    }

    #[test]
    fn test_unclosed_section_rejected() {
        assert!(parse("global { a = 1").is_err());
        assert!(parse("global }").is_err());
        assert!(parse("}").is_err());
    }

    #[test]
    fn test_bare_identifier_rejected() {
        assert!(parse("lonely").is_err());
        assert!(parse("a b = 1").is_err());
    }

    #[test]
    fn test_integer_overflow_rejected() {
        assert!(parse("k = 9223372036854775807").is_ok());
        let err = parse("k = 9223372036854775808").expect_err("overflow");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_float_overflow_rejected() {
        let huge = format!("k = {}.5", "9".repeat(400));
        let err = parse(&huge).expect_err("overflow");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_lone_dot_is_zero_float() -> ConfigResult<()> {
        let tree = parse("k = .")?;
        let k = tree.roots().next().expect("k");
        assert_eq!(k.first_value(), Some(Value::Float(0.0)));
        Ok(())
    }

    #[test]
    fn test_double_dot_splits_array_values() -> ConfigResult<()> {
        let tree = parse("k = [1.2.3]")?;
        let k = tree.roots().next().expect("k");
        assert_eq!(
            k.values().collect::<Vec<_>>(),
            vec![Value::Float(1.2), Value::Float(0.3)]
        );
        Ok(())
    }

    #[test]
    fn test_string_escapes_are_literal() -> ConfigResult<()> {
        let tree = parse(r#"k = "a\nb""#)?;
        let k = tree.roots().next().expect("k");
        assert_eq!(k.first_value(), Some(Value::Str(r"a\nb")));
        Ok(())
    }

    #[test]
    fn test_unterminated_string_drops_trailing_backslash() -> ConfigResult<()> {
        let tree = parse("k = \"ab\\")?;
        let k = tree.roots().next().expect("k");
        assert_eq!(k.first_value(), Some(Value::Str("ab")));
        Ok(())
    }

    #[test]
    fn test_nesting_records_depth() -> ConfigResult<()> {
        let tree = parse("a { b { c = 1 } }")?;
        let c = tree.find("a/b/c", '/').expect("a/b/c");
        assert_eq!(tree.arena.node(c.id()).depth, 2);
        Ok(())
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "a { ".repeat(MAX_NESTING + 1);
        assert!(parse(&deep).is_err());

        let deepest = format!("{}{}", "a { ".repeat(MAX_NESTING), "} ".repeat(MAX_NESTING));
        assert!(parse(&deepest).is_ok());
    }

    #[test]
    fn test_parser_without_eof_token() -> ConfigResult<()> {
        let mut tokens = Lexer::new("k = 1").tokenize();
        tokens.pop();
        let tree = Parser::new(tokens).parse()?;
        assert_eq!(tree.roots().count(), 1);
        Ok(())
    }
}

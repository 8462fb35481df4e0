//! Fuzz test for the config Lexer
//!
//! This fuzz target tests the lexer with arbitrary byte sequences to find:
//! - Panics (including slicing inside a UTF-8 sequence)
//! - Infinite loops
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use lvmconf_engine::{Lexer, TokenKind};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut lexer = Lexer::new(input);

        // Tokenize should never panic, even with malformed input
        let tokens = lexer.tokenize();

        // 1. The last token is always Eof
        assert_eq!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof),
            "Last token should always be Eof"
        );

        // 2. Spans are ordered, contiguous with their text, and non-overlapping
        let mut previous_end = 0;
        for token in &tokens {
            assert!(token.span.start <= token.span.end, "Span start should be <= end");
            assert!(token.span.start >= previous_end, "Tokens should not overlap");
            assert!(token.span.line >= 1, "Line numbers should be >= 1");
            assert_eq!(&input[token.span.start..token.span.end], token.text);
            previous_end = token.span.end;
        }

        // 3. Only Eof may be empty
        for token in &tokens[..tokens.len() - 1] {
            assert!(!token.text.is_empty(), "Non-Eof tokens should not be empty");
        }
    }
});

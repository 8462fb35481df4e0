//! Fuzz test for the config Parser
//!
//! This fuzz target tests the parser with arbitrary byte sequences to find:
//! - Panics or stack exhaustion
//! - Trees that do not survive a serialize/parse round trip
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use lvmconf_engine::{parse, serialize, ConfigError, Lexer, Parser};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        match parse(input) {
            Ok(tree) => {
                // Whatever parsed must re-parse from its serialized form into the
                // same tree, floats compared at six decimals.
                let text = serialize(&tree);
                let reparsed = match parse(&text) {
                    Ok(reparsed) => reparsed,
                    Err(err) => panic!("Serialized tree failed to parse: {}\n{}", err, text),
                };
                assert_eq!(serialize(&reparsed), text, "Serialized form is not stable");

                // Once floats are at six decimals the trees match exactly.
                match parse(&serialize(&reparsed)) {
                    Ok(again) => assert_eq!(again, reparsed, "Round trip changed the tree"),
                    Err(err) => panic!("Second round trip failed to parse: {}", err),
                }
            }
            Err(ConfigError::Syntax { line, message }) => {
                assert!(line >= 1, "Error line should be >= 1");
                assert!(!message.is_empty(), "Error message should not be empty");
            }
            Err(other) => panic!("Parsing text should only raise syntax errors: {}", other),
        }

        // Also test lexer -> parser pipeline separately
        let tokens = Lexer::new(input).tokenize();
        let _ = Parser::new(tokens).parse();
    }
});

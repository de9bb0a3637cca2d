//! shast - POSIX shell parser producing a normalized syntax tree
//!
//! This crate provides:
//! - A scannerless grammar for POSIX-like shell scripts
//! - Builders that turn matched syntax into AST nodes: words, redirects,
//!   simple commands, statement chains and compound statements
//! - A serde-serializable AST for executors, linters and formatters
//!
//! ```
//! let script = shast::parse("a && b; c").unwrap();
//! let names: Vec<_> = script.iter_statements().map(|s| s.control.as_str()).collect();
//! assert_eq!(names, ["&&", ";", ";"]);
//! ```

pub mod ast;
pub mod chain;
pub mod command;
pub mod compound;
pub mod error;
pub mod lexer;
pub mod nested;
pub mod parser;
pub mod redirect;
pub mod word;

use chumsky::prelude::*;
use tracing::debug;

pub use ast::*;
pub use error::{ParseError, ParseResult};
pub use shast_config::ParserConfig;

/// Parse a script with the default limits.
pub fn parse(input: &str) -> ParseResult<Script> {
    parse_with_config(input, &ParserConfig::default())
}

/// Parse a script under the given limits.
pub fn parse_with_config(input: &str, config: &ParserConfig) -> ParseResult<Script> {
    if input.len() > config.max_input_bytes {
        return Err(ParseError::InputTooLarge {
            size: input.len(),
            limit: config.max_input_bytes,
        });
    }

    debug!(
        len = input.len(),
        max_nesting_depth = config.max_nesting_depth,
        "parsing script"
    );
    let state = nested::ParseState::new(config.max_nesting_depth, input);
    let result = parser::script_parser(&state)
        .then_ignore(end())
        .parse(input);
    state.finish(result)
}

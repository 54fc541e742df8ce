//! CSS Parser
//!
//! Parses stylesheet text into a rule tree and serializes it back.
//! Rule structure is modeled (style rules, conditional groups, keyframes,
//! font faces, comments); declaration values stay raw text so that
//! custom-property passes can rewrite them in place.
//!
//! ```text
//! text → Parser::parse() → Stylesheet → serialize() → text
//! ```

pub mod ast;
pub mod parser;
pub mod serializer;

pub use ast::{Declaration, Rule, StyleRule, Stylesheet};
pub use parser::Parser;
pub use serializer::{serialize, Format};

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

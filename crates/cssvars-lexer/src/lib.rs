//! CSS Lexer
//!
//! Tokenizes stylesheet text into a stream of structural tokens.
//! Handles comments, quoted strings, at-keywords, bracket punctuation and
//! backslash escapes. Everything else is grouped into words; declaration values
//! are recovered later as raw source slices through each token's [`Span`].
//!
//! # Example
//!
//! ```
//! use cssvars_lexer::Scanner;
//!
//! let tokens = Scanner::tokenize("").unwrap();
//! assert_eq!(tokens.len(), 1); // Just EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// A region of source text. `start`/`end` are byte offsets; `line`/`column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Slice the text this span covers out of `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Token classification for CSS source.
///
/// The set is deliberately coarse: the parser only needs rule structure.
/// Declaration values are recovered as raw source slices through [`Span`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// One or more whitespace characters.
    Whitespace,

    // Literals (carry data)
    /// `/* ... */`, content without the delimiters.
    Comment(String),
    /// A quoted string, content without the quotes (escapes kept as written).
    String(String),
    /// `@name`, carrying `name`.
    AtKeyword(String),
    /// Any other run of characters: identifiers, numbers, hashes, selector parts.
    Word(String),

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Comma,

    /// A single character that cannot start a word, e.g. a lone `/`.
    Delim(char),

    // End of input
    Eof,
}

/// A token produced by the CSS lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whitespace and comments carry no structure.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment(_))
    }
}

/// Characters that end a word and are scanned as their own tokens.
pub fn is_word_boundary(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '{' | '}' | '(' | ')' | '[' | ']' | ':' | ';' | ',' | '"' | '\''
        )
}

use crate::token::{is_word_boundary, Span, Token, TokenKind};
use crate::LexerError;

/// CSS source scanner.
///
/// Tokenizes stylesheet text into a flat stream of tokens. Positions are
/// tracked both as byte offsets (so the parser can slice raw values back out
/// of the source) and as line/column pairs for error reporting.
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            offset: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens()?;
        Ok(scanner.tokens)
    }

    /// Scan all tokens from the source.
    fn scan_tokens(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }

        let span = Span::new(self.offset, self.offset, self.line, self.column);
        self.tokens.push(Token::new(TokenKind::Eof, span));
        Ok(())
    }

    /// Scan the next token.
    fn scan_token(&mut self) -> Result<(), LexerError> {
        let ch = self.peek();

        match ch {
            c if c.is_whitespace() => {
                self.scan_whitespace();
                Ok(())
            }

            '/' if self.peek_next() == '*' => self.scan_comment(),

            '"' | '\'' => self.scan_string(),

            '@' if is_name_char(self.peek_next()) => {
                self.scan_at_keyword();
                Ok(())
            }

            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ':' => self.single(TokenKind::Colon),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),

            // A trailing backslash has nothing to escape.
            '\\' if self.pos + 1 >= self.chars.len() => self.single(TokenKind::Delim('\\')),
            '@' => self.single(TokenKind::Delim('@')),

            _ => {
                self.scan_word();
                Ok(())
            }
        }
    }

    // --- Scanners ---

    fn scan_whitespace(&mut self) {
        let (start, line, column) = self.mark();
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
        self.push(TokenKind::Whitespace, start, line, column);
    }

    /// Scan a block comment (`/* ... */`).
    fn scan_comment(&mut self) -> Result<(), LexerError> {
        let (start, line, column) = self.mark();

        // Skip `/*`
        self.advance();
        self.advance();

        let content_start = self.offset;
        loop {
            if self.is_at_end() {
                return Err(LexerError {
                    message: "Unterminated comment".into(),
                    line,
                    column,
                });
            }
            if self.peek() == '*' && self.peek_next() == '/' {
                break;
            }
            self.advance();
        }
        let content = self.source[content_start..self.offset].to_string();

        // Skip `*/`
        self.advance();
        self.advance();

        self.push(TokenKind::Comment(content), start, line, column);
        Ok(())
    }

    /// Scan a quoted string. Escapes are kept verbatim; only the closing quote matters.
    fn scan_string(&mut self) -> Result<(), LexerError> {
        let quote = self.peek();
        let (start, line, column) = self.mark();
        self.advance(); // consume opening quote

        let content_start = self.offset;
        while !self.is_at_end() && self.peek() != quote {
            match self.peek() {
                '\\' => {
                    self.advance();
                    if !self.is_at_end() {
                        self.advance();
                    }
                }
                '\n' => {
                    return Err(LexerError {
                        message: "Unterminated string".into(),
                        line,
                        column,
                    });
                }
                _ => self.advance(),
            }
        }

        if self.is_at_end() {
            return Err(LexerError {
                message: "Unterminated string".into(),
                line,
                column,
            });
        }

        let content = self.source[content_start..self.offset].to_string();
        self.advance(); // consume closing quote

        self.push(TokenKind::String(content), start, line, column);
        Ok(())
    }

    /// Scan `@name`. Vendor prefixes (`@-webkit-keyframes`) are part of the name.
    fn scan_at_keyword(&mut self) {
        let (start, line, column) = self.mark();
        self.advance(); // consume `@`

        let name_start = self.offset;
        while !self.is_at_end() && is_name_char(self.peek()) {
            self.advance();
        }
        let name = self.source[name_start..self.offset].to_string();

        self.push(TokenKind::AtKeyword(name), start, line, column);
    }

    /// Scan a run of non-structural characters. A backslash escapes the next
    /// character, so `.a\:b` stays a single word.
    fn scan_word(&mut self) {
        let (start, line, column) = self.mark();

        while !self.is_at_end() {
            let c = self.peek();
            if is_word_boundary(c) || (c == '/' && self.peek_next() == '*') {
                break;
            }
            if c == '\\' && self.pos + 1 < self.chars.len() {
                self.advance();
            }
            self.advance();
        }

        let text = self.source[start..self.offset].to_string();
        self.push(TokenKind::Word(text), start, line, column);
    }

    // --- Helpers ---

    fn single(&mut self, kind: TokenKind) -> Result<(), LexerError> {
        let (start, line, column) = self.mark();
        self.advance();
        self.push(kind, start, line, column);
        Ok(())
    }

    fn mark(&self) -> (usize, usize, usize) {
        (self.offset, self.line, self.column)
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let span = Span::new(start, self.offset, line, column);
        self.tokens.push(Token::new(kind, span));
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn peek_next(&self) -> char {
        if self.pos + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.pos + 1]
        }
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

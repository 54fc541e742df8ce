//! Stylesheet parser.
//!
//! Parses the token stream from `cssvars-lexer` into a [`Stylesheet`].
//! Rule structure (selectors, blocks, at-rules) is parsed by recursive descent;
//! declaration values are sliced verbatim from the source so later passes can
//! rewrite them textually.

use crate::ast::{
    ContainerRule, Declaration, FontFaceRule, Keyframe, KeyframesRule, OtherRule, Rule,
    StyleRule, Stylesheet,
};
use crate::ParseError;
use cssvars_lexer::{Scanner, Span, Token, TokenKind};

/// At-rules whose block is a nested rule list.
const CONTAINER_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "document",
    "-moz-document",
    "container",
    "layer",
];

/// CSS stylesheet parser.
///
/// Holds the source alongside its tokens: spans index into the source to
/// recover raw selector and value text.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser over already-scanned tokens of `source`.
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    /// Parse stylesheet text into a rule tree.
    pub fn parse(source: &str) -> Result<Stylesheet, ParseError> {
        let tokens = Scanner::tokenize(source).map_err(|e| ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        })?;

        let mut parser = Parser::new(source, tokens);
        let rules = parser.parse_rules(None)?;
        Ok(Stylesheet { rules })
    }

    // =========================================================================
    // Rule lists
    // =========================================================================

    /// Parse rules until EOF (top level) or the `}` closing the block opened at `open`.
    fn parse_rules(&mut self, open: Option<Span>) -> Result<Vec<Rule>, ParseError> {
        let mut rules = Vec::new();

        loop {
            self.skip_whitespace();

            match &self.peek().kind {
                TokenKind::Eof => {
                    if let Some(open) = open {
                        return Err(Self::error_at(open, "Unclosed block".into()));
                    }
                    break;
                }
                TokenKind::RBrace => {
                    if open.is_none() {
                        return Err(self.error("Unexpected '}'".into()));
                    }
                    self.advance();
                    break;
                }
                TokenKind::Semicolon => self.advance(),
                TokenKind::Comment(text) => {
                    let text = text.clone();
                    self.advance();
                    rules.push(Rule::Comment(text));
                }
                TokenKind::AtKeyword(name) => {
                    let name = name.clone();
                    self.advance();
                    rules.push(self.parse_at_rule(name)?);
                }
                _ => rules.push(self.parse_style_rule()?),
            }
        }

        Ok(rules)
    }

    /// Parse `selector, selector { declarations }`.
    fn parse_style_rule(&mut self) -> Result<Rule, ParseError> {
        let start = self.peek().span;
        let prelude = self.collect_prelude();

        if self.peek().kind != TokenKind::LBrace {
            return Err(Self::error_at(
                start,
                format!("Expected '{{' after selector '{}'", self.join_tokens(&prelude)),
            ));
        }
        let open = self.peek().span;
        self.advance();

        let selectors = self.split_list(&prelude);
        let declarations = self.parse_declarations(open)?;

        Ok(Rule::Style(StyleRule {
            selectors,
            declarations,
        }))
    }

    // =========================================================================
    // At-rules
    // =========================================================================

    /// Parse an at-rule after its keyword has been consumed.
    fn parse_at_rule(&mut self, name: String) -> Result<Rule, ParseError> {
        let lower = name.to_ascii_lowercase();
        let prelude = self.collect_prelude();
        let prelude = self.join_tokens(&prelude);

        if self.peek().kind != TokenKind::LBrace {
            // Statement at-rule (`@import …;`). A missing `;` at EOF is tolerated.
            if self.peek().kind == TokenKind::Semicolon {
                self.advance();
            }
            return Ok(Rule::Other(OtherRule {
                name,
                prelude,
                block: None,
            }));
        }
        let open = self.peek().span;
        self.advance();

        if CONTAINER_AT_RULES.contains(&lower.as_str()) {
            let rules = self.parse_rules(Some(open))?;
            return Ok(Rule::Container(ContainerRule {
                name,
                condition: prelude,
                rules,
            }));
        }

        if lower.ends_with("keyframes") {
            let keyframes = self.parse_keyframes(open)?;
            return Ok(Rule::Keyframes(KeyframesRule {
                name,
                ident: prelude,
                keyframes,
            }));
        }

        if lower == "font-face" {
            let declarations = self.parse_declarations(open)?;
            return Ok(Rule::FontFace(FontFaceRule { declarations }));
        }

        let block = self.raw_block(open)?;
        Ok(Rule::Other(OtherRule {
            name,
            prelude,
            block: Some(block),
        }))
    }

    /// Parse keyframe steps up to the closing `}`.
    fn parse_keyframes(&mut self, open: Span) -> Result<Vec<Keyframe>, ParseError> {
        let mut keyframes = Vec::new();

        loop {
            self.skip_trivia();

            match self.peek().kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(Self::error_at(open, "Unclosed block".into())),
                TokenKind::Semicolon => self.advance(),
                _ => {
                    let start = self.peek().span;
                    let prelude = self.collect_prelude();
                    if self.peek().kind != TokenKind::LBrace {
                        return Err(Self::error_at(
                            start,
                            format!(
                                "Expected '{{' after keyframe selector '{}'",
                                self.join_tokens(&prelude)
                            ),
                        ));
                    }
                    let step_open = self.peek().span;
                    self.advance();

                    let selectors = self.split_list(&prelude);
                    let declarations = self.parse_declarations(step_open)?;
                    keyframes.push(Keyframe {
                        selectors,
                        declarations,
                    });
                }
            }
        }

        Ok(keyframes)
    }

    /// Capture the raw text of a block whose contents are not modeled.
    fn raw_block(&mut self, open: Span) -> Result<String, ParseError> {
        let start = self.peek().span.start;
        let mut depth = 1usize;

        loop {
            match self.peek().kind {
                TokenKind::Eof => return Err(Self::error_at(open, "Unclosed block".into())),
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.peek().span.start;
                        self.advance();
                        return Ok(self.source[start..end].to_string());
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Parse `property: value;` pairs up to the `}` closing the block opened at `open`.
    fn parse_declarations(&mut self, open: Span) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();

        loop {
            self.skip_trivia();

            match self.peek().kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(Self::error_at(open, "Unclosed block".into())),
                TokenKind::Semicolon => self.advance(),
                TokenKind::LBrace => {
                    return Err(self.error(
                        "Nested rules are not supported inside a declaration block".into(),
                    ));
                }
                _ => declarations.push(self.parse_declaration()?),
            }
        }

        Ok(declarations)
    }

    /// Parse one declaration. The value is the trimmed source slice up to the
    /// terminating `;` or `}` outside any parentheses or brackets.
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let start = self.peek().span;

        while self.peek().kind != TokenKind::Colon {
            match self.peek().kind {
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::LBrace | TokenKind::Eof => {
                    let property = self.source[start.start..self.peek().span.start].trim();
                    return Err(Self::error_at(
                        start,
                        format!("Expected ':' after property '{property}'"),
                    ));
                }
                _ => self.advance(),
            }
        }
        let property = self.source[start.start..self.peek().span.start]
            .trim()
            .to_string();
        self.advance(); // consume :

        let value_start = self.peek().span.start;
        let mut depth = 0usize;

        loop {
            match self.peek().kind {
                TokenKind::Eof => {
                    return Err(self.error(format!(
                        "Unexpected end of input in value of '{property}'"
                    )));
                }
                TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => break,
                TokenKind::LBrace if depth == 0 => {
                    return Err(self.error(format!("Unexpected '{{' in value of '{property}'")));
                }
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }

        let value = self.source[value_start..self.peek().span.start]
            .trim()
            .to_string();

        Ok(Declaration { property, value })
    }

    // =========================================================================
    // Preludes
    // =========================================================================

    /// Collect tokens up to a `{`, `;` or `}` outside parentheses and brackets.
    /// The terminator is left in place.
    fn collect_prelude(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => break,
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            tokens.push(token);
            self.advance();
        }

        tokens
    }

    /// Split a prelude at top-level commas into normalized items.
    fn split_list(&self, tokens: &[Token]) -> Vec<String> {
        let mut items = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;

        for (index, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => {
                    items.push(self.join_tokens(&tokens[start..index]));
                    start = index + 1;
                }
                _ => {}
            }
        }
        items.push(self.join_tokens(&tokens[start..]));

        items.retain(|item| !item.is_empty());
        items
    }

    /// Rebuild prelude text: comments dropped, whitespace runs collapsed to one space.
    fn join_tokens(&self, tokens: &[Token]) -> String {
        let mut text = String::new();
        let mut pending_space = false;

        for token in tokens {
            if token.is_trivia() {
                pending_space = true;
                continue;
            }
            if pending_space && !text.is_empty() {
                text.push(' ');
            }
            pending_space = false;
            text.push_str(token.span.slice(self.source));
        }

        text
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn skip_whitespace(&mut self) {
        while self.peek().kind == TokenKind::Whitespace {
            self.advance();
        }
    }

    fn skip_trivia(&mut self) {
        while self.peek().is_trivia() {
            self.advance();
        }
    }

    fn peek(&self) -> &Token {
        // The scanner always ends the stream with Eof, and advance() never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn error(&self, message: String) -> ParseError {
        Self::error_at(self.peek().span, message)
    }

    fn error_at(span: Span, message: String) -> ParseError {
        ParseError {
            message,
            line: span.line,
            column: span.column,
        }
    }
}

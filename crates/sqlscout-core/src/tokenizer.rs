//! Lazy, dialect-aware SQL tokenizer
//!
//! [`tokenize`] returns an iterator that scans one token per call to `next`.
//! Lexical errors are items of the stream: after reporting one the tokenizer
//! skips the offending character and carries on, so a caller can either stop
//! at the first error ([`Tokens::collect_tokens`]) or keep whatever it can use.
//! The last item of every stream is a single `EndOfInput` token.

use tracing::trace;

use crate::dialect::{DialectConfig, StringPrefixKind};
use crate::error::{LexError, Position, Span};
use crate::token::{Escapes, Payload, Token, TokenKind};

/// Scan `text` under the rules of `dialect`
pub fn tokenize<'a>(text: &'a str, dialect: &'a DialectConfig) -> Tokens<'a> {
    Tokens {
        text,
        dialect,
        pos: Position::START,
        finished: false,
    }
}

/// Iterator over the tokens of one input
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    dialect: &'a DialectConfig,
    pos: Position,
    finished: bool,
}

type Scan<'a> = Result<Token<'a>, LexError>;

impl<'a> Iterator for Tokens<'a> {
    type Item = Scan<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.scan_token();
        if let Err(err) = &item {
            trace!("lex error: {err}");
        }
        Some(item)
    }
}

impl<'a> Tokens<'a> {
    /// Collect every token, stopping at the first lexical error
    pub fn collect_tokens(self) -> Result<Vec<Token<'a>>, LexError> {
        self.collect()
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos.offset..]
    }

    fn is_at_end(&self) -> bool {
        self.pos.offset >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos = step(self.pos, c);
        Some(c)
    }

    /// Advance over the next `bytes` bytes, which must end on a char boundary
    fn advance_bytes(&mut self, bytes: usize) {
        let target = self.pos.offset + bytes;
        while self.pos.offset < target && self.advance().is_some() {}
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }

    fn token(&self, kind: TokenKind, start: Position, payload: Payload) -> Token<'a> {
        Token::new(
            kind,
            &self.text[start.offset..self.pos.offset],
            start,
            self.pos,
            payload,
        )
    }

    /// Skip whitespace and comments. Only an unterminated block comment fails.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            self.advance_while(char::is_whitespace);
            let rest = self.rest();
            if self
                .dialect
                .line_comments
                .iter()
                .any(|marker| rest.starts_with(marker.as_str()))
            {
                self.advance_while(|c| c != '\n');
            } else if rest.starts_with("/*") {
                self.scan_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn scan_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.advance_bytes(2);
        let mut depth = 1usize;
        while !self.is_at_end() {
            let rest = self.rest();
            if rest.starts_with("*/") {
                self.advance_bytes(2);
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            } else if self.dialect.nested_block_comments && rest.starts_with("/*") {
                self.advance_bytes(2);
                depth += 1;
            } else {
                self.advance();
            }
        }
        Err(LexError::UnterminatedComment {
            span: Span::new(start, self.pos),
        })
    }

    fn scan_token(&mut self) -> Scan<'a> {
        self.skip_trivia()?;

        let start = self.pos;
        let Some(c) = self.peek() else {
            self.finished = true;
            return Ok(self.token(TokenKind::EndOfInput, start, Payload::Verbatim));
        };
        let next = self.peek_nth(1);

        if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            return self.scan_number(start);
        }
        if c == '$' && self.dialect.money_literals && next.is_some_and(|n| n.is_ascii_digit()) {
            return self.scan_money(start);
        }
        if let Some(token) = self.scan_bind_variable(start) {
            return Ok(token);
        }
        if c == '\'' {
            return self.scan_string(start, None);
        }
        if let Some(close) = self.dialect.identifier_quote_close(c) {
            return self.scan_quoted_identifier(start, close);
        }
        if self.dialect.is_identifier_start(c) {
            return self.scan_word(start);
        }
        self.scan_operator(start, c)
    }

    /// Fail on an identifier-like character glued to the end of a number
    fn check_number_end(&mut self) -> Result<(), LexError> {
        match self.peek() {
            Some(c)
                if self.dialect.is_identifier_part(c)
                    || c == '\''
                    || self.dialect.identifier_quote_close(c).is_some() =>
            {
                let at = self.pos;
                self.advance();
                Err(LexError::MalformedNumber {
                    ch: c,
                    span: Span::new(at, self.pos),
                })
            }
            _ => Ok(()),
        }
    }

    fn scan_number(&mut self, start: Position) -> Scan<'a> {
        // `0x` with no hex digit is a malformed decimal, caught below
        if self.dialect.blob_literals
            && self.peek() == Some('0')
            && matches!(self.peek_nth(1), Some('x' | 'X'))
            && self.peek_nth(2).is_some_and(|c| c.is_ascii_hexdigit())
        {
            self.advance_bytes(2);
            self.advance_while(|c| c.is_ascii_hexdigit());
            self.check_number_end()?;
            let end = self.pos.offset - start.offset;
            return Ok(self.token(
                TokenKind::BlobLiteral,
                start,
                Payload::Delimited {
                    start: 2,
                    end,
                    escapes: Escapes::None,
                },
            ));
        }

        self.scan_decimal();
        self.check_number_end()?;
        Ok(self.token(TokenKind::NumberLiteral, start, Payload::Verbatim))
    }

    /// `digits[.digits][e[+-]digits]`, also `.digits`; `1..2` stays a range
    fn scan_decimal(&mut self) {
        self.advance_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_nth(1) != Some('.') {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_digits = match self.peek_nth(1) {
                Some('+' | '-') => self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_digits {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit());
            }
        }
    }

    fn scan_money(&mut self, start: Position) -> Scan<'a> {
        self.advance();
        self.scan_decimal();
        self.check_number_end()?;
        let end = self.pos.offset - start.offset;
        Ok(self.token(
            TokenKind::MoneyLiteral,
            start,
            Payload::Delimited {
                start: 1,
                end,
                escapes: Escapes::None,
            },
        ))
    }

    fn scan_bind_variable(&mut self, start: Position) -> Option<Token<'a>> {
        let dialect = self.dialect;
        let rest = self.rest();
        let prefix = dialect
            .bind_prefixes
            .iter()
            .find(|prefix| rest.starts_with(prefix.as_str()))?;
        let follower = rest[prefix.len()..].chars().next()?;
        if !(follower.is_ascii_digit() || dialect.is_identifier_part(follower)) {
            return None;
        }
        self.advance_bytes(prefix.len());
        self.advance_while(|c| dialect.is_identifier_part(c));
        Some(self.token(TokenKind::BuiltInIdentifier, start, Payload::Verbatim))
    }

    fn scan_word(&mut self, start: Position) -> Scan<'a> {
        let (dialect, text) = (self.dialect, self.text);
        self.advance_while(|c| dialect.is_identifier_part(c));
        let word = &text[start.offset..self.pos.offset];

        if self.peek() == Some('\'') {
            if let Some(kind) = dialect.string_prefix(word) {
                return self.scan_string(start, Some(kind));
            }
        }

        let kind = match dialect.keywords.lookup(word) {
            Some(id) => TokenKind::Keyword(id),
            None => TokenKind::Identifier,
        };
        Ok(self.token(kind, start, Payload::Verbatim))
    }

    /// Scan a string whose opening quote is at the cursor. `start` is where
    /// the token begins, before any prefix.
    fn scan_string(&mut self, start: Position, prefix: Option<StringPrefixKind>) -> Scan<'a> {
        let quote = self.pos;
        if prefix == Some(StringPrefixKind::Alternate) {
            if let Some(token) = self.scan_alternate_string(start) {
                return Ok(token);
            }
        }

        let escapes = if prefix == Some(StringPrefixKind::Escaped) || self.dialect.backslash_escapes
        {
            Escapes::DoubledQuoteAndBackslash
        } else {
            Escapes::DoubledQuote
        };
        let (kind, escapes) = match prefix {
            Some(StringPrefixKind::Blob) => (TokenKind::BlobLiteral, Escapes::None),
            _ => (TokenKind::StringLiteral, escapes),
        };

        self.advance();
        let content_start = self.pos.offset - start.offset;
        loop {
            match self.advance() {
                Some('\\') if escapes == Escapes::DoubledQuoteAndBackslash => {
                    self.advance();
                }
                Some('\'') if self.peek() == Some('\'') => {
                    self.advance();
                }
                Some('\'') => break,
                Some(_) => {}
                None => return Err(self.unterminated(start, quote, true)),
            }
        }
        let content_end = self.pos.offset - start.offset - 1;
        if kind == TokenKind::BlobLiteral {
            let content = &self.text[start.offset + content_start..start.offset + content_end];
            if !content.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(LexError::MalformedBlob {
                    span: Span::new(start, self.pos),
                });
            }
        }
        Ok(self.token(
            kind,
            start,
            Payload::Delimited {
                start: content_start,
                end: content_end,
                escapes,
            },
        ))
    }

    /// `q'<open>...<close>'`; `None` leaves the cursor on the quote
    fn scan_alternate_string(&mut self, start: Position) -> Option<Token<'a>> {
        let rest = self.rest();
        let mut chars = rest.chars();
        chars.next();
        let open = chars.next().filter(|c| !c.is_whitespace() && *c != '\'')?;
        let close = match open {
            '[' => ']',
            '{' => '}',
            '(' => ')',
            '<' => '>',
            other => other,
        };

        let body_offset = 1 + open.len_utf8();
        let terminator: String = [close, '\''].iter().collect();
        let body_len = rest[body_offset..].find(&terminator)?;

        let prefix_len = self.pos.offset - start.offset;
        let content_start = prefix_len + body_offset;
        let content_end = content_start + body_len;
        self.advance_bytes(body_offset + body_len + terminator.len());
        Some(self.token(
            TokenKind::StringLiteral,
            start,
            Payload::Delimited {
                start: content_start,
                end: content_end,
                escapes: Escapes::None,
            },
        ))
    }

    fn scan_quoted_identifier(&mut self, start: Position, close: char) -> Scan<'a> {
        self.advance();
        loop {
            match self.advance() {
                Some(c) if c == close && self.peek() == Some(close) => {
                    self.advance();
                }
                Some(c) if c == close => break,
                Some(_) => {}
                None => return Err(self.unterminated(start, start, false)),
            }
        }
        Ok(self.token(TokenKind::Identifier, start, Payload::Verbatim))
    }

    /// Report an unterminated literal and resume right after its opening quote
    fn unterminated(&mut self, start: Position, quote: Position, string: bool) -> LexError {
        self.pos = quote;
        self.advance();
        let span = Span::new(start, self.pos);
        if string {
            LexError::UnterminatedString { span }
        } else {
            LexError::UnterminatedIdentifier { span }
        }
    }

    fn scan_operator(&mut self, start: Position, c: char) -> Scan<'a> {
        if let Some((len, op)) = self.dialect.operators.match_compound(self.rest()) {
            self.advance_bytes(len);
            return Ok(self.token(TokenKind::Operator(op), start, Payload::Verbatim));
        }
        self.advance();
        match self.dialect.operators.match_single(c) {
            Some(kind) => Ok(self.token(kind, start, Payload::Verbatim)),
            None => Err(LexError::UnexpectedCharacter {
                ch: c,
                span: Span::new(start, self.pos),
            }),
        }
    }
}

fn step(pos: Position, c: char) -> Position {
    if c == '\n' {
        Position {
            offset: pos.offset + 1,
            line: pos.line + 1,
            column: 1,
        }
    } else {
        Position {
            offset: pos.offset + c.len_utf8(),
            line: pos.line,
            column: pos.column + 1,
        }
    }
}

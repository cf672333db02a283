//! Tokens produced by the tokenizer

use std::borrow::Cow;
use std::fmt;

use crate::dialect::KeywordId;
use crate::error::{Position, Span};

/// Structural punctuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuation {
    Comma,
    Period,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    QuestionMark,
}

impl Punctuation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuation::Comma => ",",
            Punctuation::Period => ".",
            Punctuation::LParen => "(",
            Punctuation::RParen => ")",
            Punctuation::LBracket => "[",
            Punctuation::RBracket => "]",
            Punctuation::Semicolon => ";",
            Punctuation::QuestionMark => "?",
        }
    }
}

/// Operators across all supported dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Exponent,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    NotLessThan,
    NotGreaterThan,
    NullSafeEqual,

    // Bitwise and logical
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseNot,
    ShiftLeft,
    ShiftRight,
    LogicalAnd,

    // Compound assignment
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    Assign,

    /// `::`
    Scope,
    /// `=>`
    Association,
    /// `..`
    Range,
    /// `||`
    StringConcat,

    // JSON and containment
    JsonExtract,
    JsonExtractText,
    Contains,
    ContainedBy,

    // Pattern matching
    RegexMatchInsensitive,
    RegexNotMatch,
    RegexNotMatchInsensitive,
}

/// Token classification, decided once when the token is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndOfInput,
    Identifier,
    /// Session or bind variable such as `@x`, `@@ROWCOUNT`, `:name` or `$1`
    BuiltInIdentifier,
    StringLiteral,
    NumberLiteral,
    MoneyLiteral,
    BlobLiteral,
    Punctuation(Punctuation),
    Operator(Operator),
    Keyword(KeywordId),
}

impl TokenKind {
    pub fn is_identifier(&self) -> bool {
        matches!(self, TokenKind::Identifier)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, TokenKind::Keyword(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral
                | TokenKind::NumberLiteral
                | TokenKind::MoneyLiteral
                | TokenKind::BlobLiteral
        )
    }

    pub fn is_punctuation(&self, punctuation: Punctuation) -> bool {
        matches!(self, TokenKind::Punctuation(p) if *p == punctuation)
    }

    /// Short description used in parse errors
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::EndOfInput => "end of input",
            TokenKind::Identifier => "identifier",
            TokenKind::BuiltInIdentifier => "variable",
            TokenKind::StringLiteral => "string literal",
            TokenKind::NumberLiteral => "number",
            TokenKind::MoneyLiteral => "money literal",
            TokenKind::BlobLiteral => "binary literal",
            TokenKind::Punctuation(p) => p.as_str(),
            TokenKind::Operator(_) => "operator",
            TokenKind::Keyword(_) => "keyword",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// How the literal payload of a token is stored inside its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Payload {
    /// The whole text is the value
    Verbatim,
    /// `text[start..end]` is the value, unescaped per `escapes`
    Delimited {
        start: usize,
        end: usize,
        escapes: Escapes,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Escapes {
    None,
    DoubledQuote,
    DoubledQuoteAndBackslash,
}

/// A classified, positioned slice of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    start: Position,
    end: Position,
    payload: Payload,
}

impl<'a> Token<'a> {
    pub(crate) fn new(
        kind: TokenKind,
        text: &'a str,
        start: Position,
        end: Position,
        payload: Payload,
    ) -> Self {
        Self {
            kind,
            text,
            start,
            end,
            payload,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The exact source text, delimiters and prefixes included
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// The literal value carried by the token.
    ///
    /// String literals yield the content between their quotes (a doubled
    /// quote in the standard form becomes one quote; alternate-quoted strings
    /// are returned verbatim), blob literals their hex digits, money literals
    /// the amount. Every other token yields its text.
    pub fn value(&self) -> Cow<'a, str> {
        match self.payload {
            Payload::Verbatim => Cow::Borrowed(self.text),
            Payload::Delimited {
                start,
                end,
                escapes,
            } => {
                let inner = &self.text[start..end];
                match escapes {
                    Escapes::None => Cow::Borrowed(inner),
                    Escapes::DoubledQuote if inner.contains("''") => {
                        Cow::Owned(inner.replace("''", "'"))
                    }
                    Escapes::DoubledQuote => Cow::Borrowed(inner),
                    Escapes::DoubledQuoteAndBackslash => unescape_backslashes(inner),
                }
            }
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

fn unescape_backslashes(inner: &str) -> Cow<'_, str> {
    if !inner.contains('\\') && !inner.contains("''") {
        return Cow::Borrowed(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

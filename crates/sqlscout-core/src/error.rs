//! Error types and source positions

use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifier::NamePart;

/// A location in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset from start of source
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
}

impl Position {
    /// The position of the first character of any input
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Source location span, start inclusive and end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty span sitting at `at`
    pub fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.offset.into(), span.len())
    }
}

/// Errors produced while scanning text into tokens.
///
/// A `LexError` is an item of the token stream rather than a fault: the
/// tokenizer reports it and keeps scanning after the offending character.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum LexError {
    #[error("unexpected character {ch:?} at {}", .span.start)]
    #[diagnostic(code(sqlscout::lex::unexpected_character))]
    UnexpectedCharacter {
        ch: char,
        #[label("not recognized")]
        span: Span,
    },

    #[error("malformed numeric literal: unexpected {ch:?} at {}", .span.start)]
    #[diagnostic(
        code(sqlscout::lex::malformed_number),
        help("separate the number from the following text with whitespace or an operator")
    )]
    MalformedNumber {
        ch: char,
        #[label("number cannot continue with this character")]
        span: Span,
    },

    #[error("unterminated string literal starting at {}", .span.start)]
    #[diagnostic(code(sqlscout::lex::unterminated_string))]
    UnterminatedString {
        #[label("string opened here")]
        span: Span,
    },

    #[error("unterminated quoted identifier starting at {}", .span.start)]
    #[diagnostic(code(sqlscout::lex::unterminated_identifier))]
    UnterminatedIdentifier {
        #[label("identifier quote opened here")]
        span: Span,
    },

    #[error("blob literal with non-hex digits at {}", .span.start)]
    #[diagnostic(code(sqlscout::lex::malformed_blob))]
    MalformedBlob {
        #[label("expected hex digits only")]
        span: Span,
    },

    #[error("unterminated block comment starting at {}", .span.start)]
    #[diagnostic(code(sqlscout::lex::unterminated_comment))]
    UnterminatedComment {
        #[label("comment opened here")]
        span: Span,
    },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::MalformedNumber { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedIdentifier { span }
            | LexError::MalformedBlob { span }
            | LexError::UnterminatedComment { span } => *span,
        }
    }

    /// Where the error starts
    pub fn position(&self) -> Position {
        self.span().start
    }
}

/// Errors produced while parsing a token run into a structured value
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    #[error("expected {expected}, found {found} `{text}` at {}", .span.start)]
    #[diagnostic(code(sqlscout::parse::unexpected_token))]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
        text: String,
        #[label("expected {expected}")]
        span: Span,
    },

    #[error("expected {expected}, found end of input")]
    #[diagnostic(code(sqlscout::parse::unexpected_end))]
    UnexpectedEnd {
        expected: &'static str,
        #[label("input ends here")]
        span: Span,
    },

    #[error("name part `{text}` is empty after removing its quotes")]
    #[diagnostic(code(sqlscout::parse::empty_name))]
    EmptyName {
        text: String,
        #[label("empty name")]
        span: Span,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),
}

/// Invalid identifier construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("{part} name must not be empty or whitespace")]
    BlankPart { part: NamePart },
}

/// Failure of an identifier resolution
#[derive(Debug, Error)]
pub enum ResolveError<E> {
    /// The caller's cancellation token fired before a match was found
    #[error("identifier resolution was cancelled")]
    Cancelled,

    /// The existence probe failed; the probe's own error is kept as is
    #[error(transparent)]
    Probe(E),
}

impl<E> ResolveError<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Cancelled)
    }
}

/// Errors loading dialect configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown dialect: '{0}'. Supported dialects: sqlserver, postgresql, oracle, mysql, sqlite.")]
    UnknownDialect(String),

    #[error("bind prefix must not be empty")]
    EmptyBindPrefix,
}

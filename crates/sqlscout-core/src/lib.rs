//! sqlscout-core: dialect-aware SQL fragment tokenizing and name resolution
//!
//! This library turns short SQL fragments read from a catalog (object names,
//! computed-column and index expressions) into tokens, qualified names and
//! column dependencies, and resolves partially qualified, possibly miscased
//! names against a live catalog through an injected async existence probe.

pub mod config;
pub mod dialect;
pub mod error;
pub mod identifier;
pub mod parser;
pub mod resolve;
pub mod token;
pub mod tokenizer;

pub use config::DialectOverrides;
pub use dialect::{Dialect, DialectConfig};
pub use error::{
    ConfigError, IdentifierError, LexError, ParseError, Position, ResolveError, Span,
};
pub use identifier::{
    qualify, CaseSensitivity, Identifier, IdentifierComparer, IdentifierDefaults, IdentifierKey,
    NamePart,
};
pub use parser::{
    extract_dependencies, extract_dependencies_with, parse_qualified_name,
    parse_qualified_name_str, ExpressionDependencies, IndexColumnKind, SqlIdentifier,
};
pub use resolve::{resolve, ExistenceProbe, IdentifierResolver, ResolutionStrategy};
pub use token::{Operator, Punctuation, Token, TokenKind};
pub use tokenizer::{tokenize, Tokens};

//! SQL dialect support
//!
//! Everything the tokenizer and resolver need to know about a dialect lives
//! in a [`DialectConfig`]: keyword table, operator table, quoting rules,
//! literal switches and the default identifier casing. The built-in
//! configurations are created lazily once per process and shared read-only.

mod keywords;
mod operators;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::identifier::{CaseSensitivity, IdentifierComparer};
use crate::resolve::strategy::{CaseNormalizing, ResolutionStrategy, Verbatim};

pub use keywords::{KeywordId, KeywordTable};
pub use operators::OperatorTable;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    SqlServer,
    PostgreSql,
    Oracle,
    MySql,
    Sqlite,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::SqlServer,
        Dialect::PostgreSql,
        Dialect::Oracle,
        Dialect::MySql,
        Dialect::Sqlite,
    ];

    /// The shared configuration for this dialect
    pub fn config(&self) -> &'static DialectConfig {
        match self {
            Dialect::SqlServer => &SQL_SERVER,
            Dialect::PostgreSql => &POSTGRESQL,
            Dialect::Oracle => &ORACLE,
            Dialect::MySql => &MYSQL,
            Dialect::Sqlite => &SQLITE,
        }
    }

    /// Conventional default schema name for this dialect
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            Dialect::SqlServer => Some("dbo"),
            Dialect::PostgreSql => Some("public"),
            Dialect::Sqlite => Some("main"),
            Dialect::Oracle | Dialect::MySql => None,
        }
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlserver" | "mssql" | "tsql" | "sql-server" => Ok(Dialect::SqlServer),
            "postgresql" | "postgres" | "pg" => Ok(Dialect::PostgreSql),
            "oracle" | "plsql" => Ok(Dialect::Oracle),
            "mysql" | "mysql8" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(ConfigError::UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::SqlServer => write!(f, "sqlserver"),
            Dialect::PostgreSql => write!(f, "postgresql"),
            Dialect::Oracle => write!(f, "oracle"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// How a dialect folds unquoted identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCasing {
    /// Names are stored as written
    #[default]
    Verbatim,
    /// Unquoted names fold to upper case (Oracle)
    Upper,
    /// Unquoted names fold to lower case (PostgreSQL)
    Lower,
}

/// Meaning of a letter prefix directly in front of a string quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringPrefixKind {
    /// `N'...'`: same grammar as a plain string
    National,
    /// `E'...'`: backslash escapes are honored
    Escaped,
    /// `X'...'`: hex digits of a binary value
    Blob,
    /// `q'[...]'`: user-chosen delimiter, no inner unescaping
    Alternate,
}

/// Per-dialect lexical rules
#[derive(Debug, Clone)]
pub struct DialectConfig {
    pub name: String,
    pub keywords: KeywordTable,
    pub operators: OperatorTable,
    /// Identifier quoting characters as (open, close)
    pub identifier_quotes: Vec<(char, char)>,
    /// Characters besides letters and `_` that may start an identifier
    pub identifier_start_chars: Vec<char>,
    /// Characters besides letters, digits and `_` that may continue one
    pub identifier_part_chars: Vec<char>,
    /// Lower-case string prefixes and their meaning
    pub string_prefixes: Vec<(String, StringPrefixKind)>,
    /// Whether plain string literals honor backslash escapes
    pub backslash_escapes: bool,
    /// `0x1A2B` binary literals
    pub blob_literals: bool,
    /// `$12.50` money literals
    pub money_literals: bool,
    /// Prefixes introducing session or bind variables, longest first
    pub bind_prefixes: Vec<String>,
    /// Line comment introducers
    pub line_comments: Vec<String>,
    pub nested_block_comments: bool,
    pub casing: IdentifierCasing,
    pub case_sensitivity: CaseSensitivity,
}

impl DialectConfig {
    pub fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || self.identifier_start_chars.contains(&ch)
    }

    pub fn is_identifier_part(&self, ch: char) -> bool {
        ch.is_alphanumeric()
            || ch == '_'
            || self.identifier_part_chars.contains(&ch)
            || self.identifier_start_chars.contains(&ch)
    }

    /// Closing character for an identifier quote opened by `open`
    pub fn identifier_quote_close(&self, open: char) -> Option<char> {
        self.identifier_quotes
            .iter()
            .find(|(o, _)| *o == open)
            .map(|(_, close)| *close)
    }

    /// Meaning of `word` when it directly precedes a single quote
    pub fn string_prefix(&self, word: &str) -> Option<StringPrefixKind> {
        self.string_prefixes
            .iter()
            .find(|(prefix, _)| prefix.eq_ignore_ascii_case(word))
            .map(|(_, kind)| *kind)
    }

    /// Sort bind prefixes so the longest is tried first
    pub(crate) fn normalize(mut self) -> Self {
        let mut seen = HashSet::new();
        self.bind_prefixes.retain(|p| seen.insert(p.clone()));
        self.bind_prefixes.sort_by(|a, b| b.len().cmp(&a.len()));
        self
    }

    /// The dialect's default candidate ordering for name resolution
    pub fn resolution_strategy(&self) -> Box<dyn ResolutionStrategy + Send + Sync> {
        match self.casing {
            IdentifierCasing::Verbatim => Box::new(Verbatim),
            IdentifierCasing::Upper => Box::new(CaseNormalizing::upper_first()),
            IdentifierCasing::Lower => Box::new(CaseNormalizing::lower_first()),
        }
    }

    /// Identifier equality as the dialect's catalog sees it
    pub fn identifier_comparer(&self) -> IdentifierComparer {
        IdentifierComparer::new(self.case_sensitivity)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn prefixes(items: &[(&str, StringPrefixKind)]) -> Vec<(String, StringPrefixKind)> {
    items.iter().map(|(p, k)| (p.to_string(), *k)).collect()
}

pub static SQL_SERVER: LazyLock<DialectConfig> = LazyLock::new(|| {
    DialectConfig {
        name: Dialect::SqlServer.to_string(),
        keywords: KeywordTable::new(keywords::SQL_SERVER_KEYWORDS),
        operators: operators::sql_server(),
        identifier_quotes: vec![('[', ']'), ('"', '"')],
        identifier_start_chars: vec!['#'],
        identifier_part_chars: vec!['$', '@'],
        string_prefixes: prefixes(&[("n", StringPrefixKind::National)]),
        backslash_escapes: false,
        blob_literals: true,
        money_literals: true,
        bind_prefixes: strings(&["@@", "@"]),
        line_comments: strings(&["--"]),
        nested_block_comments: true,
        casing: IdentifierCasing::Verbatim,
        case_sensitivity: CaseSensitivity::CaseInsensitive,
    }
    .normalize()
});

pub static POSTGRESQL: LazyLock<DialectConfig> = LazyLock::new(|| {
    DialectConfig {
        name: Dialect::PostgreSql.to_string(),
        keywords: KeywordTable::new(keywords::POSTGRESQL_KEYWORDS),
        operators: operators::postgresql(),
        identifier_quotes: vec![('"', '"')],
        identifier_start_chars: Vec::new(),
        identifier_part_chars: vec!['$'],
        string_prefixes: prefixes(&[
            ("n", StringPrefixKind::National),
            ("e", StringPrefixKind::Escaped),
            ("x", StringPrefixKind::Blob),
        ]),
        backslash_escapes: false,
        blob_literals: false,
        money_literals: false,
        bind_prefixes: strings(&["$"]),
        line_comments: strings(&["--"]),
        nested_block_comments: true,
        casing: IdentifierCasing::Lower,
        case_sensitivity: CaseSensitivity::Ordinal,
    }
    .normalize()
});

pub static ORACLE: LazyLock<DialectConfig> = LazyLock::new(|| {
    DialectConfig {
        name: Dialect::Oracle.to_string(),
        keywords: KeywordTable::new(keywords::ORACLE_KEYWORDS),
        operators: operators::oracle(),
        identifier_quotes: vec![('"', '"')],
        identifier_start_chars: Vec::new(),
        identifier_part_chars: vec!['$', '#'],
        string_prefixes: prefixes(&[
            ("n", StringPrefixKind::National),
            ("q", StringPrefixKind::Alternate),
            ("nq", StringPrefixKind::Alternate),
        ]),
        backslash_escapes: false,
        blob_literals: false,
        money_literals: false,
        bind_prefixes: strings(&[":"]),
        line_comments: strings(&["--"]),
        nested_block_comments: false,
        casing: IdentifierCasing::Upper,
        case_sensitivity: CaseSensitivity::Ordinal,
    }
    .normalize()
});

pub static MYSQL: LazyLock<DialectConfig> = LazyLock::new(|| {
    DialectConfig {
        name: Dialect::MySql.to_string(),
        keywords: KeywordTable::new(keywords::MYSQL_KEYWORDS),
        operators: operators::mysql(),
        identifier_quotes: vec![('`', '`')],
        identifier_start_chars: vec!['$'],
        identifier_part_chars: Vec::new(),
        string_prefixes: prefixes(&[
            ("n", StringPrefixKind::National),
            ("x", StringPrefixKind::Blob),
        ]),
        backslash_escapes: true,
        blob_literals: true,
        money_literals: false,
        bind_prefixes: strings(&["@@", "@"]),
        line_comments: strings(&["--", "#"]),
        nested_block_comments: false,
        casing: IdentifierCasing::Verbatim,
        case_sensitivity: CaseSensitivity::CaseInsensitive,
    }
    .normalize()
});

pub static SQLITE: LazyLock<DialectConfig> = LazyLock::new(|| {
    DialectConfig {
        name: Dialect::Sqlite.to_string(),
        keywords: KeywordTable::new(keywords::SQLITE_KEYWORDS),
        operators: operators::sqlite(),
        identifier_quotes: vec![('"', '"'), ('[', ']'), ('`', '`')],
        identifier_start_chars: Vec::new(),
        identifier_part_chars: vec!['$'],
        string_prefixes: prefixes(&[("x", StringPrefixKind::Blob)]),
        backslash_escapes: false,
        blob_literals: false,
        money_literals: false,
        bind_prefixes: strings(&["?", ":", "@", "$"]),
        line_comments: strings(&["--"]),
        nested_block_comments: false,
        casing: IdentifierCasing::Verbatim,
        case_sensitivity: CaseSensitivity::CaseInsensitive,
    }
    .normalize()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("MSSQL".parse::<Dialect>().unwrap(), Dialect::SqlServer);
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        let err = "db2".parse::<Dialect>().unwrap_err();
        assert!(err.to_string().contains("db2"));
    }

    #[test]
    fn test_display_round_trips() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
            assert_eq!(dialect.config().name, dialect.to_string());
        }
    }

    #[test]
    fn test_bind_prefixes_longest_first() {
        assert_eq!(SQL_SERVER.bind_prefixes, vec!["@@", "@"]);
    }

    #[test]
    fn test_identifier_quotes() {
        assert_eq!(SQL_SERVER.identifier_quote_close('['), Some(']'));
        assert_eq!(POSTGRESQL.identifier_quote_close('['), None);
        assert_eq!(MYSQL.identifier_quote_close('`'), Some('`'));
    }

    #[test]
    fn test_string_prefix_ignores_case() {
        assert_eq!(ORACLE.string_prefix("Q"), Some(StringPrefixKind::Alternate));
        assert_eq!(ORACLE.string_prefix("nQ"), Some(StringPrefixKind::Alternate));
        assert_eq!(SQL_SERVER.string_prefix("q"), None);
    }

    #[test]
    fn test_default_schema() {
        assert_eq!(Dialect::SqlServer.default_schema(), Some("dbo"));
        assert_eq!(Dialect::Oracle.default_schema(), None);
    }
}

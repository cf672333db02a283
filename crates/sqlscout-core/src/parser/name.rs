//! Qualified object names: `[server.][database.][schema.]name`

use std::borrow::Cow;
use std::fmt;

use crate::dialect::DialectConfig;
use crate::error::{IdentifierError, ParseError, Span};
use crate::identifier::Identifier;
use crate::token::{Punctuation, Token, TokenKind};
use crate::tokenizer::tokenize;

/// Most parts a qualified name can have
pub const MAX_NAME_PARTS: usize = 4;

/// A parsed dotted name with its parts unquoted, most qualified first
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlIdentifier {
    parts: Vec<String>,
}

impl SqlIdentifier {
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false; a parsed name has at least one part
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Part `back` positions from the end, if the name is that long
    fn from_end(&self, back: usize) -> Option<&str> {
        self.parts
            .len()
            .checked_sub(back + 1)
            .map(|i| self.parts[i].as_str())
    }

    pub fn local_name(&self) -> &str {
        self.from_end(0).unwrap_or_default()
    }

    pub fn schema(&self) -> Option<&str> {
        self.from_end(1)
    }

    pub fn database(&self) -> Option<&str> {
        self.from_end(2)
    }

    pub fn server(&self) -> Option<&str> {
        self.from_end(3)
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

impl TryFrom<SqlIdentifier> for Identifier {
    type Error = IdentifierError;

    fn try_from(name: SqlIdentifier) -> Result<Self, Self::Error> {
        let part = |p: Option<&str>| p.map(str::to_string);
        Identifier::from_parts(
            part(name.server()),
            part(name.database()),
            part(name.schema()),
            name.local_name().to_string(),
        )
    }
}

/// Strip the outer quotes of a delimited identifier and collapse doubled
/// closing quotes inside it. Undelimited text is returned unchanged.
pub fn unwrap_identifier(text: &str) -> Cow<'_, str> {
    let mut chars = text.chars();
    let (Some(open), Some(last)) = (chars.next(), chars.next_back()) else {
        return Cow::Borrowed(text);
    };
    let close = match open {
        '[' => ']',
        '"' => '"',
        '`' => '`',
        _ => return Cow::Borrowed(text),
    };
    if last != close {
        return Cow::Borrowed(text);
    }

    let inner = &text[open.len_utf8()..text.len() - close.len_utf8()];
    let doubled: String = [close, close].iter().collect();
    if inner.contains(&doubled) {
        Cow::Owned(inner.replace(&doubled, &close.to_string()))
    } else {
        Cow::Borrowed(inner)
    }
}

/// Parse a token run as a one to four part dotted name.
///
/// The whole run must be consumed; a trailing `EndOfInput` token is allowed.
/// Only identifier tokens are accepted as parts, so a reserved word must be
/// quoted to be used as a name.
pub fn parse_qualified_name(tokens: &[Token<'_>]) -> Result<SqlIdentifier, ParseError> {
    let tokens = match tokens.split_last() {
        Some((last, rest)) if last.kind() == TokenKind::EndOfInput => rest,
        _ => tokens,
    };

    let mut parts = Vec::with_capacity(MAX_NAME_PARTS);
    let mut expect_part = true;
    for token in tokens {
        if expect_part {
            if token.kind() != TokenKind::Identifier {
                return Err(unexpected("identifier", token));
            }
            parts.push(unwrap_part(token)?);
        } else {
            if !token.kind().is_punctuation(Punctuation::Period) {
                return Err(unexpected("`.` or end of name", token));
            }
            if parts.len() == MAX_NAME_PARTS {
                return Err(unexpected("end of name", token));
            }
        }
        expect_part = !expect_part;
    }

    if expect_part {
        let at = tokens.last().map(|t| t.end()).unwrap_or_default();
        return Err(ParseError::UnexpectedEnd {
            expected: "identifier",
            span: Span::empty(at),
        });
    }
    Ok(SqlIdentifier { parts })
}

/// Tokenize `text` and parse it as a qualified name
pub fn parse_qualified_name_str(
    text: &str,
    dialect: &DialectConfig,
) -> Result<SqlIdentifier, ParseError> {
    let tokens = tokenize(text, dialect).collect_tokens()?;
    parse_qualified_name(&tokens)
}

fn unwrap_part(token: &Token<'_>) -> Result<String, ParseError> {
    let part = unwrap_identifier(token.text());
    if part.is_empty() {
        return Err(ParseError::EmptyName {
            text: token.text().to_string(),
            span: token.span(),
        });
    }
    Ok(part.into_owned())
}

fn unexpected(expected: &'static str, token: &Token<'_>) -> ParseError {
    ParseError::UnexpectedToken {
        expected,
        found: token.kind().describe(),
        text: token.text().to_string(),
        span: token.span(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MYSQL, ORACLE, SQL_SERVER};

    #[test]
    fn test_unwrap_identifier() {
        assert_eq!(unwrap_identifier("\"My Table\""), "My Table");
        assert_eq!(unwrap_identifier("\"He said \"\"hi\"\"\""), "He said \"hi\"");
        assert_eq!(unwrap_identifier("[My Table]"), "My Table");
        assert_eq!(unwrap_identifier("[a]]b]"), "a]b");
        assert_eq!(unwrap_identifier("`a``b`"), "a`b");
        assert_eq!(unwrap_identifier("plain"), "plain");
        assert_eq!(unwrap_identifier("\""), "\"");
    }

    #[test]
    fn test_two_part_name() {
        let name = parse_qualified_name_str("schema.local", &SQL_SERVER).unwrap();
        assert_eq!(name.parts(), &["schema", "local"]);
        assert_eq!(name.schema(), Some("schema"));
        assert_eq!(name.local_name(), "local");
        assert_eq!(name.database(), None);
    }

    #[test]
    fn test_four_part_name() {
        let name = parse_qualified_name_str("srv.[my db].dbo.[T]]1]", &SQL_SERVER).unwrap();
        assert_eq!(name.server(), Some("srv"));
        assert_eq!(name.database(), Some("my db"));
        assert_eq!(name.local_name(), "T]1");
        assert_eq!(name.to_string(), "srv.my db.dbo.T]1");
    }

    #[test]
    fn test_five_parts_rejected() {
        let err = parse_qualified_name_str("a.b.c.d.e", &MYSQL).unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, text, .. } => {
                assert_eq!(expected, "end of name");
                assert_eq!(text, ".");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_period_rejected() {
        let err = parse_qualified_name_str("dbo.", &SQL_SERVER).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_keyword_part_rejected() {
        let err = parse_qualified_name_str("dbo.order", &SQL_SERVER).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: "identifier",
                found: "keyword",
                ..
            }
        ));
        assert!(parse_qualified_name_str("dbo.[order]", &SQL_SERVER).is_ok());
    }

    #[test]
    fn test_empty_quoted_part_rejected() {
        let err = parse_qualified_name_str("\"\".x", &ORACLE).unwrap_err();
        assert!(matches!(err, ParseError::EmptyName { .. }));
    }

    #[test]
    fn test_lex_error_surfaces() {
        let err = parse_qualified_name_str("dbo.[open", &SQL_SERVER).unwrap_err();
        assert!(matches!(err, ParseError::Lex(_)));
    }

    #[test]
    fn test_empty_input() {
        let err = parse_qualified_name(&[]).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_into_identifier() {
        let name = parse_qualified_name_str("\"OWNER\".\"TBL\"", &ORACLE).unwrap();
        let id = Identifier::try_from(name).unwrap();
        assert_eq!(id.schema(), Some("OWNER"));
        assert_eq!(id.local_name(), "TBL");
    }
}

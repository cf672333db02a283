//! Column dependencies of computed-column, check and index expressions

use indexmap::IndexSet;

use crate::identifier::IdentifierComparer;
use crate::parser::name::{unwrap_identifier, MAX_NAME_PARTS};
use crate::token::{Punctuation, Token, TokenKind};

/// How an index key column is backed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexColumnKind {
    /// A bare column reference; the column's own type applies
    Column,
    /// Any other expression; needs a synthesized placeholder column
    FunctionBased,
}

/// Identifiers referenced by an expression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionDependencies {
    /// Unquoted identifier names in first-seen order, function names excluded
    pub identifiers: IndexSet<String>,
    /// Known column names referenced by the expression, in first-seen order
    pub dependent_columns: IndexSet<String>,
    /// True when the expression is nothing but one (optionally qualified) name
    pub is_identity: bool,
}

impl ExpressionDependencies {
    pub fn column_kind(&self) -> IndexColumnKind {
        if self.is_identity {
            IndexColumnKind::Column
        } else {
            IndexColumnKind::FunctionBased
        }
    }

    /// Name of the placeholder column standing in for a function-based key.
    ///
    /// `None` for identity expressions. Otherwise the expression text with
    /// runs of whitespace collapsed to one space.
    pub fn placeholder_column(&self, expression_text: &str) -> Option<String> {
        if self.is_identity {
            return None;
        }
        let normalized = expression_text.split_whitespace().collect::<Vec<_>>().join(" ");
        Some(normalized)
    }
}

/// Collect the identifiers an expression depends on.
///
/// Only names present in `known_column_names` exactly as written land in
/// `dependent_columns`. Use [`extract_dependencies_with`] to match them the
/// way a case-insensitive catalog does.
pub fn extract_dependencies<S: AsRef<str>>(
    tokens: &[Token<'_>],
    known_column_names: &[S],
) -> ExpressionDependencies {
    extract_dependencies_with(tokens, known_column_names, &IdentifierComparer::ordinal())
}

/// [`extract_dependencies`] matching known column names with `comparer`.
///
/// An exact spelling wins over a case-folded one; the known column's own
/// spelling is what lands in `dependent_columns`.
pub fn extract_dependencies_with<S: AsRef<str>>(
    tokens: &[Token<'_>],
    known_column_names: &[S],
    comparer: &IdentifierComparer,
) -> ExpressionDependencies {
    let tokens: Vec<&Token<'_>> = tokens
        .iter()
        .filter(|t| t.kind() != TokenKind::EndOfInput)
        .collect();

    let mut deps = ExpressionDependencies {
        is_identity: is_bare_name(strip_parens(&tokens)),
        ..Default::default()
    };

    for (i, token) in tokens.iter().enumerate() {
        if !token.kind().is_identifier() {
            continue;
        }
        let is_call = tokens
            .get(i + 1)
            .is_some_and(|next| next.kind().is_punctuation(Punctuation::LParen));
        if is_call {
            continue;
        }

        let name = unwrap_identifier(token.text()).into_owned();
        let mut known = known_column_names.iter().map(|c| c.as_ref());
        let column = known
            .clone()
            .find(|c| *c == name)
            .or_else(|| known.find(|c| comparer.eq_part(c, &name)));
        if let Some(column) = column {
            deps.dependent_columns.insert(column.to_string());
        }
        deps.identifiers.insert(name);
    }
    deps
}

/// Drop parentheses that wrap the whole run, however deeply nested
fn strip_parens<'r, 't>(mut tokens: &'r [&'t Token<'t>]) -> &'r [&'t Token<'t>] {
    while tokens.len() >= 2
        && tokens[0].kind().is_punctuation(Punctuation::LParen)
        && tokens[tokens.len() - 1]
            .kind()
            .is_punctuation(Punctuation::RParen)
        && closes_at_end(tokens)
    {
        tokens = &tokens[1..tokens.len() - 1];
    }
    tokens
}

/// Whether the opening parenthesis at index 0 is closed by the last token
fn closes_at_end(tokens: &[&Token<'_>]) -> bool {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind() {
            TokenKind::Punctuation(Punctuation::LParen) => depth += 1,
            TokenKind::Punctuation(Punctuation::RParen) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == tokens.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// `Id (. Id){0,3}`
fn is_bare_name(tokens: &[&Token<'_>]) -> bool {
    if tokens.is_empty() || tokens.len() % 2 == 0 || tokens.len() > 2 * MAX_NAME_PARTS - 1 {
        return false;
    }
    tokens.iter().enumerate().all(|(i, token)| {
        if i % 2 == 0 {
            token.kind().is_identifier()
        } else {
            token.kind().is_punctuation(Punctuation::Period)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{ORACLE, POSTGRESQL, SQL_SERVER};
    use crate::tokenizer::tokenize;

    const NO_COLUMNS: &[&str] = &[];

    fn deps(text: &str, columns: &[&str]) -> ExpressionDependencies {
        let tokens = tokenize(text, &SQL_SERVER).collect_tokens().unwrap();
        extract_dependencies(&tokens, columns)
    }

    #[test]
    fn test_bare_column_is_identity() {
        let d = deps("TEST_COLUMN", &["TEST_COLUMN"]);
        assert!(d.is_identity);
        assert_eq!(d.identifiers.iter().collect::<Vec<_>>(), vec!["TEST_COLUMN"]);
        assert_eq!(d.column_kind(), IndexColumnKind::Column);
        assert_eq!(d.placeholder_column("TEST_COLUMN"), None);
    }

    #[test]
    fn test_function_call_is_not_identity() {
        let d = deps("UPPER(TEST_COLUMN)", &["TEST_COLUMN"]);
        assert!(!d.is_identity);
        assert_eq!(d.identifiers.iter().collect::<Vec<_>>(), vec!["TEST_COLUMN"]);
        assert_eq!(d.column_kind(), IndexColumnKind::FunctionBased);
        assert_eq!(
            d.placeholder_column("UPPER( TEST_COLUMN )"),
            Some("UPPER( TEST_COLUMN )".to_string())
        );
    }

    #[test]
    fn test_parenthesized_column_is_identity() {
        assert!(deps("((dbo.[Col]))", NO_COLUMNS).is_identity);
        assert!(!deps("(a) + (b)", NO_COLUMNS).is_identity);
    }

    #[test]
    fn test_first_seen_order_deduplicated() {
        let d = deps("b + a * b - [c]", &["a", "c"]);
        assert_eq!(
            d.identifiers.iter().collect::<Vec<_>>(),
            vec!["b", "a", "c"]
        );
        assert_eq!(
            d.dependent_columns.iter().collect::<Vec<_>>(),
            vec!["a", "c"]
        );
    }

    #[test]
    fn test_dependents_match_exactly_by_default() {
        let tokens = tokenize("price * qty", &POSTGRESQL).collect_tokens().unwrap();
        let d = extract_dependencies(&tokens, &["PRICE", "qty"]);
        assert_eq!(d.dependent_columns.iter().collect::<Vec<_>>(), vec!["qty"]);
    }

    #[test]
    fn test_case_variant_columns_under_oracle() {
        let tokens = tokenize("\"COL\" + col", &ORACLE).collect_tokens().unwrap();
        let comparer = ORACLE.identifier_comparer();
        let d = extract_dependencies_with(&tokens, &["col", "COL"], &comparer);
        assert_eq!(
            d.dependent_columns.iter().collect::<Vec<_>>(),
            vec!["COL", "col"]
        );

        let tokens = tokenize("\"COL\" + 1", &ORACLE).collect_tokens().unwrap();
        let d = extract_dependencies_with(&tokens, &["col"], &comparer);
        assert!(d.dependent_columns.is_empty());
    }

    #[test]
    fn test_case_insensitive_comparer_folds_names() {
        let comparer = SQL_SERVER.identifier_comparer();
        let tokens = tokenize("[Price] * QTY", &SQL_SERVER).collect_tokens().unwrap();
        let d = extract_dependencies_with(&tokens, &["price", "Qty", "QTY"], &comparer);
        // An exact spelling is preferred over a folded one
        assert_eq!(
            d.dependent_columns.iter().collect::<Vec<_>>(),
            vec!["price", "QTY"]
        );
    }

    #[test]
    fn test_literals_are_not_identifiers() {
        let d = deps("'TEST_COLUMN' + 1", &["TEST_COLUMN"]);
        assert!(d.identifiers.is_empty());
        assert!(d.dependent_columns.is_empty());
        assert!(!d.is_identity);
    }

    #[test]
    fn test_qualified_oracle_reference() {
        let tokens = tokenize("\"OWNER\".\"TBL\".\"COL\" + 1", &ORACLE)
            .collect_tokens()
            .unwrap();
        let d = extract_dependencies(&tokens, &["COL"]);
        assert!(!d.is_identity);
        assert_eq!(
            d.identifiers.iter().collect::<Vec<_>>(),
            vec!["OWNER", "TBL", "COL"]
        );
        assert_eq!(d.dependent_columns.len(), 1);
    }
}

// Integration tests for tokenizing and parsing SQL fragments
use pretty_assertions::assert_eq;
use sqlscout_core::dialect::{Dialect, DialectConfig, MYSQL, ORACLE, POSTGRESQL, SQL_SERVER};
use sqlscout_core::parser::{
    extract_dependencies, extract_dependencies_with, parse_qualified_name, parse_qualified_name_str,
};
use sqlscout_core::token::{Operator, Punctuation, Token, TokenKind};
use sqlscout_core::tokenizer::tokenize;
use sqlscout_core::{DialectOverrides, LexError, ParseError};

fn lex<'a>(text: &'a str, dialect: &'a DialectConfig) -> Vec<Token<'a>> {
    tokenize(text, dialect)
        .collect_tokens()
        .unwrap_or_else(|e| panic!("failed to tokenize {text:?}: {e}"))
}

fn kinds(tokens: &[Token<'_>]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind()).collect()
}

#[test]
fn test_keyword_case_insensitive_in_every_dialect() {
    for dialect in Dialect::ALL {
        let config = dialect.config();
        let upper = lex("SELECT", config)[0].kind();
        assert!(upper.is_keyword(), "{dialect}: SELECT is not a keyword");
        assert_eq!(lex("select", config)[0].kind(), upper);
        assert_eq!(lex("Select", config)[0].kind(), upper);
    }
}

#[test]
fn test_keyword_name_is_upper_case() {
    let TokenKind::Keyword(id) = lex("select", &SQL_SERVER)[0].kind() else {
        panic!("expected keyword");
    };
    assert_eq!(SQL_SERVER.keywords.name(id), Some("SELECT"));
}

#[test]
fn test_literal_kinds() {
    let tokens = lex("123 123.45 0x1A2B $12.50", &SQL_SERVER);
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::NumberLiteral,
            TokenKind::NumberLiteral,
            TokenKind::BlobLiteral,
            TokenKind::MoneyLiteral,
            TokenKind::EndOfInput,
        ]
    );
    assert_eq!(tokens[0].text(), "123");
    assert_eq!(tokens[1].text(), "123.45");
    assert_eq!(tokens[2].value(), "1A2B");
    assert_eq!(tokens[3].value(), "12.50");
}

#[test]
fn test_less_or_equal_is_one_token() {
    let tokens = lex("a<=b", &SQL_SERVER);
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::Operator(Operator::LessOrEqual),
            TokenKind::Identifier,
            TokenKind::EndOfInput,
        ]
    );
}

#[test]
fn test_alternate_quoted_string() {
    let tokens = lex("q'[it''s]'", &ORACLE);
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::StringLiteral, TokenKind::EndOfInput]
    );
    assert_eq!(tokens[0].value(), "it''s");
    assert_eq!(tokens[0].text(), "q'[it''s]'");
}

#[test]
fn test_alternate_quote_delimiters() {
    for (text, expected) in [
        ("q'{a}'", "a"),
        ("q'(a)'", "a"),
        ("q'<a>'", "a"),
        ("nq'#a#'", "a"),
    ] {
        let tokens = lex(text, &ORACLE);
        assert_eq!(tokens.len(), 2, "{text}");
        assert_eq!(tokens[0].value(), expected, "{text}");
    }
}

#[test]
fn test_oracle_qualified_expression_tokens() {
    let tokens = lex("\"OWNER\".\"TBL\".\"COL\" + 1", &ORACLE);
    let period = TokenKind::Punctuation(Punctuation::Period);
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            period,
            TokenKind::Identifier,
            period,
            TokenKind::Identifier,
            TokenKind::Operator(Operator::Plus),
            TokenKind::NumberLiteral,
            TokenKind::EndOfInput,
        ]
    );

    let name = parse_qualified_name(&tokens[..5]).unwrap();
    assert_eq!(name.parts(), &["OWNER", "TBL", "COL"]);
    assert_eq!(name.database(), Some("OWNER"));
    assert_eq!(name.schema(), Some("TBL"));
    assert_eq!(name.local_name(), "COL");

    // The full run is an expression, not a name
    assert!(parse_qualified_name(&tokens).is_err());
}

#[test]
fn test_quoted_name_parts() {
    let cases = [
        ("\"My Table\"", &*ORACLE, "My Table"),
        ("\"He said \"\"hi\"\"\"", &*POSTGRESQL, "He said \"hi\""),
        ("[My Table]", &*SQL_SERVER, "My Table"),
        ("[a]]b]", &*SQL_SERVER, "a]b"),
        ("`x``y`", &*MYSQL, "x`y"),
    ];
    for (text, dialect, expected) in cases {
        let name = parse_qualified_name_str(text, dialect).unwrap();
        assert_eq!(name.parts(), &[expected], "{text}");
    }
}

#[test]
fn test_schema_local_name() {
    let name = parse_qualified_name_str("schema.local", &POSTGRESQL).unwrap();
    assert_eq!(name.parts(), &["schema", "local"]);
}

#[test]
fn test_parse_error_names_offending_token() {
    let err = parse_qualified_name_str("dbo.Foo + 1", &SQL_SERVER).unwrap_err();
    match err {
        ParseError::UnexpectedToken { text, span, .. } => {
            assert_eq!(text, "+");
            assert_eq!(span.start.column, 9);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_identity_expressions() {
    let tokens = lex("TEST_COLUMN", &SQL_SERVER);
    let deps = extract_dependencies(&tokens, &["TEST_COLUMN"]);
    assert!(deps.is_identity);
    assert_eq!(
        deps.identifiers.iter().collect::<Vec<_>>(),
        vec!["TEST_COLUMN"]
    );

    let tokens = lex("UPPER(TEST_COLUMN)", &SQL_SERVER);
    let deps = extract_dependencies(&tokens, &["TEST_COLUMN"]);
    assert!(!deps.is_identity);
    assert_eq!(
        deps.identifiers.iter().collect::<Vec<_>>(),
        vec!["TEST_COLUMN"]
    );
    assert_eq!(
        deps.dependent_columns.iter().collect::<Vec<_>>(),
        vec!["TEST_COLUMN"]
    );
}

#[test]
fn test_unknown_identifiers_are_not_dependents() {
    let tokens = lex("price * qty + bonus", &POSTGRESQL);
    let deps = extract_dependencies(&tokens, &["price", "qty"]);
    assert_eq!(deps.identifiers.len(), 3);
    assert_eq!(
        deps.dependent_columns.iter().collect::<Vec<_>>(),
        vec!["price", "qty"]
    );
}

#[test]
fn test_ordinal_dialect_keeps_case_distinct_columns() {
    let tokens = lex("\"COL\" + 1", &ORACLE);
    let comparer = ORACLE.identifier_comparer();
    let deps = extract_dependencies_with(&tokens, &["col", "COL"], &comparer);
    assert_eq!(deps.dependent_columns.iter().collect::<Vec<_>>(), vec!["COL"]);

    let tokens = lex("price * qty", &POSTGRESQL);
    let comparer = POSTGRESQL.identifier_comparer();
    let deps = extract_dependencies_with(&tokens, &["PRICE", "QTY"], &comparer);
    assert!(deps.dependent_columns.is_empty());
}

#[test]
fn test_lex_errors_are_recoverable() {
    let items: Vec<_> = tokenize("a ! 'open", &ORACLE).collect();
    let errors: Vec<&LexError> = items.iter().filter_map(|i| i.as_ref().err()).collect();
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], LexError::UnexpectedCharacter { ch: '!', .. }));
    assert!(matches!(errors[1], LexError::UnterminatedString { .. }));
    assert_eq!(errors[1].position().column, 5);

    let texts: Vec<&str> = items
        .iter()
        .filter_map(|i| i.as_ref().ok())
        .map(|t| t.text())
        .collect();
    assert_eq!(texts, vec!["a", "open", ""]);
}

#[test]
fn test_tokens_borrow_input() {
    let text = String::from("dbo.[Orders]");
    let tokens = lex(&text, &SQL_SERVER);
    let total: usize = tokens.iter().map(|t| t.span().len()).sum();
    assert_eq!(total, text.len());
}

#[test]
fn test_overridden_dialect() {
    let config = DialectOverrides::from_toml_str(
        r#"
base = "sqlserver"
extra_keywords = ["materialize"]
money_literals = false
"#,
    )
    .unwrap()
    .build()
    .unwrap();

    assert_eq!(config.name, "sqlserver+overrides");
    assert!(lex("MATERIALIZE", &config)[0].kind().is_keyword());
    assert!(!lex("MATERIALIZE", &SQL_SERVER)[0].kind().is_keyword());
    // `$` is no longer a money prefix
    assert!(tokenize("$12", &config).collect_tokens().is_err());
}

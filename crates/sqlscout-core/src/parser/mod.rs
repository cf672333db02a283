//! Parsers over token runs: qualified names and expression dependencies

mod expression;
mod name;

pub use expression::{
    extract_dependencies, extract_dependencies_with, ExpressionDependencies, IndexColumnKind,
};
pub use name::{
    parse_qualified_name, parse_qualified_name_str, unwrap_identifier, SqlIdentifier,
    MAX_NAME_PARTS,
};

//! Operator and punctuation tables

use std::collections::{HashMap, HashSet};

use crate::token::{Operator, Punctuation, TokenKind};

/// Compound and single-character operator lookup for one dialect.
///
/// Compound operators are kept longest literal first so that trying them in
/// order always yields the longest match (`<=>` before `<=` before `<`).
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    compound: Vec<(Box<str>, Operator)>,
    single: HashMap<char, TokenKind>,
}

impl OperatorTable {
    pub fn new<'s, C, S>(compound: C, single: S) -> Self
    where
        C: IntoIterator<Item = (&'s str, Operator)>,
        S: IntoIterator<Item = (char, TokenKind)>,
    {
        let mut seen = HashSet::new();
        let mut compound: Vec<(Box<str>, Operator)> = compound
            .into_iter()
            .filter(|(literal, _)| literal.chars().count() > 1 && seen.insert(*literal))
            .map(|(literal, op)| (literal.into(), op))
            .collect();
        // Stable sort keeps declaration order among equal lengths
        compound.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        Self {
            compound,
            single: single.into_iter().collect(),
        }
    }

    /// Longest compound operator at the start of `rest`, with its byte length
    pub fn match_compound(&self, rest: &str) -> Option<(usize, Operator)> {
        self.compound
            .iter()
            .find(|(literal, _)| rest.starts_with(literal.as_ref()))
            .map(|(literal, op)| (literal.len(), *op))
    }

    pub fn match_single(&self, ch: char) -> Option<TokenKind> {
        self.single.get(&ch).copied()
    }

    /// Compound operator literals in matching order
    pub fn compound_literals(&self) -> impl Iterator<Item = &str> {
        self.compound.iter().map(|(literal, _)| literal.as_ref())
    }
}

pub(crate) fn standard_single() -> Vec<(char, TokenKind)> {
    use Operator::*;
    use Punctuation::*;
    vec![
        (',', TokenKind::Punctuation(Comma)),
        ('.', TokenKind::Punctuation(Period)),
        ('(', TokenKind::Punctuation(LParen)),
        (')', TokenKind::Punctuation(RParen)),
        ('[', TokenKind::Punctuation(LBracket)),
        (']', TokenKind::Punctuation(RBracket)),
        (';', TokenKind::Punctuation(Semicolon)),
        ('?', TokenKind::Punctuation(QuestionMark)),
        ('+', TokenKind::Operator(Plus)),
        ('-', TokenKind::Operator(Minus)),
        ('*', TokenKind::Operator(Multiply)),
        ('/', TokenKind::Operator(Divide)),
        ('%', TokenKind::Operator(Modulo)),
        ('=', TokenKind::Operator(Equal)),
        ('<', TokenKind::Operator(LessThan)),
        ('>', TokenKind::Operator(GreaterThan)),
        ('&', TokenKind::Operator(BitwiseAnd)),
        ('|', TokenKind::Operator(BitwiseOr)),
        ('^', TokenKind::Operator(BitwiseXor)),
        ('~', TokenKind::Operator(BitwiseNot)),
    ]
}

pub(crate) fn sql_server() -> OperatorTable {
    use Operator::*;
    OperatorTable::new(
        [
            ("<=", LessOrEqual),
            (">=", GreaterOrEqual),
            ("<>", NotEqual),
            ("!=", NotEqual),
            ("!<", NotLessThan),
            ("!>", NotGreaterThan),
            ("+=", AddAssign),
            ("-=", SubtractAssign),
            ("*=", MultiplyAssign),
            ("/=", DivideAssign),
            ("%=", ModuloAssign),
            ("&=", AndAssign),
            ("|=", OrAssign),
            ("^=", XorAssign),
            ("::", Scope),
        ],
        standard_single(),
    )
}

pub(crate) fn postgresql() -> OperatorTable {
    use Operator::*;
    OperatorTable::new(
        [
            ("<=", LessOrEqual),
            (">=", GreaterOrEqual),
            ("<>", NotEqual),
            ("!=", NotEqual),
            ("<<", ShiftLeft),
            (">>", ShiftRight),
            ("::", Scope),
            (":=", Assign),
            ("=>", Association),
            ("||", StringConcat),
            ("&&", LogicalAnd),
            ("->>", JsonExtractText),
            ("->", JsonExtract),
            ("@>", Contains),
            ("<@", ContainedBy),
            ("~*", RegexMatchInsensitive),
            ("!~*", RegexNotMatchInsensitive),
            ("!~", RegexNotMatch),
        ],
        standard_single(),
    )
}

pub(crate) fn oracle() -> OperatorTable {
    use Operator::*;
    OperatorTable::new(
        [
            ("<=", LessOrEqual),
            (">=", GreaterOrEqual),
            ("<>", NotEqual),
            ("!=", NotEqual),
            ("^=", NotEqual),
            ("~=", NotEqual),
            (":=", Assign),
            ("=>", Association),
            ("..", Range),
            ("||", StringConcat),
            ("**", Exponent),
        ],
        standard_single(),
    )
}

pub(crate) fn mysql() -> OperatorTable {
    use Operator::*;
    OperatorTable::new(
        [
            ("<=>", NullSafeEqual),
            ("<=", LessOrEqual),
            (">=", GreaterOrEqual),
            ("<>", NotEqual),
            ("!=", NotEqual),
            ("<<", ShiftLeft),
            (">>", ShiftRight),
            (":=", Assign),
            ("&&", LogicalAnd),
            ("||", StringConcat),
            ("->>", JsonExtractText),
            ("->", JsonExtract),
        ],
        standard_single(),
    )
}

pub(crate) fn sqlite() -> OperatorTable {
    use Operator::*;
    OperatorTable::new(
        [
            ("<=", LessOrEqual),
            (">=", GreaterOrEqual),
            ("<>", NotEqual),
            ("!=", NotEqual),
            ("==", Equal),
            ("<<", ShiftLeft),
            (">>", ShiftRight),
            ("||", StringConcat),
            ("->>", JsonExtractText),
            ("->", JsonExtract),
        ],
        standard_single(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_sorted_longest_first() {
        let table = mysql();
        let literals: Vec<&str> = table.compound_literals().collect();
        assert_eq!(literals[0].len(), 3);
        let lengths: Vec<usize> = literals.iter().map(|l| l.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn test_longest_match_wins() {
        let table = mysql();
        assert_eq!(
            table.match_compound("<=> 1"),
            Some((3, Operator::NullSafeEqual))
        );
        assert_eq!(table.match_compound("<= 1"), Some((2, Operator::LessOrEqual)));
        assert_eq!(table.match_compound("< 1"), None);
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let table = OperatorTable::new(
            [("->", Operator::JsonExtract), ("->>", Operator::JsonExtractText)],
            Vec::new(),
        );
        assert_eq!(
            table.match_compound("->>'a'"),
            Some((3, Operator::JsonExtractText))
        );
    }

    #[test]
    fn test_single_characters() {
        let table = sql_server();
        assert_eq!(
            table.match_single('.'),
            Some(TokenKind::Punctuation(Punctuation::Period))
        );
        assert_eq!(table.match_single('+'), Some(TokenKind::Operator(Operator::Plus)));
        assert_eq!(table.match_single('!'), None);
    }

    #[test]
    fn test_oracle_caret_equal_is_not_equal() {
        assert_eq!(oracle().match_compound("^= 1"), Some((2, Operator::NotEqual)));
        assert_eq!(sql_server().match_compound("^= 1"), Some((2, Operator::XorAssign)));
    }
}

//! Candidate orderings for name resolution

use crate::identifier::Identifier;

/// Produces the names to try, in order, when resolving a user-supplied name
pub trait ResolutionStrategy {
    fn candidates(&self, identifier: &Identifier) -> Vec<Identifier>;
}

impl<S: ResolutionStrategy + ?Sized> ResolutionStrategy for &S {
    fn candidates(&self, identifier: &Identifier) -> Vec<Identifier> {
        (**self).candidates(identifier)
    }
}

impl<S: ResolutionStrategy + ?Sized> ResolutionStrategy for Box<S> {
    fn candidates(&self, identifier: &Identifier) -> Vec<Identifier> {
        (**self).candidates(identifier)
    }
}

/// Try the name exactly as written
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl ResolutionStrategy for Verbatim {
    fn candidates(&self, identifier: &Identifier) -> Vec<Identifier> {
        vec![identifier.clone()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterCase {
    Upper,
    Lower,
}

/// Try the name as written, then with its local name folded to one case and
/// then the other. Catalogs that store unquoted names folded (Oracle upper,
/// PostgreSQL lower) want their own case tried first.
#[derive(Debug, Clone, Copy)]
pub struct CaseNormalizing {
    first: LetterCase,
}

impl CaseNormalizing {
    pub fn new(first: LetterCase) -> Self {
        Self { first }
    }

    pub fn upper_first() -> Self {
        Self::new(LetterCase::Upper)
    }

    pub fn lower_first() -> Self {
        Self::new(LetterCase::Lower)
    }
}

impl Default for CaseNormalizing {
    fn default() -> Self {
        Self::upper_first()
    }
}

impl ResolutionStrategy for CaseNormalizing {
    fn candidates(&self, identifier: &Identifier) -> Vec<Identifier> {
        let local = identifier.local_name();
        let folded = match self.first {
            LetterCase::Upper => [local.to_uppercase(), local.to_lowercase()],
            LetterCase::Lower => [local.to_lowercase(), local.to_uppercase()],
        };

        let mut candidates = vec![identifier.clone()];
        for name in folded {
            // Folding never blanks a non-blank name
            let Ok(candidate) = identifier.with_local_name(name) else {
                continue;
            };
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }
}

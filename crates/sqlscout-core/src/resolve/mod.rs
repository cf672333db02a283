//! Name resolution against a live catalog
//!
//! A [`ResolutionStrategy`] turns a user-supplied name into an ordered list of
//! candidates. [`resolve`] qualifies each candidate with the connection
//! defaults and asks an [`ExistenceProbe`] whether it exists, one candidate at
//! a time, stopping at the first hit.

pub mod strategy;

use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::dialect::DialectConfig;
use crate::error::ResolveError;
use crate::identifier::{qualify, Identifier, IdentifierDefaults};

pub use strategy::{CaseNormalizing, LetterCase, ResolutionStrategy, Verbatim};

/// Asks the catalog whether an object exists.
///
/// Returns the canonical name of the object when it exists. The cancellation
/// token is the caller's; a probe that does its own I/O should honor it.
///
/// Implemented for any `Fn(Identifier, CancellationToken) -> impl Future`
/// with a matching output, so an async closure can serve as a probe.
pub trait ExistenceProbe {
    type Error;

    fn probe(
        &self,
        candidate: Identifier,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Option<Identifier>, Self::Error>>;
}

impl<F, Fut, E> ExistenceProbe for F
where
    F: Fn(Identifier, CancellationToken) -> Fut,
    Fut: Future<Output = Result<Option<Identifier>, E>>,
{
    type Error = E;

    fn probe(
        &self,
        candidate: Identifier,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Option<Identifier>, E>> {
        self(candidate, cancel)
    }
}

/// Resolve `input` to the first strategy candidate the probe finds.
///
/// Candidates are probed strictly in order and never after a hit. `Ok(None)`
/// means no candidate exists. Cancelling `cancel` before or during a probe
/// ends the resolution with [`ResolveError::Cancelled`]; a probe error is
/// returned unchanged as [`ResolveError::Probe`] unless the token was
/// cancelled by then.
pub async fn resolve<S, P>(
    input: &Identifier,
    defaults: &IdentifierDefaults,
    strategy: &S,
    probe: &P,
    cancel: &CancellationToken,
) -> Result<Option<Identifier>, ResolveError<P::Error>>
where
    S: ResolutionStrategy + ?Sized,
    P: ExistenceProbe + ?Sized,
{
    let candidates = strategy.candidates(input);
    debug!("resolving {input} ({} candidates)", candidates.len());

    for candidate in candidates {
        if cancel.is_cancelled() {
            debug!("resolution of {input} cancelled");
            return Err(ResolveError::Cancelled);
        }

        let candidate = qualify(&candidate, defaults);
        trace!("probing {candidate}");
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("resolution of {input} cancelled while probing {candidate}");
                return Err(ResolveError::Cancelled);
            }
            outcome = probe.probe(candidate.clone(), cancel.clone()) => outcome,
        };

        match outcome {
            Ok(Some(found)) => {
                debug!("resolved {input} to {found}");
                return Ok(Some(found));
            }
            Ok(None) => trace!("{candidate} not found"),
            Err(_) if cancel.is_cancelled() => return Err(ResolveError::Cancelled),
            Err(err) => return Err(ResolveError::Probe(err)),
        }
    }

    debug!("no candidate for {input} exists");
    Ok(None)
}

/// A strategy and connection defaults bundled for repeated resolutions
pub struct IdentifierResolver {
    strategy: Box<dyn ResolutionStrategy + Send + Sync>,
    defaults: IdentifierDefaults,
}

impl IdentifierResolver {
    pub fn new<S>(strategy: S, defaults: IdentifierDefaults) -> Self
    where
        S: ResolutionStrategy + Send + Sync + 'static,
    {
        Self {
            strategy: Box::new(strategy),
            defaults,
        }
    }

    /// Resolver using the dialect's default candidate ordering
    pub fn for_dialect(dialect: &DialectConfig, defaults: IdentifierDefaults) -> Self {
        Self {
            strategy: dialect.resolution_strategy(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &IdentifierDefaults {
        &self.defaults
    }

    /// Fully qualified candidates in probing order
    pub fn candidates(&self, input: &Identifier) -> Vec<Identifier> {
        self.strategy
            .candidates(input)
            .iter()
            .map(|c| qualify(c, &self.defaults))
            .collect()
    }

    pub async fn resolve<P>(
        &self,
        input: &Identifier,
        probe: &P,
        cancel: &CancellationToken,
    ) -> Result<Option<Identifier>, ResolveError<P::Error>>
    where
        P: ExistenceProbe + ?Sized,
    {
        resolve(input, &self.defaults, &*self.strategy, probe, cancel).await
    }
}

impl fmt::Debug for IdentifierResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierResolver")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

//! Tagged fetch results and the ordered-strategy driver used by the catalog.
//!
//! Every logical operation is a list of named tiers (structured API
//! endpoints, then page scraping). The driver runs them in order and stops
//! at the first success; adding or removing a tier is a change to the list,
//! not to the control flow.

use futures::future::BoxFuture;
use serde::Serialize;

use crate::error::ScraperError;

/// Which tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Api,
    Scraping,
    Cache,
    /// Built-in local data used when every upstream tier failed.
    Fallback,
    None,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Provenance::Api => "api",
            Provenance::Scraping => "scraping",
            Provenance::Cache => "cache",
            Provenance::Fallback => "fallback",
            Provenance::None => "none",
        };
        f.write_str(label)
    }
}

/// A successful, normalized result together with the tier that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Sourced<T> {
    pub data: T,
    pub source: Provenance,
}

/// Result of running one tier against the upstream.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Success { data: T, source: Provenance },
    Failure { reason: String, source: Provenance },
}

impl<T> FetchOutcome<T> {
    pub fn from_result(source: Provenance, result: Result<T, ScraperError>) -> Self {
        match result {
            Ok(data) => Self::Success { data, source },
            Err(err) => {
                if err.is_soft_block() {
                    tracing::warn!(%source, block = "soft", error = %err, "upstream tier soft-blocked");
                }
                Self::Failure {
                    reason: err.to_string(),
                    source,
                }
            }
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// One tier's failure, kept so the composite error can name every reason.
#[derive(Debug, Clone)]
pub struct TierFailure {
    pub tier: &'static str,
    pub source: Provenance,
    pub reason: String,
}

/// A named tier whose work has not started yet. Later tiers only touch the
/// network when the driver reaches them.
pub(crate) struct Strategy<'a, T> {
    pub(crate) name: &'static str,
    pub(crate) source: Provenance,
    pub(crate) run: BoxFuture<'a, Result<T, ScraperError>>,
}

impl<'a, T> Strategy<'a, T> {
    pub(crate) fn new(
        name: &'static str,
        source: Provenance,
        run: BoxFuture<'a, Result<T, ScraperError>>,
    ) -> Self {
        Self { name, source, run }
    }
}

/// Runs `strategies` in order and returns the first success.
///
/// # Errors
///
/// Returns [`ScraperError::TiersExhausted`] listing every tier's reason when
/// none succeeds.
pub(crate) async fn first_success<T>(
    operation: &'static str,
    input: &str,
    strategies: Vec<Strategy<'_, T>>,
) -> Result<Sourced<T>, ScraperError> {
    let mut failures = Vec::new();

    for strategy in strategies {
        match FetchOutcome::from_result(strategy.source, strategy.run.await) {
            FetchOutcome::Success { data, source } => {
                tracing::info!(operation, input, tier = strategy.name, %source, "tier succeeded");
                return Ok(Sourced { data, source });
            }
            FetchOutcome::Failure { reason, source } => {
                tracing::warn!(operation, input, tier = strategy.name, %reason, "tier failed; falling through");
                failures.push(TierFailure {
                    tier: strategy.name,
                    source,
                    reason,
                });
            }
        }
    }

    Err(ScraperError::TiersExhausted {
        operation,
        input: input.to_owned(),
        failures,
    })
}

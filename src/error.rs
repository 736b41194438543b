// Error taxonomy shared across the fetch, enrichment, and advisory layers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller input missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A sports-data resource fetch failed (transport error, timeout, or
    /// non-2xx status). Retry policy belongs to the caller.
    #[error("upstream fetch failed for {resource}: {message}")]
    UpstreamUnavailable {
        resource: &'static str,
        message: String,
    },

    /// The event list contains neither a current nor a finished gameweek.
    #[error("no resolvable gameweek in event list")]
    NoResolvableGameweek,

    /// A pick references a player id absent from the catalog snapshot.
    #[error("pick references unknown player id {0}")]
    UnknownPlayerReference(u32),

    /// The advisory service asked us to slow down.
    #[error("advisory service rate limited; retry later")]
    AdvisoryRateLimited,

    /// The advisory service answered, but not with schema-conforming JSON.
    #[error("malformed advisory response: {0}")]
    MalformedAdvisoryResponse(String),

    /// The advisory service could not be reached or returned a server error.
    #[error("advisory service unavailable: {0}")]
    AdvisoryUnavailable(String),
}

impl CoreError {
    /// Whether this is a data-consistency fault (upstream answered, but
    /// with internally inconsistent data) as opposed to a transport or
    /// caller problem. Operators triage the two differently.
    pub fn is_data_fault(&self) -> bool {
        matches!(
            self,
            CoreError::NoResolvableGameweek | CoreError::UnknownPlayerReference(_)
        )
    }
}

use thiserror::Error;

use crate::outcome::TierFailure;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited or service unavailable (status {status}) at {url}")]
    RateLimited { status: u16, url: String },

    #[error("blocked by anti-bot protection at {url}")]
    AntiBotChallenge { url: String },

    #[error("redirected to anti-bot interstitial {host}")]
    AntiBotRedirect { host: String },

    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("max retries exceeded after {attempts} attempts, last error: {last}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        last: Box<ScraperError>,
    },

    #[error("{context}: {reason}")]
    Extraction { context: String, reason: String },

    #[error("invalid upstream URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid scraper configuration: {0}")]
    Config(String),

    #[error("{name} parameter cannot be empty")]
    EmptyParameter { name: &'static str },

    #[error("{operation} failed for \"{input}\": {}", describe_failures(.failures))]
    TiersExhausted {
        operation: &'static str,
        input: String,
        failures: Vec<TierFailure>,
    },
}

impl ScraperError {
    /// Transient conditions worth another attempt within the same call.
    ///
    /// Structural redirect failures and hard statuses are final: the
    /// upstream has answered and asking again will not change the answer.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::RateLimited { .. } | Self::AntiBotChallenge { .. }
        )
    }

    /// `true` when the upstream is refusing us rather than lacking data.
    #[must_use]
    pub fn is_soft_block(&self) -> bool {
        match self {
            Self::RateLimited { .. }
            | Self::AntiBotChallenge { .. }
            | Self::AntiBotRedirect { .. } => true,
            Self::RetriesExhausted { last, .. } => last.is_soft_block(),
            _ => false,
        }
    }

    /// Caller-side input problems, rejected before any network activity.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyParameter { .. })
    }
}

fn describe_failures(failures: &[TierFailure]) -> String {
    if failures.is_empty() {
        return "no strategies configured".to_owned();
    }
    failures
        .iter()
        .map(|f| format!("{} failed: {}", f.tier, f.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

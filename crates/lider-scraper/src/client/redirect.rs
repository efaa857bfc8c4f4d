//! Redirect inspection for the upstream client.

use std::error::Error as _;

use reqwest::redirect::{Attempt, Policy};

use crate::error::ScraperError;

/// Why the redirect policy refused to follow a hop.
///
/// Raised from inside reqwest's redirect machinery and recovered from the
/// error's source chain by [`RedirectRejection::find`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RedirectRejection {
    #[error("redirect to anti-bot interstitial {host}")]
    Interstitial { host: String },
    #[error("more than {limit} redirects")]
    TooMany { limit: usize },
}

impl RedirectRejection {
    /// Searches `err`'s source chain for a rejection raised by [`policy`].
    pub(crate) fn find(err: &reqwest::Error) -> Option<Self> {
        let mut source = err.source();
        while let Some(inner) = source {
            if let Some(rejection) = inner.downcast_ref::<Self>() {
                return Some(rejection.clone());
            }
            source = inner.source();
        }
        None
    }
}

impl From<RedirectRejection> for ScraperError {
    fn from(rejection: RedirectRejection) -> Self {
        match rejection {
            RedirectRejection::Interstitial { host } => ScraperError::AntiBotRedirect { host },
            RedirectRejection::TooMany { limit } => ScraperError::TooManyRedirects { limit },
        }
    }
}

/// Follows ordinary redirects, rejecting waiting-room hosts and long chains.
pub(crate) fn policy(blocked_hosts: Vec<String>, max_redirects: usize) -> Policy {
    Policy::custom(move |attempt| inspect(attempt, &blocked_hosts, max_redirects))
}

fn inspect(
    attempt: Attempt<'_>,
    blocked_hosts: &[String],
    max_redirects: usize,
) -> reqwest::redirect::Action {
    let host = attempt.url().host_str().unwrap_or_default().to_owned();
    if blocked_hosts
        .iter()
        .any(|blocked| !blocked.is_empty() && host.contains(blocked.as_str()))
    {
        tracing::warn!(%host, block = "soft", "redirect to anti-bot interstitial");
        return attempt.error(RedirectRejection::Interstitial { host });
    }
    if attempt.previous().len() > max_redirects {
        return attempt.error(RedirectRejection::TooMany {
            limit: max_redirects,
        });
    }
    attempt.follow()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_map_to_structural_errors() {
        let err: ScraperError = RedirectRejection::Interstitial {
            host: "lider.queue-it.net".to_owned(),
        }
        .into();
        assert!(matches!(err, ScraperError::AntiBotRedirect { ref host } if host == "lider.queue-it.net"));
        assert!(!err.is_retriable());

        let err: ScraperError = RedirectRejection::TooMany { limit: 5 }.into();
        assert!(matches!(err, ScraperError::TooManyRedirects { limit: 5 }));
        assert!(!err.is_retriable());
    }
}

//! Resilient HTTP transport toward the upstream retailer.

mod redirect;

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};

use crate::classify::{classify, ResponseClass, SoftBlock};
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::identity::IdentityPool;
use crate::rate_limit::{retry_with_backoff, RateGovernor};

use redirect::RedirectRejection;

pub(crate) const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
pub(crate) const ACCEPT_JSON: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE: &str = "es-CL,es;q=0.9,en;q=0.8";

/// One outbound request, before identity and baseline headers are applied.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    /// Caller headers; these replace baseline headers of the same name.
    pub headers: HeaderMap,
}

impl UpstreamRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Shorthand for a JSON-accepting API call.
    #[must_use]
    pub fn accept_json(self) -> Self {
        self.header(header::ACCEPT, HeaderValue::from_static(ACCEPT_JSON))
    }
}

/// A response that passed classification.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// URL after redirects.
    pub final_url: String,
    pub body: String,
}

/// Shared transport: one cookie jar, one connection pool, one pacer.
///
/// Every [`fetch`](Self::fetch) waits on the process-wide [`RateGovernor`]
/// once, then runs the bounded retry loop. Each attempt carries the next
/// rotated identity plus a browser-like header set.
pub struct UpstreamClient {
    client: Client,
    identities: IdentityPool,
    governor: RateGovernor,
    retry_delays: Vec<Duration>,
    block_markers: Vec<String>,
    referer_domain: String,
    referer: HeaderValue,
}

impl UpstreamClient {
    /// # Errors
    ///
    /// - [`ScraperError::Config`] if no usable identity or referer can be built.
    /// - [`ScraperError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let identities = IdentityPool::new(&config.user_agents)
            .ok_or_else(|| ScraperError::Config("no usable user agents configured".to_owned()))?;

        let referer_text = format!("{}/", config.web_base.trim_end_matches('/'));
        let referer = HeaderValue::from_str(&referer_text).map_err(|e| {
            ScraperError::Config(format!("web base \"{referer_text}\" is not a valid header: {e}"))
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .cookie_store(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .redirect(redirect::policy(
                config.blocked_redirect_hosts.clone(),
                config.max_redirects,
            ))
            .build()?;

        Ok(Self {
            client,
            identities,
            governor: RateGovernor::new(config.pacing_interval),
            retry_delays: config.retry_delays.clone(),
            block_markers: config.block_markers.clone(),
            referer_domain: config.referer_domain.clone(),
            referer,
        })
    }

    /// Performs `request` under pacing and retry.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] before any network activity.
    /// - [`ScraperError::AntiBotRedirect`] / [`ScraperError::TooManyRedirects`]
    ///   immediately, without retrying.
    /// - [`ScraperError::UnexpectedStatus`] for a non-2xx that is not a soft block.
    /// - [`ScraperError::RetriesExhausted`] when every attempt hit a transient error.
    pub async fn fetch(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, ScraperError> {
        let url = Url::parse(&request.url).map_err(|e| ScraperError::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        self.governor.acquire().await;
        retry_with_backoff(&self.retry_delays, || self.attempt(&url, request)).await
    }

    async fn attempt(
        &self,
        url: &Url,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, ScraperError> {
        let response = self
            .client
            .request(request.method.clone(), url.clone())
            .headers(self.headers_for(url, &request.headers))
            .send()
            .await
            .map_err(|err| {
            RedirectRejection::find(&err).map_or(ScraperError::Http(err), ScraperError::from)
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        match classify(status, &body, &self.block_markers) {
            ResponseClass::Ok => {
                tracing::debug!(url = %final_url, status = status.as_u16(), bytes = body.len(), "upstream response");
                Ok(UpstreamResponse {
                    status,
                    final_url,
                    body,
                })
            }
            ResponseClass::SoftBlocked(SoftBlock::RateLimited) => {
                tracing::warn!(url = %final_url, status = status.as_u16(), block = "soft", "upstream rate limited");
                Err(ScraperError::RateLimited {
                    status: status.as_u16(),
                    url: final_url,
                })
            }
            ResponseClass::SoftBlocked(SoftBlock::AntiBotChallenge) => {
                tracing::warn!(url = %final_url, status = status.as_u16(), block = "soft", "anti-bot marker in response body");
                Err(ScraperError::AntiBotChallenge { url: final_url })
            }
            ResponseClass::HardFailed => {
                tracing::warn!(url = %final_url, status = status.as_u16(), block = "hard", "upstream returned a hard failure");
                Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: final_url,
                })
            }
        }
    }

    /// Baseline browser headers, then the rotated identity, then `extra`,
    /// then a storefront `Referer` for upstream hosts.
    pub(crate) fn headers_for(&self, url: &Url, extra: &HeaderMap) -> HeaderMap {
        let mut headers = baseline_headers();
        headers.insert(header::USER_AGENT, self.identities.next_identity());
        for (name, value) in extra {
            headers.insert(name.clone(), value.clone());
        }
        if self.is_upstream_host(url) && !headers.contains_key(header::REFERER) {
            headers.insert(header::REFERER, self.referer.clone());
        }
        headers
    }

    fn is_upstream_host(&self, url: &Url) -> bool {
        let domain = self.referer_domain.as_str();
        !domain.is_empty()
            && url
                .host_str()
                .is_some_and(|host| host == domain || host.ends_with(&format!(".{domain}")))
    }
}

fn baseline_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;

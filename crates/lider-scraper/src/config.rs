//! Injected configuration for the upstream-fetch service object.

use std::time::Duration;

use lider_core::{AppConfig, DEFAULT_USER_AGENTS};

/// Body substrings that identify an anti-bot waiting room.
pub const DEFAULT_BLOCK_MARKERS: [&str; 2] = ["queue-it.net", "Queue-it"];

/// Redirect targets that mean the session has been parked in a waiting room.
pub const DEFAULT_BLOCKED_REDIRECT_HOSTS: [&str; 1] = ["queue-it.net"];

/// Everything the catalog needs to talk to the upstream.
///
/// Built once at the composition root and handed to [`crate::Catalog::new`];
/// there is no process-global scraper state.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub user_agents: Vec<String>,
    /// Sleep before each retry. Attempts per call are `retry_delays.len() + 1`.
    pub retry_delays: Vec<Duration>,
    pub pacing_interval: Duration,
    pub request_timeout: Duration,
    pub max_redirects: usize,
    pub api_base: String,
    pub web_base: String,
    pub referer_domain: String,
    pub block_markers: Vec<String>,
    pub blocked_redirect_hosts: Vec<String>,
    pub search_max_pages: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_owned()).collect(),
            retry_delays: [1, 3, 7, 15].into_iter().map(Duration::from_secs).collect(),
            pacing_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(45),
            max_redirects: 5,
            api_base: "https://apps.lider.cl".to_owned(),
            web_base: "https://www.lider.cl".to_owned(),
            referer_domain: "lider.cl".to_owned(),
            block_markers: DEFAULT_BLOCK_MARKERS.iter().map(|s| (*s).to_owned()).collect(),
            blocked_redirect_hosts: DEFAULT_BLOCKED_REDIRECT_HOSTS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            search_max_pages: 25,
        }
    }
}

impl ScraperConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agents: config.scraper_user_agents.clone(),
            retry_delays: config
                .scraper_retry_delays_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
            pacing_interval: Duration::from_millis(config.scraper_pacing_interval_ms),
            request_timeout: Duration::from_secs(config.scraper_request_timeout_secs),
            max_redirects: config.scraper_max_redirects,
            api_base: config.upstream_api_base_url.clone(),
            web_base: config.upstream_web_base_url.clone(),
            referer_domain: config.upstream_referer_domain.clone(),
            search_max_pages: config.scraper_search_max_pages,
            ..Self::default()
        }
    }

    /// Points both upstream hosts at `base`, with no pacing and no retries.
    ///
    /// Intended for tests against a local mock server.
    #[must_use]
    pub fn for_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_owned();
        Self {
            retry_delays: Vec::new(),
            pacing_interval: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
            api_base: base.clone(),
            web_base: base,
            referer_domain: "127.0.0.1".to_owned(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_the_baseline_schedule() {
        let config = ScraperConfig::default();
        assert_eq!(config.retry_delays.len() + 1, 5);
        assert_eq!(config.retry_delays[3], Duration::from_secs(15));
        assert_eq!(config.pacing_interval, Duration::from_secs(2));
        assert_eq!(config.max_redirects, 5);
        assert!(config.user_agents.len() >= 6);
    }

    #[test]
    fn for_base_url_strips_trailing_slash() {
        let config = ScraperConfig::for_base_url("http://127.0.0.1:9999/");
        assert_eq!(config.api_base, "http://127.0.0.1:9999");
        assert_eq!(config.web_base, "http://127.0.0.1:9999");
        assert!(config.retry_delays.is_empty());
        assert!(config.pacing_interval.is_zero());
    }
}

use std::net::SocketAddr;

/// Browser identities rotated across outbound upstream requests.
pub const DEFAULT_USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Shared secret expected in the `X-API-Key` header. The server refuses to
    /// start without it outside development; the CLI ignores it.
    pub api_key: Option<String>,
    pub upstream_api_base_url: String,
    pub upstream_web_base_url: String,
    /// Requests whose host ends with this domain carry a storefront `Referer`.
    pub upstream_referer_domain: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_pacing_interval_ms: u64,
    /// Delay before each retry; the number of attempts is `len + 1`.
    pub scraper_retry_delays_ms: Vec<u64>,
    pub scraper_max_redirects: usize,
    pub scraper_search_max_pages: u32,
    pub scraper_user_agents: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("upstream_api_base_url", &self.upstream_api_base_url)
            .field("upstream_web_base_url", &self.upstream_web_base_url)
            .field("upstream_referer_domain", &self.upstream_referer_domain)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field(
                "scraper_pacing_interval_ms",
                &self.scraper_pacing_interval_ms,
            )
            .field("scraper_retry_delays_ms", &self.scraper_retry_delays_ms)
            .field("scraper_max_redirects", &self.scraper_max_redirects)
            .field("scraper_search_max_pages", &self.scraper_search_max_pages)
            .field("scraper_user_agents", &self.scraper_user_agents.len())
            .finish()
    }
}

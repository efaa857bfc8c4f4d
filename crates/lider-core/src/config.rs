use crate::app_config::{AppConfig, Environment, DEFAULT_USER_AGENTS};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("LIDER_ENV", "development"))?;

    // `PORT` is honoured for platforms that only inject a port number.
    let default_bind = lookup("PORT").map_or_else(
        |_| "0.0.0.0:8080".to_string(),
        |port| format!("0.0.0.0:{}", port.trim()),
    );
    let bind_var = if lookup("LIDER_BIND_ADDR").is_ok() {
        "LIDER_BIND_ADDR"
    } else {
        "PORT"
    };
    let bind_addr = or_default("LIDER_BIND_ADDR", &default_bind)
        .parse::<SocketAddr>()
        .map_err(|e| invalid(bind_var, e.to_string()))?;

    let log_level = or_default("LIDER_LOG_LEVEL", "info");

    let api_key = lookup("API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let upstream_api_base_url = parse_base_url(
        "LIDER_API_BASE_URL",
        &or_default("LIDER_API_BASE_URL", "https://apps.lider.cl"),
    )?;
    let upstream_web_base_url = parse_base_url(
        "LIDER_WEB_BASE_URL",
        &or_default("LIDER_WEB_BASE_URL", "https://www.lider.cl"),
    )?;
    let upstream_referer_domain = or_default("LIDER_REFERER_DOMAIN", "lider.cl");

    let scraper_request_timeout_secs = parse_u64("LIDER_REQUEST_TIMEOUT_SECS", "45")?;
    if scraper_request_timeout_secs == 0 {
        return Err(invalid(
            "LIDER_REQUEST_TIMEOUT_SECS",
            "timeout must be greater than zero".to_string(),
        ));
    }
    let scraper_pacing_interval_ms = parse_u64("LIDER_PACING_INTERVAL_MS", "2000")?;
    let scraper_retry_delays_ms = parse_delay_list(
        "LIDER_RETRY_DELAYS_MS",
        &or_default("LIDER_RETRY_DELAYS_MS", "1000,3000,7000,15000"),
    )?;
    let scraper_max_redirects = parse_usize("LIDER_MAX_REDIRECTS", "5")?;
    let scraper_search_max_pages = parse_u32("LIDER_SEARCH_MAX_PAGES", "25")?;

    let scraper_user_agents = match lookup("LIDER_USER_AGENTS") {
        Ok(raw) => {
            let agents: Vec<String> = raw
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect();
            if agents.is_empty() {
                return Err(invalid(
                    "LIDER_USER_AGENTS",
                    "at least one user agent is required".to_string(),
                ));
            }
            agents
        }
        Err(_) => DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_string()).collect(),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_key,
        upstream_api_base_url,
        upstream_web_base_url,
        upstream_referer_domain,
        scraper_request_timeout_secs,
        scraper_pacing_interval_ms,
        scraper_retry_delays_ms,
        scraper_max_redirects,
        scraper_search_max_pages,
        scraper_user_agents,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LIDER_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Parses a comma-separated millisecond list. An empty value disables retries.
fn parse_delay_list(var: &str, raw: &str) -> Result<Vec<u64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("\"{s}\": {e}"),
            })
        })
        .collect()
}

fn parse_base_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("\"{raw}\" is not an http(s) URL"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

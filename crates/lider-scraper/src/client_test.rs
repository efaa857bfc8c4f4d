use super::*;
use lider_core::DEFAULT_USER_AGENTS;

fn client() -> UpstreamClient {
    UpstreamClient::new(&ScraperConfig::default()).expect("client")
}

fn url(s: &str) -> Url {
    Url::parse(s).expect("url")
}

#[test]
fn baseline_headers_look_like_a_browser() {
    let headers = client().headers_for(&url("https://www.lider.cl/supermercado"), &HeaderMap::new());
    assert_eq!(headers[header::ACCEPT], ACCEPT_HTML);
    assert_eq!(headers[header::ACCEPT_LANGUAGE], "es-CL,es;q=0.9,en;q=0.8");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers["sec-fetch-mode"], "navigate");
    assert_eq!(headers[header::UPGRADE_INSECURE_REQUESTS], "1");
    assert!(!headers.contains_key(header::ACCEPT_ENCODING));
}

#[test]
fn referer_is_set_only_for_upstream_hosts() {
    let client = client();
    let upstream = client.headers_for(&url("https://apps.lider.cl/supermercado/search"), &HeaderMap::new());
    assert_eq!(upstream[header::REFERER], "https://www.lider.cl/");

    let bare = client.headers_for(&url("https://lider.cl/"), &HeaderMap::new());
    assert!(bare.contains_key(header::REFERER));

    let foreign = client.headers_for(&url("https://notlider.cl/"), &HeaderMap::new());
    assert!(!foreign.contains_key(header::REFERER));
}

#[test]
fn caller_headers_replace_baseline_entries() {
    let request = UpstreamRequest::get("https://apps.lider.cl/x").accept_json();
    let headers = client().headers_for(&url(&request.url), &request.headers);
    assert_eq!(headers[header::ACCEPT], ACCEPT_JSON);
    assert_eq!(headers.get_all(header::ACCEPT).iter().count(), 1);
}

#[test]
fn identities_rotate_per_request() {
    let client = client();
    let target = url("https://www.lider.cl/");
    let seen: Vec<_> = (0..DEFAULT_USER_AGENTS.len() + 1)
        .map(|_| client.headers_for(&target, &HeaderMap::new())[header::USER_AGENT].clone())
        .collect();
    assert_eq!(seen[0], DEFAULT_USER_AGENTS[0]);
    assert_eq!(seen[1], DEFAULT_USER_AGENTS[1]);
    assert_eq!(seen[DEFAULT_USER_AGENTS.len()], seen[0]);
}

#[test]
fn empty_identity_list_is_a_config_error() {
    let config = ScraperConfig {
        user_agents: Vec::new(),
        ..ScraperConfig::default()
    };
    assert!(matches!(
        UpstreamClient::new(&config),
        Err(ScraperError::Config(_))
    ));
}

#[tokio::test]
async fn malformed_url_fails_before_any_request() {
    let err = client()
        .fetch(&UpstreamRequest::get("not a url"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, ScraperError::InvalidUrl { .. }));
}

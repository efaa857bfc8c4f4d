use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::api::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Shared-secret auth settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    api_key: Option<Arc<str>>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("enabled", &self.enabled())
            .finish()
    }
}

impl AuthState {
    /// Builds auth from the configured `API_KEY`.
    ///
    /// In development a missing key disables auth for local iteration.
    /// Elsewhere a missing key fails startup.
    pub fn new(api_key: Option<String>, is_development: bool) -> anyhow::Result<Self> {
        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => Ok(Self {
                api_key: Some(Arc::from(key)),
            }),
            None if is_development => {
                tracing::warn!("API_KEY not set; API key auth disabled in development environment");
                Ok(Self { api_key: None })
            }
            None => anyhow::bail!("API_KEY is required outside development"),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn allows(&self, presented: &str) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|expected| bool::from(expected.as_bytes().ct_eq(presented.as_bytes())))
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    res
}

/// Middleware enforcing the `X-API-Key` header when auth is enabled.
///
/// A missing header is `401` with a hint; a wrong key is `403`.
pub async fn require_api_key(State(auth): State<AuthState>, req: Request, next: Next) -> Response {
    if !auth.enabled() {
        return next.run(req).await;
    }

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let path = req.uri().path().to_owned();
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    match presented.as_deref() {
        None => {
            tracing::warn!(%path, %request_id, "request without API key");
            ApiError::new(
                request_id,
                "unauthorized",
                "missing API key; send it in the X-API-Key header",
            )
            .into_response()
        }
        Some(key) if !auth.allows(key) => {
            tracing::warn!(%path, %request_id, "request with invalid API key");
            ApiError::new(request_id, "forbidden", "invalid API key").into_response()
        }
        Some(_) => {
            tracing::debug!(%path, %request_id, "API key accepted");
            next.run(req).await
        }
    }
}

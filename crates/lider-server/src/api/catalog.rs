use axum::{
    extract::{Query, State},
    Extension, Json,
};
use lider_core::{ProductDetail, ProductSummary};
use lider_scraper::{Provenance, Sourced};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_scraper_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Echo of the caller's input plus the results and the tier that served them.
#[derive(Debug, Serialize)]
pub(super) struct CatalogPayload<T: Serialize> {
    input: String,
    count: usize,
    source: Provenance,
    results: T,
}

impl<T: Serialize> CatalogPayload<Vec<T>> {
    fn list(input: &str, sourced: Sourced<Vec<T>>) -> Self {
        Self {
            input: input.to_owned(),
            count: sourced.data.len(),
            source: sourced.source,
            results: sourced.data,
        }
    }
}

impl CatalogPayload<ProductDetail> {
    fn single(input: &str, sourced: Sourced<ProductDetail>) -> Self {
        Self {
            input: input.to_owned(),
            count: 1,
            source: sourced.source,
            results: sourced.data,
        }
    }
}

type CatalogResult<T> = Result<Json<ApiResponse<CatalogPayload<T>>>, ApiError>;

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SuggestionsQuery {
    pub term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PromotionsQuery {
    #[serde(rename = "type")]
    pub promo_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub sku: Option<String>,
}

/// Rejects an absent or empty query parameter before touching the catalog.
fn required<'a>(req_id: &RequestId, name: &str, value: Option<&'a str>) -> Result<&'a str, ApiError> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            format!("{name} parameter is required"),
        )
    })
}

fn respond<T: Serialize>(req_id: RequestId, data: CatalogPayload<T>) -> CatalogResult<T> {
    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn search_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> CatalogResult<Vec<ProductSummary>> {
    let input = required(&req_id, "q", query.q.as_deref())?;
    let result = state
        .catalog
        .search(input)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;
    respond(req_id, CatalogPayload::list(input, result))
}

pub(super) async fn suggestions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SuggestionsQuery>,
) -> CatalogResult<Vec<String>> {
    let input = required(&req_id, "term", query.term.as_deref())?;
    let result = state
        .catalog
        .suggestions(input)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;
    respond(req_id, CatalogPayload::list(input, result))
}

pub(super) async fn promotions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PromotionsQuery>,
) -> CatalogResult<Vec<ProductSummary>> {
    let input = required(&req_id, "type", query.promo_type.as_deref())?;
    let result = state
        .catalog
        .promotions(input)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;
    respond(req_id, CatalogPayload::list(input, result))
}

pub(super) async fn category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CategoryQuery>,
) -> CatalogResult<Vec<ProductSummary>> {
    let input = required(&req_id, "id", query.id.as_deref())?;
    let result = state
        .catalog
        .category(input)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;
    respond(req_id, CatalogPayload::list(input, result))
}

pub(super) async fn product_detail(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> CatalogResult<ProductDetail> {
    let input = required(&req_id, "sku", query.sku.as_deref())?;
    let result = state
        .catalog
        .product_detail(input)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;
    respond(req_id, CatalogPayload::single(input, result))
}

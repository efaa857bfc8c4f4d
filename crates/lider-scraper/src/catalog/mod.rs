//! Fetch orchestration: structured API tiers first, page scraping second.
//!
//! Each public operation validates its input, builds an ordered list of
//! named tiers, and hands it to the first-success driver in
//! [`crate::outcome`]. Whatever tier wins is already normalized into the
//! canonical model and tagged with its provenance.

mod detail;
mod endpoints;
mod listings;
mod search;
mod suggestions;

use lider_core::ProductSummary;

use crate::client::{UpstreamClient, UpstreamRequest};
use crate::config::ScraperConfig;
use crate::decode::{decode_listing, Listing};
use crate::error::ScraperError;
use crate::extract::extract_summaries;

pub use suggestions::fallback_suggestions;

use endpoints::Endpoints;

/// The service object behind every inbound operation.
///
/// Owns the single shared [`UpstreamClient`] (and therefore the one
/// process-wide pacer). Construct once at startup and share behind an `Arc`.
pub struct Catalog {
    client: UpstreamClient,
    endpoints: Endpoints,
    search_max_pages: u32,
}

impl Catalog {
    /// # Errors
    ///
    /// Returns [`ScraperError::Config`] or [`ScraperError::Http`] if the
    /// upstream client cannot be built from `config`.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            client: UpstreamClient::new(config)?,
            endpoints: Endpoints::new(&config.api_base, &config.web_base),
            search_max_pages: config.search_max_pages.max(1),
        })
    }

    /// Fetches one JSON listing page.
    async fn fetch_listing(&self, url: String, context: &str) -> Result<Listing, ScraperError> {
        let response = self
            .client
            .fetch(&UpstreamRequest::get(url).accept_json())
            .await?;
        decode_listing(&response.body, context)
    }

    /// Fetches a storefront page and extracts its product cards.
    async fn scrape_listing(
        &self,
        url: String,
        context: &str,
    ) -> Result<Vec<ProductSummary>, ScraperError> {
        let response = self.client.fetch(&UpstreamRequest::get(url)).await?;
        extract_summaries(&response.body, context)
    }
}

/// Rejects blank operation inputs before any network activity.
fn require<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ScraperError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScraperError::EmptyParameter { name });
    }
    Ok(trimmed)
}

/// An empty structured listing means the API did not serve this request.
fn non_empty(
    products: Vec<ProductSummary>,
    context: &str,
) -> Result<Vec<ProductSummary>, ScraperError> {
    if products.is_empty() {
        return Err(ScraperError::Extraction {
            context: context.to_owned(),
            reason: "no products returned".to_owned(),
        });
    }
    Ok(products)
}

use futures::FutureExt;
use lider_core::ProductDetail;

use super::{require, Catalog};
use crate::client::UpstreamRequest;
use crate::decode::decode_detail;
use crate::error::ScraperError;
use crate::extract::extract_detail;
use crate::outcome::{first_success, Provenance, Sourced, Strategy};

impl Catalog {
    /// Full product data for `sku`.
    ///
    /// Structured endpoints are tried in a fixed order before the product
    /// page is scraped. The returned `url` is always the storefront page for
    /// the product's SKU.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::EmptyParameter`] for a blank SKU.
    /// - [`ScraperError::TiersExhausted`] when both tiers fail.
    pub async fn product_detail(&self, sku: &str) -> Result<Sourced<ProductDetail>, ScraperError> {
        let sku = require("sku", sku)?;
        let mut result = first_success(
            "product detail",
            sku,
            vec![
                Strategy::new("api", Provenance::Api, self.detail_api(sku).boxed()),
                Strategy::new(
                    "scraping",
                    Provenance::Scraping,
                    self.detail_scrape(sku).boxed(),
                ),
            ],
        )
        .await?;

        let detail = &mut result.data;
        if detail.sku.is_empty() {
            sku.clone_into(&mut detail.sku);
        }
        detail.url = self.endpoints.detail_page(&detail.sku)?;
        Ok(result)
    }

    async fn detail_api(&self, sku: &str) -> Result<ProductDetail, ScraperError> {
        let mut reasons = Vec::new();
        for url in self.endpoints.detail_api_candidates(sku)? {
            let outcome = async {
                let response = self
                    .client
                    .fetch(&UpstreamRequest::get(url.as_str()).accept_json())
                    .await?;
                decode_detail(&response.body, "detail api")
            }
            .await;

            match outcome {
                Ok(detail) => return Ok(detail),
                Err(err) => {
                    tracing::debug!(%url, error = %err, "detail candidate failed");
                    reasons.push(err.to_string());
                }
            }
        }

        Err(ScraperError::Extraction {
            context: "detail api".to_owned(),
            reason: reasons.join("; "),
        })
    }

    async fn detail_scrape(&self, sku: &str) -> Result<ProductDetail, ScraperError> {
        let response = self
            .client
            .fetch(&UpstreamRequest::get(self.endpoints.detail_page(sku)?))
            .await?;
        extract_detail(&response.body, "detail page")
    }
}

use futures::FutureExt;
use lider_core::ProductSummary;

use super::{non_empty, require, Catalog};
use crate::error::ScraperError;
use crate::outcome::{first_success, Provenance, Sourced, Strategy};

impl Catalog {
    /// Searches the catalog for `term`.
    ///
    /// The API tier reads page 1, then every further page the envelope
    /// reports (clamped to the configured maximum) in sequence. A page that
    /// fails is logged and skipped; the rest are concatenated in page order.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::EmptyParameter`] for a blank term.
    /// - [`ScraperError::TiersExhausted`] when both tiers fail.
    pub async fn search(&self, term: &str) -> Result<Sourced<Vec<ProductSummary>>, ScraperError> {
        let term = require("query", term)?;
        first_success(
            "search",
            term,
            vec![
                Strategy::new("api", Provenance::Api, self.search_api(term).boxed()),
                Strategy::new(
                    "scraping",
                    Provenance::Scraping,
                    self.search_scrape(term).boxed(),
                ),
            ],
        )
        .await
    }

    async fn search_api(&self, term: &str) -> Result<Vec<ProductSummary>, ScraperError> {
        let first = self
            .fetch_listing(self.endpoints.search_api(term, 1)?, "search api")
            .await?;
        let reported = first.total_pages.unwrap_or(1);
        let total_pages = reported.clamp(1, self.search_max_pages);
        if reported > total_pages {
            tracing::warn!(
                term,
                reported,
                limit = self.search_max_pages,
                "search page count clamped"
            );
        }

        let mut products = first.products;
        for page in 2..=total_pages {
            let listing = match self.endpoints.search_api(term, page) {
                Ok(url) => self.fetch_listing(url, "search api").await,
                Err(err) => Err(err),
            };
            match listing {
                Ok(listing) => products.extend(listing.products),
                Err(err) => {
                    tracing::warn!(term, page, error = %err, "skipping failed search page");
                }
            }
        }

        non_empty(products, "search api")
    }

    async fn search_scrape(&self, term: &str) -> Result<Vec<ProductSummary>, ScraperError> {
        self.scrape_listing(self.endpoints.search_page(term)?, "search page")
            .await
    }
}

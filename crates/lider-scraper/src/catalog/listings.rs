use futures::FutureExt;
use lider_core::ProductSummary;

use super::{non_empty, require, Catalog};
use crate::error::ScraperError;
use crate::outcome::{first_success, Provenance, Sourced, Strategy};

impl Catalog {
    /// Products currently on promotion under `promo_type`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::EmptyParameter`] for a blank type.
    /// - [`ScraperError::TiersExhausted`] when both tiers fail.
    pub async fn promotions(
        &self,
        promo_type: &str,
    ) -> Result<Sourced<Vec<ProductSummary>>, ScraperError> {
        let promo_type = require("type", promo_type)?;
        let api = async {
            let listing = self
                .fetch_listing(self.endpoints.promotions_api(promo_type)?, "promotions api")
                .await?;
            non_empty(listing.products, "promotions api")
        };
        let scraping = async {
            self.scrape_listing(self.endpoints.promotions_page(promo_type)?, "promotions page")
                .await
        };

        first_success(
            "promotions",
            promo_type,
            vec![
                Strategy::new("api", Provenance::Api, api.boxed()),
                Strategy::new("scraping", Provenance::Scraping, scraping.boxed()),
            ],
        )
        .await
    }

    /// Products listed under `category_id`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::EmptyParameter`] for a blank id.
    /// - [`ScraperError::TiersExhausted`] when both tiers fail.
    pub async fn category(
        &self,
        category_id: &str,
    ) -> Result<Sourced<Vec<ProductSummary>>, ScraperError> {
        let category_id = require("id", category_id)?;
        let api = async {
            let listing = self
                .fetch_listing(self.endpoints.category_api(category_id)?, "category api")
                .await?;
            non_empty(listing.products, "category api")
        };
        let scraping = async {
            self.scrape_listing(self.endpoints.category_page(category_id)?, "category page")
                .await
        };

        first_success(
            "category",
            category_id,
            vec![
                Strategy::new("api", Provenance::Api, api.boxed()),
                Strategy::new("scraping", Provenance::Scraping, scraping.boxed()),
            ],
        )
        .await
    }
}

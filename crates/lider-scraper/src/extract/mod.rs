//! Two-tier extraction of product records from storefront HTML.
//!
//! Embedded initial state is tried first; marker patterns are the fallback
//! when the state is missing, does not parse, or yields nothing usable.

mod patterns;
mod state;

use lider_core::{ProductDetail, ProductSummary};
use serde_json::Value;

use crate::error::ScraperError;
use crate::normalize::{detail_from_value, normalize_summaries};

/// Product cards from a listing page.
///
/// # Errors
///
/// [`ScraperError::Extraction`] when neither tier yields a product.
pub fn extract_summaries(html: &str, context: &str) -> Result<Vec<ProductSummary>, ScraperError> {
    if let Some(Value::Array(records)) =
        state::initial_state(html).and_then(|mut s| state::take_at(&mut s, "/search/results"))
    {
        let products = normalize_summaries(records);
        if !products.is_empty() {
            tracing::debug!(context, count = products.len(), tier = "state", "extracted listing");
            return Ok(products);
        }
    }

    let products = patterns::summaries(html);
    if products.is_empty() {
        return Err(ScraperError::Extraction {
            context: context.to_owned(),
            reason: "no products found in page".to_owned(),
        });
    }
    tracing::debug!(context, count = products.len(), tier = "patterns", "extracted listing");
    Ok(products)
}

/// The product on a detail page. `url` is left empty for the caller.
///
/// # Errors
///
/// [`ScraperError::Extraction`] when neither tier yields a usable product.
pub fn extract_detail(html: &str, context: &str) -> Result<ProductDetail, ScraperError> {
    if let Some(detail) = state::initial_state(html)
        .and_then(|mut s| state::take_at(&mut s, "/product"))
        .and_then(detail_from_value)
    {
        return Ok(detail);
    }

    patterns::detail(html).ok_or_else(|| ScraperError::Extraction {
        context: context.to_owned(),
        reason: "no product details found in page".to_owned(),
    })
}

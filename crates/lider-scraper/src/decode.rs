//! Decoding of structured (JSON API) upstream responses.

use lider_core::{ProductDetail, ProductSummary};
use serde_json::Value;

use crate::error::ScraperError;
use crate::normalize::{detail_from_value, normalize_summaries};
use crate::types::lenient;

/// One page of a product listing.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub products: Vec<ProductSummary>,
    /// Page count reported by the envelope (`nbPages`), when present.
    pub total_pages: Option<u32>,
}

fn parse_json(body: &str, context: &str) -> Result<Value, ScraperError> {
    serde_json::from_str(body).map_err(|source| ScraperError::Deserialize {
        context: context.to_owned(),
        source,
    })
}

fn unrecognized(context: &str, reason: &str) -> ScraperError {
    ScraperError::Extraction {
        context: context.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Accepts a bare array of records or an envelope with a `products` array.
///
/// # Errors
///
/// - [`ScraperError::Deserialize`] if `body` is not JSON.
/// - [`ScraperError::Extraction`] if neither shape is present.
pub fn decode_listing(body: &str, context: &str) -> Result<Listing, ScraperError> {
    match parse_json(body, context)? {
        Value::Array(records) => Ok(Listing {
            products: normalize_summaries(records),
            total_pages: None,
        }),
        Value::Object(mut envelope) => {
            let Some(Value::Array(records)) = envelope.remove("products") else {
                return Err(unrecognized(context, "response has no products array"));
            };
            let total_pages = envelope
                .get("nbPages")
                .and_then(lenient::number_from)
                .filter(|pages| pages.is_finite() && *pages >= 0.0)
                .map(page_count);
            Ok(Listing {
                products: normalize_summaries(records),
                total_pages,
            })
        }
        _ => Err(unrecognized(context, "response is neither a list nor an envelope")),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn page_count(pages: f64) -> u32 {
    pages.min(f64::from(u32::MAX)) as u32
}

/// # Errors
///
/// - [`ScraperError::Deserialize`] if `body` is not JSON.
/// - [`ScraperError::Extraction`] if no record with a SKU or name is found.
pub fn decode_detail(body: &str, context: &str) -> Result<ProductDetail, ScraperError> {
    detail_from_value(parse_json(body, context)?)
        .ok_or_else(|| unrecognized(context, "response has no product with a SKU or name"))
}

/// Accepts a bare array or a `{"suggestions": [...]}` envelope. Entries are
/// strings, or objects carrying `term`/`name`/`text`.
///
/// # Errors
///
/// - [`ScraperError::Deserialize`] if `body` is not JSON.
/// - [`ScraperError::Extraction`] if neither shape is present.
pub fn decode_suggestions(body: &str, context: &str) -> Result<Vec<String>, ScraperError> {
    let entries = match parse_json(body, context)? {
        Value::Array(entries) => entries,
        Value::Object(mut envelope) => match envelope.remove("suggestions") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(unrecognized(context, "response has no suggestions array")),
        },
        _ => return Err(unrecognized(context, "response is neither a list nor an envelope")),
    };

    let mut suggestions: Vec<String> = Vec::new();
    for entry in &entries {
        let text = match entry {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => ["term", "name", "text"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str)),
            _ => None,
        };
        if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
            if !suggestions.iter().any(|s| s == text) {
                suggestions.push(text.to_owned());
            }
        }
    }
    Ok(suggestions)
}

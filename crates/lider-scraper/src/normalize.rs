//! Normalization from tolerant raw records to the canonical product model.
//!
//! Alias resolution lives here: when the upstream sends a field under more
//! than one spelling, the first non-empty spelling wins.

use lider_core::{DetailPrice, PriceInfo, ProductDetail, ProductImages, ProductSummary};
use serde_json::Value;

use crate::types::{RawDetail, RawSummary};

const DEFAULT_CURRENCY: &str = "CLP";

/// Converts one raw listing entry, or `None` when it has neither an
/// identifier nor a display name.
#[must_use]
pub fn normalize_summary(raw: RawSummary) -> Option<ProductSummary> {
    let summary = ProductSummary {
        id: raw.id.or(raw.id_upper).unwrap_or_default(),
        brand: raw.brand.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        display_name: raw.display_name.or(raw.name).unwrap_or_default(),
        price: PriceInfo {
            base_price_reference: raw
                .price
                .base_price_reference
                .or(raw.price.original)
                .unwrap_or_default(),
            base_price_sales: raw
                .price
                .base_price_sales
                .or(raw.price.current)
                .unwrap_or_default(),
        },
        images: summary_images(&raw.images),
    };
    summary.is_valid().then_some(summary)
}

/// Decodes and normalizes a list of loosely-typed records.
///
/// Records that are not objects, or that normalize to nothing usable, are
/// dropped without failing the batch.
#[must_use]
pub fn normalize_summaries(records: Vec<Value>) -> Vec<ProductSummary> {
    let total = records.len();
    let products: Vec<ProductSummary> = records
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|record| serde_json::from_value::<RawSummary>(record).ok())
        .filter_map(normalize_summary)
        .collect();

    if products.len() < total {
        tracing::debug!(
            dropped = total - products.len(),
            kept = products.len(),
            "dropped malformed listing records"
        );
    }
    products
}

/// Converts one raw product record. `url` is left empty for the caller.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn normalize_detail(raw: RawDetail) -> ProductDetail {
    let current = raw
        .price
        .current
        .or(raw.price.base_price_sales)
        .unwrap_or_default();
    let original = raw
        .price
        .original
        .or(raw.price.base_price_reference)
        .unwrap_or_default();
    let currency = raw
        .price
        .currency
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());

    ProductDetail {
        sku: raw.sku.or(raw.sku_upper).unwrap_or_default(),
        name: raw.name.or(raw.display_name).unwrap_or_default(),
        brand: raw.brand.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        price: DetailPrice::new(current, original, currency),
        images: detail_images(&raw.images),
        availability: raw.availability.or(raw.available).unwrap_or(true),
        stock: raw.stock.map_or(0, |s| s.max(0.0) as i64),
        rating: raw.rating.unwrap_or_default(),
        category: raw.category.unwrap_or_default(),
        url: String::new(),
    }
}

/// Decodes a detail payload, unwrapping a `{"product": {...}}` envelope.
///
/// Returns `None` unless the record is an object carrying a SKU or a name.
#[must_use]
pub fn detail_from_value(value: Value) -> Option<ProductDetail> {
    let record = match value {
        Value::Object(mut map) if map.get("product").is_some_and(Value::is_object) => {
            map.remove("product").unwrap_or_default()
        }
        Value::Object(map) => Value::Object(map),
        _ => return None,
    };
    let detail = normalize_detail(serde_json::from_value::<RawDetail>(record).ok()?);
    (!detail.sku.is_empty() || !detail.name.is_empty()).then_some(detail)
}

fn summary_images(images: &Value) -> ProductImages {
    match images {
        Value::Object(map) => ProductImages {
            default_image: string_at(map.get("defaultImage")),
            medium_image: string_at(map.get("mediumImage")),
        },
        Value::Array(list) => {
            let mut urls = list.iter().filter_map(image_url);
            ProductImages {
                default_image: urls.next().unwrap_or_default(),
                medium_image: urls.next().unwrap_or_default(),
            }
        }
        _ => ProductImages::default(),
    }
}

fn detail_images(images: &Value) -> Vec<String> {
    match images {
        Value::Array(list) => list.iter().filter_map(image_url).collect(),
        Value::Object(map) => {
            let mut urls: Vec<String> = ["defaultImage", "mediumImage"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(image_url))
                .collect();
            for (key, value) in map {
                if key == "defaultImage" || key == "mediumImage" {
                    continue;
                }
                if let Some(url) = image_url(value) {
                    if !urls.contains(&url) {
                        urls.push(url);
                    }
                }
            }
            urls
        }
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_owned()],
        _ => Vec::new(),
    }
}

/// A bare URL string, or an object carrying one under `url`/`src`.
fn image_url(value: &Value) -> Option<String> {
    let url = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("url")
            .or_else(|| map.get("src"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_owned())
}

fn string_at(value: Option<&Value>) -> String {
    value.and_then(image_url).unwrap_or_default()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

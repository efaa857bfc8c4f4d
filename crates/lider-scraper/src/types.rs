//! Schema-tolerant intermediate types for upstream product payloads.
//!
//! The upstream has served the same records under several spellings
//! (`id`/`ID`, `displayName`/`name`, price as an object or a bare number,
//! images as a map or a list). Every field here is independently optional
//! and every field decoder accepts any JSON value without failing, so a
//! single odd field never sinks a whole record. Choosing between aliases
//! happens in [`crate::normalize`].

use serde::Deserialize;
use serde_json::Value;

/// A listing entry from search, promotions, category, or embedded state.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSummary {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(rename = "ID", deserialize_with = "lenient::opt_string")]
    pub id_upper: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub brand: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(rename = "displayName", deserialize_with = "lenient::opt_string")]
    pub display_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::price")]
    pub price: RawPrice,
    /// `{defaultImage, mediumImage}` or a list of URLs.
    pub images: Value,
}

/// Price fields under both the listing and the detail spellings.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawPrice {
    #[serde(rename = "BasePriceReference", deserialize_with = "lenient::opt_price")]
    pub base_price_reference: Option<f64>,
    #[serde(rename = "BasePriceSales", deserialize_with = "lenient::opt_price")]
    pub base_price_sales: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_price")]
    pub original: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_price")]
    pub current: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub currency: Option<String>,
}

/// A product page record from a detail endpoint or embedded state.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDetail {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub sku: Option<String>,
    #[serde(rename = "SKU", deserialize_with = "lenient::opt_string")]
    pub sku_upper: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(rename = "displayName", deserialize_with = "lenient::opt_string")]
    pub display_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub brand: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::price")]
    pub price: RawPrice,
    /// A list of URLs, or a map of named image URLs.
    pub images: Value,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub availability: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub available: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub stock: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
}

/// Field decoders that read any JSON value and never return an error.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::RawPrice;

    /// Non-empty strings and numbers become `Some`; everything else `None`.
    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Numbers, and strings holding a plain number.
    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(number_from(&Value::deserialize(d)?))
    }

    /// Numbers, and storefront-formatted price strings (`"$1.990"`, `"1.234,56"`).
    pub fn opt_price<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(price_from(&Value::deserialize(d)?))
    }

    pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            Value::Number(n) => n.as_f64().map(|v| v.abs() > f64::EPSILON),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "instock" | "in_stock" => Some(true),
                "false" | "no" | "0" | "outofstock" | "out_of_stock" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    /// An object of price fields, or a bare number taken as the current price.
    pub fn price<'de, D: Deserializer<'de>>(d: D) -> Result<RawPrice, D::Error> {
        let value = Value::deserialize(d)?;
        if value.is_object() {
            return Ok(RawPrice::deserialize(value).unwrap_or_default());
        }
        Ok(price_from(&value).map_or_else(RawPrice::default, |amount| RawPrice {
            current: Some(amount),
            base_price_sales: Some(amount),
            ..RawPrice::default()
        }))
    }

    pub(crate) fn number_from(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    fn price_from(value: &Value) -> Option<f64> {
        match value {
            Value::String(s) => crate::price::parse_locale_price(s),
            other => number_from(other),
        }
    }
}

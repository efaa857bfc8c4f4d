use serde::{Deserialize, Serialize};

/// A catalog entry as returned by search, promotion, and category listings.
///
/// Field names on the wire follow the upstream retailer's listing shape so
/// existing consumers of the proxy keep working.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Upstream product identifier. May be empty when only a name was found.
    #[serde(rename = "ID")]
    pub id: String,
    pub brand: String,
    pub description: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub price: PriceInfo,
    pub images: ProductImages,
}

impl ProductSummary {
    /// A summary is usable when it carries an identifier or a display name.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() || !self.display_name.is_empty()
    }
}

/// Reference (list) and sale price in the upstream's currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    #[serde(rename = "BasePriceReference")]
    pub base_price_reference: f64,
    #[serde(rename = "BasePriceSales")]
    pub base_price_sales: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductImages {
    #[serde(rename = "defaultImage")]
    pub default_image: String,
    #[serde(rename = "mediumImage")]
    pub medium_image: String,
}

/// Full product page data keyed by SKU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price: DetailPrice,
    pub images: Vec<String>,
    pub availability: bool,
    pub stock: i64,
    pub rating: f64,
    pub category: String,
    /// Canonical storefront URL for this SKU.
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailPrice {
    pub current: f64,
    pub original: f64,
    /// Percentage off `original`; always derived, never read from upstream.
    pub discount: f64,
    /// ISO 4217 currency code (e.g., `"CLP"`).
    pub currency: String,
}

impl DetailPrice {
    /// Builds a price and derives `discount` from `current` and `original`.
    #[must_use]
    pub fn new(current: f64, original: f64, currency: impl Into<String>) -> Self {
        Self {
            current,
            original,
            discount: discount_percent(current, original),
            currency: currency.into(),
        }
    }
}

/// `(original - current) / original * 100` when both prices are positive,
/// otherwise `0.0`.
#[must_use]
pub fn discount_percent(current: f64, original: f64) -> f64 {
    if current > 0.0 && original > 0.0 {
        (original - current) / original * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_is_derived_from_original_and_current() {
        let price = DetailPrice::new(1500.0, 2000.0, "CLP");
        assert!((price.discount - 25.0).abs() < 1e-9);
    }

    #[test]
    fn discount_is_zero_when_original_is_zero() {
        let price = DetailPrice::new(1500.0, 0.0, "CLP");
        assert!(price.discount.abs() < f64::EPSILON);
        assert!(discount_percent(0.0, 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_validity_requires_id_or_name() {
        let mut summary = ProductSummary::default();
        assert!(!summary.is_valid());
        summary.display_name = "Leche Entera 1L".to_owned();
        assert!(summary.is_valid());
        summary.display_name.clear();
        summary.id = "123".to_owned();
        assert!(summary.is_valid());
    }

    #[test]
    fn summary_serializes_with_upstream_field_names() {
        let summary = ProductSummary {
            id: "42".to_owned(),
            display_name: "Leche".to_owned(),
            price: PriceInfo {
                base_price_reference: 1200.0,
                base_price_sales: 990.0,
            },
            ..ProductSummary::default()
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["ID"], "42");
        assert_eq!(json["displayName"], "Leche");
        assert_eq!(json["price"]["BasePriceSales"], 990.0);
        assert_eq!(json["images"]["defaultImage"], "");
    }
}

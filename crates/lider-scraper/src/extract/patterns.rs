//! Marker-based extraction from rendered storefront HTML.
//!
//! Used when a page carries no usable embedded state. Only records with the
//! required fields are kept; partial ones are discarded.

use std::sync::LazyLock;

use lider_core::{DetailPrice, PriceInfo, ProductDetail, ProductSummary};
use regex::Regex;

use crate::price::parse_locale_price;

const PRODUCT_ITEM_MARKER: &str = r#"data-testid="product-item""#;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid extraction regex")
}

static PRODUCT_ID: LazyLock<Regex> = LazyLock::new(|| regex(r#"data-product-id="([^"]+)""#));
static PRODUCT_TITLE: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"data-testid="product-title"[^>]*>\s*([^<]+)"#));
static PRODUCT_PRICE: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?s)data-testid="product-price"[^>]*>.*?\$\s*([0-9.,]+)"#));
static DETAIL_SKU: LazyLock<Regex> = LazyLock::new(|| regex(r#""sku"\s*:\s*"([^"]+)""#));
static DETAIL_HEADING: LazyLock<Regex> = LazyLock::new(|| regex(r"<h1[^>]*>\s*([^<]+?)\s*</h1>"));
static DETAIL_PRICE: LazyLock<Regex> = LazyLock::new(|| regex(r#""price"\s*:\s*"?([0-9.,]+)"#));

/// Product cards on a listing page, one per `product-item` marker.
pub(crate) fn summaries(html: &str) -> Vec<ProductSummary> {
    product_blocks(html)
        .filter_map(|block| {
            let id = capture(&PRODUCT_ID, block)?;
            let display_name = capture(&PRODUCT_TITLE, block)?;
            let price = capture(&PRODUCT_PRICE, block)
                .and_then(|text| parse_locale_price(&text))
                .unwrap_or_default();
            Some(ProductSummary {
                id,
                display_name,
                price: PriceInfo {
                    base_price_reference: price,
                    base_price_sales: price,
                },
                ..ProductSummary::default()
            })
        })
        .collect()
}

/// A product page's SKU or heading plus a positive price.
pub(crate) fn detail(html: &str) -> Option<ProductDetail> {
    let sku = capture(&DETAIL_SKU, html).unwrap_or_default();
    let name = capture(&DETAIL_HEADING, html).unwrap_or_default();
    if sku.is_empty() && name.is_empty() {
        return None;
    }

    let price = capture(&DETAIL_PRICE, html)
        .or_else(|| capture(&PRODUCT_PRICE, html))
        .and_then(|text| parse_locale_price(&text))
        .filter(|price| *price > 0.0)?;

    Some(ProductDetail {
        sku,
        name,
        price: DetailPrice::new(price, price, "CLP"),
        availability: true,
        ..ProductDetail::default()
    })
}

/// Splits `html` into slices that each start at a product card's opening tag
/// and run until the next card.
fn product_blocks(html: &str) -> impl Iterator<Item = &str> {
    let starts: Vec<usize> = html
        .match_indices(PRODUCT_ITEM_MARKER)
        .map(|(at, _)| html[..at].rfind('<').unwrap_or(at))
        .collect();
    let ends: Vec<usize> = starts
        .iter()
        .skip(1)
        .copied()
        .chain(std::iter::once(html.len()))
        .collect();
    starts
        .into_iter()
        .zip(ends)
        .map(move |(start, end)| &html[start..end])
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    let raw = pattern.captures(text)?.get(1)?.as_str();
    let cleaned = decode_entities(raw);
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_owned())
}

/// Decodes the handful of HTML entities the storefront emits in text nodes.
pub(crate) fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <div class="grid">
          <div data-testid="product-item" data-product-id="1001">
            <span data-testid="product-title">Leche Entera Colun 1L</span>
            <div data-testid="product-price"><span class="sr">Precio</span> $1.090</div>
          </div>
          <div data-product-id="1002" data-testid="product-item">
            <span data-testid="product-title"> Leche Descremada &amp; Light </span>
            <div data-testid="product-price">$ 990</div>
          </div>
          <div data-testid="product-item">
            <span data-testid="product-title">Sin identificador</span>
          </div>
        </div>"#;

    #[test]
    fn cards_with_id_and_title_are_extracted() {
        let products = summaries(LISTING);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "1001");
        assert_eq!(products[0].display_name, "Leche Entera Colun 1L");
        assert!((products[0].price.base_price_sales - 1090.0).abs() < f64::EPSILON);
        assert_eq!(products[1].id, "1002");
        assert_eq!(products[1].display_name, "Leche Descremada & Light");
        assert!((products[1].price.base_price_reference - 990.0).abs() < f64::EPSILON);
    }

    #[test]
    fn card_without_title_is_dropped() {
        let html = r#"<div data-testid="product-item" data-product-id="1"><img></div>"#;
        assert!(summaries(html).is_empty());
    }

    #[test]
    fn detail_reads_sku_heading_and_price() {
        let html = r#"<h1 class="title"> Queso Gauda 250g </h1>
            <script>{"sku":"55501","price": "4.590"}</script>"#;
        let detail = detail(html).unwrap();
        assert_eq!(detail.sku, "55501");
        assert_eq!(detail.name, "Queso Gauda 250g");
        assert!((detail.price.current - 4590.0).abs() < f64::EPSILON);
        assert_eq!(detail.price.currency, "CLP");
        assert!(detail.availability);
    }

    #[test]
    fn detail_falls_back_to_the_price_span() {
        let html = r#"<h1>Pan Hallulla</h1><span data-testid="product-price">$1.290</span>"#;
        let detail = detail(html).unwrap();
        assert!((detail.price.current - 1290.0).abs() < f64::EPSILON);
    }

    #[test]
    fn detail_without_price_is_rejected() {
        assert!(detail("<h1>Pan Hallulla</h1>").is_none());
        assert!(detail(r#"{"price": 990}"#).is_none());
    }

    #[test]
    fn entities_are_decoded_once() {
        assert_eq!(decode_entities("A&amp;B &quot;x&quot; &#39;y&#39;"), "A&B \"x\" 'y'");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }
}

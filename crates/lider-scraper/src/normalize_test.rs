use super::*;
use serde_json::json;

// -----------------------------------------------------------------------
// normalize_summary / normalize_summaries
// -----------------------------------------------------------------------

fn raw_summary(value: Value) -> RawSummary {
    serde_json::from_value(value).unwrap()
}

#[test]
fn summary_reads_the_listing_spelling() {
    let summary = normalize_summary(raw_summary(json!({
        "ID": "1001",
        "brand": "Colun",
        "displayName": "Leche Entera 1L",
        "price": {"BasePriceReference": 1290, "BasePriceSales": 990},
        "images": {"defaultImage": "https://img/1.jpg", "mediumImage": "https://img/1m.jpg"}
    })))
    .unwrap();

    assert_eq!(summary.id, "1001");
    assert_eq!(summary.display_name, "Leche Entera 1L");
    assert!((summary.price.base_price_reference - 1290.0).abs() < f64::EPSILON);
    assert!((summary.price.base_price_sales - 990.0).abs() < f64::EPSILON);
    assert_eq!(summary.images.medium_image, "https://img/1m.jpg");
}

#[test]
fn summary_falls_back_to_alternate_spellings() {
    let summary = normalize_summary(raw_summary(json!({
        "id": "7",
        "name": "Pan Molde",
        "price": {"original": 2000, "current": 1500},
        "images": ["https://img/a.jpg", "https://img/b.jpg", "https://img/c.jpg"]
    })))
    .unwrap();

    assert_eq!(summary.id, "7");
    assert_eq!(summary.display_name, "Pan Molde");
    assert!((summary.price.base_price_reference - 2000.0).abs() < f64::EPSILON);
    assert!((summary.price.base_price_sales - 1500.0).abs() < f64::EPSILON);
    assert_eq!(summary.images.default_image, "https://img/a.jpg");
    assert_eq!(summary.images.medium_image, "https://img/b.jpg");
}

#[test]
fn lowercase_id_wins_over_uppercase() {
    let summary = normalize_summary(raw_summary(json!({"id": "a", "ID": "b"}))).unwrap();
    assert_eq!(summary.id, "a");
}

#[test]
fn summary_without_id_or_name_is_dropped() {
    assert!(normalize_summary(raw_summary(json!({"brand": "Colun", "price": 990}))).is_none());
}

#[test]
fn malformed_records_are_dropped_from_a_batch() {
    let products = normalize_summaries(vec![
        json!({"ID": "1", "displayName": "Leche"}),
        json!("not a record"),
        json!({"brand": "nameless"}),
        json!(42),
        json!({"name": "Arroz"}),
    ]);
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, "1");
    assert_eq!(products[1].display_name, "Arroz");
}

// -----------------------------------------------------------------------
// normalize_detail / detail_from_value
// -----------------------------------------------------------------------

#[test]
fn detail_derives_discount_and_defaults() {
    let detail = detail_from_value(json!({
        "sku": "123456",
        "name": "Queso Gauda 250g",
        "price": {"current": 1500, "original": 2000},
        "images": ["https://img/q1.jpg", {"url": "https://img/q2.jpg"}, 7],
        "stock": 12.0,
        "rating": 4.5,
        "category": "Quesos"
    }))
    .unwrap();

    assert_eq!(detail.sku, "123456");
    assert!((detail.price.discount - 25.0).abs() < 1e-9);
    assert_eq!(detail.price.currency, "CLP");
    assert_eq!(detail.images, vec!["https://img/q1.jpg", "https://img/q2.jpg"]);
    assert!(detail.availability, "availability defaults to true");
    assert_eq!(detail.stock, 12);
    assert!(detail.url.is_empty());
}

#[test]
fn detail_unwraps_product_envelope_and_aliases() {
    let detail = detail_from_value(json!({
        "product": {
            "SKU": "999",
            "displayName": "Yogurt Natural",
            "price": {"BasePriceSales": 450, "BasePriceReference": 500, "currency": "USD"},
            "available": false,
            "images": {"defaultImage": "https://img/y.jpg", "zoom": "https://img/yz.jpg"}
        }
    }))
    .unwrap();

    assert_eq!(detail.sku, "999");
    assert_eq!(detail.name, "Yogurt Natural");
    assert!((detail.price.current - 450.0).abs() < f64::EPSILON);
    assert!((detail.price.discount - 10.0).abs() < 1e-9);
    assert_eq!(detail.price.currency, "USD");
    assert!(!detail.availability);
    assert_eq!(detail.images, vec!["https://img/y.jpg", "https://img/yz.jpg"]);
}

#[test]
fn detail_with_zero_original_has_no_discount() {
    let detail = detail_from_value(json!({"sku": "1", "price": 1500})).unwrap();
    assert!(detail.price.discount.abs() < f64::EPSILON);
}

#[test]
fn detail_without_sku_or_name_is_rejected() {
    assert!(detail_from_value(json!({"price": {"current": 100}})).is_none());
    assert!(detail_from_value(json!([1, 2, 3])).is_none());
}

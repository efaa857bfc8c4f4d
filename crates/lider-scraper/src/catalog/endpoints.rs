//! Upstream URL construction.

use reqwest::Url;

use crate::error::ScraperError;

/// Builds every upstream URL from the configured API and storefront bases.
#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    api: String,
    web: String,
}

impl Endpoints {
    pub(crate) fn new(api: &str, web: &str) -> Self {
        Self {
            api: api.trim_end_matches('/').to_owned(),
            web: web.trim_end_matches('/').to_owned(),
        }
    }

    pub(crate) fn search_api(&self, term: &str, page: u32) -> Result<String, ScraperError> {
        build(
            &self.api,
            &["supermercado", "search"],
            &[("query", term), ("page", &page.to_string())],
        )
    }

    pub(crate) fn search_page(&self, term: &str) -> Result<String, ScraperError> {
        build(&self.web, &["supermercado", "search"], &[("query", term)])
    }

    /// Structured detail endpoints in the order they should be tried.
    pub(crate) fn detail_api_candidates(&self, sku: &str) -> Result<Vec<String>, ScraperError> {
        Ok(vec![
            build(&self.api, &["supermercado", "product"], &[("sku", sku)])?,
            build(&self.api, &["supermercado", "product", sku], &[])?,
            build(&self.web, &["catalogo", "api", "products", sku], &[])?,
        ])
    }

    /// The storefront product page, also used as the canonical product URL.
    pub(crate) fn detail_page(&self, sku: &str) -> Result<String, ScraperError> {
        build(&self.web, &["supermercado", "product", "sku", sku], &[])
    }

    pub(crate) fn promotions_api(&self, promo_type: &str) -> Result<String, ScraperError> {
        build(
            &self.api,
            &["supermercado", "promotions"],
            &[("promoType", promo_type)],
        )
    }

    pub(crate) fn promotions_page(&self, promo_type: &str) -> Result<String, ScraperError> {
        build(&self.web, &["supermercado", "ofertas"], &[("type", promo_type)])
    }

    pub(crate) fn category_api(&self, category_id: &str) -> Result<String, ScraperError> {
        build(
            &self.api,
            &["supermercado", "category"],
            &[("categoryId", category_id), ("size", "20")],
        )
    }

    pub(crate) fn category_page(&self, category_id: &str) -> Result<String, ScraperError> {
        build(&self.web, &["supermercado", "category", category_id], &[])
    }

    pub(crate) fn suggestions_api(&self, term: &str) -> Result<String, ScraperError> {
        build(&self.api, &["supermercado", "suggestions"], &[("term", term)])
    }
}

/// Appends percent-encoded `segments` and `query` pairs to `base`.
fn build(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<String, ScraperError> {
    let invalid = |reason: String| ScraperError::InvalidUrl {
        url: base.to_owned(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("base URL cannot carry a path".to_owned()))?
        .pop_if_empty()
        .extend(segments);

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://apps.lider.cl/", "https://www.lider.cl")
    }

    #[test]
    fn search_urls_encode_the_term() {
        let e = endpoints();
        assert_eq!(
            e.search_api("leche entera", 2).unwrap(),
            "https://apps.lider.cl/supermercado/search?query=leche+entera&page=2"
        );
        assert_eq!(
            e.search_page("pan&vino").unwrap(),
            "https://www.lider.cl/supermercado/search?query=pan%26vino"
        );
    }

    #[test]
    fn detail_candidates_are_ordered() {
        let urls = endpoints().detail_api_candidates("123").unwrap();
        assert_eq!(
            urls,
            vec![
                "https://apps.lider.cl/supermercado/product?sku=123",
                "https://apps.lider.cl/supermercado/product/123",
                "https://www.lider.cl/catalogo/api/products/123",
            ]
        );
    }

    #[test]
    fn path_segments_are_escaped() {
        assert_eq!(
            endpoints().detail_page("a/b c").unwrap(),
            "https://www.lider.cl/supermercado/product/sku/a%2Fb%20c"
        );
    }

    #[test]
    fn listing_endpoints() {
        let e = endpoints();
        assert_eq!(
            e.category_api("lacteos").unwrap(),
            "https://apps.lider.cl/supermercado/category?categoryId=lacteos&size=20"
        );
        assert_eq!(
            e.category_page("lacteos").unwrap(),
            "https://www.lider.cl/supermercado/category/lacteos"
        );
        assert_eq!(
            e.promotions_page("cyber").unwrap(),
            "https://www.lider.cl/supermercado/ofertas?type=cyber"
        );
    }

    #[test]
    fn unparseable_base_is_invalid_url() {
        let e = Endpoints::new("not a url", "https://www.lider.cl");
        assert!(matches!(
            e.suggestions_api("lec"),
            Err(ScraperError::InvalidUrl { .. })
        ));
    }
}

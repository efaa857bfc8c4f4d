use futures::FutureExt;

use super::{require, Catalog};
use crate::client::UpstreamRequest;
use crate::decode::decode_suggestions;
use crate::error::ScraperError;
use crate::outcome::{first_success, Provenance, Sourced, Strategy};

const MAX_SCRAPED_SUGGESTIONS: usize = 10;

const COMMON_TERMS: &[(&str, &[&str])] = &[
    ("lec", &["leche", "leche descremada", "leche entera", "leche condensada", "lechuga"]),
    ("pan", &["pan", "pan integral", "pan molde", "pan hallulla", "panceta"]),
    ("arr", &["arroz", "arroz grado 1", "arroz integral", "arrollado"]),
    ("car", &["carne", "carne molida", "carne vacuno", "carnitas", "carbón"]),
    ("pol", &["pollo", "pollo entero", "pollo trozado", "pollo pechuga", "polenta"]),
    ("que", &["queso", "queso gauda", "queso mantecoso", "queso fresco", "queque"]),
    ("hue", &["huevos", "huevos blancos", "huevos color", "huevos codorniz"]),
    ("yog", &["yogurt", "yogurt natural", "yogurt griego", "yogurt light"]),
    ("man", &["mantequilla", "manzana", "manjar", "mandarina", "mango"]),
    ("cer", &["cereal", "cerveza", "cernir", "cerdo"]),
];

const QUALIFIERS: [&str; 5] = ["natural", "light", "premium", "casero", "integral"];

/// Local suggestions used when no upstream tier answers. Never fails.
///
/// The first three characters of `term` select a list of common grocery
/// terms; an unknown prefix yields `term` followed by each fixed qualifier.
/// The prefix is lowercased before lookup, so `"Yogu"` and `"YOG"` select the
/// same list as `"yog"`. A term shorter than three characters always gets
/// qualifiers.
#[must_use]
pub fn fallback_suggestions(term: &str) -> Vec<String> {
    let prefix: String = term.chars().take(3).collect::<String>().to_lowercase();
    if prefix.chars().count() == 3 {
        if let Some((_, terms)) = COMMON_TERMS.iter().find(|(p, _)| *p == prefix) {
            return terms.iter().map(|t| (*t).to_owned()).collect();
        }
    }
    QUALIFIERS.iter().map(|q| format!("{term} {q}")).collect()
}

impl Catalog {
    /// Autocomplete suggestions for `term`.
    ///
    /// Falls back to [`fallback_suggestions`] (provenance `fallback`) when
    /// both upstream tiers fail, so only a blank term is an error.
    ///
    /// # Errors
    ///
    /// [`ScraperError::EmptyParameter`] for a blank term.
    pub async fn suggestions(&self, term: &str) -> Result<Sourced<Vec<String>>, ScraperError> {
        let term = require("term", term)?;
        let local = async move {
            tracing::info!(term, "using local suggestions");
            Ok::<_, ScraperError>(fallback_suggestions(term))
        };

        first_success(
            "suggestions",
            term,
            vec![
                Strategy::new("api", Provenance::Api, self.suggestions_api(term).boxed()),
                Strategy::new(
                    "scraping",
                    Provenance::Scraping,
                    self.suggestions_scrape(term).boxed(),
                ),
                Strategy::new("local", Provenance::Fallback, local.boxed()),
            ],
        )
        .await
    }

    async fn suggestions_api(&self, term: &str) -> Result<Vec<String>, ScraperError> {
        let url = self.endpoints.suggestions_api(term)?;
        let response = self
            .client
            .fetch(&UpstreamRequest::get(url).accept_json())
            .await?;
        let suggestions = decode_suggestions(&response.body, "suggestions api")?;
        if suggestions.is_empty() {
            return Err(ScraperError::Extraction {
                context: "suggestions api".to_owned(),
                reason: "no suggestions returned".to_owned(),
            });
        }
        Ok(suggestions)
    }

    /// Distinct product names from the search page for `term`.
    async fn suggestions_scrape(&self, term: &str) -> Result<Vec<String>, ScraperError> {
        let products = self
            .scrape_listing(self.endpoints.search_page(term)?, "suggestions page")
            .await?;

        let mut names: Vec<String> = Vec::new();
        for product in products {
            let name = product.display_name.to_lowercase();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
            if names.len() == MAX_SCRAPED_SUGGESTIONS {
                break;
            }
        }

        if names.is_empty() {
            return Err(ScraperError::Extraction {
                context: "suggestions page".to_owned(),
                reason: "no product names found".to_owned(),
            });
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefix_returns_the_fixed_list() {
        assert_eq!(
            fallback_suggestions("lec"),
            vec!["leche", "leche descremada", "leche entera", "leche condensada", "lechuga"]
        );
    }

    #[test]
    fn prefix_lookup_ignores_case() {
        let expected = fallback_suggestions("yog");
        assert_eq!(fallback_suggestions("Yogu"), expected);
        assert_eq!(fallback_suggestions("YOG"), expected);
        assert_eq!(expected[0], "yogurt");
    }

    #[test]
    fn unknown_prefix_appends_qualifiers_in_order() {
        assert_eq!(
            fallback_suggestions("xyz"),
            vec!["xyz natural", "xyz light", "xyz premium", "xyz casero", "xyz integral"]
        );
    }

    #[test]
    fn short_term_uses_qualifiers() {
        assert_eq!(fallback_suggestions("pa").len(), 5);
        assert_eq!(fallback_suggestions("pa")[0], "pa natural");
    }

    #[test]
    fn every_table_entry_is_reachable() {
        for (prefix, terms) in COMMON_TERMS {
            assert_eq!(fallback_suggestions(prefix).len(), terms.len());
        }
    }
}

pub mod catalog;
pub mod classify;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod extract;
pub mod identity;
pub mod normalize;
pub mod outcome;
pub mod price;
pub mod rate_limit;
pub mod types;

pub use catalog::{fallback_suggestions, Catalog};
pub use client::{UpstreamClient, UpstreamRequest, UpstreamResponse};
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use identity::IdentityPool;
pub use outcome::{FetchOutcome, Provenance, Sourced, TierFailure};
pub use price::parse_locale_price;
pub use rate_limit::RateGovernor;

use clap::{Parser, Subcommand};
use lider_scraper::{Catalog, ScraperConfig, Sourced};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "lider-cli")]
#[command(about = "Run one catalog operation against the upstream and print the JSON result")]
struct Cli {
    /// Print single-line JSON instead of pretty output.
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search products by term.
    Search { term: String },
    /// Autocomplete suggestions for a term prefix.
    Suggest { term: String },
    /// Products on promotion for a promotion type.
    Promotions { promo_type: String },
    /// Products in a category.
    Category { id: String },
    /// Full product detail by SKU.
    Product { sku: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = lider_core::load_app_config()?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = Catalog::new(&ScraperConfig::from_app_config(&config))?;
    tracing::debug!(command = ?cli.command, "running catalog operation");

    let output = match &cli.command {
        Commands::Search { term } => envelope(term, catalog.search(term).await?, Vec::len),
        Commands::Suggest { term } => envelope(term, catalog.suggestions(term).await?, Vec::len),
        Commands::Promotions { promo_type } => {
            envelope(promo_type, catalog.promotions(promo_type).await?, Vec::len)
        }
        Commands::Category { id } => envelope(id, catalog.category(id).await?, Vec::len),
        Commands::Product { sku } => envelope(sku, catalog.product_detail(sku).await?, |_| 1),
    };

    let rendered = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn envelope<T: Serialize>(
    input: &str,
    sourced: Sourced<T>,
    count: impl FnOnce(&T) -> usize,
) -> serde_json::Value {
    json!({
        "input": input,
        "count": count(&sourced.data),
        "source": sourced.source,
        "results": sourced.data,
    })
}

#[cfg(test)]
mod tests;

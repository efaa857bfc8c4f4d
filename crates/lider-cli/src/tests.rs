use super::*;
use lider_scraper::Provenance;

#[test]
fn parses_search_command() {
    let cli = Cli::try_parse_from(["lider-cli", "search", "leche"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Search { ref term } if term == "leche"));
    assert!(!cli.compact);
}

#[test]
fn parses_product_with_compact_flag() {
    let cli = Cli::try_parse_from(["lider-cli", "product", "123456", "--compact"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Product { ref sku } if sku == "123456"));
    assert!(cli.compact);
}

#[test]
fn parses_promotions_command() {
    let cli =
        Cli::try_parse_from(["lider-cli", "promotions", "cyber"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Promotions { ref promo_type } if promo_type == "cyber"));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["lider-cli"]).is_err());
    assert!(Cli::try_parse_from(["lider-cli", "category"]).is_err());
}

#[test]
fn envelope_reports_count_and_source() {
    let value = envelope(
        "lec",
        Sourced {
            data: vec!["leche".to_owned()],
            source: Provenance::Fallback,
        },
        Vec::len,
    );
    assert_eq!(value["count"], 1);
    assert_eq!(value["source"], "fallback");
    assert_eq!(value["results"][0], "leche");
}

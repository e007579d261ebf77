//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the catalog crawler.

use anyhow::Context;
use catalog_harvest::catalog::{FeatureProductLink, FeatureTable, ProductTable};
use catalog_harvest::config::{self, load_or_default, Config};
use catalog_harvest::correlate::{correlate, Correlation, PriceRange, Query, SortDirection, SortKey};
use catalog_harvest::crawler::{harvest, merge_crops, CropSource};
use catalog_harvest::input::{load_local, save_local};
use catalog_harvest::output::{print_correlation, sink_for, OutputFormat};
use catalog_harvest::HarvestError;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: crawl a shop catalog and correlate features with products
///
/// Crawls the shop's filter tags and product pages (or reads the snapshot of
/// a previous crawl), keeps the products matching the filters and writes the
/// result.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "Crawl a shop catalog and correlate features with products", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Read features.csv and products.csv from the snapshot directory instead of crawling
    #[arg(long)]
    no_scrape: bool,

    /// Merge the crops of the gardening API into the tables
    #[arg(long)]
    api: bool,

    /// Keep features whose name contains TEXT
    #[arg(short, long, value_name = "TEXT")]
    feature: Option<String>,

    /// Keep products whose name contains TEXT
    #[arg(short, long, value_name = "TEXT")]
    product: Option<String>,

    /// Keep products priced between LOW and HIGH (inclusive)
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    price: Option<Vec<f64>>,

    /// Keep only sold-out (true) or available (false) products
    #[arg(long, value_name = "BOOL")]
    sold_out: Option<bool>,

    /// Sort by name or price
    #[arg(long, default_value = "name")]
    sort: SortKey,

    /// Sort order: asc or desc
    #[arg(long, default_value = "asc")]
    order: SortDirection,

    /// Report products per feature
    #[arg(short, long)]
    break_down: bool,

    /// Write the result as csv, json or db
    #[arg(short, long, value_name = "FORMAT")]
    output: Option<OutputFormat>,

    /// Print the result
    #[arg(short, long)]
    display: bool,

    /// Attempts per page (overrides fetch.attempts)
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Seconds between attempts (overrides fetch.wait-seconds)
    #[arg(long, value_name = "SECONDS")]
    sleep: Option<f64>,

    /// Concurrent feature page fetches (overrides fetch.feature-batch-size)
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);

        let code = e
            .downcast_ref::<HarvestError>()
            .map_or(1, HarvestError::exit_code);
        std::process::exit(code);
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut config, config_hash) =
        load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    match &cli.config {
        Some(path) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            config_hash
        ),
        None => tracing::info!("Using default configuration"),
    }

    apply_overrides(&mut config, &cli);
    config::validate(&config).context("Invalid fetch settings")?;

    let query = build_query(&cli)?;

    let (mut features, mut links, mut products) = if cli.no_scrape {
        handle_local(&config)?
    } else {
        handle_crawl(&config).await?
    };

    if cli.api {
        let source = CropSource::new(&config)?;
        tracing::info!("Retrieving crops from {}", source.url());
        let crops = source.fetch().await.context("Crop enrichment failed")?;
        let added = merge_crops(&crops, &config.api, &mut features, &mut links, &mut products);
        tracing::info!("Merged {} crops ({} new products)", crops.len(), added);
    }

    let result = correlate(&features, &links, &products, &query);
    tracing::info!(
        "{} product rows match across {} features",
        result.products.len(),
        result.features.len()
    );

    handle_output(&cli, &config, &config_hash, &result)
}

/// Applies the command-line fetch settings on top of the configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(retries) = cli.retries {
        config.fetch.attempts = retries;
    }
    if let Some(sleep) = cli.sleep {
        config.fetch.wait_seconds = sleep;
    }
    if let Some(batch_size) = cli.batch_size {
        config.fetch.feature_batch_size = batch_size;
    }
}

fn build_query(cli: &Cli) -> catalog_harvest::Result<Query> {
    let price = match cli.price.as_deref() {
        Some([lower, upper]) => PriceRange::new(*lower, *upper)?,
        _ => PriceRange::default(),
    };

    Ok(Query::new()
        .with_feature(cli.feature.clone().unwrap_or_default())
        .with_product(cli.product.clone().unwrap_or_default())
        .with_price(price)
        .with_sold_out(cli.sold_out)
        .sorted_by(cli.sort, cli.order)
        .with_break_down(cli.break_down))
}

type Tables = (FeatureTable, Vec<FeatureProductLink>, ProductTable);

/// Handles --no-scrape: reads the snapshot of a previous crawl
fn handle_local(config: &Config) -> anyhow::Result<Tables> {
    let dir = Path::new(&config.output.snapshot_directory);
    tracing::info!("Reading local tables from {}", dir.display());

    let tables = load_local(dir).context("Cannot run without crawling")?;
    Ok((tables.features, tables.links, tables.products))
}

/// Handles the crawl and saves its unfiltered tables
async fn handle_crawl(config: &Config) -> anyhow::Result<Tables> {
    tracing::info!(
        "Crawling {} ({} attempts per page, {:.1}s between attempts)",
        config.site.base_url,
        config.fetch.attempts,
        config.fetch.wait_seconds
    );

    let harvest = harvest(config).await.context("Crawl failed")?;
    if !harvest.report.is_complete() {
        tracing::warn!("Crawl finished with skipped pages or products");
    }

    save_local(
        Path::new(&config.output.snapshot_directory),
        &harvest.features,
        &harvest.links,
        &harvest.products,
    )
    .context("Failed to save the crawl snapshot")?;

    Ok((harvest.features, harvest.links, harvest.products))
}

/// Displays and writes the result
fn handle_output(
    cli: &Cli,
    config: &Config,
    config_hash: &str,
    result: &Correlation,
) -> anyhow::Result<()> {
    if cli.display {
        print_correlation(result);
    }

    if let Some(format) = cli.output {
        let sink = sink_for(format, &config.output, config_hash);
        sink.write(result)
            .with_context(|| format!("Failed to write {} output", sink.name()))?;
    }

    Ok(())
}

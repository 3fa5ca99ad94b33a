//! Vitrina main entry point
//!
//! This is the command-line interface for the Vitrina storefront crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vitrina::config::{load_config_with_hash, Config, SkuMode};
use vitrina::crawler::{RetailScraper, Scraper};
use vitrina::dom::ChromiumDom;
use vitrina::output::{print_statistics, JsonLinesSink};

/// Vitrina: a storefront catalog crawler
///
/// Vitrina opens a storefront in a browser, walks every category listing
/// page by page, and writes one JSON object per product to the output file.
#[derive(Parser, Debug)]
#[command(name = "vitrina")]
#[command(version = "1.0.0")]
#[command(about = "A storefront catalog crawler", long_about = None)]
struct Cli {
    /// Site to crawl (e.g. "s6", "stock")
    #[arg(value_name = "SITE", required_unless_present = "list_sites")]
    site: Option<String>,

    /// Output file (JSON Lines, one product per line)
    #[arg(value_name = "OUTPUT", required_unless_present = "list_sites")]
    output: Option<PathBuf>,

    /// Path to TOML configuration file (built-in sites when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run the browser without a window
    #[arg(long)]
    headless: bool,

    /// Skip SKU lookups on product detail pages
    #[arg(long)]
    no_sku: bool,

    /// List the configured sites and exit
    #[arg(long)]
    list_sites: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(&cli)?;

    if cli.list_sites {
        handle_list_sites(&config);
        return Ok(());
    }

    if cli.headless {
        config.browser.headless = true;
    }
    if cli.no_sku {
        config.crawler.sku_mode = SkuMode::Disabled;
    }

    // Both are required by clap unless --list-sites was given
    let (Some(site), Some(output)) = (cli.site, cli.output) else {
        anyhow::bail!("SITE and OUTPUT are required");
    };

    handle_crawl(config, &site, output).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vitrina=info,warn"),
            1 => EnvFilter::new("vitrina=debug,info"),
            2 => EnvFilter::new("vitrina=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the built-in configuration
fn load(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::debug!("Using built-in configuration");
            Ok(Config::default())
        }
    }
}

/// Handles the --list-sites mode
fn handle_list_sites(config: &Config) {
    println!("Configured sites ({}):", config.sites.len());
    for site in &config.sites {
        println!("  {:<10} {}", site.name, site.home_url);
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, site_name: &str, output: PathBuf) -> anyhow::Result<()> {
    // Resolve the site before anything touches the browser
    let site = config.site(site_name)?.clone();

    tracing::info!("Crawling '{}' starting at {}", site.name, site.home_url);
    tracing::info!("SKU enrichment: {:?}", config.crawler.sku_mode);

    let dom = ChromiumDom::launch(&config.browser)
        .await
        .context("failed to start browser")?;

    let mut scraper = RetailScraper::new(dom, site, config.crawler.clone());
    scraper
        .init()
        .await
        .context("failed to initialize scraper")?;

    let mut sink = match JsonLinesSink::create(&output) {
        Ok(sink) => sink,
        Err(e) => {
            scraper.close().await;
            return Err(e).with_context(|| format!("failed to create {}", output.display()));
        }
    };
    tracing::info!("Writing products to {}", output.display());

    match scraper.fetch(&mut sink).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Crawl failed after {} products: {}",
                sink.written(),
                e
            );
            if let Some(stats) = scraper.statistics() {
                print_statistics(stats);
            }
            Err(e.into())
        }
    }
}

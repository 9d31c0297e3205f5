//! StorePulse - trailing store summary collector
//!
//! A scheduled job that totals Shopify orders and GA4 sessions over a
//! trailing window and writes one merged JSON record for a dashboard.
//!
//! Exit codes:
//!   0 - Success (summary written, or printed with --dry-run)
//!   1 - Any failure (missing credentials, upstream error, write failure)

mod aggregate;
mod cli;
mod config;
mod error;
mod models;
mod sources;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::Window;
use sources::{AnalyticsClient, AnalyticsSourceConfig, OrderClient, OrderSourceConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env; clap reads them from the environment
    let dotenv = dotenvy::dotenv();

    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("StorePulse v{}", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    if let Err(e) = run_collection(args).await {
        error!("Collection failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .storepulse.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Credentials are read from the environment, not from this file.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the fetch / merge / write sequence.
async fn run_collection(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;
    let timeout = config.http.timeout_seconds.map(Duration::from_secs);

    // Credentials are checked before any request goes out
    let mut order_config = OrderSourceConfig::new(args.store.clone(), args.access_token.clone())?
        .with_query_filter(args.order_query.clone());
    order_config.api_version = config.orders.api_version.clone();
    order_config.page_size = config.orders.page_size;
    order_config.timeout = timeout;
    if let Some(ref base_url) = config.orders.base_url {
        order_config = order_config.with_base_url(base_url.as_str());
    }

    let mut analytics_config = AnalyticsSourceConfig::new(
        args.property_id.clone(),
        args.client_email.clone(),
        args.private_key.clone(),
    )?
    .with_dimension_filter(args.dimension_filter.clone());
    analytics_config.api_url = config.analytics.api_url.clone();
    analytics_config.token_url = config.analytics.token_url.clone();
    analytics_config.timeout = timeout;

    let window = Window::trailing(Utc::now(), config.output.window_days).with_context(|| {
        format!("Window of {} days is out of range", config.output.window_days)
    })?;
    let output = PathBuf::from(&config.output.path);

    if !args.quiet {
        println!("📊 Collecting store summary");
        println!("   Store: {}", order_config.store_url());
        println!("   Property: {}", analytics_config.property());
        println!("   Window: {}", window);
    }

    let orders = OrderClient::new(order_config)?;
    let analytics = AnalyticsClient::new(analytics_config)?;

    let spinner = fetch_spinner(args.quiet);
    let result = if args.dry_run {
        aggregate::build_record(&orders, &analytics, &window).await
    } else {
        aggregate::run(&orders, &analytics, &window, &output).await
    };
    spinner.finish_and_clear();
    let record = result?;

    if args.dry_run {
        println!("{}", aggregate::render_record(&record)?);
        if !args.quiet {
            println!("\n✅ Dry run complete. Nothing was written.");
        }
        return Ok(());
    }

    if !args.quiet {
        println!("\n📈 Summary:");
        println!("   Sessions: {}", record.sessions);
        println!("   Orders: {}", record.orders);
        println!("   Sales: {:.2}", record.sales);
        println!("   Conversion rate: {:.2}%", record.conversion_rate);
        println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
        println!("\n✅ Summary saved to: {}", output.display());
    }

    Ok(())
}

/// Spinner shown while both sources are in flight.
fn fetch_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Fetching orders and analytics...");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

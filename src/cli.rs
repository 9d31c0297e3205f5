//! Command-line interface argument parsing.
//!
//! Credentials are read from the environment through clap's `env`
//! support; a `.env` file in the working directory is loaded first.

use crate::models::MAX_WINDOW_DAYS;
use clap::Parser;
use std::path::PathBuf;

/// StorePulse - trailing 90-day store summary
///
/// Totals Shopify orders and GA4 sessions over the trailing window and
/// writes one JSON summary for a dashboard to pick up.
///
/// Examples:
///   storepulse
///   storepulse --output public/metrics.json --days 30
///   storepulse --dry-run --verbose
///   storepulse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Shopify store handle or domain
    #[arg(long, env = "SHOPIFY_STORE", value_name = "STORE")]
    pub store: Option<String>,

    /// Shopify Admin API access token
    #[arg(long, env = "SHOPIFY_ACCESS_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Extra order filter, as `key=value&key=value`
    ///
    /// Applied to the first order request, e.g. `financial_status=paid`.
    #[arg(long, env = "SHOPIFY_ORDER_QUERY", value_name = "QUERY")]
    pub order_query: Option<String>,

    /// GA4 property ID
    #[arg(long, env = "GA4_PROPERTY_ID", value_name = "ID")]
    pub property_id: Option<String>,

    /// GA4 service-account email
    #[arg(long, env = "GA4_CLIENT_EMAIL", value_name = "EMAIL")]
    pub client_email: Option<String>,

    /// GA4 service-account private key (PEM, `\n` escapes allowed)
    #[arg(long, env = "GA4_PRIVATE_KEY", hide_env_values = true, value_name = "PEM")]
    pub private_key: Option<String>,

    /// GA4 dimension filter as a JSON FilterExpression
    ///
    /// An invalid filter is logged and ignored.
    #[arg(long, env = "GA4_DIMENSION_FILTER", value_name = "JSON")]
    pub dimension_filter: Option<String>,

    /// Output file path for the summary
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Length of the trailing window in days
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Request timeout in seconds (default: none)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .storepulse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fetch and print the summary without writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .storepulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(days) = self.days {
            if days == 0 {
                return Err("Window must be at least 1 day".to_string());
            }
            if days > MAX_WINDOW_DAYS {
                return Err(format!("Window must be at most {} days", MAX_WINDOW_DAYS));
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

//! Upstream data sources.
//!
//! Each source is configured explicitly at construction and exposed through
//! a small trait so the aggregator can run against test doubles.

pub mod analytics;
pub mod auth;
pub mod orders;
pub mod pagination;

pub use analytics::{AnalyticsClient, AnalyticsSourceConfig};
pub use orders::{OrderClient, OrderSourceConfig};

use crate::error::{SourceError, SourceResult};
use crate::models::{AnalyticsSummary, OrderAggregate, Window};
use reqwest::Client;
use std::time::Duration;

/// Something that can total orders over a window.
#[allow(async_fn_in_trait)]
pub trait OrderSource {
    async fn fetch_orders(&self, window: &Window) -> SourceResult<OrderAggregate>;
}

/// Something that can report sessions and conversion rate over a window.
#[allow(async_fn_in_trait)]
pub trait AnalyticsSource {
    async fn fetch_analytics(&self, window: &Window) -> SourceResult<AnalyticsSummary>;
}

/// Unwrap a credential, treating absent and blank values alike.
pub(crate) fn require(value: Option<String>, name: &'static str) -> SourceResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(SourceError::MissingCredential(name)),
    }
}

/// HTTP client shared by a source. No timeout unless one is configured.
pub(crate) fn build_http_client(timeout: Option<Duration>) -> SourceResult<Client> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

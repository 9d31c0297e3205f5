//! Merging the two sources into the persisted summary.
//!
//! Both fetches run concurrently on the current task; the first failure
//! fails the whole run and nothing is written.

use crate::error::SourceResult;
use crate::models::{AnalyticsSummary, OrderAggregate, OutputRecord, Window};
use crate::sources::{AnalyticsSource, OrderSource};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Fetch orders and analytics for the same window, concurrently.
pub async fn collect<O, A>(
    orders: &O,
    analytics: &A,
    window: &Window,
) -> SourceResult<(OrderAggregate, AnalyticsSummary)>
where
    O: OrderSource,
    A: AnalyticsSource,
{
    futures::try_join!(
        orders.fetch_orders(window),
        analytics.fetch_analytics(window)
    )
}

/// Fetch both sources and merge them into an output record.
pub async fn build_record<O, A>(orders: &O, analytics: &A, window: &Window) -> Result<OutputRecord>
where
    O: OrderSource,
    A: AnalyticsSource,
{
    let (order_totals, summary) = collect(orders, analytics, window).await?;
    debug!("Raw totals: {:?} / {:?}", order_totals, summary);

    Ok(OutputRecord::compose(&order_totals, &summary))
}

/// Serialize a record as pretty JSON.
pub fn render_record(record: &OutputRecord) -> Result<String> {
    serde_json::to_string_pretty(record).map_err(Into::into)
}

/// Write a record to `path`, creating parent directories and replacing any
/// previous file.
pub fn write_record(record: &OutputRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let content = render_record(record)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;

    info!("Wrote summary to {}", path.display());
    Ok(())
}

/// Full collection run: fetch, merge, persist.
pub async fn run<O, A>(orders: &O, analytics: &A, window: &Window, output: &Path) -> Result<OutputRecord>
where
    O: OrderSource,
    A: AnalyticsSource,
{
    let record = build_record(orders, analytics, window).await?;
    write_record(&record, output)?;
    Ok(record)
}

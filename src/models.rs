//! Data models for the store summary.
//!
//! This module contains the reporting window, the per-source aggregates,
//! and the merged record that is persisted at the end of a run.

use chrono::{DateTime, Days, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;

/// Default length of the trailing window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 90;

/// Longest window accepted from the command line or config file.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// A trailing date range ending at the time of execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Midnight UTC of the first day in the window.
    pub start: DateTime<Utc>,
    /// The instant the window was computed.
    pub end: DateTime<Utc>,
    /// Number of calendar days covered, today included.
    pub days: u32,
}

impl Window {
    /// Build a window of `days` calendar days ending at `now`.
    ///
    /// The first day is `days - 1` days before today, so "today" counts as
    /// one of the days. Returns `None` if the start would fall outside the
    /// representable calendar.
    pub fn trailing(now: DateTime<Utc>, days: u32) -> Option<Self> {
        let days = days.max(1);
        let first_day = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(days - 1)))?;
        let start = first_day.and_time(NaiveTime::MIN).and_utc();

        Some(Self {
            start,
            end: now,
            days,
        })
    }

    /// Relative start date in the form the reporting API accepts.
    pub fn relative_start(&self) -> String {
        match self.days {
            1 => "today".to_string(),
            n => format!("{}daysAgo", n - 1),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {} ({} days)",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d %H:%M:%S UTC"),
            self.days
        )
    }
}

/// Order totals accumulated across every page of the order listing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderAggregate {
    /// Number of orders in the window.
    pub orders: u64,
    /// Sum of order totals, in store currency.
    pub sales: f64,
}

impl OrderAggregate {
    /// Fold one order total into the running aggregate.
    pub fn add(&mut self, total: f64) {
        self.orders += 1;
        self.sales += total;
    }
}

/// Session metrics from the first row of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalyticsSummary {
    pub sessions: f64,
    /// Fraction in `[0, 1]`.
    pub conversion_rate: f64,
}

/// The merged record written to disk.
///
/// Delta and series fields are reserved and always serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub sessions: u64,
    pub orders: u64,
    pub sales: f64,
    /// Percentage with two decimals.
    pub conversion_rate: f64,
    pub sessions_delta: Option<f64>,
    pub orders_delta: Option<f64>,
    pub sales_delta: Option<f64>,
    pub conversion_rate_delta: Option<f64>,
    pub sessions_series: Option<Vec<f64>>,
    pub sales_series: Option<Vec<f64>>,
}

impl OutputRecord {
    /// Merge the two source results into the persisted shape.
    pub fn compose(orders: &OrderAggregate, analytics: &AnalyticsSummary) -> Self {
        Self {
            sessions: analytics.sessions.max(0.0).round() as u64,
            orders: orders.orders,
            sales: round2(orders.sales),
            conversion_rate: round2(analytics.conversion_rate * 100.0),
            sessions_delta: None,
            orders_delta: None,
            sales_delta: None,
            conversion_rate_delta: None,
            sessions_series: None,
            sales_series: None,
        }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_trailing_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 15, 30, 0).unwrap();
        let window = Window::trailing(now, 90).unwrap();

        assert_eq!(window.end, now);
        assert_eq!(window.days, 90);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(window.relative_start(), "89daysAgo");
    }

    #[test]
    fn test_single_day_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 15, 30, 0).unwrap();
        let window = Window::trailing(now, 0).unwrap();

        assert_eq!(window.days, 1);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
        );
        assert_eq!(window.relative_start(), "today");
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 15, 30, 0).unwrap();
        assert!(Window::trailing(now, u32::MAX).is_none());

        let longest = Window::trailing(now, MAX_WINDOW_DAYS).unwrap();
        assert_eq!(longest.relative_start(), "3649daysAgo");
    }

    #[test]
    fn test_order_aggregate_add() {
        let mut agg = OrderAggregate::default();
        agg.add(9.99);
        agg.add(0.0);

        assert_eq!(agg.orders, 2);
        assert!((agg.sales - 9.99).abs() < 1e-9);
    }

    #[test]
    fn test_compose_rounds_fields() {
        let orders = OrderAggregate {
            orders: 10,
            sales: 199.996,
        };
        let analytics = AnalyticsSummary {
            sessions: 500.4,
            conversion_rate: 0.03333,
        };

        let record = OutputRecord::compose(&orders, &analytics);

        assert_eq!(record.sessions, 500);
        assert_eq!(record.orders, 10);
        assert_eq!(record.sales, 200.0);
        assert_eq!(record.conversion_rate, 3.33);
        assert!(record.sessions_delta.is_none());
        assert!(record.sales_series.is_none());
    }

    #[test]
    fn test_record_serializes_nulls() {
        let record = OutputRecord::compose(&OrderAggregate::default(), &AnalyticsSummary::default());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["sessions"], 0);
        assert_eq!(json["conversionRate"], 0.0);
        for key in [
            "sessionsDelta",
            "ordersDelta",
            "salesDelta",
            "conversionRateDelta",
            "sessionsSeries",
            "salesSeries",
        ] {
            assert!(json[key].is_null(), "{} should be null", key);
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(24.98000000001), 24.98);
        assert_eq!(round2(1.006), 1.01);
        assert_eq!(round2(0.0), 0.0);
    }
}

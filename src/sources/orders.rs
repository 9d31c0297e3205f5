//! Shopify Admin REST order client.
//!
//! Walks the paginated order listing for a window and sums order totals.
//! Pages are fetched strictly in sequence because each request needs the
//! cursor returned by the previous one.

use crate::error::{SourceError, SourceResult};
use crate::models::{OrderAggregate, Window};
use crate::sources::pagination::{link_header, next_page_info};
use crate::sources::{build_http_client, require, OrderSource};
use chrono::SecondsFormat;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const SOURCE_NAME: &str = "Shopify";

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Only the fields we sum over.
const ORDER_FIELDS: &str = "total_price,created_at";

pub const DEFAULT_API_VERSION: &str = "2024-01";
pub const MAX_PAGE_SIZE: u32 = 250;

/// Connection settings for the order API.
#[derive(Debug, Clone)]
pub struct OrderSourceConfig {
    /// Store handle (`my-shop`) or full domain (`my-shop.myshopify.com`).
    pub store: String,
    pub access_token: String,
    /// Extra `key=value&...` filter appended to the first request.
    pub query_filter: Option<String>,
    pub api_version: String,
    pub page_size: u32,
    /// Overrides the URL derived from `store`.
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl OrderSourceConfig {
    /// Build a config from possibly-missing credentials.
    ///
    /// Fails before any network activity if the store or token is absent.
    pub fn new(store: Option<String>, access_token: Option<String>) -> SourceResult<Self> {
        Ok(Self {
            store: require(store, "SHOPIFY_STORE")?,
            access_token: require(access_token, "SHOPIFY_ACCESS_TOKEN")?,
            query_filter: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: MAX_PAGE_SIZE,
            base_url: None,
            timeout: None,
        })
    }

    pub fn with_query_filter(mut self, filter: Option<String>) -> Self {
        self.query_filter = filter.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Root URL of the store's Admin API host.
    pub fn store_url(&self) -> String {
        if let Some(ref base) = self.base_url {
            return base.trim_end_matches('/').to_string();
        }

        let store = self.store.trim().trim_end_matches('/');
        if store.starts_with("http://") || store.starts_with("https://") {
            store.to_string()
        } else if store.contains('.') {
            format!("https://{}", store)
        } else {
            format!("https://{}.myshopify.com", store)
        }
    }

    fn orders_url(&self) -> String {
        format!(
            "{}/admin/api/{}/orders.json",
            self.store_url(),
            self.api_version
        )
    }

    fn filter_pairs(&self) -> Vec<(String, String)> {
        self.query_filter
            .as_deref()
            .map(|filter| {
                url::form_urlencoded::parse(filter.trim_start_matches('?').as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One page of the order listing.
#[derive(Debug, Deserialize)]
struct OrdersPage {
    #[serde(default)]
    orders: Vec<OrderRow>,
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    /// Decimal string in practice; numbers are tolerated.
    #[serde(default)]
    total_price: Value,
}

impl OrderRow {
    fn total(&self) -> f64 {
        let parsed = match &self.total_price {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        };

        parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Client for the paginated order listing.
pub struct OrderClient {
    config: OrderSourceConfig,
    http_client: Client,
}

impl OrderClient {
    pub fn new(config: OrderSourceConfig) -> SourceResult<Self> {
        let http_client = build_http_client(config.timeout)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Count orders and sum their totals over the window.
    ///
    /// Any non-success page aborts the whole walk; no partial totals are
    /// returned.
    pub async fn fetch(&self, window: &Window) -> SourceResult<OrderAggregate> {
        let url = self.config.orders_url();
        let mut aggregate = OrderAggregate::default();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        info!("Fetching {} orders for {}", SOURCE_NAME, window);

        loop {
            let query = self.page_query(window, cursor.as_deref());
            debug!("GET {} (page {})", url, pages + 1);

            let response = self
                .http_client
                .get(&url)
                .header(ACCESS_TOKEN_HEADER, &self.config.access_token)
                .query(&query)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(SourceError::from_response(SOURCE_NAME, response).await);
            }

            let next = next_page_info(link_header(response.headers()));
            let body = response.text().await?;
            let page: OrdersPage =
                serde_json::from_str(&body).map_err(|e| SourceError::Decode {
                    source_name: SOURCE_NAME,
                    message: e.to_string(),
                })?;

            for order in &page.orders {
                aggregate.add(order.total());
            }
            pages += 1;
            debug!(
                "Page {}: {} orders, running total {} orders / {:.2}",
                pages,
                page.orders.len(),
                aggregate.orders,
                aggregate.sales
            );

            match next {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        info!(
            "{}: {} orders, {:.2} sales across {} page(s)",
            SOURCE_NAME, aggregate.orders, aggregate.sales, pages
        );
        Ok(aggregate)
    }

    /// Query parameters for one page.
    ///
    /// The API rejects filters alongside `page_info`, so follow-up pages
    /// only carry the limit, field list and cursor.
    fn page_query(&self, window: &Window, cursor: Option<&str>) -> Vec<(String, String)> {
        let mut query = vec![
            ("limit".to_string(), self.config.page_size.min(MAX_PAGE_SIZE).to_string()),
            ("fields".to_string(), ORDER_FIELDS.to_string()),
        ];

        match cursor {
            Some(token) => query.push(("page_info".to_string(), token.to_string())),
            None => {
                query.push(("status".to_string(), "any".to_string()));
                query.push((
                    "created_at_min".to_string(),
                    window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
                query.push((
                    "created_at_max".to_string(),
                    window.end.to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
                query.extend(self.config.filter_pairs());
            }
        }

        query
    }
}

impl OrderSource for OrderClient {
    async fn fetch_orders(&self, window: &Window) -> SourceResult<OrderAggregate> {
        self.fetch(window).await
    }
}

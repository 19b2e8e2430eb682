use super::types::{Bundle, OrderKeyRecord, OrderRecord};
use crate::error::BundleDlError;
use futures::stream::{self, StreamExt, TryStreamExt};
use itertools::Itertools;
use reqwest::header::COOKIE;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://www.humblebundle.com";

/// Maximum number of purchase keys per order-detail request.
pub const ORDER_DETAIL_BATCH_SIZE: usize = 40;

const ORDER_DETAIL_PARALLELISM: usize = 4;
const SESSION_COOKIE: &str = "_simpleauth_sess";

/// Client for the storefront order API, authenticated with an opaque session token.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    session: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, session: impl Into<String>) -> Result<Self, BundleDlError> {
        Self::with_http_client(reqwest::Client::new(), base_url, session)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        session: impl Into<String>,
    ) -> Result<Self, BundleDlError> {
        // A trailing slash keeps `join` from dropping the last path segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).map_err(|e| {
            BundleDlError::validation(format!("Invalid API base URL {base_url}: {e}"))
        })?;

        Ok(Self {
            http,
            base_url,
            session: session.into(),
        })
    }

    /// The underlying HTTP client, shared with content downloads.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn endpoint(&self, path: &str) -> Result<Url, BundleDlError> {
        self.base_url
            .join(path)
            .map_err(|e| BundleDlError::validation(format!("Invalid API path {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BundleDlError> {
        tracing::debug!(%url, "Requesting");
        let response = self
            .http
            .get(url.clone())
            .header(COOKIE, format!("{SESSION_COOKIE}={}", self.session))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BundleDlError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Every purchase key of the account, deduplicated, in API order.
    pub async fn fetch_order_keys(&self) -> Result<Vec<String>, BundleDlError> {
        let url = self.endpoint("api/v1/user/order")?;
        let records: Vec<OrderKeyRecord> = self.get_json(url).await?;
        Ok(records.into_iter().map(|r| r.gamekey).unique().collect())
    }

    async fn fetch_order_batch(&self, keys: &[String]) -> Result<Vec<Bundle>, BundleDlError> {
        let mut url = self.endpoint("api/v1/orders")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("all_tpkds", "true");
            for key in keys {
                query.append_pair("gamekeys", key);
            }
        }

        let orders: HashMap<String, Option<OrderRecord>> = self.get_json(url).await?;
        tracing::debug!(requested = keys.len(), received = orders.len(), "Fetched order batch");

        Ok(orders
            .into_values()
            .flatten()
            .map(Bundle::from)
            .collect())
    }

    /// Full order records for `keys`, fetched in batches of [`ORDER_DETAIL_BATCH_SIZE`].
    ///
    /// Batches run concurrently and the result carries no ordering guarantee. The
    /// first failing batch aborts the whole fetch.
    pub async fn fetch_orders(&self, keys: &[String]) -> Result<Vec<Bundle>, BundleDlError> {
        let keys: Vec<String> = keys.iter().unique().cloned().collect();
        tracing::info!(
            "Fetching {} orders in {} batches",
            keys.len(),
            keys.len().div_ceil(ORDER_DETAIL_BATCH_SIZE)
        );

        let batches: Vec<Vec<Bundle>> = stream::iter(keys.chunks(ORDER_DETAIL_BATCH_SIZE))
            .map(|chunk| self.fetch_order_batch(chunk))
            .buffer_unordered(ORDER_DETAIL_PARALLELISM)
            .try_collect()
            .await?;

        let mut seen = HashSet::new();
        Ok(batches
            .into_iter()
            .flatten()
            .filter(|bundle| seen.insert(bundle.key.clone()))
            .collect())
    }

    /// Fetches the account's bundles, optionally restricted to `subset`.
    ///
    /// Every key in `subset` must belong to the account; otherwise a validation error
    /// is returned before any order detail is requested.
    pub async fn fetch_catalog(
        &self,
        subset: Option<&[String]>,
    ) -> Result<Vec<Bundle>, BundleDlError> {
        tracing::info!("Fetching purchase keys...");
        let all_keys = self.fetch_order_keys().await?;
        tracing::info!("Account has {} purchases", all_keys.len());

        let keys = match subset {
            Some(requested) => {
                let known: HashSet<&str> = all_keys.iter().map(String::as_str).collect();
                let missing: Vec<&str> = requested
                    .iter()
                    .map(String::as_str)
                    .filter(|key| !known.contains(key))
                    .unique()
                    .collect();
                if !missing.is_empty() {
                    return Err(BundleDlError::validation(format!(
                        "Purchase keys not found in account: {}",
                        missing.join(", ")
                    )));
                }
                requested.to_vec()
            }
            None => all_keys,
        };

        self.fetch_orders(&keys).await
    }
}

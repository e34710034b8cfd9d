//! HTTP client for the backend REST API.
//!
//! Speaks the Appwrite-style document API: project and key headers on every
//! request, documents under `databases/{db}/collections/{collection}`, and
//! JSON-encoded `queries[]` parameters for listing.
//! Caches products and the catalog listing using `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use rxshop_core::{Product, ProductId};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::types::{AccountDocument, DocumentList, ProductDocument};
use super::{BackendError, IdentityProvider, ProductStore};
use crate::config::BackendConfig;
use crate::models::CurrentCustomer;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";
const SESSION_HEADER: &str = "X-Appwrite-Session";

/// Documents requested per listing page.
const PAGE_SIZE: u64 = 100;

/// Upper bound on documents read for the catalog listing.
const MAX_CATALOG_DOCUMENTS: u64 = 1000;

/// Client for the backend REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: SecretString,
    documents_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let endpoint = config.endpoint.as_str().trim_end_matches('/').to_string();
        let documents_url = format!(
            "{endpoint}/databases/{}/collections/{}/documents",
            urlencoding::encode(&config.database_id),
            urlencoding::encode(&config.products_collection_id),
        );

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                endpoint,
                project_id: config.project_id.clone(),
                api_key: config.api_key.clone(),
                documents_url,
                cache,
            }),
        }
    }

    /// Start a server-side request authenticated with the API key.
    fn server_request(&self, url: &str) -> RequestBuilder {
        self.inner
            .client
            .get(url)
            .header(PROJECT_HEADER, &self.inner.project_id)
            .header(KEY_HEADER, self.inner.api_key.expose_secret())
    }

    /// Send a request and decode the JSON body.
    ///
    /// Returns `Ok(None)` on 404 so callers can treat missing documents as
    /// absent rather than failed.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(BackendError::Parse(e))
            }
        }
    }

    /// Build a listing URL with `limit`/`offset` queries.
    fn page_url(&self, limit: u64, offset: u64) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.inner.documents_url)?;
        url.query_pairs_mut()
            .append_pair(
                "queries[]",
                &serde_json::json!({ "method": "limit", "values": [limit] }).to_string(),
            )
            .append_pair(
                "queries[]",
                &serde_json::json!({ "method": "offset", "values": [offset] }).to_string(),
            );
        Ok(url)
    }

    /// Read the whole collection page by page.
    async fn fetch_catalog(&self) -> Result<Vec<Product>, BackendError> {
        let mut products = Vec::new();
        let mut offset = 0;

        loop {
            let url = self.page_url(PAGE_SIZE, offset)?;
            let page: DocumentList<serde_json::Value> = self
                .execute(self.server_request(url.as_str()))
                .await?
                .ok_or_else(|| BackendError::Status {
                    status: StatusCode::NOT_FOUND.as_u16(),
                    message: "product collection not found".to_string(),
                })?;

            let fetched = page.documents.len() as u64;
            products.extend(page.documents.into_iter().filter_map(usable_product));

            offset += fetched;
            if fetched == 0 || offset >= page.total || offset >= MAX_CATALOG_DOCUMENTS {
                break;
            }
        }

        Ok(products)
    }
}

/// Decode a product document, logging and dropping it when malformed.
fn usable_product(doc: serde_json::Value) -> Option<Product> {
    serde_json::from_value::<ProductDocument>(doc)
        .map_err(BackendError::Parse)
        .and_then(Product::try_from)
        .inspect_err(|e| tracing::warn!(error = %e, "Skipping malformed product document"))
        .ok()
}

#[async_trait]
impl ProductStore for BackendClient {
    #[instrument(skip_all, fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(Product::clone(&product)));
        }

        let url = format!(
            "{}/{}",
            self.inner.documents_url,
            urlencoding::encode(id.as_str())
        );
        let Some(doc) = self
            .execute::<serde_json::Value>(self.server_request(&url))
            .await?
        else {
            debug!("Product not found");
            return Ok(None);
        };

        // A malformed document reads as a missing product
        let Some(product) = usable_product(doc) else {
            return Ok(None);
        };
        self.inner
            .cache
            .insert(key, CacheValue::Product(Arc::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Catalog(products)) = self.inner.cache.get(&CacheKey::Catalog).await
        {
            debug!("Cache hit for catalog");
            return Ok(Vec::clone(&products));
        }

        let products = self.fetch_catalog().await?;
        debug!(count = products.len(), "Fetched catalog");

        self.inner
            .cache
            .insert(
                CacheKey::Catalog,
                CacheValue::Catalog(Arc::new(products.clone())),
            )
            .await;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), BackendError> {
        let url = self.page_url(1, 0)?;
        self.execute::<DocumentList<serde_json::Value>>(self.server_request(url.as_str()))
            .await?
            .map(|_| ())
            .ok_or_else(|| BackendError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: "product collection not found".to_string(),
            })
    }
}

#[async_trait]
impl IdentityProvider for BackendClient {
    #[instrument(skip_all)]
    async fn verify_session(
        &self,
        secret: &SecretString,
    ) -> Result<Option<CurrentCustomer>, BackendError> {
        let request = self
            .inner
            .client
            .get(format!("{}/account", self.inner.endpoint))
            .header(PROJECT_HEADER, &self.inner.project_id)
            .header(SESSION_HEADER, secret.expose_secret());

        match self.execute::<AccountDocument>(request).await {
            Ok(account) => Ok(account.map(CurrentCustomer::from)),
            // Unknown or expired sessions are rejected with 401
            Err(BackendError::Status { status: 401, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> BackendClient {
        BackendClient::new(&BackendConfig {
            endpoint: Url::parse("https://backend.test/v1/").unwrap(),
            project_id: "rxshop".to_string(),
            api_key: SecretString::from("k3y"),
            database_id: "main".to_string(),
            products_collection_id: "products".to_string(),
        })
    }

    #[test]
    fn test_documents_url() {
        assert_eq!(
            client().inner.documents_url,
            "https://backend.test/v1/databases/main/collections/products/documents"
        );
    }

    #[test]
    fn test_usable_product_drops_malformed_documents() {
        let product = usable_product(serde_json::json!({
            "$id": "loratadine-10",
            "name": "Loratadine 10mg",
            "category": "Allergy",
            "price": 7.25
        }))
        .unwrap();
        assert_eq!(product.id.as_str(), "loratadine-10");

        // Missing name
        assert!(usable_product(serde_json::json!({ "$id": "x", "price": 1 })).is_none());
        // Negative price
        assert!(
            usable_product(serde_json::json!({ "$id": "x", "name": "X", "price": -3 })).is_none()
        );
    }

    #[test]
    fn test_page_url_encodes_queries() {
        let url = client().page_url(100, 200).unwrap();
        let queries: Vec<String> = url
            .query_pairs()
            .filter(|(k, _)| k == "queries[]")
            .map(|(_, v)| v.into_owned())
            .collect();

        assert_eq!(
            queries,
            [
                r#"{"method":"limit","values":[100]}"#,
                r#"{"method":"offset","values":[200]}"#
            ]
        );
    }
}

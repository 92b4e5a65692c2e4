//! HTTP client for the Shopify Admin REST API.
//!
//! Read-only and scoped to the four lookups the catalog builder needs. Every
//! request carries the `X-Shopify-Access-Token` header and is retried with
//! exponential backoff on 429 and network failures.

use std::time::Duration;

use fuelcart_core::AdminApiConfig;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::CatalogError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{
    AdminCollect, AdminCollection, AdminProduct, CollectsResponse, CustomCollectionsResponse,
    ProductsResponse, SmartCollectionsResponse,
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Retry and transport settings shared by every admin request.
#[derive(Debug, Clone)]
pub struct AdminClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

pub struct AdminClient {
    client: Client,
    base_url: Url,
    access_token: String,
    store: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

/// Build `https://{store}/admin/api/{version}/` from a bare store host.
///
/// Tolerates a scheme prefix and trailing slash on `store`.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidStoreUrl`] if the result does not parse.
pub fn admin_base_url(store: &str, api_version: &str) -> Result<Url, CatalogError> {
    let host = store
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    let raw = format!("https://{host}/admin/api/{}/", api_version.trim());
    Url::parse(&raw).map_err(|e| CatalogError::InvalidStoreUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

impl AdminClient {
    /// Creates a client for the store and API version in `admin`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidStoreUrl`] for an unusable store host, or
    /// [`CatalogError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(admin: &AdminApiConfig, options: &AdminClientOptions) -> Result<Self, CatalogError> {
        let base_url = admin_base_url(&admin.store, &admin.api_version)?;
        Self::with_base_url(base_url.as_str(), &admin.access_token, options)
    }

    /// Creates a client rooted at an arbitrary admin API prefix (for testing
    /// with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidStoreUrl`] if `base_url` does not parse,
    /// or [`CatalogError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        access_token: &str,
        options: &AdminClientOptions,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&options.user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidStoreUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let store = base_url.host_str().unwrap_or_default().to_string();

        Ok(Self {
            client,
            base_url,
            access_token: access_token.to_owned(),
            store,
            max_retries: options.max_retries,
            backoff_base_secs: options.backoff_base_secs,
        })
    }

    /// Looks a product up by handle. `None` when no product has that handle.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and deserialization failures.
    pub async fn product_by_handle(&self, handle: &str) -> Result<Option<AdminProduct>, CatalogError> {
        let response: ProductsResponse = self.get_json("products.json", &[("handle", handle)]).await?;
        Ok(response.products.into_iter().next())
    }

    /// # Errors
    ///
    /// Propagates transport, status, and deserialization failures.
    pub async fn custom_collection_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<AdminCollection>, CatalogError> {
        let response: CustomCollectionsResponse = self
            .get_json("custom_collections.json", &[("handle", handle)])
            .await?;
        Ok(response.custom_collections.into_iter().next())
    }

    /// # Errors
    ///
    /// Propagates transport, status, and deserialization failures.
    pub async fn smart_collection_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<AdminCollection>, CatalogError> {
        let response: SmartCollectionsResponse = self
            .get_json("smart_collections.json", &[("handle", handle)])
            .await?;
        Ok(response.smart_collections.into_iter().next())
    }

    /// The first collection membership recorded for `product_id`, if any.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and deserialization failures.
    pub async fn first_collect_for_product(
        &self,
        product_id: u64,
    ) -> Result<Option<AdminCollect>, CatalogError> {
        let product_id = product_id.to_string();
        let response: CollectsResponse = self
            .get_json("collects.json", &[("product_id", &product_id), ("limit", "1")])
            .await?;
        Ok(response.collects.into_iter().next())
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CatalogError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidStoreUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = self.endpoint(path, query)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                tracing::debug!(%url, "admin API request");
                let response = self
                    .client
                    .get(url.clone())
                    .header(ACCESS_TOKEN_HEADER, &self.access_token)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        // Shopify sends fractional seconds ("2.0").
                        .and_then(|s| s.trim().split('.').next()?.parse::<u64>().ok())
                        .unwrap_or(2);
                    return Err(CatalogError::RateLimited {
                        store: self.store.clone(),
                        retry_after_secs,
                    });
                }

                if status == StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| CatalogError::Deserialize {
                    context: format!("GET {}", url.path()),
                    source: e,
                })
            }
        })
        .await
    }
}

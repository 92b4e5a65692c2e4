//! Client for the storefront cart endpoints (`cart/add.js`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::bundle::{CartAddRequest, CartItem};
use crate::error::ServiceError;
use crate::service::compact_body;

#[async_trait]
pub trait CartApi: Send + Sync {
    /// Adds `items` to the cart. Any 2xx counts as success.
    async fn add_items(&self, items: &[CartItem]) -> Result<(), ServiceError>;

    /// Where the buyer should land after a successful add.
    fn cart_url(&self) -> String;
}

pub struct ShopifyCartClient {
    client: Client,
    root: Url,
}

impl ShopifyCartClient {
    /// `store_root` is the storefront root the cart routes hang off, e.g.
    /// `https://styrkr.com/` or a localized root like `https://styrkr.com/en-gb/`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ServiceError::InvalidUrl`] if `store_root` does not parse.
    pub fn new(store_root: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", store_root.trim_end_matches('/'));
        let root = Url::parse(&normalised).map_err(|e| ServiceError::InvalidUrl {
            url: store_root.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, root })
    }

    fn route(&self, path: &str) -> Result<Url, ServiceError> {
        self.root.join(path).map_err(|e| ServiceError::InvalidUrl {
            url: format!("{}{path}", self.root),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl CartApi for ShopifyCartClient {
    async fn add_items(&self, items: &[CartItem]) -> Result<(), ServiceError> {
        let url = self.route("cart/add.js")?;
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&CartAddRequest { items })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // The error body is informational; a failed read leaves it empty.
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
            body: compact_body(&body),
        })
    }

    fn cart_url(&self) -> String {
        self.route("cart")
            .map_or_else(|_| format!("{}cart", self.root), |u| u.to_string())
    }
}

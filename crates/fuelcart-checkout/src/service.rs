//! Subscription bundle service client.
//!
//! The pipeline only sees the [`BundleService`] trait: a readiness check, a
//! validator, and the bundle-id endpoint. [`HttpBundleService`] speaks JSON
//! to a bundle service exposed over HTTP:
//!
//! | operation | request | success body |
//! |---|---|---|
//! | readiness | `GET {base}status` | any 2xx |
//! | validate | `POST {base}bundles/validate` | `{"valid": bool, "message": string?}` |
//! | bundle id | `POST {base}bundles` | `{"bundle_id": string}` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::bundle::{BundleDefinition, BundleToken};
use crate::error::ServiceError;

/// Outcome of a validation call that completed without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
}

#[async_trait]
pub trait BundleService: Send + Sync {
    /// Human-readable name used in status and timeout messages.
    fn name(&self) -> &str {
        "Bundle service"
    }

    /// `true` once the service can accept requests. Must not block for long;
    /// the pipeline polls it.
    async fn is_ready(&self) -> bool;

    async fn validate(&self, definition: &BundleDefinition) -> Result<Verdict, ServiceError>;

    async fn get_bundle_id(&self, definition: &BundleDefinition) -> Result<BundleToken, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BundleIdResponse {
    bundle_id: String,
}

pub struct HttpBundleService {
    client: Client,
    base_url: Url,
}

impl HttpBundleService {
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ServiceError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Trailing slash so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ServiceError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url.join(path).map_err(|e| ServiceError::InvalidUrl {
            url: format!("{}{path}", self.base_url),
            reason: e.to_string(),
        })
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        definition: &BundleDefinition,
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(definition)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ServiceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: compact_body(&body),
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| ServiceError::Deserialize {
            context: format!("POST {url}"),
            source: e,
        })
    }
}

#[async_trait]
impl BundleService for HttpBundleService {
    async fn is_ready(&self) -> bool {
        let Ok(url) = self.endpoint("status") else {
            return false;
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "bundle service readiness check failed");
                false
            }
        }
    }

    async fn validate(&self, definition: &BundleDefinition) -> Result<Verdict, ServiceError> {
        let response: ValidateResponse = self.post_json("bundles/validate", definition).await?;
        Ok(if response.valid {
            Verdict::Valid
        } else {
            Verdict::Invalid(response.message.unwrap_or_else(|| "no reason given".to_string()))
        })
    }

    async fn get_bundle_id(&self, definition: &BundleDefinition) -> Result<BundleToken, ServiceError> {
        let response: BundleIdResponse = self.post_json("bundles", definition).await?;
        let token = response.bundle_id.trim();
        if token.is_empty() {
            return Err(ServiceError::Rejected(
                "bundle service returned an empty bundle id".to_string(),
            ));
        }
        Ok(BundleToken(token.to_string()))
    }
}

/// Re-serialize JSON bodies compactly; pass anything else through trimmed.
pub(crate) fn compact_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .map_or_else(|_| body.trim().to_string(), |v| v.to_string())
}

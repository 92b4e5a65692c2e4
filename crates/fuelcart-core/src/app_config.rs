use std::path::PathBuf;

/// Connection settings for the Shopify Admin API, used only by the catalog builder.
#[derive(Clone)]
pub struct AdminApiConfig {
    /// Store host, e.g. `styrkr.myshopify.com`.
    pub store: String,
    pub access_token: String,
    pub api_version: String,
}

impl std::fmt::Debug for AdminApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiConfig")
            .field("store", &self.store)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub packs_path: PathBuf,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Storefront root that cart endpoints are resolved against. Always ends with `/`.
    pub store_root: String,
    pub bundle_service_url: Option<String>,
    pub ready_poll_interval_ms: u64,
    pub ready_timeout_ms: u64,
    /// `None` unless both `SHOPIFY_STORE` and `SHOPIFY_TOKEN` are set.
    pub admin: Option<AdminApiConfig>,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

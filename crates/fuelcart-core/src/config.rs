use crate::app_config::{AdminApiConfig, AppConfig};
use crate::ConfigError;

pub(crate) const DEFAULT_API_VERSION: &str = "2025-10";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let catalog_path = PathBuf::from(or_default("FUELCART_CATALOG_PATH", "./config/catalog.yaml"));
    let packs_path = PathBuf::from(or_default("FUELCART_PACKS_PATH", "./config/packs.yaml"));
    let log_level = or_default("FUELCART_LOG_LEVEL", "info");
    let http_timeout_secs = parse_u64("FUELCART_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("FUELCART_USER_AGENT", "fuelcart/0.1 (bundle-checkout)");
    let store_root = normalize_store_root(&or_default("FUELCART_STORE_ROOT", "http://localhost:9292/"));
    let bundle_service_url = optional("FUELCART_BUNDLE_SERVICE_URL");

    let ready_poll_interval_ms = parse_u64("FUELCART_READY_POLL_MS", "100")?;
    if ready_poll_interval_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FUELCART_READY_POLL_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let ready_timeout_ms = parse_u64("FUELCART_READY_TIMEOUT_MS", "8000")?;

    let admin = match (optional("SHOPIFY_STORE"), optional("SHOPIFY_TOKEN")) {
        (Some(store), Some(access_token)) => Some(AdminApiConfig {
            store,
            access_token,
            api_version: or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
        }),
        _ => None,
    };

    let max_retries = parse_u32("FUELCART_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("FUELCART_RETRY_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        catalog_path,
        packs_path,
        log_level,
        http_timeout_secs,
        user_agent,
        store_root,
        bundle_service_url,
        ready_poll_interval_ms,
        ready_timeout_ms,
        admin,
        max_retries,
        retry_backoff_base_secs,
    })
}

/// Ensures the storefront root ends with exactly one `/` so `cart/add.js`
/// joins onto it rather than replacing the last path segment.
fn normalize_store_root(raw: &str) -> String {
    format!("{}/", raw.trim().trim_end_matches('/'))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

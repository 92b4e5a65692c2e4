use thiserror::Error;

/// Errors from the HTTP clients that talk to the bundle service and the cart.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        /// Response body, re-serialized compactly when it was JSON.
        body: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{0}")]
    Rejected(String),
}

/// Terminal failure reasons for one checkout attempt.
///
/// A validator that errors out is only a warning; a validator that answers
/// with a rejection is [`CheckoutError::ValidationRejected`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("No bundle lines to add.")]
    EmptyInput,

    #[error("Catalog not configured: {0}")]
    Configuration(String),

    #[error("{dependency} not available after {timeout_ms}ms. Is it reachable from this storefront?")]
    DependencyTimeout { dependency: String, timeout_ms: u64 },

    #[error("Could not map any pack selection to Shopify variants. Check the identifier catalog.")]
    NoValidSelections,

    #[error("Bundle validation failed: {reason}")]
    ValidationRejected { reason: String },

    #[error("Bundle id request failed: {reason}. Check the collection/product/variant ids in the catalog.")]
    TokenAcquisition { reason: String },

    #[error("Cart add failed (HTTP {status}). {detail}")]
    CartSubmission { status: u16, detail: String },

    #[error("Cart add failed: {reason}")]
    CartUnreachable { reason: String },

    #[error("A checkout is already in progress.")]
    Busy,

    #[error("Checkout cancelled.")]
    Cancelled,
}

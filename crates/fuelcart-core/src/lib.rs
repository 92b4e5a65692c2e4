pub mod app_config;
pub mod catalog;
pub mod config;
pub mod lines;
pub mod packs;
pub mod prefill;

pub use app_config::{AdminApiConfig, AppConfig};
pub use catalog::{
    load_catalog, parse_catalog, BundleParent, Catalog, CatalogAudit, CatalogEntry, ExternalId,
    SENTINEL_NOT_FOUND, SENTINEL_UNSET,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use lines::PackLine;
pub use packs::{load_packs, PackDefinition, PacksFile};
pub use prefill::PrefillPayload;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    FileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid pack line \"{input}\": {reason}")]
    InvalidPackLine { input: String, reason: String },

    #[error("invalid prefill payload: {0}")]
    InvalidPrefill(String),
}

//! Catalog builder: resolves pack definitions into Shopify identifiers via the
//! Admin REST API and writes the identifier catalog artifact.

pub mod admin;
pub mod builder;
pub mod error;
pub mod matcher;
pub(crate) mod rate_limit;
pub mod types;

pub use admin::{admin_base_url, AdminClient, AdminClientOptions};
pub use builder::{render_catalog, write_catalog, BuildReport, CatalogBuilder, PackOutcome};
pub use error::CatalogError;
pub use matcher::{match_variant, VariantMatch, VariantStrategy, DEFAULT_STRATEGIES};

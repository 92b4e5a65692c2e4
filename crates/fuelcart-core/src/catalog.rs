//! Identifier catalog: maps internal pack keys to Shopify identifiers.
//!
//! The catalog is a human-editable YAML document produced by the catalog
//! builder and loaded once as immutable configuration:
//!
//! ```yaml
//! bundle_product_id: "7134322196677"
//! bundle_variant_id: "41291293425861"
//! bundle_selling_plan: FILL_ME_IN
//! packs:
//!   MIX60_6:
//!     variant_id: "41291293425900"
//!     product_id: "7134322196000"
//!     collection_id: "281234567890"
//! ```
//!
//! Every identifier is either a plain numeric string (no `gid://` prefix) or
//! one of the sentinels [`SENTINEL_UNSET`] / [`SENTINEL_NOT_FOUND`]. Sentinel
//! values are valid runtime states and are never handed to external services:
//! [`ExternalId::resolved`] is the only way to read an identifier out.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder for a value nobody has filled in yet.
pub const SENTINEL_UNSET: &str = "FILL_ME_IN";

/// Placeholder written by the catalog builder when a lookup came back empty.
pub const SENTINEL_NOT_FOUND: &str = "NOT_FOUND";

/// A Shopify numeric identifier, or a sentinel marking it unresolved.
///
/// Deserializes from either a string or a bare YAML integer, since hand-edited
/// catalogs often drop the quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId")]
#[serde(into = "String")]
pub struct ExternalId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for ExternalId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

impl ExternalId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn unset() -> Self {
        Self(SENTINEL_UNSET.to_string())
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self(SENTINEL_NOT_FOUND.to_string())
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        let v = self.0.trim();
        v.is_empty() || v == SENTINEL_UNSET || v == SENTINEL_NOT_FOUND
    }

    /// The identifier value, or `None` if it is a sentinel.
    #[must_use]
    pub fn resolved(&self) -> Option<&str> {
        if self.is_sentinel() {
            None
        } else {
            Some(self.0.trim())
        }
    }

    /// Raw value including sentinels. For display and serialization only.
    #[must_use]
    pub fn as_raw(&self) -> &str {
        &self.0
    }

    fn is_well_formed(&self) -> bool {
        self.is_sentinel() || self.0.trim().bytes().all(|b| b.is_ascii_digit())
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub variant_id: ExternalId,
    pub product_id: ExternalId,
    pub collection_id: ExternalId,
}

impl CatalogEntry {
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            variant_id: ExternalId::not_found(),
            product_id: ExternalId::not_found(),
            collection_id: ExternalId::not_found(),
        }
    }

    /// `true` when all three identifiers carry real values.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.variant_id.is_sentinel()
            && !self.product_id.is_sentinel()
            && !self.collection_id.is_sentinel()
    }
}

/// The purchasable container product that carries an arbitrary pack mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleParent {
    pub product_id: ExternalId,
    pub variant_id: ExternalId,
    pub selling_plan_id: ExternalId,
}

impl BundleParent {
    /// Product and variant are both resolved. The selling plan is optional.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.product_id.is_sentinel() && !self.variant_id.is_sentinel()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub bundle_product_id: ExternalId,
    pub bundle_variant_id: ExternalId,
    pub bundle_selling_plan: ExternalId,
    #[serde(default)]
    pub packs: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// A catalog with every bundle-parent field unset and no packs.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            bundle_product_id: ExternalId::unset(),
            bundle_variant_id: ExternalId::unset(),
            bundle_selling_plan: ExternalId::unset(),
            packs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn lookup(&self, pack_key: &str) -> Option<&CatalogEntry> {
        self.packs.get(pack_key)
    }

    #[must_use]
    pub fn bundle_parent(&self) -> BundleParent {
        BundleParent {
            product_id: self.bundle_product_id.clone(),
            variant_id: self.bundle_variant_id.clone(),
            selling_plan_id: self.bundle_selling_plan.clone(),
        }
    }

    /// Summarize which parts of the catalog still hold sentinel values.
    #[must_use]
    pub fn audit(&self) -> CatalogAudit {
        let parent = self.bundle_parent();
        let unresolved_packs = self
            .packs
            .iter()
            .filter(|(_, entry)| !entry.is_resolved())
            .map(|(key, _)| key.clone())
            .collect();

        CatalogAudit {
            parent_configured: parent.is_configured(),
            selling_plan_configured: !parent.selling_plan_id.is_sentinel(),
            pack_count: self.packs.len(),
            unresolved_packs,
        }
    }

    /// Serialize to the YAML artifact format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogAudit {
    pub parent_configured: bool,
    pub selling_plan_configured: bool,
    pub pack_count: usize,
    pub unresolved_packs: Vec<String>,
}

impl CatalogAudit {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.parent_configured && self.selling_plan_configured && self.unresolved_packs.is_empty()
    }
}

/// Load and validate the identifier catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let catalog = parse_catalog(&content, &path.display().to_string())?;

    let audit = catalog.audit();
    tracing::debug!(
        path = %path.display(),
        packs = audit.pack_count,
        unresolved = audit.unresolved_packs.len(),
        "loaded identifier catalog"
    );
    if !audit.parent_configured {
        tracing::warn!(path = %path.display(), "bundle parent ids are not configured");
    }

    Ok(catalog)
}

/// Parse and validate catalog YAML. `origin` is used in error messages only.
///
/// # Errors
///
/// Returns `ConfigError` if the document cannot be parsed or fails validation.
pub fn parse_catalog(content: &str, origin: &str) -> Result<Catalog, ConfigError> {
    let catalog: Catalog = serde_yaml::from_str(content).map_err(|e| ConfigError::FileParse {
        path: origin.to_string(),
        source: e,
    })?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    let parent_fields = [
        ("bundle_product_id", &catalog.bundle_product_id),
        ("bundle_variant_id", &catalog.bundle_variant_id),
        ("bundle_selling_plan", &catalog.bundle_selling_plan),
    ];
    for (field, id) in parent_fields {
        check_id(field, id)?;
    }

    for (key, entry) in &catalog.packs {
        if key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pack key must be non-empty".to_string(),
            ));
        }
        check_id(&format!("packs.{key}.variant_id"), &entry.variant_id)?;
        check_id(&format!("packs.{key}.product_id"), &entry.product_id)?;
        check_id(&format!("packs.{key}.collection_id"), &entry.collection_id)?;
    }

    Ok(())
}

fn check_id(field: &str, id: &ExternalId) -> Result<(), ConfigError> {
    if id.is_well_formed() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field} must be a numeric id or {SENTINEL_UNSET}, got '{id}'"
        )))
    }
}

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Describes where a pack lives in the Shopify catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackDefinition {
    pub pack_key: String,
    /// Handle of the Shopify product that owns the pack variant.
    pub product_handle: String,
    /// Text identifying the pack variant, e.g. `"12 pack"` or `"Tube of 12"`.
    pub pack_option: String,
    /// Bundle-builder collection handle. When absent the builder falls back
    /// to the first collection the product is collected into.
    #[serde(default)]
    pub collection_handle: Option<String>,
}

fn default_bundle_handle() -> String {
    "build-your-own-bundle".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacksFile {
    #[serde(default = "default_bundle_handle")]
    pub bundle_product_handle: String,
    pub packs: Vec<PackDefinition>,
}

/// Load and validate pack definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_packs(path: &Path) -> Result<PacksFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let packs_file: PacksFile =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::FileParse {
            path: path.display().to_string(),
            source: e,
        })?;

    validate_packs(&packs_file)?;

    Ok(packs_file)
}

fn validate_packs(packs_file: &PacksFile) -> Result<(), ConfigError> {
    if packs_file.bundle_product_handle.trim().is_empty() {
        return Err(ConfigError::Validation(
            "bundle_product_handle must be non-empty".to_string(),
        ));
    }

    let mut seen_keys = HashSet::new();

    for pack in &packs_file.packs {
        if pack.pack_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pack_key must be non-empty".to_string(),
            ));
        }

        if pack.product_handle.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "pack '{}' has an empty product_handle",
                pack.pack_key
            )));
        }

        if pack.pack_option.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "pack '{}' has an empty pack_option",
                pack.pack_key
            )));
        }

        if !seen_keys.insert(pack.pack_key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate pack key: '{}'",
                pack.pack_key
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(key: &str) -> PackDefinition {
        PackDefinition {
            pack_key: key.to_string(),
            product_handle: "mix60-dual-carb-drink".to_string(),
            pack_option: "6 pack".to_string(),
            collection_handle: Some("byob-energy-drink-powders".to_string()),
        }
    }

    fn file(packs: Vec<PackDefinition>) -> PacksFile {
        PacksFile {
            bundle_product_handle: default_bundle_handle(),
            packs,
        }
    }

    #[test]
    fn validate_accepts_unique_packs() {
        assert!(validate_packs(&file(vec![pack("MIX60_6"), pack("MIX60_12")])).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_key() {
        let err = validate_packs(&file(vec![pack("MIX60_6"), pack("MIX60_6")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")));
    }

    #[test]
    fn validate_rejects_empty_handle() {
        let mut p = pack("BAR50_6");
        p.product_handle = " ".to_string();
        let err = validate_packs(&file(vec![p])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("BAR50_6")));
    }

    #[test]
    fn validate_rejects_empty_pack_option() {
        let mut p = pack("BAR50_6");
        p.pack_option = String::new();
        assert!(validate_packs(&file(vec![p])).is_err());
    }

    #[test]
    fn collection_handle_is_optional_and_bundle_handle_defaults() {
        let yaml = r"
packs:
  - pack_key: GEL50_12
    product_handle: gel50-dual-carb-energy-gel-citrus-fruits-copy
    pack_option: 12 pack
";
        let parsed: PacksFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.bundle_product_handle, "build-your-own-bundle");
        assert_eq!(parsed.packs[0].collection_handle, None);
    }

    #[test]
    fn bundled_packs_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/packs.yaml");
        let packs = load_packs(&path).expect("config/packs.yaml should load");
        assert_eq!(packs.packs.len(), 23);
        assert!(packs.packs.iter().any(|p| p.pack_key == "MIX60_6"));
    }
}

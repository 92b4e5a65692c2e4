//! Shopify Admin REST API response types.
//!
//! Only the fields the catalog builder reads are modelled. Variants keep every
//! other field in [`AdminVariant::extra`] because the fallback matcher searches
//! all string-valued fields (`option1`, `sku`, ...) for the pack option text.

use serde::Deserialize;
use serde_json::{Map, Value};

/// `GET /products.json?handle=...`
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<AdminProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminProduct {
    pub id: u64,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub variants: Vec<AdminVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminVariant {
    pub id: u64,
    /// Display title, e.g. `"Citrus / 12 pack"`. Null on some legacy variants.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdminVariant {
    /// Every string-valued field on the variant, title included.
    pub fn string_fields(&self) -> impl Iterator<Item = &str> {
        self.title
            .as_deref()
            .into_iter()
            .chain(self.extra.values().filter_map(Value::as_str))
    }
}

/// `GET /custom_collections.json?handle=...`
#[derive(Debug, Deserialize)]
pub struct CustomCollectionsResponse {
    #[serde(default)]
    pub custom_collections: Vec<AdminCollection>,
}

/// `GET /smart_collections.json?handle=...`
#[derive(Debug, Deserialize)]
pub struct SmartCollectionsResponse {
    #[serde(default)]
    pub smart_collections: Vec<AdminCollection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminCollection {
    pub id: u64,
    #[serde(default)]
    pub handle: String,
}

/// `GET /collects.json?product_id=...&limit=1`
#[derive(Debug, Deserialize)]
pub struct CollectsResponse {
    #[serde(default)]
    pub collects: Vec<AdminCollect>,
}

/// Membership of a product in a custom collection.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminCollect {
    pub collection_id: u64,
    #[serde(default)]
    pub product_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_keeps_unmodelled_fields() {
        let variant: AdminVariant = serde_json::from_value(serde_json::json!({
            "id": 41291293425900_u64,
            "title": "Citrus",
            "option1": "Citrus",
            "option2": "12 pack",
            "sku": "BAR50-12",
            "position": 2,
            "price": "24.00"
        }))
        .unwrap();

        let fields: Vec<&str> = variant.string_fields().collect();
        assert_eq!(fields[0], "Citrus");
        assert!(fields.contains(&"12 pack"));
        assert!(fields.contains(&"BAR50-12"));
        assert!(!variant.extra.contains_key("id"));
    }

    #[test]
    fn null_title_is_tolerated() {
        let variant: AdminVariant =
            serde_json::from_value(serde_json::json!({"id": 1, "title": null})).unwrap();
        assert_eq!(variant.string_fields().count(), 0);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let products: ProductsResponse = serde_json::from_str("{}").unwrap();
        assert!(products.products.is_empty());
        let collects: CollectsResponse = serde_json::from_str("{}").unwrap();
        assert!(collects.collects.is_empty());
    }
}

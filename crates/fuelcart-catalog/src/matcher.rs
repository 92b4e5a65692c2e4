//! Ranked strategies for picking the pack variant out of a product.
//!
//! Pack options are free text (`"12 pack"`, `"Tube of 12"`, `"556g tub"`) and
//! merchants are inconsistent about where they put them, so the builder tries
//! progressively looser strategies and records which one hit.

use crate::types::{AdminProduct, AdminVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStrategy {
    /// Variant title contains the option text, case-insensitively.
    TitleContains,
    /// Any string-valued variant field contains the option text.
    AnyFieldContains,
    /// The product's first variant, whatever it is.
    FirstVariant,
}

/// Strongest first.
pub const DEFAULT_STRATEGIES: [VariantStrategy; 3] = [
    VariantStrategy::TitleContains,
    VariantStrategy::AnyFieldContains,
    VariantStrategy::FirstVariant,
];

impl VariantStrategy {
    /// Returns the first variant this strategy accepts. `needle` must already
    /// be lowercased.
    #[must_use]
    pub fn find<'a>(self, variants: &'a [AdminVariant], needle: &str) -> Option<&'a AdminVariant> {
        match self {
            Self::TitleContains => variants.iter().find(|v| {
                v.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(needle))
            }),
            Self::AnyFieldContains => variants.iter().find(|v| {
                v.string_fields()
                    .any(|field| field.to_lowercase().contains(needle))
            }),
            Self::FirstVariant => variants.first(),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::TitleContains => "title",
            Self::AnyFieldContains => "any-field",
            Self::FirstVariant => "first-variant",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VariantMatch<'a> {
    pub variant: &'a AdminVariant,
    pub strategy: VariantStrategy,
}

/// Runs `strategies` in order and returns the first hit.
#[must_use]
pub fn match_variant<'a>(
    strategies: &[VariantStrategy],
    product: &'a AdminProduct,
    pack_option: &str,
) -> Option<VariantMatch<'a>> {
    let needle = pack_option.trim().to_lowercase();
    strategies.iter().find_map(|&strategy| {
        strategy
            .find(&product.variants, &needle)
            .map(|variant| VariantMatch { variant, strategy })
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn variant(value: serde_json::Value) -> AdminVariant {
        serde_json::from_value(value).unwrap()
    }

    fn product(variants: Vec<AdminVariant>) -> AdminProduct {
        AdminProduct {
            id: 7_134_322_196_000,
            handle: "bar50-variety-pack-energy-bars".to_string(),
            title: "BAR50 Variety Pack".to_string(),
            variants,
        }
    }

    #[test]
    fn title_contains_is_case_insensitive() {
        let variants = vec![
            variant(json!({"id": 1, "title": "6 Pack"})),
            variant(json!({"id": 2, "title": "12 Pack"})),
        ];
        let hit = VariantStrategy::TitleContains.find(&variants, "12 pack").unwrap();
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn title_contains_misses_when_option_lives_elsewhere() {
        let variants = vec![variant(json!({"id": 1, "title": "Citrus", "option2": "12 pack"}))];
        assert!(VariantStrategy::TitleContains.find(&variants, "12 pack").is_none());
    }

    #[test]
    fn any_field_contains_searches_options() {
        let variants = vec![
            variant(json!({"id": 1, "title": "Citrus", "option2": "6 pack"})),
            variant(json!({"id": 2, "title": "Citrus", "option2": "12 pack"})),
        ];
        let hit = VariantStrategy::AnyFieldContains.find(&variants, "12 pack").unwrap();
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn any_field_contains_ignores_non_string_fields() {
        let variants = vec![variant(json!({"id": 1, "title": "Default", "grams": 12}))];
        assert!(VariantStrategy::AnyFieldContains.find(&variants, "12").is_none());
    }

    #[test]
    fn first_variant_takes_the_head() {
        let variants = vec![
            variant(json!({"id": 9, "title": "Default Title"})),
            variant(json!({"id": 10, "title": "Other"})),
        ];
        assert_eq!(VariantStrategy::FirstVariant.find(&variants, "anything").unwrap().id, 9);
        assert!(VariantStrategy::FirstVariant.find(&[], "anything").is_none());
    }

    #[test]
    fn ranking_prefers_title_over_other_fields() {
        // The first variant mentions "box of 3" only in its sku; the second in its title.
        let p = product(vec![
            variant(json!({"id": 1, "title": "Tube of 12", "sku": "SLT07-box of 3"})),
            variant(json!({"id": 2, "title": "Box of 3"})),
        ]);
        let hit = match_variant(&DEFAULT_STRATEGIES, &p, "Box of 3").unwrap();
        assert_eq!(hit.variant.id, 2);
        assert_eq!(hit.strategy, VariantStrategy::TitleContains);
    }

    #[test]
    fn ranking_falls_back_to_first_variant() {
        let p = product(vec![
            variant(json!({"id": 5, "title": "Default Title"})),
            variant(json!({"id": 6, "title": "Other"})),
        ]);
        let hit = match_variant(&DEFAULT_STRATEGIES, &p, "Box (30 servings)").unwrap();
        assert_eq!(hit.variant.id, 5);
        assert_eq!(hit.strategy, VariantStrategy::FirstVariant);
    }

    #[test]
    fn product_without_variants_has_no_match() {
        assert!(match_variant(&DEFAULT_STRATEGIES, &product(Vec::new()), "6 pack").is_none());
    }

    #[test]
    fn custom_strategy_list_can_disable_fallback() {
        let p = product(vec![variant(json!({"id": 5, "title": "Default Title"}))]);
        let strict = [VariantStrategy::TitleContains, VariantStrategy::AnyFieldContains];
        assert!(match_variant(&strict, &p, "6 pack").is_none());
    }
}

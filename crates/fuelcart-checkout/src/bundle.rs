//! Wire types for the bundle service and cart, and the pure steps that build them.

use fuelcart_core::{BundleParent, Catalog, PackLine};
use serde::{Deserialize, Serialize};

/// One resolved pack inside a bundle definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub collection_id: String,
    pub external_product_id: String,
    pub external_variant_id: String,
    pub quantity: u32,
}

/// Bundle definition sent to the bundle service. Built fresh for every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDefinition {
    pub external_product_id: String,
    pub external_variant_id: String,
    pub selections: Vec<Selection>,
}

/// Opaque bundle id returned by the bundle service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleToken(pub String);

impl BundleToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BundleToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemProperties {
    #[serde(rename = "_rb_id")]
    pub bundle_token: BundleToken,
}

/// Literal line item posted to `cart/add.js`.
///
/// `quantity` is always 1: the pack mix lives inside the bundle token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub quantity: u32,
    pub properties: CartItemProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_plan: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CartAddRequest<'a> {
    pub(crate) items: &'a [CartItem],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No catalog entry for the pack key.
    Missing,
    /// Entry exists but holds sentinel identifiers.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub pack_key: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub selections: Vec<Selection>,
    pub skipped: Vec<SkippedLine>,
}

/// Resolve each line with `qty > 0` against the catalog.
///
/// Absent and sentinel-valued entries are skipped, never submitted.
#[must_use]
pub fn resolve_selections(catalog: &Catalog, lines: &[PackLine]) -> Resolution {
    let mut resolution = Resolution::default();

    for line in lines.iter().filter(|l| l.qty > 0) {
        let Some(entry) = catalog.lookup(&line.pack_key) else {
            resolution.skipped.push(SkippedLine {
                pack_key: line.pack_key.clone(),
                reason: SkipReason::Missing,
            });
            continue;
        };

        match (
            entry.collection_id.resolved(),
            entry.product_id.resolved(),
            entry.variant_id.resolved(),
        ) {
            (Some(collection_id), Some(product_id), Some(variant_id)) => {
                resolution.selections.push(Selection {
                    collection_id: collection_id.to_string(),
                    external_product_id: product_id.to_string(),
                    external_variant_id: variant_id.to_string(),
                    quantity: line.qty,
                });
            }
            _ => resolution.skipped.push(SkippedLine {
                pack_key: line.pack_key.clone(),
                reason: SkipReason::Unresolved,
            }),
        }
    }

    resolution
}

/// Wrap resolved selections under the bundle parent.
///
/// Returns `None` if the parent product or variant is still a sentinel.
#[must_use]
pub fn build_definition(parent: &BundleParent, selections: Vec<Selection>) -> Option<BundleDefinition> {
    Some(BundleDefinition {
        external_product_id: parent.product_id.resolved()?.to_string(),
        external_variant_id: parent.variant_id.resolved()?.to_string(),
        selections,
    })
}

/// Outcome of [`build_cart_item`]: the item and whether a requested
/// subscription had to be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemPlan {
    pub item: CartItem,
    pub downgraded: bool,
}

/// Build the parent-variant cart line carrying `token`.
///
/// With `subscribe` set, the selling plan is attached when resolved. An
/// unresolved plan downgrades to a one-time purchase instead of failing.
#[must_use]
pub fn build_cart_item(
    parent_variant_id: &str,
    token: BundleToken,
    subscribe: bool,
    parent: &BundleParent,
) -> CartItemPlan {
    let selling_plan = if subscribe {
        parent
            .selling_plan_id
            .resolved()
            .and_then(|id| id.parse::<u64>().ok())
    } else {
        None
    };

    CartItemPlan {
        downgraded: subscribe && selling_plan.is_none(),
        item: CartItem {
            id: parent_variant_id.to_string(),
            quantity: 1,
            properties: CartItemProperties {
                bundle_token: token,
            },
            selling_plan,
        },
    }
}

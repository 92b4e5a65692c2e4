//! Resolves the identifier catalog from pack definitions via the Admin API.
//!
//! One pass over the pack definitions:
//!
//! 1. Bundle parent product by handle. Its first variant becomes the parent
//!    variant. A missing parent product aborts the build.
//! 2. Per pack: product by handle, variant by [`match_variant`], collection by
//!    handle (custom collections first, then smart collections) or, when the
//!    pack names no collection, the product's first collect.
//! 3. Anything that could not be resolved is written as `NOT_FOUND`. The
//!    selling plan is never available from the Admin API and stays
//!    `FILL_ME_IN`.
//!
//! Products and collections are cached by handle for the duration of a build.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use fuelcart_core::{Catalog, CatalogEntry, ExternalId, PackDefinition, PacksFile};

use crate::admin::AdminClient;
use crate::error::CatalogError;
use crate::matcher::{match_variant, VariantStrategy, DEFAULT_STRATEGIES};
use crate::types::AdminProduct;

/// How one pack definition was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOutcome {
    pub pack_key: String,
    pub entry: CatalogEntry,
    /// `None` when the product was missing or had no variants.
    pub strategy: Option<VariantStrategy>,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub catalog: Catalog,
    pub outcomes: Vec<PackOutcome>,
}

impl BuildReport {
    /// Pack keys with at least one `NOT_FOUND` identifier, in definition order.
    #[must_use]
    pub fn unresolved_packs(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.entry.is_resolved())
            .map(|o| o.pack_key.as_str())
            .collect()
    }

    /// Packs whose variant was picked by a fallback rather than a title match.
    #[must_use]
    pub fn fallback_matches(&self) -> Vec<(&str, VariantStrategy)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o.strategy {
                Some(s) if s != VariantStrategy::TitleContains => Some((o.pack_key.as_str(), s)),
                _ => None,
            })
            .collect()
    }
}

pub struct CatalogBuilder<'a> {
    client: &'a AdminClient,
    strategies: Vec<VariantStrategy>,
    products: HashMap<String, Option<AdminProduct>>,
    collections: HashMap<String, Option<u64>>,
}

impl<'a> CatalogBuilder<'a> {
    #[must_use]
    pub fn new(client: &'a AdminClient) -> Self {
        Self {
            client,
            strategies: DEFAULT_STRATEGIES.to_vec(),
            products: HashMap::new(),
            collections: HashMap::new(),
        }
    }

    /// Replace the ranked variant strategies.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<VariantStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Resolve every pack in `packs` into a catalog.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::MissingBundleProduct`] if the bundle parent handle
    ///   matches no product.
    /// - Any admin API error. Lookups that succeed but come back empty are not
    ///   errors; they produce `NOT_FOUND` entries.
    pub async fn build(&mut self, packs: &PacksFile) -> Result<BuildReport, CatalogError> {
        let handle = packs.bundle_product_handle.as_str();
        tracing::info!(handle, "resolving bundle parent product");
        let parent = self
            .product(handle)
            .await?
            .ok_or_else(|| CatalogError::MissingBundleProduct {
                handle: handle.to_string(),
            })?;

        let mut catalog = Catalog::unconfigured();
        catalog.bundle_product_id = ExternalId::new(parent.id.to_string());
        catalog.bundle_variant_id = parent
            .variants
            .first()
            .map_or_else(ExternalId::not_found, |v| ExternalId::new(v.id.to_string()));
        tracing::info!(
            product_id = %catalog.bundle_product_id,
            variant_id = %catalog.bundle_variant_id,
            "bundle parent resolved"
        );

        let mut outcomes = Vec::with_capacity(packs.packs.len());
        for def in &packs.packs {
            let outcome = self.resolve_pack(def).await?;
            catalog
                .packs
                .insert(outcome.pack_key.clone(), outcome.entry.clone());
            outcomes.push(outcome);
        }

        Ok(BuildReport { catalog, outcomes })
    }

    async fn resolve_pack(&mut self, def: &PackDefinition) -> Result<PackOutcome, CatalogError> {
        let Some(product) = self.product(&def.product_handle).await? else {
            tracing::warn!(
                pack_key = %def.pack_key,
                handle = %def.product_handle,
                "product not found"
            );
            return Ok(PackOutcome {
                pack_key: def.pack_key.clone(),
                entry: CatalogEntry::not_found(),
                strategy: None,
            });
        };

        let matched = match_variant(&self.strategies, &product, &def.pack_option);
        let variant_id = matched.map_or_else(ExternalId::not_found, |m| {
            ExternalId::new(m.variant.id.to_string())
        });
        let strategy = matched.map(|m| m.strategy);

        let collection_id = match &def.collection_handle {
            Some(handle) => self.collection(handle).await?,
            None => self
                .client
                .first_collect_for_product(product.id)
                .await?
                .map(|c| c.collection_id),
        };

        let entry = CatalogEntry {
            variant_id,
            product_id: ExternalId::new(product.id.to_string()),
            collection_id: collection_id
                .map_or_else(ExternalId::not_found, |id| ExternalId::new(id.to_string())),
        };
        tracing::info!(
            pack_key = %def.pack_key,
            variant_id = %entry.variant_id,
            product_id = %entry.product_id,
            collection_id = %entry.collection_id,
            strategy = strategy.map_or("none", VariantStrategy::label),
            "pack resolved"
        );

        Ok(PackOutcome {
            pack_key: def.pack_key.clone(),
            entry,
            strategy,
        })
    }

    async fn product(&mut self, handle: &str) -> Result<Option<AdminProduct>, CatalogError> {
        if let Some(cached) = self.products.get(handle) {
            return Ok(cached.clone());
        }
        let product = self.client.product_by_handle(handle).await?;
        self.products.insert(handle.to_string(), product.clone());
        Ok(product)
    }

    async fn collection(&mut self, handle: &str) -> Result<Option<u64>, CatalogError> {
        if let Some(cached) = self.collections.get(handle) {
            return Ok(*cached);
        }
        let id = match self.client.custom_collection_by_handle(handle).await? {
            Some(c) => Some(c.id),
            None => self
                .client
                .smart_collection_by_handle(handle)
                .await?
                .map(|c| c.id),
        };
        if id.is_none() {
            tracing::warn!(handle, "collection not found");
        }
        self.collections.insert(handle.to_string(), id);
        Ok(id)
    }
}

/// Render the catalog artifact with a generated header comment.
///
/// # Errors
///
/// Returns [`CatalogError::Config`] if YAML serialization fails.
pub fn render_catalog(
    catalog: &Catalog,
    store: &str,
    generated_at: DateTime<Utc>,
) -> Result<String, CatalogError> {
    let body = catalog.to_yaml()?;
    Ok(format!(
        "# Identifier catalog, generated by `fuelcart build-catalog`.\n\
         # Generated: {}\n\
         # Store: {store}\n\
         #\n\
         # bundle_selling_plan: copy the Subscribe & Save selling plan id from the\n\
         # Recharge merchant portal (Subscriptions > Selling plans).\n\
         # NOT_FOUND entries could not be resolved and must be fixed by hand.\n\
         {body}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    ))
}

/// Render and write the catalog artifact to `path`.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the file cannot be written.
pub fn write_catalog(
    path: &Path,
    catalog: &Catalog,
    store: &str,
    generated_at: DateTime<Utc>,
) -> Result<(), CatalogError> {
    let rendered = render_catalog(catalog, store, generated_at)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CatalogError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    std::fs::write(path, rendered).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "catalog written");
    Ok(())
}

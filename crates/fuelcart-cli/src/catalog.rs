//! `build-catalog` and `audit-catalog` command handlers.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use fuelcart_catalog::{write_catalog, AdminClient, AdminClientOptions, CatalogBuilder};
use fuelcart_core::{load_catalog, load_packs, AppConfig, CatalogAudit};

/// Resolve every pack definition against the Admin API and write the catalog.
///
/// # Errors
///
/// Returns an error if admin credentials are missing, the pack definitions
/// cannot be loaded, any admin request fails, or the output cannot be written.
pub(crate) async fn run_build_catalog(
    config: &AppConfig,
    output: Option<PathBuf>,
    api_version: Option<String>,
) -> anyhow::Result<()> {
    let mut admin = config.admin.clone().ok_or_else(|| {
        anyhow::anyhow!("SHOPIFY_STORE and SHOPIFY_TOKEN must be set to build the catalog")
    })?;
    if let Some(version) = api_version {
        admin.api_version = version;
    }
    let output = output.unwrap_or_else(|| config.catalog_path.clone());

    let packs = load_packs(&config.packs_path)?;
    let client = AdminClient::new(
        &admin,
        &AdminClientOptions {
            timeout_secs: config.http_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        },
    )
    .context("failed to build Shopify Admin API client")?;

    println!(
        "Fetching Shopify data from {} (API {})...",
        admin.store, admin.api_version
    );
    let report = CatalogBuilder::new(&client).build(&packs).await?;
    write_catalog(&output, &report.catalog, &admin.store, Utc::now())?;
    println!("Written to {}", output.display());

    for (pack_key, strategy) in report.fallback_matches() {
        println!(
            "  note: {pack_key} variant picked by {} fallback; check it",
            strategy.label()
        );
    }

    let unresolved = report.unresolved_packs();
    if unresolved.is_empty() {
        println!("All packs resolved.");
    } else {
        println!("Packs with NOT_FOUND entries (fix manually):");
        for pack_key in unresolved {
            println!("  - {pack_key}");
        }
    }
    println!("bundle_selling_plan is left as FILL_ME_IN; copy it from the Recharge portal.");

    Ok(())
}

/// Print which parts of the catalog still need filling in.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) fn run_audit_catalog(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog(&config.catalog_path)?;
    for line in audit_lines(&catalog.audit()) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn audit_lines(audit: &CatalogAudit) -> Vec<String> {
    let mark = |ok: bool| if ok { "ok" } else { "MISSING" };
    let mut lines = vec![
        format!("bundle parent:  {}", mark(audit.parent_configured)),
        format!("selling plan:   {}", mark(audit.selling_plan_configured)),
        format!(
            "packs:          {}/{} resolved",
            audit.pack_count.saturating_sub(audit.unresolved_packs.len()),
            audit.pack_count
        ),
    ];
    lines.extend(
        audit
            .unresolved_packs
            .iter()
            .map(|key| format!("  unresolved: {key}")),
    );
    if audit.is_complete() {
        lines.push("catalog complete".to_string());
    }
    lines
}

//! `checkout` and `prefill-link` command handlers.

use std::sync::Arc;

use anyhow::Context;
use fuelcart_checkout::{
    cancel_pair, CheckoutOutcome, CheckoutPipeline, HttpBundleService, ReadinessPolicy,
    Redirector, ShopifyCartClient, StatusReporter,
};
use fuelcart_core::{load_catalog, AppConfig, PackLine, PrefillPayload};

const BUNDLE_PRODUCT_HANDLE: &str = "build-your-own-bundle";

/// Prints the redirect target instead of navigating to it.
struct PrintRedirector;

impl Redirector for PrintRedirector {
    fn redirect(&self, url: &str) {
        println!("Cart: {url}");
    }
}

fn print_status(message: &str, is_error: bool) {
    if is_error {
        eprintln!("error: {message}");
    } else {
        println!("{message}");
    }
}

/// Run one checkout attempt. Ctrl-C cancels whatever the pipeline is waiting on.
///
/// # Errors
///
/// Returns an error if the catalog or clients cannot be set up, or if the
/// attempt ends in a failure (already reported on stderr).
pub(crate) async fn run_checkout(
    config: &AppConfig,
    lines: &[PackLine],
    subscribe: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(&config.catalog_path)?;
    let service_url = config
        .bundle_service_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("FUELCART_BUNDLE_SERVICE_URL is not set"))?;

    let bundles = HttpBundleService::new(service_url, config.http_timeout_secs, &config.user_agent)
        .context("failed to build bundle service client")?;
    let cart = ShopifyCartClient::new(&config.store_root, config.http_timeout_secs, &config.user_agent)
        .context("failed to build cart client")?;

    let pipeline = CheckoutPipeline::new(
        Arc::new(catalog),
        Arc::new(bundles),
        Arc::new(cart),
        Arc::new(PrintRedirector),
    )
    .with_readiness(ReadinessPolicy::from_millis(
        config.ready_poll_interval_ms,
        config.ready_timeout_ms,
    ));

    let (cancel, signal) = cancel_pair();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling checkout");
            cancel.cancel();
        }
    });

    let reporter: &dyn StatusReporter = &print_status;
    let outcome = pipeline
        .submit_with_cancel(lines, subscribe, Some(reporter), &signal)
        .await;
    ctrl_c.abort();

    match outcome {
        CheckoutOutcome::Completed(done) => {
            tracing::info!(bundle_token = %done.bundle_token, "checkout completed");
            Ok(())
        }
        CheckoutOutcome::Failed { at, error } => {
            Err(anyhow::anyhow!(error).context(format!("checkout failed while {at:?}")))
        }
    }
}

/// Print a bundle-builder URL carrying `lines` in its `prefill` parameter.
///
/// # Errors
///
/// Returns an error if no line has a positive quantity.
pub(crate) fn run_prefill_link(config: &AppConfig, lines: &[PackLine]) -> anyhow::Result<()> {
    println!("{}", prefill_link(&config.store_root, lines)?);
    Ok(())
}

pub(crate) fn prefill_link(store_root: &str, lines: &[PackLine]) -> anyhow::Result<String> {
    let payload = PrefillPayload::new(lines);
    if payload.lines.is_empty() {
        anyhow::bail!("no pack lines with a positive quantity");
    }
    Ok(payload.link(store_root, BUNDLE_PRODUCT_HANDLE)?)
}

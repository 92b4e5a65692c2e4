//! The bundle checkout pipeline.
//!
//! One attempt runs strictly in order:
//!
//! ```text
//! Idle -> WaitingForDependency -> ResolvingSelections -> ValidatingBundle
//!      -> AcquiringToken -> SubmittingCart -> Completed
//! ```
//!
//! Any state before `Completed` can end in `Failed`. Nothing is retried
//! automatically; callers re-invoke [`CheckoutPipeline::submit`].
//!
//! A validator that answers with a rejection stops the attempt before any
//! token is requested. A validator call that errors out does not: the
//! service throws on some fixed-price bundles it would accept, so the error
//! is reported as a warning and the pipeline moves on to token acquisition.
//! This accepts the risk of submitting a bundle the service would reject,
//! and is pending product-owner review.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fuelcart_core::{Catalog, PackLine};

use crate::bundle::{
    build_cart_item, build_definition, resolve_selections, BundleToken, CartItem, SkipReason,
};
use crate::cancel::CancelSignal;
use crate::cart::CartApi;
use crate::error::{CheckoutError, ServiceError};
use crate::readiness::{wait_until_ready, ReadinessPolicy};
use crate::redirect::Redirector;
use crate::service::{BundleService, Verdict};
use crate::status::{StatusReporter, StatusSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    WaitingForDependency,
    ResolvingSelections,
    ValidatingBundle,
    AcquiringToken,
    SubmittingCart,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub bundle_token: BundleToken,
    pub item: CartItem,
    pub redirect_url: String,
}

#[derive(Debug)]
pub enum CheckoutOutcome {
    Completed(CompletedCheckout),
    /// `at` is the phase that was active when the attempt stopped.
    Failed { at: Phase, error: CheckoutError },
}

impl CheckoutOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&CheckoutError> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// Last phase the attempt entered.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Completed(_) => Phase::Completed,
            Self::Failed { at, .. } => *at,
        }
    }
}

pub struct CheckoutPipeline {
    catalog: Arc<Catalog>,
    bundles: Arc<dyn BundleService>,
    cart: Arc<dyn CartApi>,
    redirector: Arc<dyn Redirector>,
    readiness: ReadinessPolicy,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the attempt ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CheckoutPipeline {
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        bundles: Arc<dyn BundleService>,
        cart: Arc<dyn CartApi>,
        redirector: Arc<dyn Redirector>,
    ) -> Self {
        Self {
            catalog,
            bundles,
            cart,
            redirector,
            readiness: ReadinessPolicy::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    /// Runs one checkout attempt. Never returns an error or panics past this
    /// boundary: every failure is reported through `on_status` and returned as
    /// [`CheckoutOutcome::Failed`].
    pub async fn submit(
        &self,
        lines: &[PackLine],
        subscribe: bool,
        on_status: Option<&dyn StatusReporter>,
    ) -> CheckoutOutcome {
        self.submit_with_cancel(lines, subscribe, on_status, &CancelSignal::never())
            .await
    }

    /// Like [`Self::submit`], but aborts pending waits when `cancel` fires.
    ///
    /// A concurrent call on the same pipeline is rejected with
    /// [`CheckoutError::Busy`] without touching the in-flight attempt.
    pub async fn submit_with_cancel(
        &self,
        lines: &[PackLine],
        subscribe: bool,
        on_status: Option<&dyn StatusReporter>,
        cancel: &CancelSignal,
    ) -> CheckoutOutcome {
        let status = StatusSink::new(on_status);

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return fail(&status, Phase::Idle, CheckoutError::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        let mut phase = Phase::Idle;
        match self.run(lines, subscribe, &status, cancel, &mut phase).await {
            Ok(completed) => {
                status.info("Added to cart! Redirecting…");
                self.redirector.redirect(&completed.redirect_url);
                CheckoutOutcome::Completed(completed)
            }
            Err(error) => fail(&status, phase, error),
        }
    }

    async fn run(
        &self,
        lines: &[PackLine],
        subscribe: bool,
        status: &StatusSink<'_>,
        cancel: &CancelSignal,
        phase: &mut Phase,
    ) -> Result<CompletedCheckout, CheckoutError> {
        if lines.iter().all(|l| l.qty == 0) {
            return Err(CheckoutError::EmptyInput);
        }

        let parent = self.catalog.bundle_parent();
        let Some(parent_variant_id) = parent.variant_id.resolved() else {
            return Err(CheckoutError::Configuration(
                "bundle parent variant id is not set".to_string(),
            ));
        };
        if parent.product_id.is_sentinel() {
            return Err(CheckoutError::Configuration(
                "bundle parent product id is not set".to_string(),
            ));
        }

        *phase = Phase::WaitingForDependency;
        status.info(format!("Connecting to {}…", self.bundles.name()));
        wait_until_ready(self.bundles.as_ref(), self.readiness, cancel).await?;

        *phase = Phase::ResolvingSelections;
        let resolution = resolve_selections(&self.catalog, lines);
        for skipped in &resolution.skipped {
            match skipped.reason {
                SkipReason::Missing => status.warn(format!(
                    "No catalog entry for pack {}; skipping.",
                    skipped.pack_key
                )),
                SkipReason::Unresolved => status.warn(format!(
                    "Pack {} has unresolved Shopify ids; skipping.",
                    skipped.pack_key
                )),
            }
        }
        if resolution.selections.is_empty() {
            return Err(CheckoutError::NoValidSelections);
        }
        let definition = build_definition(&parent, resolution.selections).ok_or_else(|| {
            CheckoutError::Configuration("bundle parent ids are not set".to_string())
        })?;
        tracing::debug!(
            selections = definition.selections.len(),
            skipped = resolution.skipped.len(),
            "bundle definition built"
        );

        *phase = Phase::ValidatingBundle;
        status.info("Validating bundle…");
        match guarded(cancel, self.bundles.validate(&definition)).await? {
            Ok(Verdict::Valid) => {}
            Ok(Verdict::Invalid(reason)) => {
                return Err(CheckoutError::ValidationRejected { reason });
            }
            Err(e) => status.warn(format!(
                "Bundle validation errored ({e}); continuing anyway."
            )),
        }

        *phase = Phase::AcquiringToken;
        status.info("Generating bundle ID…");
        let token = guarded(cancel, self.bundles.get_bundle_id(&definition))
            .await?
            .map_err(|e| CheckoutError::TokenAcquisition {
                reason: e.to_string(),
            })?;

        let plan = build_cart_item(parent_variant_id, token.clone(), subscribe, &parent);
        if plan.downgraded {
            status.info(
                "Subscribe requested but no selling plan is configured; adding as a one-time purchase.",
            );
        }

        *phase = Phase::SubmittingCart;
        status.info("Adding to cart…");
        let items = [plan.item];
        guarded(cancel, self.cart.add_items(&items))
            .await?
            .map_err(cart_error)?;

        *phase = Phase::Completed;
        let [item] = items;
        Ok(CompletedCheckout {
            bundle_token: token,
            item,
            redirect_url: self.cart.cart_url(),
        })
    }
}

/// Races `fut` against cancellation.
async fn guarded<T>(cancel: &CancelSignal, fut: impl Future<Output = T>) -> Result<T, CheckoutError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CheckoutError::Cancelled),
        value = fut => Ok(value),
    }
}

fn cart_error(err: ServiceError) -> CheckoutError {
    match err {
        ServiceError::UnexpectedStatus { status, body, .. } => CheckoutError::CartSubmission {
            status,
            detail: body,
        },
        other => CheckoutError::CartUnreachable {
            reason: other.to_string(),
        },
    }
}

fn fail(status: &StatusSink<'_>, at: Phase, error: CheckoutError) -> CheckoutOutcome {
    status.error(error.to_string());
    CheckoutOutcome::Failed { at, error }
}

//! Bounded readiness polling for the bundle service.

use std::time::Duration;

use tokio::time::Instant;

use crate::cancel::CancelSignal;
use crate::error::CheckoutError;
use crate::service::BundleService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_millis(8000),
        }
    }
}

impl ReadinessPolicy {
    #[must_use]
    pub fn from_millis(poll_interval_ms: u64, timeout_ms: u64) -> Self {
        Self {
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

/// Polls `service.is_ready()` until it reports ready, the timeout elapses, or
/// `cancel` fires. The first check happens immediately.
///
/// The bound covers the checks themselves: a check still pending at the
/// deadline is abandoned and counts as a timeout.
///
/// # Errors
///
/// - [`CheckoutError::DependencyTimeout`] naming the service and the bound.
/// - [`CheckoutError::Cancelled`] if cancellation is raised while waiting.
pub async fn wait_until_ready(
    service: &dyn BundleService,
    policy: ReadinessPolicy,
    cancel: &CancelSignal,
) -> Result<(), CheckoutError> {
    let start = Instant::now();
    let deadline = start + policy.timeout;
    let mut polls = 0u32;

    loop {
        polls += 1;
        let check = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CheckoutError::Cancelled),
            check = tokio::time::timeout_at(deadline, service.is_ready()) => check,
        };
        match check {
            Ok(true) => {
                tracing::debug!(polls, elapsed_ms = start.elapsed().as_millis(), "dependency ready");
                return Ok(());
            }
            Ok(false) => {}
            Err(_) => {
                tracing::debug!(polls, "readiness check still pending at deadline");
                return Err(timeout_error(service, policy));
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timeout_error(service, policy));
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CheckoutError::Cancelled),
            () = tokio::time::sleep(policy.poll_interval.min(remaining)) => {}
        }
    }
}

fn timeout_error(service: &dyn BundleService, policy: ReadinessPolicy) -> CheckoutError {
    CheckoutError::DependencyTimeout {
        dependency: service.name().to_string(),
        timeout_ms: u64::try_from(policy.timeout.as_millis()).unwrap_or(u64::MAX),
    }
}

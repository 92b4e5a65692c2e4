//! Bundle checkout pipeline.
//!
//! Turns a list of `(pack key, quantity)` lines into a single cart line on
//! the bundle parent product: resolve the lines against the identifier
//! catalog, exchange the resulting bundle definition for an opaque bundle
//! token, then add the parent variant to the cart with that token attached.

pub mod bundle;
pub mod cancel;
pub mod cart;
pub mod error;
pub mod pipeline;
pub mod readiness;
pub mod redirect;
pub mod service;
pub mod status;

pub use bundle::{BundleDefinition, BundleToken, CartItem, Selection};
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use cart::{CartApi, ShopifyCartClient};
pub use error::{CheckoutError, ServiceError};
pub use pipeline::{CheckoutOutcome, CheckoutPipeline, CompletedCheckout, Phase};
pub use readiness::ReadinessPolicy;
pub use redirect::{RecordingRedirector, Redirector};
pub use service::{BundleService, HttpBundleService, Verdict};
pub use status::{StatusEvent, StatusLevel, StatusLog, StatusReporter};

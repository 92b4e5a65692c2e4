//! Status side channel for checkout progress.
//!
//! The pipeline never assumes a UI exists. Every phase transition, skipped
//! line, downgrade, and failure is pushed through a [`StatusReporter`] and
//! mirrored into `tracing`.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub level: StatusLevel,
    pub message: String,
}

impl StatusEvent {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

pub trait StatusReporter: Send + Sync {
    fn report(&self, event: &StatusEvent);
}

/// Plain `(message, is_error)` callbacks. Warnings arrive with `is_error = false`.
impl<F> StatusReporter for F
where
    F: Fn(&str, bool) + Send + Sync,
{
    fn report(&self, event: &StatusEvent) {
        self(&event.message, event.is_error());
    }
}

/// Collects every event in order.
#[derive(Debug, Default)]
pub struct StatusLog {
    events: Mutex<Vec<StatusEvent>>,
}

impl StatusLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Most recent error message, i.e. what a UI should be showing after a failure.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.events()
            .into_iter()
            .rev()
            .find(StatusEvent::is_error)
            .map(|e| e.message)
    }
}

impl StatusReporter for StatusLog {
    fn report(&self, event: &StatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Optional reporter plus the `tracing` mirror. An absent reporter is a no-op.
pub(crate) struct StatusSink<'a> {
    reporter: Option<&'a dyn StatusReporter>,
}

impl<'a> StatusSink<'a> {
    pub(crate) fn new(reporter: Option<&'a dyn StatusReporter>) -> Self {
        Self { reporter }
    }

    pub(crate) fn info(&self, message: impl Into<String>) {
        self.emit(StatusLevel::Info, message.into());
    }

    pub(crate) fn warn(&self, message: impl Into<String>) {
        self.emit(StatusLevel::Warning, message.into());
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.emit(StatusLevel::Error, message.into());
    }

    fn emit(&self, level: StatusLevel, message: String) {
        match level {
            StatusLevel::Info => tracing::info!(status = %message, "checkout"),
            StatusLevel::Warning => tracing::warn!(status = %message, "checkout"),
            StatusLevel::Error => tracing::error!(status = %message, "checkout"),
        }
        if let Some(reporter) = self.reporter {
            reporter.report(&StatusEvent { level, message });
        }
    }
}

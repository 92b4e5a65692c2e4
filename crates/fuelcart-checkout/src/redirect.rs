//! The post-checkout navigation step, kept behind a trait so it can be
//! observed on its own.

use std::sync::Mutex;

pub trait Redirector: Send + Sync {
    fn redirect(&self, url: &str);
}

/// Remembers every redirect instead of navigating anywhere.
#[derive(Debug, Default)]
pub struct RecordingRedirector {
    urls: Mutex<Vec<String>>,
}

impl RecordingRedirector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

impl Redirector for RecordingRedirector {
    fn redirect(&self, url: &str) {
        tracing::debug!(url, "redirect recorded");
        if let Ok(mut urls) = self.urls.lock() {
            urls.push(url.to_string());
        }
    }
}

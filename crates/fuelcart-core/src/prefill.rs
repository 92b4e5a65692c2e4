//! Prefill links for the bundle-builder product page.
//!
//! The payload is `{"lines":[{"packKey":"MIX60_6","qty":2}]}` encoded as
//! unpadded base64url JSON in the `prefill` query parameter. Whatever runs on
//! the product page decodes it and applies the quantities; that part lives
//! outside this crate.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::lines::PackLine;
use crate::ConfigError;

/// Accepts tokens with or without trailing `=` padding.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefillPayload {
    pub lines: Vec<PackLine>,
}

#[derive(Deserialize)]
struct RawPayload {
    lines: Vec<RawLine>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLine {
    #[serde(default)]
    pack_key: Option<String>,
    #[serde(default)]
    qty: i64,
}

impl PrefillPayload {
    /// Keeps only lines with a pack key and a positive quantity.
    #[must_use]
    pub fn new(lines: &[PackLine]) -> Self {
        Self {
            lines: lines
                .iter()
                .filter(|l| l.qty > 0 && !l.pack_key.trim().is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Encode as an unpadded base64url token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefill`] if JSON serialization fails.
    pub fn encode(&self) -> Result<String, ConfigError> {
        let json =
            serde_json::to_vec(self).map_err(|e| ConfigError::InvalidPrefill(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a `prefill` token. Lines without a key or with `qty <= 0` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefill`] if the token is not base64url or
    /// the JSON does not carry a `lines` array.
    pub fn decode(token: &str) -> Result<Self, ConfigError> {
        let bytes = LENIENT_URL_SAFE
            .decode(token.trim())
            .map_err(|e| ConfigError::InvalidPrefill(format!("bad base64url: {e}")))?;
        let raw: RawPayload = serde_json::from_slice(&bytes)
            .map_err(|e| ConfigError::InvalidPrefill(format!("bad JSON: {e}")))?;

        let lines = raw
            .lines
            .into_iter()
            .filter_map(|l| {
                let key = l.pack_key?.trim().to_string();
                let qty = u32::try_from(l.qty).ok().filter(|q| *q > 0)?;
                (!key.is_empty()).then(|| PackLine::new(key, qty))
            })
            .collect();

        Ok(Self { lines })
    }

    /// Builds `{store_root}products/{product_handle}?prefill={token}`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefill`] if encoding fails.
    pub fn link(&self, store_root: &str, product_handle: &str) -> Result<String, ConfigError> {
        let token = self.encode()?;
        let root = store_root.trim_end_matches('/');
        Ok(format!("{root}/products/{product_handle}?prefill={token}"))
    }
}

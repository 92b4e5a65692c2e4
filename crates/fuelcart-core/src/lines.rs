use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One requested quantity of one catalog pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackLine {
    pub pack_key: String,
    pub qty: u32,
}

impl PackLine {
    #[must_use]
    pub fn new(pack_key: impl Into<String>, qty: u32) -> Self {
        Self {
            pack_key: pack_key.into(),
            qty,
        }
    }
}

/// Parses the `KEY=QTY` form used on the command line, e.g. `MIX60_6=2`.
impl FromStr for PackLine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidPackLine {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (key, qty) = s.split_once('=').ok_or_else(|| invalid("expected KEY=QTY"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid("pack key is empty"));
        }
        let qty = qty
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(Self::new(key, qty))
    }
}

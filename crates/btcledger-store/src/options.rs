//! Store options.
//!
//! Options come from a JSON document: unknown fields are rejected and missing
//! fields take their defaults.

use btcledger_core::DisplayUnit;
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Key the browser app has always stored its ledger under.
pub const DEFAULT_KEY: &str = "btcTransactions";

/// Where and how a ledger is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreOptions {
    /// Storage key the ledger blob lives under.
    pub key: String,

    /// Write indented JSON.
    pub pretty: bool,

    /// Unit hosts should use when showing quantities.
    pub display_unit: DisplayUnit,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            pretty: false,
            display_unit: DisplayUnit::Btc,
        }
    }
}

impl StoreOptions {
    /// Create options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let options: Self =
            serde_json::from_str(json).map_err(|source| StoreError::Options { source })?;
        validate_key(&options.key)?;
        Ok(options)
    }

    /// Use a different storage key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Toggle indented output.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Check that a storage key is usable as a single file name.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::new();
        assert_eq!(options.key, "btcTransactions");
        assert!(!options.pretty);
        assert_eq!(options.display_unit, DisplayUnit::Btc);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let options = StoreOptions::from_json(r#"{ "display_unit": "sats" }"#).unwrap();
        assert_eq!(options.key, DEFAULT_KEY);
        assert_eq!(options.display_unit, DisplayUnit::Sats);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let err = StoreOptions::from_json(r#"{ "colour": "blue" }"#).unwrap_err();
        assert!(matches!(err, StoreError::Options { .. }));
    }

    #[test]
    fn test_from_json_rejects_bad_key() {
        let err = StoreOptions::from_json(r#"{ "key": "../etc/passwd" }"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("btcTransactions").is_ok());
        assert!(validate_key("ledger_2024.v2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a\\b").is_err());
    }
}

//! JSON blob encoding.

use btcledger_core::Ledger;
use tracing::warn;

use crate::StoreError;

/// Serialize a ledger to the stored JSON shape.
pub fn encode(ledger: &Ledger, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(ledger)
    } else {
        serde_json::to_string(ledger)
    }
}

/// Parse the blob stored under `key`. Missing `buys` or `sells` arrays load
/// as empty.
///
/// Every record is checked against the trade bounds and
/// `0 ≤ remaining ≤ amount`; a blob that breaks them is rejected.
pub fn decode(key: &str, blob: &str) -> Result<Ledger, StoreError> {
    let ledger: Ledger = serde_json::from_str(blob).map_err(|source| {
        warn!(key, error = %source, "failed to decode stored ledger");
        StoreError::Decode {
            key: key.to_string(),
            source,
        }
    })?;
    ledger.validate().map_err(|source| {
        warn!(key, error = %source, "stored ledger breaks an invariant");
        StoreError::Invalid {
            key: key.to_string(),
            source,
        }
    })?;
    Ok(ledger)
}

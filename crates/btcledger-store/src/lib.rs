//! Persistence for the bitcoin ledger.
//!
//! The ledger is stored as a single JSON document under one key, in the same
//! shape the browser app keeps in `localStorage`:
//!
//! ```json
//! { "buys": [ ... ], "sells": [ ... ] }
//! ```
//!
//! # Features
//!
//! - A [`Store`] trait for string key-value backends
//! - [`MemoryStore`] and [`FileStore`] implementations
//! - [`StoreOptions`] for the storage key and output format
//! - A [`Session`] that loads once and saves after every mutation
//!
//! # Example
//!
//! ```
//! use btcledger_core::TradeInput;
//! use btcledger_store::{MemoryStore, Session, StoreOptions};
//!
//! let mut session = Session::open(MemoryStore::new(), StoreOptions::default())?;
//! session.add_buy(TradeInput::parse("2024-01-01", "1", "10000", "0")?)?;
//!
//! let blob = session.store().get("btcTransactions").unwrap();
//! assert!(blob.contains("\"remaining\":1"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod file;
mod memory;
mod options;
mod session;

pub use codec::{decode, encode};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use options::{validate_key, StoreOptions, DEFAULT_KEY};
pub use session::{Session, SessionError};

use btcledger_core::{Ledger, LedgerError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading or writing a ledger.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error on a backing file.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The stored document is not a valid ledger.
    #[error("stored ledger under \"{key}\" is malformed: {source}")]
    Decode {
        /// The key that was read.
        key: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The stored document parses but holds records that break a ledger
    /// invariant.
    #[error("stored ledger under \"{key}\" is invalid: {source}")]
    Invalid {
        /// The key that was read.
        key: String,
        /// The broken invariant.
        #[source]
        source: LedgerError,
    },

    /// The ledger could not be serialized.
    #[error("failed to encode ledger: {source}")]
    Encode {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Options document could not be parsed.
    #[error("invalid store options: {source}")]
    Options {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Storage key is empty or would escape the store.
    #[error("invalid storage key \"{key}\"")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },
}

/// A string key-value backend.
pub trait Store {
    /// Read the value under `key`, or `None` if it was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Load the ledger stored under `key`.
///
/// An absent key loads as an empty ledger.
pub fn load<S: Store + ?Sized>(store: &S, key: &str) -> Result<Ledger, StoreError> {
    let Some(blob) = store.read(key)? else {
        debug!(key, "no stored ledger, starting empty");
        return Ok(Ledger::new());
    };

    decode(key, &blob)
}

/// Save `ledger` under the key named in `options`.
pub fn save<S: Store + ?Sized>(
    store: &mut S,
    ledger: &Ledger,
    options: &StoreOptions,
) -> Result<(), StoreError> {
    let blob = encode(ledger, options.pretty).map_err(|source| StoreError::Encode { source })?;
    store.write(&options.key, &blob)?;
    debug!(
        key = %options.key,
        bytes = blob.len(),
        buys = ledger.buys().len(),
        sells = ledger.sells().len(),
        "saved ledger"
    );
    Ok(())
}

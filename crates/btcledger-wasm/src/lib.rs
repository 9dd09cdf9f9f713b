//! Bitcoin ledger WASM Bindings.
//!
//! This crate exposes the FIFO ledger engine to JavaScript/TypeScript. The
//! page owns persistence: it reads the blob from `localStorage`, hands it to
//! [`BtcLedger::from_json`], and writes [`BtcLedger::to_json`] back after
//! every mutation.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { BtcLedger } from '@btcledger/wasm';
//!
//! await init();
//!
//! const ledger = BtcLedger.fromJson(localStorage.getItem('btcTransactions'));
//! ledger.addBuy({ date: '2024-01-01', amount: '1', price: '10000', fees: '0' });
//! ledger.addSell({ date: '2024-03-01', amount: '0.5', price: '25000', fees: '10' });
//! localStorage.setItem(ledger.storageKey(), ledger.toJson());
//!
//! console.log(ledger.aggregates('btc'));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod types;

use wasm_bindgen::prelude::*;

use btcledger_core::format::{format_money, format_quantity};
use btcledger_core::{AggregatesDisplay, DisplayUnit, Ledger, LedgerError, TransactionKind};
use btcledger_store::{decode, encode, StoreError, StoreOptions};
use thiserror::Error;

use types::{parse_unit, BuyJson, SellJson, SummaryJson, TradeFields, TransactionJson};

// =============================================================================
// TypeScript Type Definitions
// =============================================================================

#[wasm_bindgen(typescript_custom_section)]
const TS_TYPES: &'static str = r#"
/** Quantity unit. */
export type DisplayUnit = 'btc' | 'sats';

/** Transaction kind. */
export type TransactionKind = 'buy' | 'sell';

/** Raw form fields. `amount` is read in `unit`, or in `display_unit` when absent. */
export interface TradeFields {
    date: string;
    amount: string;
    price: string;
    fees?: string;
    unit?: DisplayUnit;
}

/** A buy lot with display strings. */
export interface Buy {
    index: number;
    date: string;
    amount: string;
    price: string;
    fees: string;
    remaining: string;
}

/** A sell record with display strings. */
export interface Sell {
    index: number;
    date: string;
    amount: string;
    price: string;
    fees: string;
    costBasis: string;
    gainLoss: string;
}

/** A buy or sell, tagged by kind. */
export type Transaction = ({ kind: 'buy' } & Buy) | ({ kind: 'sell' } & Sell);

/** Realized totals. `totalLosses` is a magnitude. */
export interface Summary {
    totalGains: string;
    totalLosses: string;
    netGain: string;
    available: string;
    openCost: string;
    unit: string;
}

/** Store options accepted by the constructor. */
export interface StoreOptions {
    key?: string;
    pretty?: boolean;
    display_unit?: DisplayUnit;
}
"#;

/// Initialize the WASM module.
///
/// This sets up panic hooks for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

// =============================================================================
// Internal Helpers
// =============================================================================

/// Errors raised by the bindings before they reach JavaScript.
#[derive(Debug, Error)]
pub enum BindingError {
    /// The engine rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The blob or options could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<btcledger_core::ValidationError> for BindingError {
    fn from(e: btcledger_core::ValidationError) -> Self {
        Self::Ledger(e.into())
    }
}

/// Serialize a value to `JsValue` using JSON-compatible settings.
///
/// This ensures:
/// - `None` serializes as `null` (not `undefined`)
/// - Maps serialize as plain objects (not ES2015 `Map`)
fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsError::new(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn parse_kind(kind: &str) -> Result<TransactionKind, BindingError> {
    kind.parse::<TransactionKind>()
        .map_err(|message| btcledger_core::ValidationError::new("kind", message).into())
}

// =============================================================================
// Ledger
// =============================================================================

/// A bitcoin ledger held in WASM memory.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const ledger = new BtcLedger();
/// ledger.addBuy({ date: '2024-01-01', amount: '1', price: '10000' });
/// const sell = ledger.addSell({ date: '2024-02-01', amount: '0.25', price: '40000' });
/// console.log(sell.gainLoss); // "7500.00"
/// ```
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct BtcLedger {
    ledger: Ledger,
    options: StoreOptions,
}

impl BtcLedger {
    /// Build from an optional stored blob and optional options JSON.
    ///
    /// A missing blob yields an empty ledger.
    pub fn load(blob: Option<&str>, options: Option<&str>) -> Result<Self, BindingError> {
        let options = match options {
            Some(json) => StoreOptions::from_json(json)?,
            None => StoreOptions::default(),
        };
        let ledger = match blob {
            Some(blob) => decode(&options.key, blob)?,
            None => Ledger::new(),
        };
        Ok(Self { ledger, options })
    }

    /// The wrapped ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The stored blob for the current ledger.
    pub fn blob(&self) -> Result<String, BindingError> {
        encode(&self.ledger, self.options.pretty)
            .map_err(|source| StoreError::Encode { source }.into())
    }

    fn unit(&self, unit: Option<&str>) -> Result<DisplayUnit, BindingError> {
        Ok(parse_unit(unit, self.options.display_unit)?)
    }

    /// Add a buy from raw form fields.
    pub fn add_buy_fields(&mut self, fields: &TradeFields) -> Result<BuyJson, BindingError> {
        let unit = self.unit(fields.unit.as_deref())?;
        let input = fields.to_input(self.options.display_unit)?;
        let index = self.ledger.buys().len();
        let lot = self.ledger.add_buy(input)?;
        Ok(BuyJson::new(index, lot, unit))
    }

    /// Add a sell from raw form fields.
    pub fn add_sell_fields(&mut self, fields: &TradeFields) -> Result<SellJson, BindingError> {
        let unit = self.unit(fields.unit.as_deref())?;
        let input = fields.to_input(self.options.display_unit)?;
        let index = self.ledger.sells().len();
        let sell = self.ledger.add_sell(input)?;
        Ok(SellJson::new(index, sell, unit))
    }

    /// Replace the record of `kind` at `index`.
    pub fn edit_fields(
        &mut self,
        kind: &str,
        index: usize,
        fields: &TradeFields,
    ) -> Result<TransactionJson, BindingError> {
        let kind = parse_kind(kind)?;
        let unit = self.unit(fields.unit.as_deref())?;
        let input = fields.to_input(self.options.display_unit)?;
        let edited = self.ledger.edit_transaction(kind, index, input)?;
        Ok(TransactionJson::new(index, &edited, unit))
    }

    /// Remove the record of `kind` at `index`.
    pub fn delete(&mut self, kind: &str, index: usize) -> Result<TransactionJson, BindingError> {
        let kind = parse_kind(kind)?;
        let removed = self.ledger.delete_transaction(kind, index)?;
        Ok(TransactionJson::new(index, &removed, self.options.display_unit))
    }

    /// Buy lots rendered in `unit`.
    pub fn buy_list(&self, unit: Option<&str>) -> Result<Vec<BuyJson>, BindingError> {
        let unit = self.unit(unit)?;
        Ok(self
            .ledger
            .buys()
            .iter()
            .enumerate()
            .map(|(i, lot)| BuyJson::new(i, lot, unit))
            .collect())
    }

    /// Sell records rendered in `unit`.
    pub fn sell_list(&self, unit: Option<&str>) -> Result<Vec<SellJson>, BindingError> {
        let unit = self.unit(unit)?;
        Ok(self
            .ledger
            .sells()
            .iter()
            .enumerate()
            .map(|(i, sell)| SellJson::new(i, sell, unit))
            .collect())
    }

    /// Totals and holdings rendered in `unit`.
    pub fn summary(&self, unit: Option<&str>) -> Result<SummaryJson, BindingError> {
        let unit = self.unit(unit)?;
        Ok(SummaryJson {
            totals: AggregatesDisplay::from(&self.ledger.compute_aggregates()),
            available: format_quantity(self.ledger.available(), unit),
            open_cost: format_money(self.ledger.open_cost()?),
            unit: unit.to_string(),
        })
    }
}

#[wasm_bindgen]
impl BtcLedger {
    /// Create an empty ledger. `options` is an optional `StoreOptions` JSON string.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<BtcLedger, JsError> {
        Ok(Self::load(None, options.as_deref())?)
    }

    /// Load a ledger from a stored blob; `null` gives an empty ledger.
    #[wasm_bindgen(js_name = "fromJson")]
    pub fn from_json(blob: Option<String>, options: Option<String>) -> Result<BtcLedger, JsError> {
        Ok(Self::load(blob.as_deref(), options.as_deref())?)
    }

    /// Serialize the ledger to the stored blob format.
    #[wasm_bindgen(js_name = "toJson")]
    pub fn to_json(&self) -> Result<String, JsError> {
        Ok(self.blob()?)
    }

    /// The `localStorage` key the blob belongs under.
    #[wasm_bindgen(js_name = "storageKey")]
    pub fn storage_key(&self) -> String {
        self.options.key.clone()
    }

    /// Add a buy. Returns the new lot.
    #[wasm_bindgen(js_name = "addBuy")]
    pub fn add_buy(&mut self, fields: JsValue) -> Result<JsValue, JsError> {
        let fields: TradeFields = from_js(fields)?;
        to_js(&self.add_buy_fields(&fields)?)
    }

    /// Add a sell. Throws if not enough BTC is available.
    #[wasm_bindgen(js_name = "addSell")]
    pub fn add_sell(&mut self, fields: JsValue) -> Result<JsValue, JsError> {
        let fields: TradeFields = from_js(fields)?;
        to_js(&self.add_sell_fields(&fields)?)
    }

    /// Replace the buy or sell at `index`. Returns the new record.
    #[wasm_bindgen(js_name = "editTransaction")]
    pub fn edit_transaction(
        &mut self,
        kind: &str,
        index: usize,
        fields: JsValue,
    ) -> Result<JsValue, JsError> {
        let fields: TradeFields = from_js(fields)?;
        to_js(&self.edit_fields(kind, index, &fields)?)
    }

    /// Remove the buy or sell at `index`. Returns the removed record.
    #[wasm_bindgen(js_name = "deleteTransaction")]
    pub fn delete_transaction(&mut self, kind: &str, index: usize) -> Result<JsValue, JsError> {
        to_js(&self.delete(kind, index)?)
    }

    /// Remove every sell and restore every lot.
    #[wasm_bindgen(js_name = "clearSells")]
    pub fn clear_sells(&mut self) {
        self.ledger.clear_sells();
    }

    /// Remove every buy.
    #[wasm_bindgen(js_name = "clearBuys")]
    pub fn clear_buys(&mut self) {
        self.ledger.clear_buys();
    }

    /// Replay every sell against restored lots.
    #[wasm_bindgen]
    pub fn rebuild(&mut self) -> Result<(), JsError> {
        self.ledger.rebuild()?;
        Ok(())
    }

    /// All buy lots.
    #[wasm_bindgen]
    pub fn buys(&self, unit: Option<String>) -> Result<JsValue, JsError> {
        to_js(&self.buy_list(unit.as_deref())?)
    }

    /// All sell records.
    #[wasm_bindgen]
    pub fn sells(&self, unit: Option<String>) -> Result<JsValue, JsError> {
        to_js(&self.sell_list(unit.as_deref())?)
    }

    /// Realized gains, losses, net, and current holdings.
    #[wasm_bindgen]
    pub fn aggregates(&self, unit: Option<String>) -> Result<JsValue, JsError> {
        to_js(&self.summary(unit.as_deref())?)
    }

    /// BTC still held, formatted in `unit`.
    #[wasm_bindgen]
    pub fn available(&self, unit: Option<String>) -> Result<String, JsError> {
        let unit = self.unit(unit.as_deref())?;
        Ok(format_quantity(self.ledger.available(), unit))
    }
}

// =============================================================================
// Tests
// =============================================================================

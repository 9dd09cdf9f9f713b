//! Errors returned by ledger operations.
//!
//! Every error here is recoverable: an operation that fails leaves the
//! [`Ledger`](crate::Ledger) exactly as it was.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::transaction::TransactionKind;

/// A trade field was missing, unparseable, or out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field (`date`, `amount`, `price`, `fees`, `remaining`).
    pub field: &'static str,
    /// What was wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Error that can occur while mutating a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Input failed validation; nothing was mutated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The sell amount exceeds the quantity still open across all buy lots.
    #[error("not enough BTC available to sell: requested {requested}, available {available}")]
    InsufficientInventory {
        /// Amount the sell asked for.
        requested: Decimal,
        /// Total remaining across all buy lots.
        available: Decimal,
    },

    /// No record exists at the given position.
    #[error("no {kind} at index {index} (have {len})")]
    IndexOutOfRange {
        /// Which sequence was addressed.
        kind: TransactionKind,
        /// Requested position.
        index: usize,
        /// Length of the sequence.
        len: usize,
    },

    /// A recorded sell could not be re-matched while rebuilding the ledger.
    #[error("sell #{index} cannot be matched: requested {requested}, available {available}")]
    Unmatchable {
        /// Position of the sell in the sells sequence.
        index: usize,
        /// Amount the sell asked for.
        requested: Decimal,
        /// Total remaining when the sell was replayed.
        available: Decimal,
    },

    /// A product or sum left the range `Decimal` can represent.
    #[error("arithmetic overflow while computing {what}")]
    Overflow {
        /// The quantity being computed.
        what: &'static str,
    },

    /// A stored record breaks a lot or trade invariant.
    #[error("{kind} #{index} is invalid: {source}")]
    InvalidRecord {
        /// Which sequence holds the record.
        kind: TransactionKind,
        /// Position of the record.
        index: usize,
        /// The broken constraint.
        #[source]
        source: ValidationError,
    },
}

impl LedgerError {
    /// Whether this error was raised by input validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_messages() {
        let err = LedgerError::InsufficientInventory {
            requested: dec!(0.1),
            available: dec!(0),
        };
        assert_eq!(
            err.to_string(),
            "not enough BTC available to sell: requested 0.1, available 0"
        );

        let err = LedgerError::from(ValidationError::new("amount", "must be positive"));
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid amount: must be positive");

        let err = LedgerError::IndexOutOfRange {
            kind: TransactionKind::Sell,
            index: 3,
            len: 1,
        };
        assert_eq!(err.to_string(), "no sell at index 3 (have 1)");

        let err = LedgerError::Overflow { what: "cost basis" };
        assert_eq!(err.to_string(), "arithmetic overflow while computing cost basis");

        let err = LedgerError::InvalidRecord {
            kind: TransactionKind::Buy,
            index: 2,
            source: ValidationError::new("remaining", "exceeds amount"),
        };
        assert_eq!(
            err.to_string(),
            "buy #2 is invalid: invalid remaining: exceeds amount"
        );
    }
}

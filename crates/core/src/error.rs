//! Domain error model.

use thiserror::Error;

/// Result type used across the ledger crates.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every variant describes malformed input or a forbidden transition. None of
/// them are transient, so callers surface them instead of retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Two amounts with different currencies were combined.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// A textual value (amount, currency code, identifier) could not be parsed.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A split rule is malformed or does not match the expense total.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// A lifecycle transition is not allowed from the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An amount is out of the accepted range for the operation.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Minor-unit arithmetic overflowed `i64`.
    #[error("amount overflow")]
    Overflow,

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl LedgerError {
    pub fn currency_mismatch(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::CurrencyMismatch {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn invalid_split(msg: impl Into<String>) -> Self {
        Self::InvalidSplit(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

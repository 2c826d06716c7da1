//! Error taxonomy for BARK payment operations.
//!
//! Every failure surfaced by this crate is a [`PayError`] variant. Validation
//! errors are raised before any ledger interaction; ledger failures are
//! wrapped with context rather than swallowed, and no raw RPC payload is ever
//! shown to an end user untranslated.

use crate::ledger::LedgerError;

/// Errors produced by transfer construction, payment tracking, and gift card
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum PayError {
    /// A sender, recipient, or escrow address failed base58 decoding.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An amount was non-numeric, not positive, or out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The token symbol is not present in the registry.
    #[error("unknown token: {0}")]
    UnknownToken(String),

    /// A request payload or encoded value could not be parsed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The payer's balance does not cover the requested amount.
    #[error("insufficient funds: need {required} base units, have {available}")]
    InsufficientFunds {
        /// Base units required by the operation.
        required: u64,
        /// Base units actually available.
        available: u64,
    },

    /// The transferred value is below the ledger's rent-exemption minimum
    /// for a zero-data account and would be reclaimed.
    #[error("transfer of {lamports} lamports is below the rent-exempt minimum of {minimum}")]
    InsufficientForRentExemption {
        /// Rent-exempt minimum reported by the ledger.
        minimum: u64,
        /// Lamports the transfer would move.
        lamports: u64,
    },

    /// The ledger RPC call failed. Transient; callers own retry policy.
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    /// No payment request exists for the given transaction id.
    #[error("payment request not found: {0}")]
    RequestNotFound(String),

    /// No gift card exists for the given code.
    #[error("gift card not found")]
    GiftCardNotFound,

    /// The gift card has already been redeemed (or a redemption is in
    /// flight).
    #[error("gift card already redeemed")]
    AlreadyRedeemed,

    /// Transaction compilation, encoding, or signing failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// The dispatcher received an action tag it does not handle.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),
}

impl PayError {
    /// Whether the error is user-correctable (maps to HTTP 400) as opposed
    /// to an infrastructure or internal failure (HTTP 500).
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        match self {
            Self::InvalidAddress(_)
            | Self::InvalidAmount(_)
            | Self::UnknownToken(_)
            | Self::InvalidInput(_)
            | Self::InsufficientFunds { .. }
            | Self::InsufficientForRentExemption { .. }
            | Self::RequestNotFound(_)
            | Self::GiftCardNotFound
            | Self::AlreadyRedeemed
            | Self::UnsupportedAction(_) => true,
            Self::Ledger(_) | Self::Transaction(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_map_to_400() {
        assert!(PayError::InvalidAmount("-1".into()).is_user_error());
        assert!(PayError::AlreadyRedeemed.is_user_error());
        assert!(PayError::UnsupportedAction("mintNft".into()).is_user_error());
        assert!(!PayError::Ledger(LedgerError("rpc timeout".into())).is_user_error());
        assert!(!PayError::Transaction("compile failed".into()).is_user_error());
    }

    #[test]
    fn test_ledger_error_keeps_context() {
        let err = PayError::from(LedgerError("connection refused".into()));
        assert_eq!(err.to_string(), "ledger unavailable: connection refused");
    }
}

//! Error types for phrase recovery and the send pipeline
//!
//! Every variant is terminal for the operation that raised it. Nothing is
//! retried and no partially built draft survives an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Expected {expected} words, got {found}")]
    InvalidInputLength { expected: usize, found: usize },

    #[error("Invalid word in list: \"{0}\"")]
    UnknownWord(String),

    #[error("Invalid checksum for recovery phrase")]
    InvalidChecksum,

    #[error("No valid 12th word found, input may be invalid")]
    NoChecksumFound,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0} sats")]
    InvalidAmount(u64),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    #[error("No UTXOs available to send")]
    NoUtxosAvailable,

    #[error("Insufficient balance: needed {needed} sats, have {have} sats")]
    InsufficientFunds { needed: u64, have: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(String),

    #[error("Signing failed for input {input_index}: {reason}")]
    SigningFailure { input_index: usize, reason: String },
}

/// Coarse classification of [`WalletError`] for callers that only need to
/// know which stage of the pipeline refused the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong word count, unknown word, failed checksum, bad address or amount
    InputValidation,
    /// Exhaustive search found no valid 12th word
    CryptoRecovery,
    /// No UTXOs, or not enough value to cover amount and fee
    FundsAvailability,
    /// Any chain-query or broadcast failure, including malformed responses
    NetworkFailure,
    /// A signature failed its own post-sign validation
    SigningFailure,
    /// Key derivation fault
    Internal,
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidInputLength { .. }
            | WalletError::UnknownWord(_)
            | WalletError::InvalidChecksum
            | WalletError::InvalidAddress(_)
            | WalletError::InvalidAmount(_) => ErrorKind::InputValidation,
            WalletError::NoChecksumFound => ErrorKind::CryptoRecovery,
            WalletError::NoUtxosAvailable | WalletError::InsufficientFunds { .. } => {
                ErrorKind::FundsAvailability
            }
            WalletError::Network(_) | WalletError::BroadcastRejected(_) => {
                ErrorKind::NetworkFailure
            }
            WalletError::SigningFailure { .. } => ErrorKind::SigningFailure,
            WalletError::KeyDerivation(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn signing(input_index: usize, reason: impl Into<String>) -> Self {
        WalletError::SigningFailure {
            input_index,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        WalletError::Network(err.to_string())
    }
}

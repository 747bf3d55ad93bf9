//! Unified error types for the Turion wallet core
//!
//! Every fallible operation reports a `TurionError`. The `code` is the
//! stable, machine-readable part; `message` is safe to show to a user.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message used for every failed decryption, whatever the cause.
pub const DECRYPTION_FAILED_MESSAGE: &str = "Cannot decrypt wallet: invalid password or corrupted data";

/// Main error type for all wallet operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurionError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl TurionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_phrase(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPhrase, msg)
    }

    pub fn derivation_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DerivationFailed, msg)
    }

    /// The one and only decryption failure. Takes no argument so callers
    /// cannot leak which check failed.
    pub fn decryption_failed() -> Self {
        Self::new(ErrorCode::DecryptionFailed, DECRYPTION_FAILED_MESSAGE)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn entropy_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntropyUnavailable, msg)
    }

    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, msg)
    }

    pub fn qr_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::QrError, msg)
    }

    pub fn no_wallet(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoWallet, msg)
    }

    pub fn wallet_locked(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::WalletLocked, msg)
    }

    pub fn network_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkMismatch, msg)
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// Validation and authentication failures are plain rejected actions;
    /// everything else is an environment or configuration problem.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidInput | ErrorCode::InvalidPhrase | ErrorCode::DecryptionFailed
        )
    }
}

impl fmt::Display for TurionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for TurionError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Validation errors
    InvalidInput,
    InvalidPhrase,

    // Derivation errors (fatal)
    DerivationFailed,

    // Encryption / authentication errors
    DecryptionFailed,
    CryptoError,

    // Environment errors
    EntropyUnavailable,
    StorageError,
    QrError,

    // Session state
    NoWallet,
    WalletLocked,

    // Stored wallet belongs to another network parameter set
    NetworkMismatch,

    // Internal
    ConfigError,
    Internal,
}

/// Result type alias for wallet operations
pub type TurionResult<T> = Result<T, TurionError>;

// Conversions from common error types

impl From<bip39::Error> for TurionError {
    fn from(e: bip39::Error) -> Self {
        TurionError::new(ErrorCode::InvalidPhrase, format!("Invalid recovery phrase: {}", e))
    }
}

impl From<bitcoin::bip32::Error> for TurionError {
    fn from(e: bitcoin::bip32::Error) -> Self {
        TurionError::new(ErrorCode::DerivationFailed, format!("BIP32 error: {}", e))
    }
}

impl From<bitcoin::secp256k1::Error> for TurionError {
    fn from(e: bitcoin::secp256k1::Error) -> Self {
        TurionError::new(ErrorCode::DerivationFailed, format!("Secp256k1 error: {}", e))
    }
}

impl From<serde_json::Error> for TurionError {
    fn from(e: serde_json::Error) -> Self {
        TurionError::new(ErrorCode::ConfigError, e.to_string())
    }
}

impl From<std::io::Error> for TurionError {
    fn from(e: std::io::Error) -> Self {
        TurionError::new(ErrorCode::StorageError, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = TurionError::invalid_phrase("checksum mismatch")
            .with_details("word 12");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("invalid_phrase"));
        assert!(json.contains("checksum mismatch"));
    }

    #[test]
    fn test_decryption_failure_is_uniform() {
        let a = TurionError::decryption_failed();
        let b = TurionError::decryption_failed();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), format!("[DecryptionFailed] {}", DECRYPTION_FAILED_MESSAGE));
        assert!(a.is_rejection());
    }

    #[test]
    fn test_environment_errors_are_not_rejections() {
        assert!(!TurionError::storage_error("disk full").is_rejection());
        assert!(!TurionError::derivation_failed("out of range").is_rejection());
        assert!(TurionError::invalid_phrase("bad").is_rejection());
        assert!(!TurionError::network_mismatch("turion-legacy").is_rejection());
    }

    #[test]
    fn test_bip39_error_maps_to_invalid_phrase() {
        let err: TurionError = bip39::Error::InvalidChecksum.into();
        assert_eq!(err.code, ErrorCode::InvalidPhrase);
    }
}

//! Wallet Module
//!
//! Handles recovery phrase generation and validation, HD key derivation,
//! address/WIF encoding and wallet assembly for the Turion network.

mod assembler;
mod derivation;
mod encoding;
mod mnemonic;
pub mod network;

pub use assembler::*;
pub use derivation::*;
pub use encoding::*;
pub use mnemonic::*;
pub use network::{AddressScheme, Bip32Versions, NetworkParams, TURION, TURION_LEGACY};

use crate::error::TurionResult;
use crate::types::WalletRecord;

/// Create a new wallet on the default network with the default QR renderer
pub fn create_wallet() -> TurionResult<WalletRecord> {
    WalletAssembler::default().create_wallet()
}

/// Restore a wallet on the default network from a recovery phrase
pub fn restore_wallet(phrase: &str) -> TurionResult<WalletRecord> {
    WalletAssembler::default().restore_wallet(phrase)
}

/// Validate a recovery phrase (word count, wordlist and checksum)
pub fn validate_mnemonic(phrase: &str) -> bool {
    mnemonic::is_valid_mnemonic(phrase)
}

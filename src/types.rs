//! Shared types for the Turion wallet core
//!
//! Records handed to the UI layer. They are read-only once built; the UI
//! never constructs keys or addresses itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Display balance in base units. Supplied from outside the core, never computed here.
pub type Balance = u64;

// =============================================================================
// Wallet Record
// =============================================================================

/// Everything the UI shows for an open wallet.
///
/// `mnemonic` and `private_key_wif` are wiped when the record is dropped.
/// Records come only from the wallet assembler; they cannot be parsed back
/// from JSON:
///
/// ```compile_fail
/// let record: turion_wallet::WalletRecord = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct WalletRecord {
    mnemonic: String,
    address: String,
    private_key_wif: String,
    qr_code_data_url: String,
    balance: Balance,
}

impl WalletRecord {
    pub(crate) fn new(
        mnemonic: String,
        address: String,
        private_key_wif: String,
        qr_code_data_url: String,
    ) -> Self {
        Self {
            mnemonic,
            address,
            private_key_wif,
            qr_code_data_url,
            balance: 0,
        }
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn private_key_wif(&self) -> &str {
        &self.private_key_wif
    }

    /// `data:` URL of the address QR image
    pub fn qr_code_data_url(&self) -> &str {
        &self.qr_code_data_url
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Copy of this record with a new display balance
    pub fn with_balance(&self, balance: Balance) -> Self {
        let mut copy = self.clone();
        copy.balance = balance;
        copy
    }

    /// Public view of the record, safe to log or print
    pub fn summary(&self) -> WalletSummary {
        WalletSummary {
            address: self.address.clone(),
            qr_code_data_url: self.qr_code_data_url.clone(),
            balance: self.balance,
        }
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("mnemonic", &"[REDACTED]")
            .field("address", &self.address)
            .field("private_key_wif", &"[REDACTED]")
            .field("balance", &self.balance)
            .finish()
    }
}

impl Drop for WalletRecord {
    fn drop(&mut self) {
        self.mnemonic.zeroize();
        self.private_key_wif.zeroize();
    }
}

/// Non-secret part of a wallet record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub address: String,
    pub qr_code_data_url: String,
    pub balance: Balance,
}

// =============================================================================
// Wallet Status
// =============================================================================

/// Where the password-gated wallet currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    /// Nothing persisted
    NoWallet,
    /// Blob persisted, no verified password yet
    Locked,
    /// Blob persisted and its phrase held in memory
    Unlocked,
}

impl fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WalletStatus::NoWallet => "no wallet",
            WalletStatus::Locked => "locked",
            WalletStatus::Unlocked => "unlocked",
        };
        f.write_str(s)
    }
}

//! Persisted wallet slot
//!
//! Exactly one named slot holds the encrypted recovery phrase together with
//! the network and encryption settings it was written under. Writers
//! replace the whole record; readers always see one complete snapshot.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{TurionError, TurionResult};
use crate::utils::secure_storage::{EncryptedBlob, EncryptionSettings, KdfAlgorithm, SaltPolicy};
use crate::wallet::NetworkParams;

/// Default slot name, shared with the browser wallet's storage key
pub const DEFAULT_SLOT_NAME: &str = "turionEncryptedWallet";

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid slot name: {0:?}")]
    InvalidSlot(String),

    #[error("Slot already holds a wallet")]
    Occupied,

    #[error("Unreadable wallet slot: {0}")]
    Corrupt(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for TurionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Occupied => TurionError::invalid_input(
                "A wallet is already stored; log out before creating or restoring another",
            ),
            other => TurionError::storage_error(other.to_string()),
        }
    }
}

/// What a stored phrase is tied to: the network its addresses belong to and
/// the settings needed to decrypt it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBinding {
    pub network: String,
    pub kdf: KdfAlgorithm,
    pub salt_policy: SaltPolicy,
}

impl WalletBinding {
    pub fn new(params: &NetworkParams, settings: &EncryptionSettings) -> Self {
        Self {
            network: params.name.to_string(),
            kdf: settings.kdf,
            salt_policy: settings.salt_policy.clone(),
        }
    }

    /// Bytes authenticated alongside the ciphertext, so an edited binding
    /// no longer decrypts
    pub fn associated_data(&self) -> TurionResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Same encryption settings as `settings`, ignoring password policy
    pub fn matches_encryption(&self, settings: &EncryptionSettings) -> bool {
        self.kdf == settings.kdf && self.salt_policy == settings.salt_policy
    }
}

/// Contents of the slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWallet {
    pub binding: WalletBinding,
    pub blob: EncryptedBlob,
}

/// The single wallet slot
pub trait BlobStore: Send + Sync {
    /// Current contents, or `None` when no wallet is stored
    fn load(&self) -> StoreResult<Option<StoredWallet>>;

    /// Replace whatever the slot holds
    fn store(&self, wallet: &StoredWallet) -> StoreResult<()>;

    /// Fill an empty slot. Fails with `StoreError::Occupied`, leaving the
    /// existing wallet untouched, if another writer got there first.
    fn store_new(&self, wallet: &StoredWallet) -> StoreResult<()>;

    /// Remove the wallet. Clearing an empty slot is not an error.
    fn clear(&self) -> StoreResult<()>;

    fn exists(&self) -> StoreResult<bool> {
        Ok(self.load()?.is_some())
    }
}

/// Slot names end up in file names, so keep them to a safe alphabet
pub(crate) fn validate_slot_name(slot: &str) -> StoreResult<()> {
    let valid = !slot.is_empty()
        && slot.len() <= 64
        && slot.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSlot(slot.to_string()))
    }
}

#[cfg(test)]
pub(crate) fn sample_wallet(blob: &str) -> StoredWallet {
    StoredWallet {
        binding: WalletBinding::new(&crate::wallet::TURION, &EncryptionSettings::standard()),
        blob: EncryptedBlob::from_encoded(blob),
    }
}

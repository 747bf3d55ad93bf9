//! Wallet Session
//!
//! Password-gated lifecycle of the single stored wallet:
//!
//! ```text
//! NoWallet --create/restore--> Unlocked --lock--> Locked --unlock--> Unlocked
//!     ^                            |                 |
//!     +----------logout------------+-----logout------+
//! ```
//!
//! The decrypted phrase lives only in memory while `Unlocked`. A failed
//! unlock leaves both the stored blob and the session state untouched.
//!
//! The slot records the network and encryption settings the phrase was
//! stored under, and they are authenticated with the ciphertext. Opening it
//! under a different network is a `NetworkMismatch`; under different
//! encryption settings a `ConfigError`. Neither is reported as a wrong
//! password.

use std::sync::{Arc, RwLock};

use zeroize::Zeroizing;

use crate::config::WalletConfig;
use crate::error::{TurionError, TurionResult};
use crate::storage::{BlobStore, FileStore, StoredWallet, WalletBinding};
use crate::types::{WalletRecord, WalletStatus};
use crate::utils::secure_storage::EncryptionService;
use crate::wallet::{AccountInfo, WalletAssembler};
use crate::{log_info, log_warn};

const LOG_MODULE: &str = "session";

/// Stored wallet plus the in-memory unlocked record
pub struct WalletSession {
    store: Arc<dyn BlobStore>,
    encryption: EncryptionService,
    assembler: WalletAssembler,
    unlocked: RwLock<Option<WalletRecord>>,
}

impl WalletSession {
    pub fn new(store: Arc<dyn BlobStore>, encryption: EncryptionService, assembler: WalletAssembler) -> Self {
        Self {
            store,
            encryption,
            assembler,
            unlocked: RwLock::new(None),
        }
    }

    /// Session over the file slot described by `config`
    pub fn from_config(config: &WalletConfig) -> TurionResult<Self> {
        config.validate()?;
        let store = FileStore::new(&config.storage.data_dir, &config.storage.slot_name)?;
        Ok(Self::new(
            Arc::new(store),
            EncryptionService::new(config.encryption.clone())?,
            WalletAssembler::with_params(config.network_params()?),
        ))
    }

    pub fn assembler(&self) -> &WalletAssembler {
        &self.assembler
    }

    pub fn status(&self) -> TurionResult<WalletStatus> {
        if self.read_unlocked()?.is_some() {
            return Ok(WalletStatus::Unlocked);
        }
        if self.store.exists()? {
            Ok(WalletStatus::Locked)
        } else {
            Ok(WalletStatus::NoWallet)
        }
    }

    /// Generate a new wallet, persist its encrypted phrase and unlock it
    pub fn create(&self, password: &str) -> TurionResult<WalletRecord> {
        self.ensure_empty_slot()?;
        let record = self.assembler.create_wallet()?;
        self.persist_and_unlock(record, password)
    }

    /// Restore from a phrase, persist it encrypted and unlock it
    pub fn restore(&self, phrase: &str, password: &str) -> TurionResult<WalletRecord> {
        self.ensure_empty_slot()?;
        let record = self.assembler.restore_wallet(phrase)?;
        self.persist_and_unlock(record, password)
    }

    /// Decrypt the stored phrase and hold the rebuilt wallet in memory
    pub fn unlock(&self, password: &str) -> TurionResult<WalletRecord> {
        let record = self.open_stored(password)?;
        *self.write_unlocked()? = Some(record.clone());
        log_info!(LOG_MODULE, "wallet unlocked", address = record.address());
        Ok(record)
    }

    /// Forget the in-memory wallet; the stored blob stays
    pub fn lock(&self) -> TurionResult<()> {
        *self.write_unlocked()? = None;
        log_info!(LOG_MODULE, "wallet locked");
        Ok(())
    }

    /// Delete the stored blob and the in-memory wallet
    pub fn logout(&self) -> TurionResult<()> {
        self.store.clear()?;
        *self.write_unlocked()? = None;
        log_info!(LOG_MODULE, "wallet removed");
        Ok(())
    }

    /// The unlocked wallet
    pub fn current(&self) -> TurionResult<WalletRecord> {
        if let Some(record) = self.read_unlocked()?.as_ref() {
            return Ok(record.clone());
        }
        Err(self.not_unlocked_error()?)
    }

    /// Phrase and WIF, only after the password is checked again against
    /// the stored blob. Does not change the session state.
    pub fn reveal_secrets(&self, password: &str) -> TurionResult<WalletRecord> {
        let record = self.open_stored(password)?;
        log_info!(LOG_MODULE, "secrets revealed", address = record.address());
        Ok(record)
    }

    /// Public account details of the unlocked wallet
    pub fn account_info(&self) -> TurionResult<AccountInfo> {
        let record = self.current()?;
        self.assembler.account_info(record.mnemonic())
    }

    /// Account-level extended private key, after checking the password
    /// against the stored blob like `reveal_secrets`
    pub fn reveal_account_xprv(&self, password: &str) -> TurionResult<Zeroizing<String>> {
        let record = self.open_stored(password)?;
        let xprv = self.assembler.account_xprv(record.mnemonic())?;
        log_info!(LOG_MODULE, "account xprv revealed", address = record.address());
        Ok(xprv)
    }

    /// Binding for wallets written by this session
    pub fn binding(&self) -> WalletBinding {
        WalletBinding::new(self.assembler.params(), self.encryption.settings())
    }

    fn persist_and_unlock(&self, record: WalletRecord, password: &str) -> TurionResult<WalletRecord> {
        let binding = self.binding();
        let blob = self
            .encryption
            .encrypt_bound(record.mnemonic(), password, &binding.associated_data()?)?;
        // a concurrent writer may have filled the slot since the emptiness check
        self.store.store_new(&StoredWallet { binding, blob })?;
        *self.write_unlocked()? = Some(record.clone());
        log_info!(LOG_MODULE, "wallet stored", address = record.address(), network = self.assembler.params().name);
        Ok(record)
    }

    fn open_stored(&self, password: &str) -> TurionResult<WalletRecord> {
        let stored = self.load_stored()?;
        self.check_binding(&stored.binding)?;

        let context = stored.binding.associated_data()?;
        let phrase = self
            .encryption
            .decrypt_bound(&stored.blob, password, &context)
            .map_err(|e| {
                log_warn!(LOG_MODULE, "password rejected");
                e
            })?;
        self.assembler.restore_wallet(&phrase)
    }

    /// The stored wallet must have been written under this session's
    /// network and encryption settings
    fn check_binding(&self, binding: &WalletBinding) -> TurionResult<()> {
        let network = self.assembler.params().name;
        if binding.network != network {
            log_warn!(LOG_MODULE, "network mismatch", stored = &binding.network, configured = network);
            return Err(TurionError::network_mismatch(format!(
                "Stored wallet belongs to network '{}' but '{}' is configured",
                binding.network, network
            )));
        }

        let settings = self.encryption.settings();
        if !binding.matches_encryption(settings) {
            log_warn!(LOG_MODULE, "encryption settings mismatch");
            return Err(TurionError::config_error(
                "Stored wallet was encrypted with different settings than configured",
            )
            .with_details(format!(
                "stored: {:?} {:?}, configured: {:?} {:?}",
                binding.kdf, binding.salt_policy, settings.kdf, settings.salt_policy
            )));
        }
        Ok(())
    }

    fn load_stored(&self) -> TurionResult<StoredWallet> {
        self.store
            .load()?
            .ok_or_else(|| TurionError::no_wallet("No wallet stored"))
    }

    fn ensure_empty_slot(&self) -> TurionResult<()> {
        if self.store.exists()? {
            log_warn!(LOG_MODULE, "slot occupied");
            return Err(TurionError::invalid_input(
                "A wallet is already stored; log out before creating or restoring another",
            ));
        }
        Ok(())
    }

    fn not_unlocked_error(&self) -> TurionResult<TurionError> {
        if self.store.exists()? {
            Ok(TurionError::wallet_locked("Wallet is locked"))
        } else {
            Ok(TurionError::no_wallet("No wallet stored"))
        }
    }

    fn read_unlocked(&self) -> TurionResult<std::sync::RwLockReadGuard<'_, Option<WalletRecord>>> {
        self.unlocked
            .read()
            .map_err(|_| TurionError::internal("Session lock poisoned"))
    }

    fn write_unlocked(&self) -> TurionResult<std::sync::RwLockWriteGuard<'_, Option<WalletRecord>>> {
        self.unlocked
            .write()
            .map_err(|_| TurionError::internal("Session lock poisoned"))
    }
}

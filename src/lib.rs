//! Turion Wallet Core Library
//!
//! Deterministic key derivation and at-rest phrase encryption for the
//! Turion network wallet.
//!
//! # Architecture
//!
//! This crate provides:
//! - **wallet**: Recovery phrases, HD derivation, address/WIF encoding, wallet assembly
//! - **utils::secure_storage**: Password-based AES-256-GCM encryption of the phrase
//! - **storage**: The single wallet slot (memory or file backed), bound to its network
//! - **session**: The `NoWallet -> Unlocked -> Locked` lifecycle over a slot
//! - **qr**: Address QR images as `data:` URLs
//! - **config**: JSON configuration with presets
//! - **runtime**: Async wrappers that move CPU-bound work off the executor
//!
//! # Security
//!
//! Seeds, derived keys and decrypted phrases are zeroed when dropped.
//! Log output redacts phrases, passwords and WIF strings by field name.
//!
//! # Example
//!
//! ```rust,ignore
//! use turion_wallet::wallet;
//!
//! let record = wallet::restore_wallet("abandon abandon ... about")?;
//! println!("Address: {}", record.address());
//! ```

pub mod config;
pub mod error;
pub mod qr;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use config::WalletConfig;
pub use error::{ErrorCode, TurionError, TurionResult};
pub use session::WalletSession;
pub use types::*;
pub use utils::secure_storage::{EncryptedBlob, EncryptionService, EncryptionSettings};

// Re-export wallet functions
pub use wallet::{create_wallet, restore_wallet, validate_mnemonic, WalletAssembler};

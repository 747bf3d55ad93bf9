//! Wallet Configuration
//!
//! One JSON document configures the whole core:
//! - `network`: parameter set preset (`turion` or `turion-legacy`)
//! - `encryption`: KDF, salt policy and password rules
//! - `storage`: where the encrypted blob slot lives
//! - `logging`: debug output switch
//!
//! Missing fields fall back to `WalletConfig::standard()`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TurionError, TurionResult};
use crate::storage::{validate_slot_name, DEFAULT_SLOT_NAME};
use crate::utils::secure_storage::{EncryptionSettings, KdfAlgorithm, SaltPolicy, DEFAULT_PBKDF2_ITERATIONS};
use crate::wallet::NetworkParams;

/// Default directory for the blob slot, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = ".turion-wallet";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Network parameter set preset name. A stored wallet only opens
    /// under the network it was created with.
    pub network: String,
    pub encryption: EncryptionSettings,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Blob slot location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub slot_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            slot_name: DEFAULT_SLOT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub debug: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl WalletConfig {
    /// Turion network, PBKDF2-SHA256 (100k) with a random salt per blob
    pub fn standard() -> Self {
        Self {
            network: crate::wallet::TURION.name.to_string(),
            encryption: EncryptionSettings::standard(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Blobs interchangeable with the browser wallet (fixed `turion-salt` label)
    pub fn web_compatible() -> Self {
        Self {
            encryption: EncryptionSettings::web_compatible(),
            ..Self::standard()
        }
    }

    /// Load from a JSON file and validate
    pub fn load(path: impl AsRef<Path>) -> TurionResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            TurionError::config_error(format!("Cannot read config file {}", path.display()))
                .with_details(e.to_string())
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string and validate
    pub fn from_json(json: &str) -> TurionResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The network parameter set named by `network`
    pub fn network_params(&self) -> TurionResult<NetworkParams> {
        NetworkParams::from_name(&self.network)
    }

    /// Reject values that cannot work
    pub fn validate(&self) -> TurionResult<()> {
        self.network_params()?;
        self.encryption.validate()?;
        validate_slot_name(&self.storage.slot_name)
            .map_err(|e| TurionError::config_error(e.to_string()))?;
        Ok(())
    }

    /// Settings that work but weaken the wallet
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let SaltPolicy::FixedLabel(_) = self.encryption.salt_policy {
            warnings.push("Fixed salt label: the same password derives the same key for every wallet".to_string());
        }

        if let KdfAlgorithm::Pbkdf2Sha256 { iterations } = self.encryption.kdf {
            if iterations < DEFAULT_PBKDF2_ITERATIONS {
                warnings.push(format!(
                    "PBKDF2 iterations ({}) below the recommended {}",
                    iterations, DEFAULT_PBKDF2_ITERATIONS
                ));
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::wallet::TURION_LEGACY;

    #[test]
    fn test_standard_preset() {
        let config = WalletConfig::standard();
        assert!(config.validate().is_ok());
        assert!(config.warnings().is_empty());
        assert_eq!(config.storage.slot_name, "turionEncryptedWallet");
        assert_eq!(config.encryption.salt_policy, SaltPolicy::PerBlob);
        assert_eq!(config.network_params().unwrap().bech32_hrp, "tur");
    }

    #[test]
    fn test_web_compatible_preset_warns() {
        let config = WalletConfig::web_compatible();
        assert!(config.validate().is_ok());
        assert_eq!(config.warnings().len(), 1);
        assert_eq!(config.encryption.salt_policy, SaltPolicy::FixedLabel("turion-salt".into()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WalletConfig::from_json(
            r#"{
                "network": "turion-legacy",
                "encryption": { "kdf": { "algorithm": "pbkdf2_sha256", "iterations": 2000 } },
                "logging": { "debug": true }
            }"#,
        )
        .unwrap();

        assert_eq!(config.network_params().unwrap(), TURION_LEGACY);
        assert_eq!(config.encryption.kdf, KdfAlgorithm::Pbkdf2Sha256 { iterations: 2000 });
        assert_eq!(config.encryption.min_password_len, 6);
        assert_eq!(config.storage, StorageConfig::default());
        assert!(config.logging.debug);
        assert_eq!(config.warnings().len(), 1);
    }

    #[test]
    fn test_rejects_unknown_network() {
        let err = WalletConfig::from_json(r#"{ "network": "bitcoin" }"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let err = WalletConfig::from_json(
            r#"{ "encryption": { "kdf": { "algorithm": "pbkdf2_sha256", "iterations": 0 } } }"#,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_rejects_empty_slot() {
        let err = WalletConfig::from_json(r#"{ "storage": { "slot_name": "" } }"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_malformed_json() {
        let err = WalletConfig::from_json("{ network: ").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_load_missing_file() {
        let err = WalletConfig::load("/nonexistent/turion.json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }
}

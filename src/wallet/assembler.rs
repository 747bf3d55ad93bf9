//! Wallet Assembler
//!
//! The only way the UI obtains wallet data: phrase -> seed -> leaf key ->
//! address/WIF -> QR image, bundled into an immutable `WalletRecord`.

use bip39::Mnemonic;
use serde::Serialize;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::error::TurionResult;
use crate::qr::{QrRenderer, SvgQrRenderer};
use crate::types::WalletRecord;
use crate::{log_info, log_warn};

use super::derivation::{derive_account_keys, derive_leaf_key_pair, derive_seed};
use super::encoding::{encode_address, encode_extended_private, encode_extended_public, encode_secret_key};
use super::mnemonic::{generate_mnemonic, parse_mnemonic};
use super::network::{format_path, NetworkParams};

const LOG_MODULE: &str = "wallet";

/// Public account details for a phrase, without any secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub network: &'static str,
    pub leaf_path: String,
    pub address: String,
    pub account_path: String,
    pub account_xpub: String,
}

/// Builds wallet records under one network parameter set
#[derive(Clone)]
pub struct WalletAssembler {
    params: NetworkParams,
    qr: Arc<dyn QrRenderer>,
}

impl WalletAssembler {
    pub fn new(params: NetworkParams, qr: Arc<dyn QrRenderer>) -> Self {
        Self { params, qr }
    }

    /// Assembler for `params` using the default SVG QR renderer
    pub fn with_params(params: NetworkParams) -> Self {
        Self::new(params, Arc::new(SvgQrRenderer::default()))
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    /// Generate a new phrase and build its wallet
    pub fn create_wallet(&self) -> TurionResult<WalletRecord> {
        let mnemonic = generate_mnemonic()?;
        let record = self.assemble(&mnemonic, "")?;
        log_info!(LOG_MODULE, "wallet created", address = record.address(), network = self.params.name);
        Ok(record)
    }

    /// Rebuild the wallet for a user-supplied phrase.
    ///
    /// Fails with `InvalidPhrase` before any derivation if the phrase does
    /// not pass the checksum.
    pub fn restore_wallet(&self, phrase: &str) -> TurionResult<WalletRecord> {
        self.restore_wallet_with_passphrase(phrase, "")
    }

    /// Same as `restore_wallet` with a BIP-39 passphrase
    pub fn restore_wallet_with_passphrase(&self, phrase: &str, passphrase: &str) -> TurionResult<WalletRecord> {
        let mnemonic = parse_mnemonic(phrase).map_err(|e| {
            log_warn!(LOG_MODULE, "restore rejected", reason = &e.message);
            e
        })?;
        let record = self.assemble(&mnemonic, passphrase)?;
        log_info!(LOG_MODULE, "wallet restored", address = record.address(), network = self.params.name);
        Ok(record)
    }

    /// Address and account xpub for a phrase
    pub fn account_info(&self, phrase: &str) -> TurionResult<AccountInfo> {
        let mnemonic = parse_mnemonic(phrase)?;
        let seed = derive_seed(&mnemonic, "");
        let pair = derive_leaf_key_pair(&seed, &self.params)?;
        let xpub = derive_account_keys(&seed, &self.params)?.1;

        Ok(AccountInfo {
            network: self.params.name,
            leaf_path: pair.path_string(),
            address: encode_address(pair.public_key(), &self.params)?,
            account_path: format_path(&self.params.account_path()),
            account_xpub: encode_extended_public(&xpub, &self.params),
        })
    }

    /// Account-level extended private key under the set's BIP-32 versions
    pub fn account_xprv(&self, phrase: &str) -> TurionResult<Zeroizing<String>> {
        let mnemonic = parse_mnemonic(phrase)?;
        let seed = derive_seed(&mnemonic, "");
        let (xpriv, _) = derive_account_keys(&seed, &self.params)?;
        Ok(Zeroizing::new(encode_extended_private(&xpriv, &self.params)))
    }

    fn assemble(&self, mnemonic: &Mnemonic, passphrase: &str) -> TurionResult<WalletRecord> {
        let seed = derive_seed(mnemonic, passphrase);
        let pair = derive_leaf_key_pair(&seed, &self.params)?;

        let address = encode_address(pair.public_key(), &self.params)?;
        let private_key_wif = encode_secret_key(pair.secret_key(), &self.params);
        let qr_code_data_url = self.qr.render(&address)?;

        Ok(WalletRecord::new(
            mnemonic.to_string(),
            address,
            private_key_wif,
            qr_code_data_url,
        ))
    }
}

impl Default for WalletAssembler {
    fn default() -> Self {
        Self::with_params(NetworkParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::qr::{QrError, QrResult};
    use crate::wallet::network::{TURION, TURION_LEGACY};

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    struct FailingRenderer;

    impl QrRenderer for FailingRenderer {
        fn render(&self, _address: &str) -> QrResult<String> {
            Err(QrError::Generation("renderer offline".into()))
        }
    }

    #[test]
    fn test_restore_golden_vector() {
        let record = WalletAssembler::default().restore_wallet(TEST_PHRASE).unwrap();
        assert_eq!(record.address(), "tur1qruhlme44e0rr4wtsvsvkernpc8xx7qg3xmm5l5");
        assert_eq!(record.private_key_wif(), "QR9b3jzX4GqAsXBQbnRJ1ENci7XodGD5MZxNZJj6vRwVKPd3rSRM");
        assert_eq!(record.mnemonic(), TEST_PHRASE);
        assert_eq!(record.balance(), 0);
        assert!(record.qr_code_data_url().starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_create_then_restore_matches() {
        let assembler = WalletAssembler::default();
        let created = assembler.create_wallet().unwrap();
        let restored = assembler.restore_wallet(created.mnemonic()).unwrap();
        assert_eq!(created, restored);
    }

    #[test]
    fn test_restore_rejects_bad_checksum() {
        let bad = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        let err = WalletAssembler::default().restore_wallet(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhrase);
    }

    #[test]
    fn test_passphrase_changes_address() {
        let assembler = WalletAssembler::default();
        let record = assembler.restore_wallet_with_passphrase(TEST_PHRASE, "TREZOR").unwrap();
        assert_eq!(record.address(), "tur1qvp8su9c0gmn6txsqzj023lqhaxs8s53v6ytpsm");
    }

    #[test]
    fn test_params_are_threaded_through() {
        let legacy = WalletAssembler::with_params(TURION_LEGACY).restore_wallet(TEST_PHRASE).unwrap();
        assert_eq!(legacy.address(), "VeDPc6coBsk9dXX855SxRprf9gcGTrFXJ");
        assert_eq!(WalletAssembler::with_params(TURION).params(), &TURION);
    }

    #[test]
    fn test_qr_failure_is_surfaced() {
        let assembler = WalletAssembler::new(TURION, Arc::new(FailingRenderer));
        let err = assembler.restore_wallet(TEST_PHRASE).unwrap_err();
        assert_eq!(err.code, ErrorCode::QrError);
    }

    #[test]
    fn test_account_info() {
        let info = WalletAssembler::default().account_info(TEST_PHRASE).unwrap();
        assert_eq!(info.leaf_path, "m/44'/905'/0'/0/0");
        assert_eq!(info.account_path, "m/44'/905'/0'");
        assert_eq!(info.address, "tur1qruhlme44e0rr4wtsvsvkernpc8xx7qg3xmm5l5");
        assert!(info.account_xpub.starts_with("xpub"));
    }

    #[test]
    fn test_account_xprv_matches_xpub() {
        use bitcoin::bip32::{Xpriv, Xpub};
        use bitcoin::secp256k1::Secp256k1;
        use std::str::FromStr;

        let assembler = WalletAssembler::default();
        let xprv = assembler.account_xprv(TEST_PHRASE).unwrap();
        assert!(xprv.starts_with("xprv"));

        let xpriv = Xpriv::from_str(&xprv).unwrap();
        let xpub = Xpub::from_priv(&Secp256k1::new(), &xpriv);
        assert_eq!(xpub.to_string(), assembler.account_info(TEST_PHRASE).unwrap().account_xpub);
    }

    #[test]
    fn test_account_xprv_rejects_bad_phrase() {
        let bad = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        let err = WalletAssembler::default().account_xprv(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhrase);
    }
}

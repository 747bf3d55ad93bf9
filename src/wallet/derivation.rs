//! Seed and key derivation
//!
//! Recovery phrase -> 64-byte BIP-39 seed -> BIP-32 tree -> the single leaf
//! key at `m/44'/<coin>'/0'/0/0`. Everything here is a pure function of the
//! phrase, passphrase and network parameters.
//!
//! SECURITY: seeds and secret keys are wiped when dropped.

use bip39::Mnemonic;
use bitcoin::bip32::{ChildNumber, Xpriv, Xpub};
use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{All, Secp256k1, SecretKey};
use bitcoin::NetworkKind;
use std::fmt;
use zeroize::Zeroizing;

use crate::error::{TurionError, TurionResult};

use super::network::{format_path, NetworkParams};

/// Length of a BIP-39 seed
pub const SEED_LEN: usize = 64;

/// Binary seed stretched from a recovery phrase
pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// Leaf key pair on secp256k1
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: CompressedPublicKey,
    path: Vec<u32>,
}

impl KeyPair {
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn public_key(&self) -> &CompressedPublicKey {
        &self.public_key
    }

    /// Raw derivation indices that produced this key
    pub fn path(&self) -> &[u32] {
        &self.path
    }

    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key.to_bytes()))
            .field("path", &self.path_string())
            .finish_non_exhaustive()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

/// BIP-39 seed from a validated phrase and optional passphrase (usually "")
pub fn derive_seed(mnemonic: &Mnemonic, passphrase: &str) -> Seed {
    Seed::from_bytes(mnemonic.to_seed(passphrase))
}

/// Root of the HD tree
pub fn derive_master(seed: &Seed) -> TurionResult<Xpriv> {
    // The network kind only picks serialization bytes, which we never use
    // from the bitcoin crate; extended keys are encoded with NetworkParams.
    Ok(Xpriv::new_master(NetworkKind::Main, seed.as_bytes())?)
}

/// Walk `path` from the root.
///
/// An invalid child key (negligible probability) is a fatal
/// `DerivationFailed`; no other index is tried.
pub fn derive_node(secp: &Secp256k1<All>, seed: &Seed, path: &[u32]) -> TurionResult<Xpriv> {
    let master = derive_master(seed)?;
    let children: Vec<ChildNumber> = path.iter().copied().map(ChildNumber::from).collect();
    master.derive_priv(secp, &children).map_err(|e| {
        TurionError::derivation_failed(format!("Child derivation failed at {}", format_path(path)))
            .with_details(e.to_string())
    })
}

/// Key pair at an arbitrary path
pub fn derive_key_pair_at(seed: &Seed, path: &[u32]) -> TurionResult<KeyPair> {
    let secp = Secp256k1::new();
    let node = derive_node(&secp, seed, path)?;
    let secret_key = node.private_key;
    let public_key = CompressedPublicKey(secret_key.public_key(&secp));

    Ok(KeyPair {
        secret_key,
        public_key,
        path: path.to_vec(),
    })
}

/// The wallet's one leaf key, at the path fixed by `params`
pub fn derive_leaf_key_pair(seed: &Seed, params: &NetworkParams) -> TurionResult<KeyPair> {
    derive_key_pair_at(seed, &params.leaf_path())
}

/// Account-level node (`m/44'/<coin>'/0'`) as a private/public pair
pub fn derive_account_keys(seed: &Seed, params: &NetworkParams) -> TurionResult<(Xpriv, Xpub)> {
    let secp = Secp256k1::new();
    let xpriv = derive_node(&secp, seed, &params.account_path())?;
    let xpub = Xpub::from_priv(&secp, &xpriv);
    Ok((xpriv, xpub))
}

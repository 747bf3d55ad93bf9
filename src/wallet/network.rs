//! Network Parameter Set
//!
//! Version bytes and prefixes that make keys and addresses belong to the
//! Turion chain. A `NetworkParams` value is threaded through derivation and
//! every encoding call; nothing reads these constants from anywhere else.

use serde::{Deserialize, Serialize};

use crate::error::{TurionError, TurionResult};

/// Hardened offset for BIP-32 derivation
pub const HARDENED: u32 = 0x8000_0000;

/// BIP-44 purpose used for the wallet's single leaf key
pub const BIP44_PURPOSE: u32 = 44;

/// Address format the chain uses for the leaf key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressScheme {
    /// Witness v0 key hash, bech32 with the chain HRP (`tur1q...`)
    P2wpkh,
    /// Legacy key hash, base58check with the pubkey-hash version byte
    P2pkh,
}

/// BIP-32 extended key version bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bip32Versions {
    pub public: u32,
    pub private: u32,
}

/// Chain-specific constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkParams {
    /// Preset name, used in config and logs
    pub name: &'static str,
    pub message_prefix: &'static str,
    pub bech32_hrp: &'static str,
    pub bip32: Bip32Versions,
    pub pubkey_hash: u8,
    pub script_hash: u8,
    pub wif: u8,
    /// SLIP-44 style coin index in `m/44'/<coin>'/0'/0/0`
    pub coin_index: u32,
    pub address_scheme: AddressScheme,
}

/// The production Turion network: native segwit addresses, `Q...` WIFs.
pub const TURION: NetworkParams = NetworkParams {
    name: "turion",
    message_prefix: "\x19Turion Signed Message:\n",
    bech32_hrp: "tur",
    bip32: Bip32Versions {
        public: 0x0488_b21e,
        private: 0x0488_ade4,
    },
    pubkey_hash: 0x01,
    script_hash: 0x05,
    wif: 0x9e,
    coin_index: 905,
    address_scheme: AddressScheme::P2wpkh,
};

/// Legacy key-hash variant. Produces different addresses than `TURION`
/// for the same phrase; only usable as a whole set.
pub const TURION_LEGACY: NetworkParams = NetworkParams {
    name: "turion-legacy",
    message_prefix: "\x19Turion Signed Message:\n",
    bech32_hrp: "tur",
    bip32: Bip32Versions {
        public: 0x0488_b21e,
        private: 0x0488_ade4,
    },
    pubkey_hash: 0x01,
    script_hash: 0x05,
    wif: 0x80,
    coin_index: 1,
    address_scheme: AddressScheme::P2pkh,
};

impl NetworkParams {
    /// Look up a preset by name
    pub fn from_name(name: &str) -> TurionResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "turion" => Ok(TURION),
            "turion-legacy" => Ok(TURION_LEGACY),
            other => Err(TurionError::config_error(format!(
                "Unknown network preset: {}",
                other
            ))),
        }
    }

    /// Path components for the leaf key: `44' / coin' / 0' / 0 / 0`
    pub fn leaf_path(&self) -> [u32; 5] {
        [
            BIP44_PURPOSE | HARDENED,
            self.coin_index | HARDENED,
            HARDENED,
            0,
            0,
        ]
    }

    /// Path components for the account node: `44' / coin' / 0'`
    pub fn account_path(&self) -> [u32; 3] {
        let leaf = self.leaf_path();
        [leaf[0], leaf[1], leaf[2]]
    }

    /// Leaf path in `m/...` notation
    pub fn leaf_path_string(&self) -> String {
        format_path(&self.leaf_path())
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        TURION
    }
}

/// Render raw indices as `m/44'/905'/0'/0/0`
pub fn format_path(indices: &[u32]) -> String {
    let mut out = String::from("m");
    for index in indices {
        if index & HARDENED != 0 {
            out.push_str(&format!("/{}'", index & !HARDENED));
        } else {
            out.push_str(&format!("/{}", index));
        }
    }
    out
}

//! Password-based encryption of the recovery phrase
//!
//! Provides at-rest protection for the one persisted wallet artifact using:
//! - AES-256-GCM for authenticated encryption
//! - PBKDF2-HMAC-SHA256 or Argon2id for key derivation from the password
//! - A fresh random IV per call, so the same input never encrypts twice alike
//!
//! Blob layouts (standard base64 of the bytes below):
//! - per-blob salt: `kdf_tag(1) || salt(16) || iv(12) || ciphertext+tag`
//! - fixed label:   `iv(12) || ciphertext+tag`, readable by the browser wallet
//!
//! KDF costs always come from the service settings, never from the blob.
//! The `*_bound` variants authenticate a caller-supplied context as AES-GCM
//! associated data; the browser wallet format uses an empty context.

#![allow(deprecated)] // GenericArray::from_slice deprecated in generic-array 1.x

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroizing;

use crate::error::{TurionError, TurionResult};
use crate::log_debug;

const LOG_MODULE: &str = "secure_storage";

/// Derived AES-256 key length
pub const KEY_LEN: usize = 32;
/// Random salt length for per-blob salts
pub const SALT_LEN: usize = 16;
/// AES-GCM IV length
pub const IV_LEN: usize = 12;
/// AES-GCM authentication tag length
pub const TAG_LEN: usize = 16;

/// Default PBKDF2 iteration count
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;
/// Fixed label used as salt by the browser wallet
pub const LEGACY_SALT_LABEL: &str = "turion-salt";
/// Shortest password accepted when encrypting
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

/// Argon2 refuses salts shorter than this
const ARGON2_MIN_SALT_LEN: usize = 8;

const PBKDF2_TAG: u8 = 0x01;
const ARGON2_TAG: u8 = 0x02;

/// Key derivation function and its cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum KdfAlgorithm {
    Pbkdf2Sha256 {
        iterations: u32,
    },
    Argon2id {
        /// Memory cost in KiB
        memory_kib: u32,
        time_cost: u32,
        parallelism: u32,
    },
}

impl KdfAlgorithm {
    fn tag(&self) -> u8 {
        match self {
            KdfAlgorithm::Pbkdf2Sha256 { .. } => PBKDF2_TAG,
            KdfAlgorithm::Argon2id { .. } => ARGON2_TAG,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KdfAlgorithm::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
            KdfAlgorithm::Argon2id { .. } => "argon2id",
        }
    }
}

impl Default for KdfAlgorithm {
    fn default() -> Self {
        KdfAlgorithm::Pbkdf2Sha256 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

/// Where the KDF salt comes from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaltPolicy {
    /// Fresh random salt per encryption, stored in the blob
    #[default]
    PerBlob,
    /// One hard-coded label for every wallet (browser wallet format)
    FixedLabel(String),
}

/// Encryption settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionSettings {
    pub kdf: KdfAlgorithm,
    pub salt_policy: SaltPolicy,
    pub min_password_len: usize,
}

impl Default for EncryptionSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl EncryptionSettings {
    /// PBKDF2-SHA256 at 100k iterations with a random salt per blob
    pub fn standard() -> Self {
        Self {
            kdf: KdfAlgorithm::default(),
            salt_policy: SaltPolicy::PerBlob,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }

    /// Blob format shared with the browser wallet
    pub fn web_compatible() -> Self {
        Self {
            salt_policy: SaltPolicy::FixedLabel(LEGACY_SALT_LABEL.to_string()),
            ..Self::standard()
        }
    }

    /// Reject settings that can never produce a usable key
    pub fn validate(&self) -> TurionResult<()> {
        match self.kdf {
            KdfAlgorithm::Pbkdf2Sha256 { iterations } => {
                if iterations == 0 {
                    return Err(TurionError::config_error("PBKDF2 iterations must be at least 1"));
                }
            }
            KdfAlgorithm::Argon2id { memory_kib, time_cost, parallelism } => {
                argon2::Params::new(memory_kib, time_cost, parallelism, Some(KEY_LEN))
                    .map_err(|e| TurionError::config_error(format!("Invalid Argon2 parameters: {}", e)))?;
            }
        }

        if let SaltPolicy::FixedLabel(label) = &self.salt_policy {
            if label.is_empty() {
                return Err(TurionError::config_error("Salt label must not be empty"));
            }
            if matches!(self.kdf, KdfAlgorithm::Argon2id { .. }) && label.len() < ARGON2_MIN_SALT_LEN {
                return Err(TurionError::config_error(format!(
                    "Argon2 needs a salt label of at least {} bytes",
                    ARGON2_MIN_SALT_LEN
                )));
            }
        }

        if self.min_password_len == 0 {
            return Err(TurionError::config_error("Minimum password length must be at least 1"));
        }

        Ok(())
    }
}

/// Text-encoded encrypted recovery phrase, as persisted
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBlob(String);

impl EncryptedBlob {
    /// Wrap a blob read back from storage. No validation happens here;
    /// a malformed blob simply fails to decrypt.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedBlob({} chars)", self.0.len())
    }
}

impl fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encrypts and decrypts recovery phrases under a password
#[derive(Debug, Clone)]
pub struct EncryptionService {
    settings: EncryptionSettings,
}

impl Default for EncryptionService {
    fn default() -> Self {
        Self {
            settings: EncryptionSettings::standard(),
        }
    }
}

impl EncryptionService {
    pub fn new(settings: EncryptionSettings) -> TurionResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EncryptionSettings {
        &self.settings
    }

    /// Encrypt `plaintext` under `password` with a fresh IV (and salt)
    pub fn encrypt(&self, plaintext: &str, password: &str) -> TurionResult<EncryptedBlob> {
        self.encrypt_bound(plaintext, password, &[])
    }

    /// Encrypt and authenticate `context` with the ciphertext. The same
    /// context must be supplied to `decrypt_bound`.
    pub fn encrypt_bound(&self, plaintext: &str, password: &str, context: &[u8]) -> TurionResult<EncryptedBlob> {
        self.encrypt_with_rng(plaintext, password, context, &mut OsRng)
    }

    /// Same as `encrypt_bound` with an explicit randomness source
    pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
        &self,
        plaintext: &str,
        password: &str,
        context: &[u8],
        rng: &mut R,
    ) -> TurionResult<EncryptedBlob> {
        if password.chars().count() < self.settings.min_password_len {
            return Err(TurionError::invalid_input(format!(
                "Password must be at least {} characters",
                self.settings.min_password_len
            )));
        }

        let mut iv = [0u8; IV_LEN];
        let mut out = Vec::with_capacity(1 + SALT_LEN + IV_LEN + plaintext.len() + TAG_LEN);

        let key = match &self.settings.salt_policy {
            SaltPolicy::PerBlob => {
                let mut salt = [0u8; SALT_LEN];
                fill_random(rng, &mut salt)?;
                out.push(self.settings.kdf.tag());
                out.extend_from_slice(&salt);
                self.derive_key(password, &salt)?
            }
            SaltPolicy::FixedLabel(label) => self.derive_key(password, label.as_bytes())?,
        };

        fill_random(rng, &mut iv)?;

        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| TurionError::crypto_error(format!("Failed to create cipher: {}", e)))?;
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: context,
                },
            )
            .map_err(|e| TurionError::crypto_error(format!("Encryption failed: {}", e)))?;

        out.extend_from_slice(&iv);
        out.extend_from_slice(&ciphertext);

        log_debug!(LOG_MODULE, "phrase encrypted", kdf = self.settings.kdf.name(), bytes = out.len());
        Ok(EncryptedBlob(BASE64.encode(&out)))
    }

    /// Decrypt a blob. Every failure, whatever its cause, is the same
    /// `DecryptionFailed` error; no partial plaintext is ever returned.
    pub fn decrypt(&self, blob: &EncryptedBlob, password: &str) -> TurionResult<Zeroizing<String>> {
        self.decrypt_bound(blob, password, &[])
    }

    /// Decrypt a blob sealed by `encrypt_bound`. A different context fails
    /// exactly like a wrong password.
    pub fn decrypt_bound(
        &self,
        blob: &EncryptedBlob,
        password: &str,
        context: &[u8],
    ) -> TurionResult<Zeroizing<String>> {
        self.try_decrypt(blob, password, context)
            .ok_or_else(TurionError::decryption_failed)
    }

    /// Check a password against a blob without handing out the plaintext
    pub fn verify_password(&self, blob: &EncryptedBlob, password: &str) -> bool {
        self.try_decrypt(blob, password, &[]).is_some()
    }

    fn try_decrypt(&self, blob: &EncryptedBlob, password: &str, context: &[u8]) -> Option<Zeroizing<String>> {
        let raw = Zeroizing::new(BASE64.decode(blob.as_str().trim()).ok()?);

        let (salt, rest): (&[u8], &[u8]) = match &self.settings.salt_policy {
            SaltPolicy::PerBlob => {
                if raw.len() < 1 + SALT_LEN + IV_LEN + TAG_LEN || raw[0] != self.settings.kdf.tag() {
                    return None;
                }
                (&raw[1..1 + SALT_LEN], &raw[1 + SALT_LEN..])
            }
            SaltPolicy::FixedLabel(label) => {
                if raw.len() < IV_LEN + TAG_LEN {
                    return None;
                }
                (label.as_bytes(), &raw[..])
            }
        };
        let (iv, ciphertext) = rest.split_at(IV_LEN);

        let key = self.derive_key(password, salt).ok()?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice()).ok()?;
        let payload = Payload {
            msg: ciphertext,
            aad: context,
        };
        let plaintext = Zeroizing::new(cipher.decrypt(Nonce::from_slice(iv), payload).ok()?);

        let text = std::str::from_utf8(&plaintext).ok()?;
        Some(Zeroizing::new(text.to_owned()))
    }

    fn derive_key(&self, password: &str, salt: &[u8]) -> TurionResult<Zeroizing<[u8; KEY_LEN]>> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);

        match self.settings.kdf {
            KdfAlgorithm::Pbkdf2Sha256 { iterations } => {
                pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key[..]);
            }
            KdfAlgorithm::Argon2id { memory_kib, time_cost, parallelism } => {
                use argon2::{Algorithm, Argon2, Params, Version};

                let params = Params::new(memory_kib, time_cost, parallelism, Some(KEY_LEN))
                    .map_err(|e| TurionError::crypto_error(format!("Invalid KDF params: {}", e)))?;
                Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                    .hash_password_into(password.as_bytes(), salt, &mut key[..])
                    .map_err(|e| TurionError::crypto_error(format!("Key derivation failed: {}", e)))?;
            }
        }

        Ok(key)
    }
}

fn fill_random<R: RngCore + CryptoRng>(rng: &mut R, buf: &mut [u8]) -> TurionResult<()> {
    rng.try_fill_bytes(buf)
        .map_err(|e| TurionError::entropy_unavailable(format!("System random source failed: {}", e)))
}

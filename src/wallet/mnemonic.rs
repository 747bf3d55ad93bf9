//! Recovery phrase generation and validation
//!
//! SECURITY: entropy buffers are zeroized on drop. A phrase is only ever
//! accepted after the BIP-39 checksum has been verified.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{TurionError, TurionResult};

/// Words in every Turion recovery phrase
pub const WORD_COUNT: usize = 12;

/// 128 bits of entropy -> 12 words
pub const ENTROPY_BYTES: usize = 16;

/// Generate a fresh 12-word phrase from the operating system RNG
pub fn generate_mnemonic() -> TurionResult<Mnemonic> {
    generate_mnemonic_with(&mut OsRng)
}

/// Generate a fresh phrase from the supplied RNG.
///
/// A failing RNG is an error; there is no fallback source.
pub fn generate_mnemonic_with<R: RngCore + CryptoRng>(rng: &mut R) -> TurionResult<Mnemonic> {
    let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
    rng.try_fill_bytes(entropy.as_mut())
        .map_err(|e| TurionError::entropy_unavailable(format!("Random source unavailable: {}", e)))?;

    Mnemonic::from_entropy_in(Language::English, entropy.as_ref())
        .map_err(|e| TurionError::crypto_error(format!("Failed to create mnemonic: {}", e)))
}

/// Canonical form of user input: lowercase words separated by single spaces
pub fn normalize_phrase(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse user input into a checksum-verified 12-word phrase
pub fn parse_mnemonic(input: &str) -> TurionResult<Mnemonic> {
    let normalized = Zeroizing::new(normalize_phrase(input));

    let count = normalized.split(' ').filter(|w| !w.is_empty()).count();
    if count != WORD_COUNT {
        return Err(TurionError::invalid_phrase(format!(
            "Recovery phrase must have {} words, got {}",
            WORD_COUNT, count
        )));
    }

    Ok(Mnemonic::parse_in(Language::English, normalized.as_str())?)
}

/// Check if a phrase would be accepted by `parse_mnemonic`
pub fn is_valid_mnemonic(input: &str) -> bool {
    parse_mnemonic(input).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0)
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no entropy",
            )))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn test_generate_has_twelve_valid_words() {
        let mnemonic = generate_mnemonic().unwrap();
        let phrase = mnemonic.to_string();
        assert_eq!(phrase.split(' ').count(), WORD_COUNT);
        assert!(is_valid_mnemonic(&phrase));
    }

    #[test]
    fn test_generate_is_not_repeated() {
        let a = generate_mnemonic().unwrap().to_string();
        let b = generate_mnemonic().unwrap().to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_broken_rng_propagates() {
        let err = generate_mnemonic_with(&mut BrokenRng).unwrap_err();
        assert_eq!(err.code, ErrorCode::EntropyUnavailable);
    }

    #[test]
    fn test_normalization() {
        let messy = "  Abandon abandon\tabandon abandon abandon abandon\nabandon abandon abandon abandon abandon ABOUT ";
        assert_eq!(normalize_phrase(messy), TEST_PHRASE);
        assert_eq!(parse_mnemonic(messy).unwrap().to_string(), TEST_PHRASE);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let bad = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        let err = parse_mnemonic(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhrase);
    }

    #[test]
    fn test_unknown_word_rejected() {
        let bad = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon turion";
        assert_eq!(parse_mnemonic(bad).unwrap_err().code, ErrorCode::InvalidPhrase);
    }

    #[test]
    fn test_word_count_enforced() {
        // Valid 24-word BIP-39 phrase, but not a Turion phrase
        let long = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";
        assert_eq!(parse_mnemonic(long).unwrap_err().code, ErrorCode::InvalidPhrase);
        assert!(!is_valid_mnemonic(""));
    }
}

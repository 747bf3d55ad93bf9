//! Address and secret-key encoding
//!
//! All encoders take the `NetworkParams` explicitly. With the bundled
//! presets none of them can fail for a key produced by `derivation`.

use bech32::{self, Variant};
use bitcoin::bip32::{Xpriv, Xpub};
use bitcoin::hashes::{hash160, sha256d, Hash};
use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::SecretKey;

use crate::error::{TurionError, TurionResult};

use super::network::{AddressScheme, NetworkParams};

/// WIF payload suffix marking a compressed public key
const COMPRESSED_FLAG: u8 = 0x01;

/// Witness program version for P2WPKH
const WITNESS_V0: u8 = 0;

/// Encode the chain address for a public key
pub fn encode_address(public_key: &CompressedPublicKey, params: &NetworkParams) -> TurionResult<String> {
    let pubkey_hash = hash160::Hash::hash(&public_key.to_bytes());

    match params.address_scheme {
        AddressScheme::P2wpkh => encode_segwit_v0(params.bech32_hrp, pubkey_hash.as_ref()),
        AddressScheme::P2pkh => {
            let mut payload = Vec::with_capacity(21);
            payload.push(params.pubkey_hash);
            payload.extend_from_slice(pubkey_hash.as_ref());
            Ok(base58check_encode(payload))
        }
    }
}

/// Encode a secret key as a compressed WIF string
pub fn encode_secret_key(secret_key: &SecretKey, params: &NetworkParams) -> String {
    let mut data = Vec::with_capacity(34);
    data.push(params.wif);
    data.extend_from_slice(&secret_key.secret_bytes());
    data.push(COMPRESSED_FLAG);

    let encoded = base58check_encode(data.clone());
    zeroize::Zeroize::zeroize(&mut data);
    encoded
}

/// Decode a WIF string, rejecting keys encoded for another network
pub fn decode_secret_key(wif: &str, params: &NetworkParams) -> TurionResult<SecretKey> {
    let payload = zeroize::Zeroizing::new(base58check_decode(wif.trim())?);

    if payload.len() != 34 || payload[33] != COMPRESSED_FLAG {
        return Err(TurionError::invalid_input("Not a compressed WIF key"));
    }
    if payload[0] != params.wif {
        return Err(TurionError::invalid_input(format!(
            "WIF version 0x{:02x} does not belong to network {}",
            payload[0], params.name
        )));
    }

    SecretKey::from_slice(&payload[1..33])
        .map_err(|e| TurionError::invalid_input(format!("Invalid secret key: {}", e)))
}

/// Serialize an extended public key with the network's BIP-32 version
pub fn encode_extended_public(xpub: &Xpub, params: &NetworkParams) -> String {
    let mut bytes = xpub.encode();
    bytes[..4].copy_from_slice(&params.bip32.public.to_be_bytes());
    base58check_encode(bytes.to_vec())
}

/// Serialize an extended private key with the network's BIP-32 version
pub fn encode_extended_private(xpriv: &Xpriv, params: &NetworkParams) -> String {
    let mut bytes = xpriv.encode();
    bytes[..4].copy_from_slice(&params.bip32.private.to_be_bytes());
    let encoded = base58check_encode(bytes.to_vec());
    zeroize::Zeroize::zeroize(&mut bytes);
    encoded
}

fn encode_segwit_v0(hrp: &str, program: &[u8]) -> TurionResult<String> {
    let version = bech32::u5::try_from_u8(WITNESS_V0)
        .map_err(|e| TurionError::internal(format!("Bech32 error: {}", e)))?;
    let converted = bech32::convert_bits(program, 8, 5, true)
        .map_err(|e| TurionError::internal(format!("Bech32 error: {}", e)))?;

    let mut data = Vec::with_capacity(1 + converted.len());
    data.push(version);
    for value in converted {
        let u5 = bech32::u5::try_from_u8(value)
            .map_err(|e| TurionError::internal(format!("Bech32 error: {}", e)))?;
        data.push(u5);
    }

    bech32::encode(hrp, data, Variant::Bech32)
        .map_err(|e| TurionError::internal(format!("Bech32 error: {}", e)))
}

/// Base58 with a 4-byte double-SHA256 checksum
pub fn base58check_encode(mut payload: Vec<u8>) -> String {
    let checksum = sha256d::Hash::hash(&payload);
    payload.extend_from_slice(&checksum[..4]);
    let encoded = bs58::encode(&payload).into_string();
    zeroize::Zeroize::zeroize(&mut payload);
    encoded
}

fn base58check_decode(s: &str) -> TurionResult<Vec<u8>> {
    let mut raw = bs58::decode(s)
        .into_vec()
        .map_err(|e| TurionError::invalid_input(format!("Invalid base58: {}", e)))?;
    if raw.len() < 5 {
        return Err(TurionError::invalid_input("Base58 payload too short"));
    }

    let split = raw.len() - 4;
    let checksum = sha256d::Hash::hash(&raw[..split]);
    if checksum[..4] != raw[split..] {
        zeroize::Zeroize::zeroize(&mut raw);
        return Err(TurionError::invalid_input("Base58 checksum mismatch"));
    }

    raw.truncate(split);
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::derivation::{derive_account_keys, derive_leaf_key_pair, derive_seed};
    use crate::wallet::network::{TURION, TURION_LEGACY};
    use bip39::Mnemonic;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn seed() -> crate::wallet::derivation::Seed {
        derive_seed(&Mnemonic::parse(TEST_PHRASE).unwrap(), "")
    }

    #[test]
    fn test_turion_segwit_address() {
        let pair = derive_leaf_key_pair(&seed(), &TURION).unwrap();
        let address = encode_address(pair.public_key(), &TURION).unwrap();
        assert_eq!(address, "tur1qruhlme44e0rr4wtsvsvkernpc8xx7qg3xmm5l5");
    }

    #[test]
    fn test_turion_wif() {
        let pair = derive_leaf_key_pair(&seed(), &TURION).unwrap();
        let wif = encode_secret_key(pair.secret_key(), &TURION);
        assert_eq!(wif, "QR9b3jzX4GqAsXBQbnRJ1ENci7XodGD5MZxNZJj6vRwVKPd3rSRM");
    }

    #[test]
    fn test_legacy_preset_vectors() {
        let pair = derive_leaf_key_pair(&seed(), &TURION_LEGACY).unwrap();
        assert_eq!(
            encode_address(pair.public_key(), &TURION_LEGACY).unwrap(),
            "VeDPc6coBsk9dXX855SxRprf9gcGTrFXJ"
        );
        assert_eq!(
            encode_secret_key(pair.secret_key(), &TURION_LEGACY),
            "L4jNzRuAe1kHvGj7N5UXd3m9erYWRkV6EnXiHR6AoMM37dEzUkTV"
        );
    }

    #[test]
    fn test_wif_decode_checks_network() {
        let pair = derive_leaf_key_pair(&seed(), &TURION).unwrap();
        let wif = encode_secret_key(pair.secret_key(), &TURION);

        let decoded = decode_secret_key(&wif, &TURION).unwrap();
        assert_eq!(decoded.secret_bytes(), pair.secret_key().secret_bytes());
        assert!(decode_secret_key(&wif, &TURION_LEGACY).is_err());
    }

    #[test]
    fn test_wif_decode_rejects_bad_checksum() {
        let mut wif = encode_secret_key(
            derive_leaf_key_pair(&seed(), &TURION).unwrap().secret_key(),
            &TURION,
        );
        let last = wif.pop().unwrap();
        wif.push(if last == 'M' { 'N' } else { 'M' });
        assert!(decode_secret_key(&wif, &TURION).is_err());
    }

    #[test]
    fn test_account_extended_keys() {
        let (xpriv, xpub) = derive_account_keys(&seed(), &TURION).unwrap();
        assert_eq!(
            encode_extended_public(&xpub, &TURION),
            "xpub6CdRkkFRgwSgXnWpJXs2Bt65DNBxHCXSPe9gLw5zFhMzu4CnyDuJrbsKLuCS9vJbojNqBDJDVVJZSBjzhGGD4faXuhu8kXqP6bcZHw9vFk6"
        );
        assert_eq!(
            encode_extended_private(&xpriv, &TURION),
            "xprv9ye5MEiXrZtPKJSMCWL1pk9LfLMTsjob2RE5YYgNhMq22FseRgb4JoYqVbrqZUsN1j3b7w7hDniZrFdx8XXgHH9QmZB4LNL6EAkgZatbFCi"
        );
    }
}

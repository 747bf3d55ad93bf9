//! Async entry points
//!
//! Derivation and key stretching are CPU-bound. These wrappers run them on
//! tokio's blocking pool so an async caller's executor stays responsive.
//! Each call owns its inputs; nothing is shared between calls.

use zeroize::Zeroizing;

use crate::error::{TurionError, TurionResult};
use crate::types::WalletRecord;
use crate::utils::secure_storage::{EncryptedBlob, EncryptionService};
use crate::wallet::WalletAssembler;

async fn offload<T, F>(task: F) -> TurionResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> TurionResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| TurionError::internal(format!("Blocking task failed: {}", e)))?
}

pub async fn create_wallet_async(assembler: WalletAssembler) -> TurionResult<WalletRecord> {
    offload(move || assembler.create_wallet()).await
}

pub async fn restore_wallet_async(assembler: WalletAssembler, phrase: String) -> TurionResult<WalletRecord> {
    let phrase = Zeroizing::new(phrase);
    offload(move || assembler.restore_wallet(&phrase)).await
}

pub async fn encrypt_async(
    service: EncryptionService,
    plaintext: String,
    password: String,
) -> TurionResult<EncryptedBlob> {
    let plaintext = Zeroizing::new(plaintext);
    let password = Zeroizing::new(password);
    offload(move || service.encrypt(&plaintext, &password)).await
}

pub async fn decrypt_async(
    service: EncryptionService,
    blob: EncryptedBlob,
    password: String,
) -> TurionResult<Zeroizing<String>> {
    let password = Zeroizing::new(password);
    offload(move || service.decrypt(&blob, &password)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::utils::secure_storage::{EncryptionSettings, KdfAlgorithm};

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn fast_service() -> EncryptionService {
        EncryptionService::new(EncryptionSettings {
            kdf: KdfAlgorithm::Pbkdf2Sha256 { iterations: 1000 },
            ..EncryptionSettings::standard()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_parallel_creation() {
        let assembler = WalletAssembler::default();
        let (a, b) = tokio::join!(
            create_wallet_async(assembler.clone()),
            create_wallet_async(assembler.clone())
        );
        assert_ne!(a.unwrap().address(), b.unwrap().address());
    }

    #[tokio::test]
    async fn test_restore_async_matches_sync() {
        let assembler = WalletAssembler::default();
        let record = restore_wallet_async(assembler.clone(), TEST_PHRASE.to_string()).await.unwrap();
        assert_eq!(record, assembler.restore_wallet(TEST_PHRASE).unwrap());

        let err = restore_wallet_async(assembler, "not a phrase".to_string()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhrase);
    }

    #[tokio::test]
    async fn test_encrypt_decrypt_async() {
        let service = fast_service();
        let blob = encrypt_async(service.clone(), TEST_PHRASE.to_string(), "correcthorse".to_string())
            .await
            .unwrap();

        let phrase = decrypt_async(service.clone(), blob.clone(), "correcthorse".to_string())
            .await
            .unwrap();
        assert_eq!(phrase.as_str(), TEST_PHRASE);

        let err = decrypt_async(service, blob, "wrongpass".to_string()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DecryptionFailed);
    }
}

//! In-memory slot for tests and embedders that persist elsewhere

use std::sync::{Arc, RwLock};

use super::{BlobStore, StoreError, StoreResult, StoredWallet};

/// Holds the wallet as an immutable snapshot that is swapped on every write
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<Option<Arc<StoredWallet>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a wallet
    pub fn with_wallet(wallet: StoredWallet) -> Self {
        Self {
            slot: RwLock::new(Some(Arc::new(wallet))),
        }
    }
}

impl BlobStore for MemoryStore {
    fn load(&self) -> StoreResult<Option<StoredWallet>> {
        let snapshot = self.slot.read().map_err(|_| StoreError::Poisoned)?.clone();
        Ok(snapshot.map(|wallet| (*wallet).clone()))
    }

    fn store(&self, wallet: &StoredWallet) -> StoreResult<()> {
        let next = Arc::new(wallet.clone());
        *self.slot.write().map_err(|_| StoreError::Poisoned)? = Some(next);
        Ok(())
    }

    fn store_new(&self, wallet: &StoredWallet) -> StoreResult<()> {
        let mut slot = self.slot.write().map_err(|_| StoreError::Poisoned)?;
        if slot.is_some() {
            return Err(StoreError::Occupied);
        }
        *slot = Some(Arc::new(wallet.clone()));
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        *self.slot.write().map_err(|_| StoreError::Poisoned)? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sample_wallet;
    use std::thread;

    #[test]
    fn test_store_load_clear() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        assert!(!store.exists().unwrap());

        let wallet = sample_wallet("AQID");
        store.store(&wallet).unwrap();
        assert_eq!(store.load().unwrap(), Some(wallet));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_store_new_keeps_first_wallet() {
        let store = MemoryStore::new();
        store.store_new(&sample_wallet("first")).unwrap();

        assert!(matches!(store.store_new(&sample_wallet("second")), Err(StoreError::Occupied)));
        assert_eq!(store.load().unwrap().unwrap().blob.as_str(), "first");
    }

    #[test]
    fn test_readers_see_whole_blobs() {
        let a = "A".repeat(512);
        let b = "B".repeat(512);
        let store = Arc::new(MemoryStore::with_wallet(sample_wallet(&a)));

        let writer = {
            let store = Arc::clone(&store);
            let (a, b) = (a.clone(), b.clone());
            thread::spawn(move || {
                for i in 0..200 {
                    let next = if i % 2 == 0 { &b } else { &a };
                    store.store(&sample_wallet(next)).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let seen = store.load().unwrap().unwrap();
            assert!(seen.blob.as_str() == a || seen.blob.as_str() == b);
        }
        writer.join().unwrap();
    }
}

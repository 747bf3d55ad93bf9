//! File-backed slot
//!
//! The wallet lives in `<data_dir>/<slot>.blob` as one line of JSON. Writes
//! go to a uniquely named temp file in the same directory which is then
//! renamed over the slot, so a reader gets either the old or the new
//! contents, never a mix. A first write hard-links the temp file into
//! place instead, which fails if the slot already exists.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use super::{validate_slot_name, BlobStore, StoreError, StoreResult, StoredWallet};

const BLOB_EXTENSION: &str = "blob";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Slot stored as a single file
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    slot: String,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>, slot_name: &str) -> StoreResult<Self> {
        validate_slot_name(slot_name)?;
        Ok(Self {
            dir: data_dir.into(),
            slot: slot_name.to_string(),
        })
    }

    /// Full path of the slot file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.slot, BLOB_EXTENSION))
    }

    fn temp_path(&self) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}.{}.tmp", self.slot, std::process::id(), n))
    }

    fn write_temp(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    /// Serialize `wallet` into a fresh temp file and hand it to `publish`.
    /// The temp file is gone afterwards whatever `publish` did.
    fn publish_with(
        &self,
        wallet: &StoredWallet,
        publish: impl FnOnce(&Path, &Path) -> std::io::Result<()>,
    ) -> StoreResult<()> {
        let mut contents = serde_json::to_string(wallet).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        contents.push('\n');

        fs::create_dir_all(&self.dir)?;
        let temp_path = self.temp_path();
        let result = Self::write_temp(&temp_path, contents.as_bytes())
            .and_then(|_| publish(&temp_path, &self.path()));
        let _ = fs::remove_file(&temp_path);
        result.map_err(StoreError::from)
    }
}

impl BlobStore for FileStore {
    fn load(&self) -> StoreResult<Option<StoredWallet>> {
        let contents = match fs::read_to_string(self.path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(contents.trim_end())
            .map(Some)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn store(&self, wallet: &StoredWallet) -> StoreResult<()> {
        self.publish_with(wallet, |temp, slot| fs::rename(temp, slot))
    }

    fn store_new(&self, wallet: &StoredWallet) -> StoreResult<()> {
        self.publish_with(wallet, |temp, slot| fs::hard_link(temp, slot))
            .map_err(|e| match e {
                StoreError::Io(io) if io.kind() == ErrorKind::AlreadyExists => StoreError::Occupied,
                other => other,
            })
    }

    fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-only
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{BlobStore, RecordKey, StoreError};

/// Directory holding one `<segment>.bin` file per record.
///
/// Lets the daemon run against exported registry values on any platform.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn path_for(&self, key: RecordKey) -> PathBuf {
        self.directory.join(format!("{}.bin", key.segment()))
    }
}

impl BlobStore for FileStore {
    fn exists(&self, key: RecordKey) -> bool {
        self.path_for(key).is_file()
    }

    fn read_blob(&self, key: RecordKey) -> Result<Vec<u8>, StoreError> {
        fs::read(self.path_for(key)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::KeyNotFound { key },
            _ => StoreError::Io {
                key,
                reason: e.to_string(),
            },
        })
    }

    fn write_blob(&self, key: RecordKey, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let staging = path.with_extension("bin.tmp");

        // Stage then rename so readers never observe a partial record
        fs::write(&staging, bytes)
            .and_then(|()| fs::rename(&staging, &path))
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => {
                    StoreError::WriteDenied {
                        key,
                        reason: e.to_string(),
                    }
                }
                _ => StoreError::Io {
                    key,
                    reason: e.to_string(),
                },
            })?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch_dir() -> PathBuf {
        let dir = env::temp_dir().join(format!("nightlight_store_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_writes_then_reads_back() {
        let dir = scratch_dir();
        let store = FileStore::new(&dir);

        assert!(!store.exists(RecordKey::State));
        store.write_blob(RecordKey::State, &[0x13, 0x15]).unwrap();
        assert!(store.exists(RecordKey::State));
        assert_eq!(store.read_blob(RecordKey::State).unwrap(), vec![0x13, 0x15]);
        assert!(store.path_for(RecordKey::State).ends_with("bluelightreductionstate.bin"));
        assert!(!dir.join("bluelightreductionstate.bin.tmp").exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_key_not_found() {
        let dir = scratch_dir();
        let store = FileStore::new(&dir);
        assert!(matches!(
            store.read_blob(RecordKey::Settings),
            Err(StoreError::KeyNotFound { .. })
        ));
        fs::remove_dir_all(dir).unwrap();
    }
}

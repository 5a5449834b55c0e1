// SPDX-License-Identifier: GPL-3.0-only
//! Blob storage the night light records live in.
//!
//! On Windows this is the per-user CloudStore in the registry. The other
//! implementations exist so the codecs and the daemon can run against
//! captured or synthetic records.

mod file;
mod memory;
#[cfg(windows)]
mod registry;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(windows)]
pub use registry::RegistryStore;

use strum_macros::{EnumIter, IntoStaticStr};

const REGISTRY_KEY_PREFIX: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\CloudStore\\Store\\DefaultAccount\\Current";
const NAMESPACE: &str = "windows.data.bluelightreduction";

/// Name of the binary value holding the record under each key.
pub const DATA_VALUE: &str = "Data";

/// The two records the night light feature persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum RecordKey {
    #[strum(serialize = "bluelightreductionstate")]
    State,
    #[strum(serialize = "settings")]
    Settings,
}

impl RecordKey {
    /// Namespace segment naming this record, e.g. `bluelightreductionstate`.
    #[must_use]
    pub fn segment(self) -> &'static str {
        self.into()
    }

    /// Registry path relative to `HKEY_CURRENT_USER`.
    #[must_use]
    pub fn registry_path(self) -> String {
        let segment = self.segment();
        format!("{REGISTRY_KEY_PREFIX}\\default${NAMESPACE}.{segment}\\{NAMESPACE}.{segment}")
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record {key} not found")]
    KeyNotFound { key: RecordKey },

    #[error("Writing record {key} was denied: {reason}")]
    WriteDenied { key: RecordKey, reason: String },

    #[error("I/O error on record {key}: {reason}")]
    Io { key: RecordKey, reason: String },
}

/// Key/value store holding the raw record blobs.
///
/// Implementations do no caching; every read returns what is stored now.
pub trait BlobStore: Send + Sync {
    fn exists(&self, key: RecordKey) -> bool;

    /// Read the whole blob for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyNotFound`] if nothing is stored under `key`,
    /// or [`StoreError::Io`] if the backend fails.
    fn read_blob(&self, key: RecordKey) -> Result<Vec<u8>, StoreError>;

    /// Replace the blob for `key` in a single call.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteDenied`] if the backend refuses the write.
    fn write_blob(&self, key: RecordKey, bytes: &[u8]) -> Result<(), StoreError>;
}

impl<T: BlobStore + ?Sized> BlobStore for std::sync::Arc<T> {
    fn exists(&self, key: RecordKey) -> bool {
        (**self).exists(key)
    }

    fn read_blob(&self, key: RecordKey) -> Result<Vec<u8>, StoreError> {
        (**self).read_blob(key)
    }

    fn write_blob(&self, key: RecordKey, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write_blob(key, bytes)
    }
}

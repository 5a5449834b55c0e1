// SPDX-License-Identifier: GPL-3.0-only
pub mod filter;
pub mod record;
pub mod store;

// Re-export commonly used types for convenience
pub use filter::{BlueLightFilter, FilterError};
pub use record::{Percent, RecordError, RecordStatus};
pub use store::{BlobStore, FileStore, MemoryStore, RecordKey, StoreError};

#[cfg(windows)]
pub use store::RegistryStore;

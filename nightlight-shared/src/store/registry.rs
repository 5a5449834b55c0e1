// SPDX-License-Identifier: GPL-3.0-only
//! Per-user CloudStore registry backend.

use log::debug;
use std::ffi::c_void;
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_PATH_NOT_FOUND,
    ERROR_SUCCESS, WIN32_ERROR,
};
use windows::Win32::System::Registry::{
    HKEY_CURRENT_USER, REG_BINARY, RRF_RT_REG_BINARY, RegGetValueW, RegSetKeyValueW,
};
use windows::core::HSTRING;

use super::{BlobStore, DATA_VALUE, RecordKey, StoreError};

const MAX_READ_ATTEMPTS: usize = 3;

/// Reads and writes the `Data` value under each record's CloudStore key.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryStore;

impl RegistryStore {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Query the value size, or fill `buffer` when given. Returns the size
    /// reported by the registry.
    fn query(key: RecordKey, buffer: Option<&mut [u8]>) -> (WIN32_ERROR, usize) {
        let subkey = HSTRING::from(key.registry_path());
        let value = HSTRING::from(DATA_VALUE);
        let (data, mut size) = match buffer {
            Some(buf) => (
                Some(buf.as_mut_ptr().cast::<c_void>()),
                u32::try_from(buf.len()).unwrap_or(u32::MAX),
            ),
            None => (None, 0),
        };

        // SAFETY: `data` points to a buffer of `size` bytes that outlives the call.
        let status = unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                &subkey,
                &value,
                RRF_RT_REG_BINARY,
                None,
                data,
                Some(&raw mut size),
            )
        };
        (status, size as usize)
    }
}

fn io_error(key: RecordKey, status: WIN32_ERROR) -> StoreError {
    StoreError::Io {
        key,
        reason: format!("registry error {}", status.0),
    }
}

impl BlobStore for RegistryStore {
    fn exists(&self, key: RecordKey) -> bool {
        let (status, _) = Self::query(key, None);
        status == ERROR_SUCCESS
    }

    fn read_blob(&self, key: RecordKey) -> Result<Vec<u8>, StoreError> {
        // The value can grow between the size query and the read
        for _ in 0..MAX_READ_ATTEMPTS {
            let (status, size) = Self::query(key, None);
            match status {
                ERROR_SUCCESS => {}
                ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => {
                    return Err(StoreError::KeyNotFound { key });
                }
                other => return Err(io_error(key, other)),
            }

            let mut buffer = vec![0u8; size];
            let (status, written) = Self::query(key, Some(&mut buffer));
            match status {
                ERROR_SUCCESS => {
                    buffer.truncate(written);
                    debug!("Read {written} bytes from registry record {key}");
                    return Ok(buffer);
                }
                ERROR_MORE_DATA => {}
                other => return Err(io_error(key, other)),
            }
        }
        Err(StoreError::Io {
            key,
            reason: "value kept changing size while reading".to_string(),
        })
    }

    fn write_blob(&self, key: RecordKey, bytes: &[u8]) -> Result<(), StoreError> {
        let subkey = HSTRING::from(key.registry_path());
        let value = HSTRING::from(DATA_VALUE);
        let len = u32::try_from(bytes.len()).map_err(|_| StoreError::WriteDenied {
            key,
            reason: format!("{} bytes exceeds registry value limit", bytes.len()),
        })?;

        // SAFETY: `bytes` is valid for `len` bytes for the duration of the call.
        let status = unsafe {
            RegSetKeyValueW(
                HKEY_CURRENT_USER,
                &subkey,
                &value,
                REG_BINARY.0,
                Some(bytes.as_ptr().cast::<c_void>()),
                len,
            )
        };

        match status {
            ERROR_SUCCESS => {
                debug!("Wrote {} bytes to registry record {key}", bytes.len());
                Ok(())
            }
            ERROR_ACCESS_DENIED => Err(StoreError::WriteDenied {
                key,
                reason: "access denied".to_string(),
            }),
            other => Err(StoreError::WriteDenied {
                key,
                reason: format!("registry error {}", other.0),
            }),
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-only
//! Night light control on top of a [`BlobStore`].
//!
//! Every operation reads the current record, runs it through the codec and
//! writes a complete replacement back in one call. Nothing is cached between
//! calls, and callers must not drive one store from two filters at once.

use log::{debug, info};

use crate::record::{self, Percent, RecordError, RecordStatus, intensity, settings, state};
use crate::store::{BlobStore, RecordKey, StoreError};

/// Filter errors
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(RecordError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(RecordError),

    #[error("Record {key} is empty")]
    InvalidState { key: RecordKey },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<RecordError> for FilterError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::PercentOutOfRange { .. } => FilterError::InvalidArgument(err),
            RecordError::Malformed { .. } | RecordError::IntensityOutOfRange { .. } => {
                FilterError::MalformedRecord(err)
            }
        }
    }
}

pub struct BlueLightFilter<S> {
    store: S,
}

impl<S: BlobStore> BlueLightFilter<S> {
    /// Wrap `store` after checking both records are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedEnvironment`] if either record is
    /// missing, unreadable or empty.
    pub fn new(store: S) -> Result<Self, FilterError> {
        for key in [RecordKey::State, RecordKey::Settings] {
            if !store.exists(key) {
                return Err(FilterError::UnsupportedEnvironment(format!(
                    "night light record {key} not found"
                )));
            }
            match store.read_blob(key) {
                Ok(blob) if blob.is_empty() => {
                    return Err(FilterError::UnsupportedEnvironment(format!(
                        "night light record {key} is empty"
                    )));
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(FilterError::UnsupportedEnvironment(format!(
                        "night light record {key} is unreadable: {e}"
                    )));
                }
            }
        }

        info!("Night light records found, filter ready");
        Ok(Self { store })
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Activate the filter. No write happens if it is already on.
    ///
    /// # Errors
    ///
    /// Returns an error if the state record cannot be read, decoded or written.
    pub fn turn_on(&self) -> Result<(), FilterError> {
        let current = self.read(RecordKey::State)?;
        let next = state::turn_on(&current)?;
        self.write_if_changed(RecordKey::State, &current, &next)
    }

    /// Deactivate the filter. No write happens if it is already off.
    ///
    /// # Errors
    ///
    /// Returns an error if the state record cannot be read, decoded or written.
    pub fn turn_off(&self) -> Result<(), FilterError> {
        let current = self.read(RecordKey::State)?;
        let next = state::turn_off(&current)?;
        self.write_if_changed(RecordKey::State, &current, &next)
    }

    /// Decoded on/off status.
    ///
    /// # Errors
    ///
    /// Returns an error if the state record cannot be read or decoded.
    pub fn status(&self) -> Result<RecordStatus, FilterError> {
        let current = self.read(RecordKey::State)?;
        Ok(state::decode(&current)?.status)
    }

    /// Whether the filter is currently active.
    ///
    /// # Errors
    ///
    /// Returns an error if the state record cannot be read or decoded.
    pub fn is_on(&self) -> Result<bool, FilterError> {
        Ok(self.status()? == RecordStatus::On)
    }

    /// Set the intensity, activating the filter first.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] for values outside `0..=100`
    /// without touching the store, or any read, decode or write error.
    pub fn set_intensity_percent(&self, percent: i64) -> Result<(), FilterError> {
        let percent = Percent::try_from(percent)?;
        self.set_intensity(percent)
    }

    /// Typed form of [`Self::set_intensity_percent`].
    ///
    /// # Errors
    ///
    /// Returns any read, decode or write error.
    pub fn set_intensity(&self, percent: Percent) -> Result<(), FilterError> {
        self.turn_on()?;

        let strength = intensity::percent_to_strength(percent);
        debug!("Setting intensity to {percent} (strength {strength})");
        self.set_strength(strength)
    }

    /// Store an exact strength without touching the on/off state.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MalformedRecord`] for a strength wider than 14
    /// bits, or any read, decode or write error.
    pub fn set_strength(&self, strength: u16) -> Result<(), FilterError> {
        let current = self.read(RecordKey::Settings)?;
        let next = settings::encode_intensity(&current, strength)?;
        self.write_if_changed(RecordKey::Settings, &current, &next)
    }

    /// Current intensity, truncated toward zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings record cannot be read or decoded.
    pub fn intensity_percent(&self) -> Result<Percent, FilterError> {
        let current = self.read(RecordKey::Settings)?;
        let strength = settings::decode_intensity(&current)?;
        Ok(intensity::strength_to_percent(strength))
    }

    /// Raw stored strength, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings record cannot be read or decoded.
    pub fn strength(&self) -> Result<u16, FilterError> {
        let current = self.read(RecordKey::Settings)?;
        Ok(settings::decode_intensity(&current)?)
    }

    /// Decoded state record, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the state record cannot be read or decoded.
    pub fn state_record(&self) -> Result<record::StateRecord, FilterError> {
        let current = self.read(RecordKey::State)?;
        Ok(state::decode(&current)?)
    }

    fn read(&self, key: RecordKey) -> Result<Vec<u8>, FilterError> {
        let blob = self.store.read_blob(key)?;
        if blob.is_empty() {
            return Err(FilterError::InvalidState { key });
        }
        Ok(blob)
    }

    fn write_if_changed(
        &self,
        key: RecordKey,
        current: &[u8],
        next: &[u8],
    ) -> Result<(), FilterError> {
        if current == next {
            debug!("Record {key} unchanged, skipping write");
            return Ok(());
        }
        self.store.write_blob(key, next)?;
        Ok(())
    }
}

// SPDX-License-Identifier: GPL-3.0-only
//! Codecs for the two night light records.
//!
//! Both codecs are pure: they take the current blob and return a complete
//! replacement, leaving every byte they do not own as it was.

pub mod fixtures;
pub mod intensity;
pub mod layout;
pub mod settings;
pub mod state;
pub mod timestamp;

pub use intensity::{Percent, STRENGTH_MAX, STRENGTH_MIN};
pub use state::{RecordStatus, StateRecord};

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Malformed {record} record: {len} bytes, need at least {required}")]
    Malformed {
        record: &'static str,
        len: usize,
        required: usize,
    },

    #[error("Strength {value} does not fit in 14 bits")]
    IntensityOutOfRange { value: u16 },

    #[error("Percentage {value} is outside 0-100")]
    PercentOutOfRange { value: i64 },
}

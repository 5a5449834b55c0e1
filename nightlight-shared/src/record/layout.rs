// SPDX-License-Identifier: GPL-3.0-only
//! Byte layout of the night light records.
//!
//! Every offset the codecs touch is named here. Anything not named is opaque
//! and is only ever copied, never interpreted.

use super::RecordError;

/// Half-open byte range `[start, end)` inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "byte range start must not exceed its end");
        Self { start, end }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Borrow this range out of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Malformed`] when `bytes` ends before the range does.
    pub fn slice<'a>(
        self,
        record: &'static str,
        bytes: &'a [u8],
    ) -> Result<&'a [u8], RecordError> {
        bytes
            .get(self.start..self.end)
            .ok_or(RecordError::Malformed {
                record,
                len: bytes.len(),
                required: self.end,
            })
    }

    /// Copy this range of `src` into `dst`, starting at `dst_start`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Malformed`] when either buffer is too short.
    pub fn copy_to(
        self,
        record: &'static str,
        src: &[u8],
        dst: &mut [u8],
        dst_start: usize,
    ) -> Result<(), RecordError> {
        let source = self.slice(record, src)?;
        let dst_len = dst.len();
        let target = dst
            .get_mut(dst_start..dst_start + self.len())
            .ok_or(RecordError::Malformed {
                record,
                len: dst_len,
                required: dst_start + self.len(),
            })?;
        target.copy_from_slice(source);
        Ok(())
    }
}

// State record ("bluelightreductionstate")

/// Five byte continuation-bit timestamp of the last state change.
pub const TIMESTAMP: ByteRange = ByteRange::new(10, 15);

/// On/off discriminator.
pub const STATUS_TAG: usize = 18;
pub const STATUS_OFF: u8 = 0x13;
pub const STATUS_ON: u8 = 0x15;

/// Leading part of the record kept in place by both transitions.
pub const STATE_PREFIX: ByteRange = ByteRange::new(0, 23);

/// Sub-field that only exists in the active (long) form.
pub const ACTIVE_FIELD: ByteRange = ByteRange::new(23, 25);
pub const ACTIVE_FIELD_VALUE: [u8; 2] = [0x10, 0x00];

/// Canonical record lengths. Transitions need at least this much input.
pub const INACTIVE_LEN: usize = 41;
pub const ACTIVE_LEN: usize = INACTIVE_LEN + ACTIVE_FIELD.len();

/// Smallest record `decode` accepts.
pub const STATE_MIN_LEN: usize = STATUS_TAG + 1;

/// Prefix bytes that are neither the timestamp nor the status tag.
pub const OPAQUE_STATE_RANGES: [ByteRange; 3] = [
    ByteRange::new(0, TIMESTAMP.start),
    ByteRange::new(TIMESTAMP.end, STATUS_TAG),
    ByteRange::new(STATUS_TAG + 1, STATE_PREFIX.end),
];

// Settings record ("settings")

/// Low six bits of the strength, stored doubled with the high bit set.
pub const INTENSITY_LOW: usize = 35;
/// Remaining strength bits.
pub const INTENSITY_HIGH: usize = 36;
pub const SETTINGS_MIN_LEN: usize = INTENSITY_HIGH + 1;

const _: () = assert!(TIMESTAMP.len() == 5);
const _: () = assert!(TIMESTAMP.end <= STATUS_TAG);
const _: () = assert!(STATUS_TAG < STATE_PREFIX.end);
const _: () = assert!(STATE_PREFIX.end == ACTIVE_FIELD.start);
const _: () = assert!(ACTIVE_LEN == 43);
const _: () = assert!(INACTIVE_LEN > ACTIVE_FIELD.end);

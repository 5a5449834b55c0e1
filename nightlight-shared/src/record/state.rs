// SPDX-License-Identifier: GPL-3.0-only
//! On/off state record codec.
//!
//! The record has two shapes. The inactive form is tagged `0x13`; the active
//! form is tagged `0x15` and carries a two byte sub-field at offset 23 that
//! the inactive form lacks. Switching shape splices that sub-field in or out
//! and restamps the timestamp. Bytes outside those fields are carried over.

use std::borrow::Cow;

use log::{debug, warn};

use super::RecordError;
use super::layout::{
    ACTIVE_FIELD, ByteRange, ACTIVE_FIELD_VALUE, ACTIVE_LEN, INACTIVE_LEN, STATE_MIN_LEN, STATE_PREFIX,
    STATUS_OFF, STATUS_ON, STATUS_TAG, TIMESTAMP,
};
use super::timestamp;

const RECORD: &str = "state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Off,
    On,
    /// A tag this codec has never seen; records carrying it are left alone.
    Unknown(u8),
}

impl RecordStatus {
    #[must_use]
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            STATUS_OFF => Self::Off,
            STATUS_ON => Self::On,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::Off => STATUS_OFF,
            Self::On => STATUS_ON,
            Self::Unknown(tag) => tag,
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Off => write!(f, "off"),
            RecordStatus::On => write!(f, "on"),
            RecordStatus::Unknown(tag) => write!(f, "unknown (0x{tag:02x})"),
        }
    }
}

/// Decoded view of a state record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub status: RecordStatus,
    /// Unix seconds of the last change.
    pub timestamp: u64,
    /// Raw timestamp bytes as stored.
    pub timestamp_bytes: [u8; TIMESTAMP.len()],
    /// Everything after the status tag, as stored.
    pub rest: Vec<u8>,
    pub len: usize,
}

/// Decode the fields this codec understands.
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] if the record ends before the status tag.
pub fn decode(bytes: &[u8]) -> Result<StateRecord, RecordError> {
    if bytes.len() < STATE_MIN_LEN {
        return Err(RecordError::Malformed {
            record: RECORD,
            len: bytes.len(),
            required: STATE_MIN_LEN,
        });
    }

    let mut timestamp_bytes = [0u8; TIMESTAMP.len()];
    timestamp_bytes.copy_from_slice(TIMESTAMP.slice(RECORD, bytes)?);

    Ok(StateRecord {
        status: RecordStatus::from_tag(bytes[STATUS_TAG]),
        timestamp: timestamp::decode(&timestamp_bytes),
        timestamp_bytes,
        rest: after_tag(bytes)?.to_vec(),
        len: bytes.len(),
    })
}

/// Switch the record to its active form, stamped with the current time.
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] if an inactive record is too short to splice.
pub fn turn_on(bytes: &[u8]) -> Result<Cow<'_, [u8]>, RecordError> {
    turn_on_at(bytes, timestamp::now_unix_seconds())
}

/// Switch the record to its inactive form, stamped with the current time.
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] if an active record is too short to splice.
pub fn turn_off(bytes: &[u8]) -> Result<Cow<'_, [u8]>, RecordError> {
    turn_off_at(bytes, timestamp::now_unix_seconds())
}

/// [`turn_on`] with an explicit timestamp.
///
/// Returns the input untouched when the record is already active or carries
/// an unknown tag.
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] if an inactive record is too short to splice.
pub fn turn_on_at(bytes: &[u8], now: u64) -> Result<Cow<'_, [u8]>, RecordError> {
    match decode(bytes)?.status {
        RecordStatus::On => return Ok(Cow::Borrowed(bytes)),
        RecordStatus::Unknown(tag) => {
            warn!("State record has unknown status tag 0x{tag:02x}, leaving it untouched");
            return Ok(Cow::Borrowed(bytes));
        }
        RecordStatus::Off => {}
    }
    require_len(bytes, INACTIVE_LEN)?;

    let mut out = vec![0u8; bytes.len() + ACTIVE_FIELD.len()];
    STATE_PREFIX.copy_to(RECORD, bytes, &mut out, 0)?;
    out[ACTIVE_FIELD.start..ACTIVE_FIELD.end].copy_from_slice(&ACTIVE_FIELD_VALUE);
    ByteRange::new(STATE_PREFIX.end, bytes.len()).copy_to(
        RECORD,
        bytes,
        &mut out,
        ACTIVE_FIELD.end,
    )?;
    out[STATUS_TAG] = STATUS_ON;
    stamp(&mut out, now);

    debug!("State record turned on ({} -> {} bytes)", bytes.len(), out.len());
    Ok(Cow::Owned(out))
}

/// [`turn_off`] with an explicit timestamp.
///
/// Returns the input untouched when the record is already inactive or carries
/// an unknown tag.
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] if an active record is too short to splice.
pub fn turn_off_at(bytes: &[u8], now: u64) -> Result<Cow<'_, [u8]>, RecordError> {
    match decode(bytes)?.status {
        RecordStatus::Off => return Ok(Cow::Borrowed(bytes)),
        RecordStatus::Unknown(tag) => {
            warn!("State record has unknown status tag 0x{tag:02x}, leaving it untouched");
            return Ok(Cow::Borrowed(bytes));
        }
        RecordStatus::On => {}
    }
    require_len(bytes, ACTIVE_LEN)?;

    let mut out = vec![0u8; bytes.len() - ACTIVE_FIELD.len()];
    STATE_PREFIX.copy_to(RECORD, bytes, &mut out, 0)?;
    ByteRange::new(ACTIVE_FIELD.end, bytes.len()).copy_to(
        RECORD,
        bytes,
        &mut out,
        STATE_PREFIX.end,
    )?;
    out[STATUS_TAG] = STATUS_OFF;
    stamp(&mut out, now);

    debug!("State record turned off ({} -> {} bytes)", bytes.len(), out.len());
    Ok(Cow::Owned(out))
}

fn after_tag(bytes: &[u8]) -> Result<&[u8], RecordError> {
    ByteRange::new(STATUS_TAG + 1, bytes.len()).slice(RECORD, bytes)
}

fn require_len(bytes: &[u8], required: usize) -> Result<(), RecordError> {
    if bytes.len() < required {
        return Err(RecordError::Malformed {
            record: RECORD,
            len: bytes.len(),
            required,
        });
    }
    Ok(())
}

fn stamp(out: &mut [u8], now: u64) {
    let mut encoded = [0u8; TIMESTAMP.len()];
    timestamp::encode(now, &mut encoded);
    out[TIMESTAMP.start..TIMESTAMP.end].copy_from_slice(&encoded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::{active_state, inactive_state};
    use crate::record::layout::OPAQUE_STATE_RANGES;

    const NOW: u64 = 1_718_000_000;

    #[test]
    fn test_decodes_both_shapes() {
        let off = decode(&inactive_state()).unwrap();
        assert_eq!(off.status, RecordStatus::Off);
        assert_eq!(off.len, INACTIVE_LEN);

        let on = decode(&active_state()).unwrap();
        assert_eq!(on.status, RecordStatus::On);
        assert_eq!(on.len, ACTIVE_LEN);
    }

    #[test]
    fn test_decode_keeps_bytes_after_tag() {
        let input = active_state();
        let record = decode(&input).unwrap();
        assert_eq!(record.rest.as_slice(), &input[STATUS_TAG + 1..]);
        assert_eq!(&record.rest[..2], &input[19..21]);
        assert_eq!(record.rest.len(), ACTIVE_LEN - STATE_MIN_LEN);
    }

    #[test]
    fn test_decode_rejects_record_without_tag() {
        let err = decode(&[0u8; 18]).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Malformed {
                len: 18,
                required: 19,
                ..
            }
        ));
    }

    #[test]
    fn test_turn_on_splices_active_field() {
        let input = inactive_state();
        let out = turn_on_at(&input, NOW).unwrap();

        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(out.len(), input.len() + 2);
        assert_eq!(out[STATUS_TAG], STATUS_ON);
        assert_eq!(&out[23..25], &[0x10, 0x00]);
        assert_eq!(&out[25..43], &input[23..41]);
        assert_eq!(decode(&out).unwrap().timestamp, NOW);
    }

    #[test]
    fn test_turn_off_removes_active_field() {
        let input = active_state();
        let out = turn_off_at(&input, NOW).unwrap();

        assert_eq!(out.len(), input.len() - 2);
        assert_eq!(out[STATUS_TAG], STATUS_OFF);
        assert_eq!(&out[23..41], &input[25..43]);
        assert_eq!(decode(&out).unwrap().timestamp, NOW);
    }

    #[test]
    fn test_transitions_preserve_opaque_prefix() {
        let off = inactive_state();
        let on = turn_on_at(&off, NOW).unwrap().into_owned();
        let back = turn_off_at(&on, NOW + 1).unwrap().into_owned();

        for range in OPAQUE_STATE_RANGES {
            let expected = &off[range.start..range.end];
            assert_eq!(&on[range.start..range.end], expected, "{range:?} after turn_on");
            assert_eq!(&back[range.start..range.end], expected, "{range:?} after turn_off");
        }
    }

    #[test]
    fn test_round_trip_restores_everything_but_timestamp() {
        let off = inactive_state();
        let on = turn_on_at(&off, NOW).unwrap().into_owned();
        let back = turn_off_at(&on, NOW).unwrap().into_owned();

        assert_eq!(back.len(), off.len());
        assert_eq!(&back[..TIMESTAMP.start], &off[..TIMESTAMP.start]);
        assert_eq!(&back[TIMESTAMP.end..], &off[TIMESTAMP.end..]);
    }

    #[test]
    fn test_tail_past_canonical_length_is_carried() {
        let mut off = inactive_state();
        off.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let on = turn_on_at(&off, NOW).unwrap();
        assert_eq!(&on[on.len() - 3..], &[0xAA, 0xBB, 0xCC]);

        let back = turn_off_at(&on, NOW).unwrap();
        assert_eq!(&back[back.len() - 3..], &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_no_op_paths_borrow_input() {
        let on = active_state();
        let off = inactive_state();

        let unchanged_on = turn_on_at(&on, NOW).unwrap();
        assert!(matches!(unchanged_on, Cow::Borrowed(_)));
        assert_eq!(unchanged_on.len(), on.len());

        let unchanged_off = turn_off_at(&off, NOW).unwrap();
        assert!(matches!(unchanged_off, Cow::Borrowed(_)));
        assert_eq!(unchanged_off.len(), off.len());
    }

    #[test]
    fn test_transitions_are_idempotent() {
        let once = turn_on_at(&inactive_state(), NOW).unwrap().into_owned();
        let twice = turn_on_at(&once, NOW + 60).unwrap();
        assert_eq!(twice.as_ref(), once.as_slice());

        let once = turn_off_at(&active_state(), NOW).unwrap().into_owned();
        let twice = turn_off_at(&once, NOW + 60).unwrap();
        assert_eq!(twice.as_ref(), once.as_slice());
    }

    #[test]
    fn test_unknown_tag_is_left_untouched() {
        let mut record = inactive_state();
        record[STATUS_TAG] = 0x17;

        let on = turn_on_at(&record, NOW).unwrap();
        assert!(matches!(on, Cow::Borrowed(_)));
        let off = turn_off_at(&record, NOW).unwrap();
        assert!(matches!(off, Cow::Borrowed(_)));
        assert_eq!(decode(&record).unwrap().status, RecordStatus::Unknown(0x17));
    }

    #[test]
    fn test_short_records_are_malformed() {
        let mut off = inactive_state();
        off.truncate(40);
        assert!(matches!(
            turn_on_at(&off, NOW),
            Err(RecordError::Malformed { required: 41, .. })
        ));

        let mut on = active_state();
        on.truncate(42);
        assert!(matches!(
            turn_off_at(&on, NOW),
            Err(RecordError::Malformed { required: 43, .. })
        ));
    }

    #[test]
    fn test_consecutive_stamps_do_not_go_backwards() {
        let on = turn_on_at(&inactive_state(), NOW).unwrap().into_owned();
        let off = turn_off_at(&on, NOW + 2).unwrap().into_owned();
        assert!(decode(&off).unwrap().timestamp >= decode(&on).unwrap().timestamp);
    }

    #[test]
    fn test_wall_clock_stamp_is_recent() {
        let before = timestamp::now_unix_seconds();
        let input = inactive_state();
        let on = turn_on(&input).unwrap();
        let stamped = decode(&on).unwrap().timestamp;
        assert!(stamped >= before);
    }
}

// SPDX-License-Identifier: GPL-3.0-only
//! Intensity field of the settings record.
//!
//! The strength is a 14-bit value split across two bytes: byte 35 holds the
//! low six bits doubled plus `0x80`, byte 36 holds the rest.

use super::RecordError;
use super::layout::{INTENSITY_HIGH, INTENSITY_LOW, SETTINGS_MIN_LEN};

const RECORD: &str = "settings";
const LOW_BITS: u32 = 6;
const LOW_MASK: u16 = 0x3F;
const LOW_BIAS: u8 = 0x80;

/// Largest strength the two-byte split can carry.
pub const STRENGTH_BITS_MAX: u16 = (1 << 14) - 1;

/// Read the stored strength.
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] if the record ends before byte 36.
pub fn decode_intensity(bytes: &[u8]) -> Result<u16, RecordError> {
    require_len(bytes)?;
    let low = u16::from(bytes[INTENSITY_LOW].wrapping_sub(LOW_BIAS) >> 1) & LOW_MASK;
    let high = u16::from(bytes[INTENSITY_HIGH]) << LOW_BITS;
    Ok(high | low)
}

/// Copy of `bytes` with the strength replaced by `value`.
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] if the record ends before byte 36, or
/// [`RecordError::IntensityOutOfRange`] if `value` needs more than 14 bits.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_intensity(bytes: &[u8], value: u16) -> Result<Vec<u8>, RecordError> {
    require_len(bytes)?;
    if value > STRENGTH_BITS_MAX {
        return Err(RecordError::IntensityOutOfRange { value });
    }

    let mut out = bytes.to_vec();
    out[INTENSITY_LOW] = (((value & LOW_MASK) as u8) << 1) + LOW_BIAS;
    out[INTENSITY_HIGH] = (value >> LOW_BITS) as u8;
    Ok(out)
}

fn require_len(bytes: &[u8]) -> Result<(), RecordError> {
    if bytes.len() < SETTINGS_MIN_LEN {
        return Err(RecordError::Malformed {
            record: RECORD,
            len: bytes.len(),
            required: SETTINGS_MIN_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures;
    use crate::record::intensity::{STRENGTH_MAX, STRENGTH_MIN};

    #[test]
    fn test_decodes_fixture_strength() {
        assert_eq!(decode_intensity(&fixtures::settings()).unwrap(), 6500);
    }

    #[test]
    fn test_encodes_documented_bytes() {
        let out = encode_intensity(&fixtures::settings(), 6500).unwrap();
        // 6500 = 101 * 64 + 36
        assert_eq!(out[35], 36 * 2 + 0x80);
        assert_eq!(out[36], 101);

        let out = encode_intensity(&fixtures::settings(), 1200).unwrap();
        // 1200 = 18 * 64 + 48
        assert_eq!(out[35], 48 * 2 + 0x80);
        assert_eq!(out[36], 18);
    }

    #[test]
    fn test_every_calibrated_strength_survives_the_split() {
        let base = fixtures::settings();
        for value in STRENGTH_MIN..=STRENGTH_MAX {
            let out = encode_intensity(&base, value).unwrap();
            assert_eq!(decode_intensity(&out).unwrap(), value);
        }
    }

    #[test]
    fn test_only_intensity_bytes_change() {
        let base = fixtures::settings();
        let out = encode_intensity(&base, 3000).unwrap();
        assert_eq!(out.len(), base.len());
        for (i, (a, b)) in base.iter().zip(out.iter()).enumerate() {
            if i != 35 && i != 36 {
                assert_eq!(a, b, "byte {i} changed");
            }
        }
    }

    #[test]
    fn test_rejects_short_record() {
        let short = vec![0u8; 36];
        assert!(matches!(
            decode_intensity(&short),
            Err(RecordError::Malformed { required: 37, .. })
        ));
        assert!(encode_intensity(&short, 4000).is_err());
    }

    #[test]
    fn test_rejects_values_wider_than_fourteen_bits() {
        let err = encode_intensity(&fixtures::settings(), 1 << 14).unwrap_err();
        assert!(matches!(err, RecordError::IntensityOutOfRange { value: 16384 }));
    }
}

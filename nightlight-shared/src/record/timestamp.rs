// SPDX-License-Identifier: GPL-3.0-only
//! Fixed-width base-128 timestamp stored in the state record.
//!
//! Five little-endian groups of seven bits. The first four bytes carry the
//! continuation bit, the last one does not, which covers 2^35 seconds.

use chrono::Utc;

use super::layout::TIMESTAMP;

const GROUP_BITS: u32 = 7;
const GROUP_MASK: u64 = 0x7F;
const CONTINUATION: u8 = 0x80;

/// Current Unix time in seconds; clocks before the epoch read as zero.
#[must_use]
pub fn now_unix_seconds() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// Encode `seconds` into the five bytes of `out`.
#[allow(clippy::cast_possible_truncation)]
pub fn encode(seconds: u64, out: &mut [u8; TIMESTAMP.len()]) {
    let last = out.len() - 1;
    for (i, byte) in out.iter_mut().enumerate() {
        let shift = GROUP_BITS * i as u32;
        if i == last {
            *byte = (seconds >> shift) as u8;
        } else {
            *byte = (((seconds >> shift) & GROUP_MASK) as u8) | CONTINUATION;
        }
    }
}

/// Decode the five bytes written by [`encode`].
#[must_use]
pub fn decode(bytes: &[u8; TIMESTAMP.len()]) -> u64 {
    let last = bytes.len() - 1;
    bytes.iter().enumerate().fold(0u64, |acc, (i, &byte)| {
        let shift = GROUP_BITS * i as u32;
        let group = if i == last {
            u64::from(byte)
        } else {
            u64::from(byte) & GROUP_MASK
        };
        acc | (group << shift)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_known_instant() {
        // 2024-01-01T00:00:00Z
        let t = 1_704_067_200u64;
        let mut out = [0u8; 5];
        encode(t, &mut out);

        assert_eq!(out[0], ((t & 0x7F) as u8) | 0x80);
        assert_eq!(out[1], (((t >> 7) & 0x7F) as u8) | 0x80);
        assert_eq!(out[2], (((t >> 14) & 0x7F) as u8) | 0x80);
        assert_eq!(out[3], (((t >> 21) & 0x7F) as u8) | 0x80);
        assert_eq!(out[4], (t >> 28) as u8);
        assert_eq!(decode(&out), t);
    }

    #[test]
    fn test_continuation_bits_on_all_but_last_byte() {
        let mut out = [0u8; 5];
        encode(0, &mut out);
        assert_eq!(out, [0x80, 0x80, 0x80, 0x80, 0x00]);
    }

    #[test]
    fn test_decode_preserves_ordering() {
        let mut earlier = [0u8; 5];
        let mut later = [0u8; 5];
        encode(1_700_000_000, &mut earlier);
        encode(1_700_000_128, &mut later);
        assert!(decode(&later) > decode(&earlier));
    }

    #[test]
    fn test_handles_upper_end_of_range() {
        let t = (1u64 << 35) - 1;
        let mut out = [0u8; 5];
        encode(t, &mut out);
        assert_eq!(decode(&out), t);
    }

    #[test]
    fn test_clock_is_past_epoch() {
        assert!(now_unix_seconds() > 1_600_000_000);
    }
}

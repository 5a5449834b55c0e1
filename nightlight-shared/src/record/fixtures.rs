// SPDX-License-Identifier: GPL-3.0-only
//! Synthetic records following the observed registry layout.
//!
//! Used by tests and to seed a file-backed store for dry runs.

/// Inactive (`0x13`) state record, 41 bytes.
#[must_use]
pub fn inactive_state() -> Vec<u8> {
    vec![
        0x43, 0x42, 0x01, 0x00, 0x0A, 0x02, 0x01, 0x00, 0x2A, 0x06, // header
        0x80, 0xF2, 0xB6, 0xB3, 0x06, // timestamp
        0x2A, 0x2B, 0x0E, 0x13, // status tag at 18
        0x43, 0x42, 0x01, 0x00, // nested header
        0xD0, 0x0A, 0x02, 0xC6, 0x14, 0xB8, 0x8E, 0x9D, 0xD0, 0xB4, 0xC0, 0xAE, 0xE9, 0x01, 0x00,
        0x00, 0x00, 0x00,
    ]
}

/// Active (`0x15`) state record, 43 bytes.
#[must_use]
pub fn active_state() -> Vec<u8> {
    let mut record = inactive_state();
    record[18] = 0x15;
    record.splice(23..23, [0x10, 0x00]);
    record
}

/// Settings record holding the neutral strength (6500, i.e. 0 %).
#[must_use]
pub fn settings() -> Vec<u8> {
    vec![
        0x43, 0x42, 0x01, 0x00, 0x0A, 0x02, 0x01, 0x00, 0x2A, 0x06, // header
        0x80, 0xF2, 0xB6, 0xB3, 0x06, // timestamp
        0x2A, 0x2B, 0x0E, 0x1D, 0x43, 0x42, 0x01, 0x00, 0x02, 0x01, 0xC2, 0x0A, 0x00, 0xCA,
        0x14, 0x0E, 0x15, 0x00, 0xCF, 0x28, // strength follows
        0xC8, 0x65, // 6500
        0xCA, 0x32, 0x0E, 0x10, 0x2E, 0x36, 0x00, 0x00, 0x00, 0x00,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::layout::{ACTIVE_LEN, INACTIVE_LEN, SETTINGS_MIN_LEN};

    #[test]
    fn test_fixtures_have_canonical_lengths() {
        assert_eq!(inactive_state().len(), INACTIVE_LEN);
        assert_eq!(active_state().len(), ACTIVE_LEN);
        assert!(settings().len() >= SETTINGS_MIN_LEN);
    }
}

// SPDX-License-Identifier: GPL-3.0-only
//! Mapping between the user-facing percentage and the stored strength.
//!
//! The scale is descending: `STRENGTH_MAX` is no filtering (0 %) and
//! `STRENGTH_MIN` is full filtering (100 %).
//!
//! `strength = STRENGTH_MAX + (STRENGTH_MIN - STRENGTH_MAX) * percent / 100`
//! `percent  = (strength - STRENGTH_MAX) * 100 / (STRENGTH_MIN - STRENGTH_MAX)`

use std::fmt;

use super::RecordError;

pub const STRENGTH_MAX: u16 = 6500;
pub const STRENGTH_MIN: u16 = 1200;

const STRENGTH_DIFFERENCE: i64 = STRENGTH_MIN as i64 - STRENGTH_MAX as i64;

/// Filter intensity in percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percent(u8);

impl Percent {
    pub const MIN: Percent = Percent(0);
    pub const MAX: Percent = Percent(100);

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Saturating constructor for values already known to be sane, such as
    /// utilization readings.
    #[must_use]
    pub fn saturating(value: u8) -> Self {
        Self(value.min(Self::MAX.0))
    }
}

impl TryFrom<i64> for Percent {
    type Error = RecordError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX.0)
            .map(Percent)
            .ok_or(RecordError::PercentOutOfRange { value })
    }
}

impl TryFrom<i32> for Percent {
    type Error = RecordError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<Percent> for u8 {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Strength to store for `percent`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent_to_strength(percent: Percent) -> u16 {
    let strength = i64::from(STRENGTH_MAX) + STRENGTH_DIFFERENCE * i64::from(percent.0) / 100;
    strength as u16
}

/// Percentage represented by a stored strength, truncated toward zero.
///
/// Strengths outside the calibrated range clamp to 0 % or 100 %.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn strength_to_percent(strength: u16) -> Percent {
    let percent = (i64::from(strength) - i64::from(STRENGTH_MAX)) * 100 / STRENGTH_DIFFERENCE;
    Percent(percent.clamp(0, 100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_match_calibration() {
        assert_eq!(percent_to_strength(Percent::MIN), STRENGTH_MAX);
        assert_eq!(percent_to_strength(Percent::MAX), STRENGTH_MIN);
        assert_eq!(strength_to_percent(STRENGTH_MAX), Percent::MIN);
        assert_eq!(strength_to_percent(STRENGTH_MIN), Percent::MAX);
    }

    #[test]
    fn test_every_percent_round_trips() {
        for p in 0..=100i64 {
            let percent = Percent::try_from(p).unwrap();
            assert_eq!(strength_to_percent(percent_to_strength(percent)), percent);
        }
    }

    #[test]
    fn test_higher_percent_means_lower_strength() {
        let half = percent_to_strength(Percent::try_from(50i64).unwrap());
        assert_eq!(half, 3850);
        assert!(half < STRENGTH_MAX && half > STRENGTH_MIN);
    }

    #[test]
    fn test_reading_truncates_toward_zero() {
        // 6500 - 53 * 10 = 5970 is exactly 10 %, one step less filtering is 9.98 %
        assert_eq!(strength_to_percent(5970).value(), 10);
        assert_eq!(strength_to_percent(5971).value(), 9);
    }

    #[test]
    fn test_out_of_calibration_strengths_clamp() {
        assert_eq!(strength_to_percent(7000), Percent::MIN);
        assert_eq!(strength_to_percent(900), Percent::MAX);
    }

    #[test]
    fn test_rejects_out_of_range_percentages() {
        assert!(matches!(
            Percent::try_from(-1i64),
            Err(RecordError::PercentOutOfRange { value: -1 })
        ));
        assert!(matches!(
            Percent::try_from(101i32),
            Err(RecordError::PercentOutOfRange { value: 101 })
        ));
        assert_eq!(Percent::saturating(250), Percent::MAX);
    }
}

//! Stream time in microseconds.

use core::ops::{Add, Sub};

/// Microseconds per second.
pub const TICKS_PER_SECOND: i64 = 1_000_000;

/// A point or span on the stream clock, in microseconds.
///
/// [`Timestamp::INVALID`] marks an unset value; arithmetic on it yields
/// `INVALID` again so unset timestamps travel through the pipeline intact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Unset timestamp.
    pub const INVALID: Timestamp = Timestamp(i64::MIN);

    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Time covered by `frames` frames at `rate` Hz, rounded down.
    ///
    /// A zero rate has no meaningful clock and yields `INVALID`.
    pub fn from_frames(frames: u64, rate: u32) -> Self {
        if rate == 0 {
            return Self::INVALID;
        }
        let micros = frames as u128 * TICKS_PER_SECOND as u128 / rate as u128;
        Self(micros.min(i64::MAX as u128) as i64)
    }

    pub const fn is_valid(self) -> bool {
        self.0 != i64::MIN
    }

    pub const fn as_micros(self) -> i64 {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Add for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Timestamp) -> Timestamp {
        if !self.is_valid() || !rhs.is_valid() {
            return Timestamp::INVALID;
        }
        match self.0.checked_add(rhs.0) {
            Some(sum) if sum != i64::MIN => Timestamp(sum),
            _ => Timestamp::INVALID,
        }
    }
}

impl Sub for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Timestamp) -> Timestamp {
        if !self.is_valid() || !rhs.is_valid() {
            return Timestamp::INVALID;
        }
        match self.0.checked_sub(rhs.0) {
            Some(diff) if diff != i64::MIN => Timestamp(diff),
            _ => Timestamp::INVALID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_ordering() {
        let t1 = Timestamp::from_micros(10);
        let t2 = Timestamp::from_micros(20);
        assert!(t1 < t2);
        assert!(Timestamp::INVALID < Timestamp::ZERO);
    }

    #[test]
    fn from_frames() {
        assert_eq!(Timestamp::from_frames(48000, 48000).as_micros(), 1_000_000);
        assert_eq!(Timestamp::from_frames(441, 44100).as_micros(), 10_000);
        assert!(!Timestamp::from_frames(100, 0).is_valid());
    }

    #[test]
    fn invalid_is_sticky() {
        let t = Timestamp::INVALID + Timestamp::from_micros(5);
        assert!(!t.is_valid());
        assert_eq!(
            Timestamp::from_micros(5) + Timestamp::from_micros(7),
            Timestamp::from_micros(12)
        );
    }

    #[test]
    fn default_is_unset() {
        assert!(!Timestamp::default().is_valid());
    }

    #[test]
    fn span_between_frames() {
        let start = Timestamp::from_frames(1024, 48000);
        let end = Timestamp::from_frames(2048, 48000);
        assert_eq!((end - start).as_micros(), 21_333);
        assert_eq!(end - Timestamp::INVALID, Timestamp::INVALID);
        assert!(!(Timestamp::from_frames(5, 0) - Timestamp::ZERO).is_valid());
    }
}

//! Millisecond time values used for annotation intervals.
//!
//! Annotation files carry `HH:MM:SS,mmm` stamps (SubRip), while media probes
//! report `HH:MM:SS.ff` durations. Both parse into [`Timestamp`], a plain
//! signed millisecond count so that offsets such as "tolerance before the
//! start of the video" stay representable.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;

/// A point in time (or a duration) with millisecond resolution.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp {
    millis: i64,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { millis: 0 };

    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Converts fractional seconds, rounding to the nearest millisecond.
    #[must_use]
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() {
            return Self::ZERO;
        }
        Self {
            millis: (seconds * MILLIS_PER_SECOND as f64).round() as i64,
        }
    }

    /// Builds a stamp from clock fields. Saturates at the `i64` range.
    #[must_use]
    pub fn from_hms(hours: i64, minutes: i64, seconds: i64, millis: i64) -> Self {
        Self::checked_from_hms(hours, minutes, seconds, millis).unwrap_or(Self {
            millis: if hours < 0 { i64::MIN } else { i64::MAX },
        })
    }

    /// Like [`Timestamp::from_hms`], but `None` when the total overflows.
    #[must_use]
    pub fn checked_from_hms(hours: i64, minutes: i64, seconds: i64, millis: i64) -> Option<Self> {
        let millis = hours
            .checked_mul(MILLIS_PER_HOUR)?
            .checked_add(minutes.checked_mul(MILLIS_PER_MINUTE)?)?
            .checked_add(seconds.checked_mul(MILLIS_PER_SECOND)?)?
            .checked_add(millis)?;
        Some(Self { millis })
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.millis
    }

    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.millis as f64 / MILLIS_PER_SECOND as f64
    }

    /// Midpoint between two stamps, truncated towards `self`.
    #[must_use]
    pub fn midpoint(self, other: Timestamp) -> Timestamp {
        let half = (i128::from(other.millis) - i128::from(self.millis)) / 2;
        Timestamp {
            millis: self.millis.saturating_add(half as i64),
        }
    }

    /// Parses `HH<sep>MM<sep>SS<sep_ms>fraction`.
    ///
    /// The fractional part is read as a decimal fraction of a second, so
    /// `,5` and `,500` both mean 500 ms. Digits past the third are dropped.
    pub fn parse(text: &str, sep: char, sep_ms: char) -> CoreResult<Self> {
        let invalid = || CoreError::Timestamp(format!("'{}'", text.trim()));

        let mut fields = text.trim().split(sep);
        let (Some(h), Some(m), Some(rest), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };

        let (s, fraction) = match rest.split_once(sep_ms) {
            Some((s, fraction)) => (s, fraction),
            None => (rest, ""),
        };

        let hours: i64 = h.trim().parse().map_err(|_| invalid())?;
        let minutes: i64 = m.trim().parse().map_err(|_| invalid())?;
        let seconds: i64 = s.trim().parse().map_err(|_| invalid())?;
        if hours < 0 || minutes < 0 || seconds < 0 {
            return Err(invalid());
        }

        let fraction = fraction.trim();
        let millis = if fraction.is_empty() {
            0
        } else {
            if !fraction.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let digits: String = fraction.chars().chain("000".chars()).take(3).collect();
            digits.parse::<i64>().map_err(|_| invalid())?
        };

        Self::checked_from_hms(hours, minutes, seconds, millis).ok_or_else(invalid)
    }

    /// Parses a SubRip stamp such as `00:01:02,345`.
    pub fn parse_srt(text: &str) -> CoreResult<Self> {
        Self::parse(text, ':', ',')
    }

    /// Parses a probe-style duration such as `00:01:02.34`.
    pub fn parse_probe(text: &str) -> CoreResult<Self> {
        Self::parse(text, ':', '.')
    }

    /// Formats as a SubRip stamp (`HH:MM:SS,mmm`).
    #[must_use]
    pub fn to_srt_string(self) -> String {
        self.to_string().replacen('.', ",", 1)
    }
}

impl Add for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Timestamp) -> Timestamp {
        Timestamp::from_millis(self.millis.saturating_add(rhs.millis))
    }
}

impl Sub for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Timestamp) -> Timestamp {
        Timestamp::from_millis(self.millis.saturating_sub(rhs.millis))
    }
}

impl Sum for Timestamp {
    fn sum<I: Iterator<Item = Timestamp>>(iter: I) -> Self {
        iter.fold(Timestamp::ZERO, |acc, t| acc + t)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.millis < 0 { "-" } else { "" };
        let total = self.millis.unsigned_abs();
        let hours = total / MILLIS_PER_HOUR as u64;
        let minutes = (total % MILLIS_PER_HOUR as u64) / MILLIS_PER_MINUTE as u64;
        let seconds = (total % MILLIS_PER_MINUTE as u64) / MILLIS_PER_SECOND as u64;
        let millis = total % MILLIS_PER_SECOND as u64;
        write!(f, "{sign}{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}

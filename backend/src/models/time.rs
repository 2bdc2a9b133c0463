//! Wall-clock time values for availability intervals.
//!
//! Persisted records store interval endpoints as un-padded 24-hour strings
//! (`"9:00"`, `"17:30"`), so parsing splits on `:` instead of using a
//! fixed-width time format.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error raised when a time-of-day string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("Empty time value")]
    Empty,
    #[error("Time '{0}' is not in H:MM format")]
    Malformed(String),
    #[error("Hour {0} is out of range (0-23)")]
    HourOutOfRange(u32),
    #[error("Minute {0} is out of range (0-59)")]
    MinuteOutOfRange(u32),
}

/// A wall-clock time of day in 24-hour `H:MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// `0:00`, the placeholder endpoint for newly added intervals.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    /// Create a time of day, validating component ranges.
    pub fn new(hour: u8, minute: u8) -> Result<Self, TimeParseError> {
        if hour > 23 {
            return Err(TimeParseError::HourOutOfRange(hour as u32));
        }
        if minute > 59 {
            return Err(TimeParseError::MinuteOutOfRange(minute as u32));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// The 24 whole-hour values (`0:00` through `23:00`) offered by time
    /// pickers. Arbitrary minutes are still accepted when parsing.
    pub fn hourly_options() -> Vec<TimeOfDay> {
        (0..24)
            .map(|hour| TimeOfDay { hour, minute: 0 })
            .collect()
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TimeParseError::Empty);
        }

        let mut parts = trimmed.split(':');
        let (hour_part, minute_part) = match (parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(m), None) => (h, m),
            _ => return Err(TimeParseError::Malformed(trimmed.to_string())),
        };

        let hour: u32 = hour_part
            .parse()
            .map_err(|_| TimeParseError::Malformed(trimmed.to_string()))?;
        let minute: u32 = minute_part
            .parse()
            .map_err(|_| TimeParseError::Malformed(trimmed.to_string()))?;

        if hour > 23 {
            return Err(TimeParseError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeParseError::MinuteOutOfRange(minute));
        }

        Ok(TimeOfDay {
            hour: hour as u8,
            minute: minute as u8,
        })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hours stay un-padded to round-trip stored values byte for byte.
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

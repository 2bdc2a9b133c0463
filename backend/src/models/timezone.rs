//! IANA timezone identifiers and the picker catalog.

use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error raised when a string does not name a known IANA timezone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown IANA timezone '{name}'")]
pub struct TimezoneParseError {
    pub name: String,
}

/// A validated IANA timezone identifier (e.g. `America/New_York`).
///
/// Defaults to `America/Los_Angeles`, the zone availability forms start from
/// before a stored or profile value is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timezone(Tz);

impl Timezone {
    /// Parse and validate an IANA zone name.
    pub fn new(name: &str) -> Result<Self, TimezoneParseError> {
        name.parse()
    }

    /// The canonical IANA name (`America/New_York`).
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// The underlying chrono-tz zone, for offset computations.
    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Timezone(chrono_tz::America::Los_Angeles)
    }
}

impl FromStr for Timezone {
    type Err = TimezoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Tz>()
            .map(Timezone)
            .map_err(|_| TimezoneParseError {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Timezone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One entry in the timezone picker catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimezoneOption {
    /// IANA identifier stored in records.
    pub value: &'static str,
    /// Human-readable label shown in pickers.
    pub label: &'static str,
}

/// The curated zones offered by availability and profile pickers.
///
/// Any valid IANA zone is accepted by [`Timezone`]; this list only drives
/// the choices a picker displays.
pub const TIMEZONE_CATALOG: [TimezoneOption; 20] = [
    TimezoneOption {
        value: "Europe/Berlin",
        label: "Central European Time (CET)",
    },
    TimezoneOption {
        value: "America/New_York",
        label: "Eastern Time (ET)",
    },
    TimezoneOption {
        value: "America/Los_Angeles",
        label: "Pacific Time (PT)",
    },
    TimezoneOption {
        value: "America/Chicago",
        label: "Central Time (CT)",
    },
    TimezoneOption {
        value: "Asia/Tokyo",
        label: "Japan Standard Time (JST)",
    },
    TimezoneOption {
        value: "Asia/Kolkata",
        label: "India Standard Time (IST)",
    },
    TimezoneOption {
        value: "Australia/Sydney",
        label: "Australian Eastern Time (AET)",
    },
    TimezoneOption {
        value: "Europe/London",
        label: "Greenwich Mean Time (GMT)",
    },
    TimezoneOption {
        value: "Pacific/Auckland",
        label: "New Zealand Standard Time (NZST)",
    },
    TimezoneOption {
        value: "Asia/Shanghai",
        label: "China Standard Time (CST)",
    },
    TimezoneOption {
        value: "Asia/Dubai",
        label: "Gulf Standard Time (GST)",
    },
    TimezoneOption {
        value: "America/Sao_Paulo",
        label: "Brasilia Time (BRT)",
    },
    TimezoneOption {
        value: "Pacific/Honolulu",
        label: "Hawaii Standard Time (HST)",
    },
    TimezoneOption {
        value: "Africa/Johannesburg",
        label: "South Africa Standard Time (SAST)",
    },
    TimezoneOption {
        value: "Asia/Seoul",
        label: "Korea Standard Time (KST)",
    },
    TimezoneOption {
        value: "Asia/Singapore",
        label: "Singapore Time (SGT)",
    },
    TimezoneOption {
        value: "Europe/Moscow",
        label: "Moscow Standard Time (MSK)",
    },
    TimezoneOption {
        value: "Europe/Paris",
        label: "Central European Time (CET)",
    },
    TimezoneOption {
        value: "Asia/Bangkok",
        label: "Indochina Time (ICT)",
    },
    TimezoneOption {
        value: "America/Phoenix",
        label: "Mountain Standard Time (MST)",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_zone() {
        let tz = Timezone::new("Europe/Berlin").unwrap();
        assert_eq!(tz.name(), "Europe/Berlin");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let tz = Timezone::new(" Asia/Tokyo ").unwrap();
        assert_eq!(tz.name(), "Asia/Tokyo");
    }

    #[test]
    fn test_parse_invalid_zone() {
        let err = Timezone::new("Mars/Olympus_Mons").unwrap_err();
        assert_eq!(err.name, "Mars/Olympus_Mons");
    }

    #[test]
    fn test_default_is_los_angeles() {
        assert_eq!(Timezone::default().name(), "America/Los_Angeles");
    }

    #[test]
    fn test_serde_as_name() {
        let tz = Timezone::new("Asia/Kolkata").unwrap();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Asia/Kolkata\"");

        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }

    #[test]
    fn test_deserialize_invalid_zone_fails() {
        let result: Result<Timezone, _> = serde_json::from_str("\"Nowhere/Special\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_catalog_values_are_valid_zones() {
        for option in TIMEZONE_CATALOG {
            assert!(
                Timezone::new(option.value).is_ok(),
                "catalog entry {} should parse",
                option.value
            );
        }
    }

    #[test]
    fn test_catalog_contains_default() {
        assert!(TIMEZONE_CATALOG
            .iter()
            .any(|option| option.value == Timezone::default().name()));
    }
}

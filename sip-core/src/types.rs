//! Core data types shared by the plugins and the hardware layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Logic level of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

/// Internal pull resistor for an input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    Up,
    Down,
}

/// Parse a form switch value.
///
/// HTML checkboxes send `on` when ticked and nothing at all when not, so a
/// missing value reads as `false`.
pub fn parse_switch(field: &str, value: Option<&str>) -> crate::Result<bool> {
    match value.map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("on") || v == "1" || v.eq_ignore_ascii_case("true") => {
            Ok(true)
        }
        Some(v) if v.eq_ignore_ascii_case("off") || v == "0" || v.eq_ignore_ascii_case("false") => {
            Ok(false)
        }
        Some(v) => Err(crate::SipError::InvalidInput(format!(
            "'{}' must be 'on' or 'off', got '{}'",
            field, v
        ))),
    }
}

/// Seconds since the unix epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Serde adapter storing a `bool` as the `"on"` / `"off"` strings used in the
/// plugin data files.
pub mod on_off {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "on" } else { "off" })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Bool(bool),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b),
            Raw::Str(s) => match s.as_str() {
                "on" => Ok(true),
                "off" | "" => Ok(false),
                other => Err(de::Error::custom(format!(
                    "expected \"on\" or \"off\", got \"{}\"",
                    other
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Flag {
        #[serde(with = "on_off")]
        value: bool,
    }

    #[test]
    fn test_on_off_serialization() {
        let json = serde_json::to_string(&Flag { value: true }).unwrap();
        assert_eq!(json, r#"{"value":"on"}"#);

        let json = serde_json::to_string(&Flag { value: false }).unwrap();
        assert_eq!(json, r#"{"value":"off"}"#);
    }

    #[test]
    fn test_on_off_accepts_plain_booleans() {
        let flag: Flag = serde_json::from_str(r#"{"value":true}"#).unwrap();
        assert!(flag.value);

        let flag: Flag = serde_json::from_str(r#"{"value":"off"}"#).unwrap();
        assert!(!flag.value);

        assert!(serde_json::from_str::<Flag>(r#"{"value":"maybe"}"#).is_err());
    }

    #[test]
    fn test_parse_switch() {
        assert!(parse_switch("enabled", Some("on")).unwrap());
        assert!(parse_switch("enabled", Some("ON")).unwrap());
        assert!(!parse_switch("enabled", Some("off")).unwrap());
        assert!(!parse_switch("enabled", None).unwrap());
        assert!(parse_switch("enabled", Some("yes please")).is_err());
    }

    #[test]
    fn test_level_toggle() {
        assert_eq!(Level::Low.toggled(), Level::High);
        assert_eq!(Level::High.toggled(), Level::Low);
        assert_eq!(Level::High.to_string(), "high");
    }
}

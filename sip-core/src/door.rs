//! Door plugin configuration record
//!
//! Persisted as `door.json` in the data directory. Keys match the form fields
//! submitted by the settings page so a record can be diffed field by field
//! against an update request.

use crate::types::{on_off, parse_switch, Level, Pull};
use crate::{Result, SipError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Door position as classified from the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorStatus {
    Open,
    Closed,
    /// The relay fired but the sensor could not be read
    Unknown,
}

impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorStatus::Open => write!(f, "open"),
            DoorStatus::Closed => write!(f, "closed"),
            DoorStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Door position switch type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorType {
    /// Normally-open switch, wired to 3V3
    #[serde(rename = "NO")]
    NormallyOpen,
    /// Normally-closed switch, wired to GND
    #[serde(rename = "NC")]
    NormallyClosed,
}

impl SensorType {
    /// Pull resistor that holds the line at its "door open" level.
    pub fn pull(self) -> Pull {
        match self {
            SensorType::NormallyOpen => Pull::Down,
            SensorType::NormallyClosed => Pull::Up,
        }
    }

    /// Classify a sensor reading.
    ///
    /// With the pull resistor from [`SensorType::pull`] both switch types read
    /// high when the door is shut.
    pub fn status_for(self, level: Level) -> DoorStatus {
        match level {
            Level::High => DoorStatus::Closed,
            Level::Low => DoorStatus::Open,
        }
    }
}

impl FromStr for SensorType {
    type Err = SipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "NO" | "no" => Ok(SensorType::NormallyOpen),
            "NC" | "nc" => Ok(SensorType::NormallyClosed),
            other => Err(SipError::InvalidInput(format!(
                "sensor type must be 'NO' or 'NC', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorType::NormallyOpen => write!(f, "NO"),
            SensorType::NormallyClosed => write!(f, "NC"),
        }
    }
}

/// Which logic level energizes the relay coil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayPolarity {
    #[serde(rename = "low")]
    ActiveLow,
    #[serde(rename = "high")]
    ActiveHigh,
}

impl RelayPolarity {
    /// Level that energizes the relay
    pub fn active_level(self) -> Level {
        match self {
            RelayPolarity::ActiveLow => Level::Low,
            RelayPolarity::ActiveHigh => Level::High,
        }
    }

    /// Level that leaves the relay released
    pub fn idle_level(self) -> Level {
        self.active_level().toggled()
    }
}

impl FromStr for RelayPolarity {
    type Err = SipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "low" => Ok(RelayPolarity::ActiveLow),
            "high" => Ok(RelayPolarity::ActiveHigh),
            other => Err(SipError::InvalidInput(format!(
                "relay polarity must be 'low' or 'high', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for RelayPolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayPolarity::ActiveLow => write!(f, "low"),
            RelayPolarity::ActiveHigh => write!(f, "high"),
        }
    }
}

/// Door actuation requested through the web endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    /// Pulse relay 0
    FullOpen,
    /// Pulse relay 1
    SemiOpen,
}

impl DoorAction {
    /// Index of the relay this action pulses
    pub fn relay(self) -> usize {
        match self {
            DoorAction::FullOpen => 0,
            DoorAction::SemiOpen => 1,
        }
    }
}

impl fmt::Display for DoorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorAction::FullOpen => write!(f, "full open"),
            DoorAction::SemiOpen => write!(f, "semi open"),
        }
    }
}

/// Persisted door plugin settings and last known state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    #[serde(with = "on_off")]
    pub enabled: bool,
    #[serde(rename = "o_full", with = "on_off")]
    pub open_full: bool,
    #[serde(rename = "o_semi", with = "on_off")]
    pub open_semi: bool,
    #[serde(rename = "o_sens", with = "on_off")]
    pub sensor_enabled: bool,
    #[serde(rename = "sens_t")]
    pub sensor_type: SensorType,
    #[serde(rename = "active")]
    pub relay_polarity: RelayPolarity,
    /// Unix seconds of the last actuation
    #[serde(rename = "last")]
    pub last_actuated: Option<u64>,
    pub status: DoorStatus,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            open_full: true,
            open_semi: false,
            sensor_enabled: false,
            sensor_type: SensorType::NormallyOpen,
            relay_polarity: RelayPolarity::ActiveLow,
            last_actuated: None,
            status: DoorStatus::Closed,
        }
    }
}

impl DoorConfig {
    /// Whether `action` may run with the current settings
    pub fn allows(&self, action: DoorAction) -> bool {
        self.enabled
            && match action {
                DoorAction::FullOpen => self.open_full,
                DoorAction::SemiOpen => self.open_semi,
            }
    }

    /// Apply a settings form, returning whether any field changed.
    ///
    /// The form is validated as a whole before anything is written, so a
    /// rejected form leaves the record untouched.
    pub fn apply_form(&mut self, form: &DoorSettingsForm) -> Result<bool> {
        let enabled = parse_switch("enabled", form.enabled.as_deref())?;
        let open_full = parse_switch("o_full", form.o_full.as_deref())?;
        let open_semi = parse_switch("o_semi", form.o_semi.as_deref())?;
        let sensor_enabled = parse_switch("o_sens", form.o_sens.as_deref())?;
        let sensor_type = match form.sens_t.as_deref() {
            Some(v) => v.parse()?,
            None => self.sensor_type,
        };
        let relay_polarity = match form.active.as_deref() {
            Some(v) => v.parse()?,
            None => self.relay_polarity,
        };

        let mut changed = false;
        changed |= replace(&mut self.enabled, enabled);
        changed |= replace(&mut self.open_full, open_full);
        changed |= replace(&mut self.open_semi, open_semi);
        changed |= replace(&mut self.sensor_enabled, sensor_enabled);
        changed |= replace(&mut self.sensor_type, sensor_type);
        changed |= replace(&mut self.relay_polarity, relay_polarity);
        Ok(changed)
    }

    /// Serialize to the on-disk JSON representation
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from the on-disk JSON representation
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Query parameters submitted by the door settings page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoorSettingsForm {
    pub enabled: Option<String>,
    pub o_full: Option<String>,
    pub o_semi: Option<String>,
    pub o_sens: Option<String>,
    pub sens_t: Option<String>,
    pub active: Option<String>,
}

impl DoorSettingsForm {
    /// Form that would reproduce `config` exactly
    pub fn from_config(config: &DoorConfig) -> Self {
        let switch = |on: bool| Some(if on { "on" } else { "off" }.to_string());
        Self {
            enabled: switch(config.enabled),
            o_full: switch(config.open_full),
            o_semi: switch(config.open_semi),
            o_sens: switch(config.sensor_enabled),
            sens_t: Some(config.sensor_type.to_string()),
            active: Some(config.relay_polarity.to_string()),
        }
    }
}

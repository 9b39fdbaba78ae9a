//! OLED plugin configuration record
//!
//! Persisted as `oled_adj.json` in the data directory.

use crate::types::{on_off, parse_switch};
use crate::{Result, SipError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default SSD1306 slave address
pub const DEFAULT_OLED_ADDRESS: u8 = 0x3C;

/// A status panel in the normal rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    /// System name; always shown first
    Name,
    SoftwareVersion,
    IpAddress,
    Port,
    CpuTemp,
    DateTime,
    Uptime,
    RainSensor,
    RunningStations,
}

impl Panel {
    /// Optional panels in rotation order
    pub const OPTIONAL: [Panel; 8] = [
        Panel::SoftwareVersion,
        Panel::IpAddress,
        Panel::Port,
        Panel::CpuTemp,
        Panel::DateTime,
        Panel::Uptime,
        Panel::RainSensor,
        Panel::RunningStations,
    ];

    /// Settings key of the panel's on/off switch
    pub fn key(self) -> &'static str {
        match self {
            Panel::Name => "name",
            Panel::SoftwareVersion => "d_sw_version",
            Panel::IpAddress => "d_ip",
            Panel::Port => "d_port",
            Panel::CpuTemp => "d_cpu_temp",
            Panel::DateTime => "d_date_time",
            Panel::Uptime => "d_uptime",
            Panel::RainSensor => "d_rain_sensor",
            Panel::RunningStations => "d_running_stations",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Persisted OLED plugin settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OledConfig {
    #[serde(rename = "use_oled", with = "on_off")]
    pub enabled: bool,
    /// 7-bit I2C address of the display
    pub address: u8,
    #[serde(with = "on_off")]
    pub d_sw_version: bool,
    #[serde(with = "on_off")]
    pub d_ip: bool,
    #[serde(with = "on_off")]
    pub d_port: bool,
    #[serde(with = "on_off")]
    pub d_cpu_temp: bool,
    #[serde(with = "on_off")]
    pub d_date_time: bool,
    #[serde(with = "on_off")]
    pub d_uptime: bool,
    #[serde(with = "on_off")]
    pub d_rain_sensor: bool,
    #[serde(with = "on_off")]
    pub d_running_stations: bool,
    /// Status text captured when the settings were last saved
    pub status: String,
}

impl Default for OledConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: DEFAULT_OLED_ADDRESS,
            d_sw_version: true,
            d_ip: true,
            d_port: true,
            d_cpu_temp: true,
            d_date_time: true,
            d_uptime: true,
            d_rain_sensor: true,
            d_running_stations: true,
            status: String::new(),
        }
    }
}

impl OledConfig {
    /// Whether an optional panel is switched on. `Name` is always on.
    pub fn shows(&self, panel: Panel) -> bool {
        match panel {
            Panel::Name => true,
            Panel::SoftwareVersion => self.d_sw_version,
            Panel::IpAddress => self.d_ip,
            Panel::Port => self.d_port,
            Panel::CpuTemp => self.d_cpu_temp,
            Panel::DateTime => self.d_date_time,
            Panel::Uptime => self.d_uptime,
            Panel::RainSensor => self.d_rain_sensor,
            Panel::RunningStations => self.d_running_stations,
        }
    }

    fn switch_mut(&mut self, panel: Panel) -> Option<&mut bool> {
        match panel {
            Panel::Name => None,
            Panel::SoftwareVersion => Some(&mut self.d_sw_version),
            Panel::IpAddress => Some(&mut self.d_ip),
            Panel::Port => Some(&mut self.d_port),
            Panel::CpuTemp => Some(&mut self.d_cpu_temp),
            Panel::DateTime => Some(&mut self.d_date_time),
            Panel::Uptime => Some(&mut self.d_uptime),
            Panel::RainSensor => Some(&mut self.d_rain_sensor),
            Panel::RunningStations => Some(&mut self.d_running_stations),
        }
    }

    /// Panels of the normal rotation, `Name` first
    pub fn rotation(&self) -> Vec<Panel> {
        std::iter::once(Panel::Name)
            .chain(Panel::OPTIONAL.into_iter().filter(|p| self.shows(*p)))
            .collect()
    }

    /// Apply the settings form submitted by the settings page.
    ///
    /// Every switch missing from the form is turned off. A missing address
    /// keeps the current one.
    pub fn apply_form(&mut self, form: &HashMap<String, String>) -> Result<()> {
        let get = |key: &str| form.get(key).map(String::as_str);

        let mut next = self.clone();
        next.enabled = parse_switch("use_oled", get("use_oled"))?;
        if let Some(raw) = get("address") {
            next.address = parse_address(raw)?;
        }
        for panel in Panel::OPTIONAL {
            let on = parse_switch(panel.key(), get(panel.key()))?;
            if let Some(slot) = next.switch_mut(panel) {
                *slot = on;
            }
        }

        *self = next;
        Ok(())
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

/// Parse a 7-bit I2C address written as decimal (`60`) or hex (`0x3c`)
pub fn parse_address(raw: &str) -> Result<u8> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse::<u8>(),
    };

    match parsed {
        Ok(addr) if addr <= 0x7F => Ok(addr),
        _ => Err(SipError::InvalidInput(format!(
            "I2C address must be 0-127 (or 0x00-0x7f), got '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_rotation_has_every_panel() {
        let rotation = OledConfig::default().rotation();
        assert_eq!(rotation.len(), 9);
        assert_eq!(rotation[0], Panel::Name);
        assert_eq!(rotation[8], Panel::RunningStations);
    }

    #[test]
    fn test_rotation_skips_disabled_panels() {
        let config = OledConfig {
            d_ip: false,
            d_uptime: false,
            ..Default::default()
        };
        let rotation = config.rotation();
        assert!(!rotation.contains(&Panel::IpAddress));
        assert!(!rotation.contains(&Panel::Uptime));
        assert_eq!(rotation.len(), 7);
    }

    #[test]
    fn test_default_record_keys() {
        let value: serde_json::Value =
            serde_json::from_str(&OledConfig::default().to_json().unwrap()).unwrap();
        assert_eq!(value["use_oled"], "off");
        assert_eq!(value["address"], 60);
        assert_eq!(value["d_running_stations"], "on");
        assert_eq!(value["status"], "");
    }

    #[test]
    fn test_legacy_reset_pin_key_is_not_an_address() {
        // Older records carry the display reset GPIO as "adress"
        let config =
            OledConfig::from_json(r#"{"use_oled": "on", "adress": "24"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.address, OledConfig::default().address);
    }

    #[test]
    fn test_apply_form_turns_missing_switches_off() {
        let mut config = OledConfig::default();
        config
            .apply_form(&form(&[("use_oled", "on"), ("d_ip", "on"), ("address", "0x3d")]))
            .unwrap();

        assert!(config.enabled);
        assert_eq!(config.address, 0x3D);
        assert_eq!(config.rotation(), vec![Panel::Name, Panel::IpAddress]);
    }

    #[test]
    fn test_apply_form_rejects_bad_address() {
        let mut config = OledConfig::default();
        let result = config.apply_form(&form(&[("use_oled", "on"), ("address", "200")]));
        assert!(result.is_err());
        assert_eq!(config, OledConfig::default());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("60").unwrap(), 0x3C);
        assert_eq!(parse_address("0x3C").unwrap(), 0x3C);
        assert!(parse_address("0x80").is_err());
        assert!(parse_address("oled").is_err());
    }
}

//! Static configuration loaded once at startup
//!
//! This configuration is read-only after the daemon starts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::paths::default_data_dir;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server hostname
    pub hostname: String,
    /// Server port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 8080,
        }
    }
}

/// Identity of the irrigation host shown on the status panels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// System name
    pub name: String,
    /// Software version string
    pub version: String,
    /// Temperature unit for the CPU panel ("C" or "F")
    pub temp_unit: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: "SIP".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            temp_unit: "C".to_string(),
        }
    }
}

/// Door relay wiring and pulse timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorHardwareConfig {
    /// Header pins of relay 0 (full open) and relay 1 (semi open)
    pub relay_pins: [u8; 2],
    /// Header pin of the door position sensor
    pub sensor_pin: u8,
    /// How long a relay is held active
    pub pulse_ms: u64,
    /// Extra wait before sampling the sensor after a semi open
    pub semi_open_settle_ms: u64,
    /// Pause between configuring consecutive relay pins
    pub pin_setup_interval_ms: u64,
}

impl Default for DoorHardwareConfig {
    fn default() -> Self {
        Self {
            relay_pins: [38, 40],
            sensor_pin: 19,
            pulse_ms: 1000,
            semi_open_settle_ms: 2000,
            pin_setup_interval_ms: 100,
        }
    }
}

impl DoorHardwareConfig {
    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn semi_open_settle(&self) -> Duration {
        Duration::from_millis(self.semi_open_settle_ms)
    }

    pub fn pin_setup_interval(&self) -> Duration {
        Duration::from_millis(self.pin_setup_interval_ms)
    }
}

/// OLED bus and rotation timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OledHardwareConfig {
    /// I2C bus number (`/dev/i2c-N`)
    pub i2c_bus: u8,
    /// How long each panel of the normal rotation is shown
    pub panel_dwell_secs: u64,
    /// How long the alarm panel is held
    pub alarm_dwell_secs: u64,
    /// How long each of the two schedule panels is held
    pub schedule_dwell_secs: u64,
    /// Pause after a failed render
    pub error_backoff_secs: u64,
    /// Random delay before the first render, lower bound
    pub startup_delay_min_secs: u64,
    /// Random delay before the first render, upper bound
    pub startup_delay_max_secs: u64,
}

impl Default for OledHardwareConfig {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            panel_dwell_secs: 4,
            alarm_dwell_secs: 20,
            schedule_dwell_secs: 5,
            error_backoff_secs: 60,
            startup_delay_min_secs: 3,
            startup_delay_max_secs: 10,
        }
    }
}

impl OledHardwareConfig {
    pub fn panel_dwell(&self) -> Duration {
        Duration::from_secs(self.panel_dwell_secs)
    }

    pub fn alarm_dwell(&self) -> Duration {
        Duration::from_secs(self.alarm_dwell_secs)
    }

    pub fn schedule_dwell(&self) -> Duration {
        Duration::from_secs(self.schedule_dwell_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

/// Static configuration for the plugin daemon.
///
/// This is loaded once at startup and remains immutable during runtime.
/// Located at `~/.config/sip-plugins/config.toml` by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Server configuration (hostname, port)
    pub server: ServerConfig,

    /// Host identity shown on the display
    pub host: HostConfig,

    /// Door relay wiring and timing
    pub door: DoorHardwareConfig,

    /// OLED bus and timing
    pub oled: OledHardwareConfig,

    /// Directory for the plugin records (door.json, oled_adj.json)
    ///
    /// Defaults to `~/.local/share/sip-plugins` (XDG data directory).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            host: HostConfig::default(),
            door: DoorHardwareConfig::default(),
            oled: OledHardwareConfig::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl StaticConfig {
    /// Create a new StaticConfig with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Parse StaticConfig from TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize StaticConfig to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

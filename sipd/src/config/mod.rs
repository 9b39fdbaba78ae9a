//! Configuration management module
//!
//! Loads the static TOML config and the plugin records, and checks the
//! hardware section before any pin is touched.

mod runtime_config;

pub(crate) use runtime_config::RuntimeConfig;

use sip_core::config::{DoorHardwareConfig, OledHardwareConfig, StaticConfig};
use sip_core::pins::header_to_bcm;

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Header pin with no GPIO behind it
    #[error("{role} pin {header_pin} is not a GPIO on the 40-pin header")]
    UnknownHeaderPin { role: &'static str, header_pin: u8 },

    /// Two door roles share one pin
    #[error("Header pin {header_pin} is used by both {first} and {second}")]
    PinConflict {
        header_pin: u8,
        first: &'static str,
        second: &'static str,
    },

    /// Startup delay range is empty
    #[error("OLED startup delay min ({min}s) is greater than max ({max}s)")]
    StartupDelayRange { min: u64, max: u64 },

    /// A hold of zero seconds would spin the reporter
    #[error("OLED {field} must be at least 1 second")]
    ZeroDwell { field: &'static str },
}

/// Door pins resolved to BCM GPIO numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DoorPins {
    /// Relay 0 (full open) and relay 1 (semi open)
    pub relays: [u8; 2],
    pub sensor: u8,
}

/// Map the door's header pins to BCM numbers.
pub(crate) fn resolve_door_pins(door: &DoorHardwareConfig) -> Result<DoorPins, ValidationError> {
    let roles = [
        ("relay 0", door.relay_pins[0]),
        ("relay 1", door.relay_pins[1]),
        ("sensor", door.sensor_pin),
    ];

    for (i, (first, pin)) in roles.iter().enumerate() {
        if let Some((second, _)) = roles[i + 1..].iter().find(|(_, other)| other == pin) {
            return Err(ValidationError::PinConflict {
                header_pin: *pin,
                first: *first,
                second: *second,
            });
        }
    }

    let bcm = |role: &'static str, header_pin: u8| {
        header_to_bcm(header_pin).map_err(|_| ValidationError::UnknownHeaderPin { role, header_pin })
    };

    Ok(DoorPins {
        relays: [
            bcm("relay 0", door.relay_pins[0])?,
            bcm("relay 1", door.relay_pins[1])?,
        ],
        sensor: bcm("sensor", door.sensor_pin)?,
    })
}

fn validate_oled(oled: &OledHardwareConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if oled.startup_delay_min_secs > oled.startup_delay_max_secs {
        errors.push(ValidationError::StartupDelayRange {
            min: oled.startup_delay_min_secs,
            max: oled.startup_delay_max_secs,
        });
    }

    let dwells = [
        ("panel_dwell_secs", oled.panel_dwell_secs),
        ("alarm_dwell_secs", oled.alarm_dwell_secs),
        ("schedule_dwell_secs", oled.schedule_dwell_secs),
        ("error_backoff_secs", oled.error_backoff_secs),
    ];
    errors.extend(
        dwells
            .into_iter()
            .filter(|(_, secs)| *secs == 0)
            .map(|(field, _)| ValidationError::ZeroDwell { field }),
    );

    errors
}

/// Validate the hardware sections of the static config.
///
/// Returns every problem found, not just the first.
pub(crate) fn validate(config: &StaticConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Err(e) = resolve_door_pins(&config.door) {
        errors.push(e);
    }
    errors.extend(validate_oled(&config.oled));
    errors
}

//! Door relay controller
//!
//! Drives the two relay outputs and samples the door sensor through a
//! [`GpioBackend`], so the same code runs on the Pi and in tests.

use crate::config::DoorPins;
use sip_core::config::DoorHardwareConfig;
use sip_core::{DoorConfig, DoorStatus, RelayPolarity, Result, SensorType, SipError};
use sip_hardware::GpioBackend;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pulse and settle timing of the door relays
#[derive(Debug, Clone, Copy)]
pub(crate) struct RelayTiming {
    /// How long a relay is held active
    pub pulse: Duration,
    /// Extra wait before sampling the sensor after a semi open
    pub semi_open_settle: Duration,
    /// Pause between configuring consecutive pins
    pub pin_setup_interval: Duration,
}

impl From<&DoorHardwareConfig> for RelayTiming {
    fn from(config: &DoorHardwareConfig) -> Self {
        Self {
            pulse: config.pulse(),
            semi_open_settle: config.semi_open_settle(),
            pin_setup_interval: config.pin_setup_interval(),
        }
    }
}

/// Relay and sensor pins of one door
pub(crate) struct DoorController {
    gpio: Box<dyn GpioBackend>,
    pins: DoorPins,
    timing: RelayTiming,
}

impl DoorController {
    pub fn new(gpio: Box<dyn GpioBackend>, pins: DoorPins, timing: RelayTiming) -> Self {
        Self { gpio, pins, timing }
    }

    pub fn timing(&self) -> RelayTiming {
        self.timing
    }

    /// Configure the relay pins at their idle level and, when the sensor is
    /// enabled, the sensor pin with the pull matching its switch type.
    pub async fn init_pins(&mut self, config: &DoorConfig) -> Result<()> {
        let idle = config.relay_polarity.idle_level();

        for (i, pin) in self.pins.relays.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.timing.pin_setup_interval).await;
            }
            self.gpio.configure_output(pin, idle)?;
        }

        if config.sensor_enabled {
            tokio::time::sleep(self.timing.pin_setup_interval).await;
            self.gpio
                .configure_input(self.pins.sensor, config.sensor_type.pull())?;
        }

        info!(
            "Door pins initialized: relays {:?} idle {}, sensor {}",
            self.pins.relays,
            idle,
            if config.sensor_enabled {
                format!("GPIO{} ({})", self.pins.sensor, config.sensor_type)
            } else {
                "disabled".to_string()
            }
        );
        Ok(())
    }

    /// Hold `relay` active for the pulse duration, then return it to idle.
    pub async fn pulse(&mut self, relay: usize, polarity: RelayPolarity) -> Result<()> {
        let pin = *self.pins.relays.get(relay).ok_or_else(|| {
            SipError::InvalidInput(format!("Relay index {} out of range", relay))
        })?;

        debug!("Relay {} (GPIO{}) active for {:?}", relay, pin, self.timing.pulse);
        self.gpio.write(pin, polarity.active_level())?;
        tokio::time::sleep(self.timing.pulse).await;
        self.gpio.write(pin, polarity.idle_level())
    }

    /// Sample the door sensor
    pub fn read_status(&mut self, sensor_type: SensorType) -> Result<DoorStatus> {
        let level = self.gpio.read(self.pins.sensor)?;
        let status = sensor_type.status_for(level);
        debug!("Door sensor GPIO{} reads {} -> {}", self.pins.sensor, level, status);
        Ok(status)
    }

    /// Drive every relay to idle. Attempts all relays, returns the first error.
    pub fn release(&mut self, polarity: RelayPolarity) -> Result<()> {
        let mut first_error = None;
        for pin in self.pins.relays {
            if let Err(e) = self.gpio.write(pin, polarity.idle_level()) {
                warn!("Failed to release relay GPIO{}: {}", pin, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sip_core::{Level, Pull};
    use sip_hardware::{GpioEvent, MockGpio, Unavailable};

    const PINS: DoorPins = DoorPins {
        relays: [20, 21],
        sensor: 10,
    };

    fn controller(mock: &MockGpio) -> DoorController {
        DoorController::new(
            Box::new(mock.clone()),
            PINS,
            RelayTiming::from(&DoorHardwareConfig::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_pins_active_low() {
        let mock = MockGpio::new();
        let mut door = controller(&mock);

        door.init_pins(&DoorConfig::default()).await.unwrap();

        assert_eq!(mock.output_level(20), Some(Level::High));
        assert_eq!(mock.output_level(21), Some(Level::High));
        assert_eq!(mock.input_pull(10), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_pins_with_sensor() {
        let mock = MockGpio::new();
        let mut door = controller(&mock);
        let config = DoorConfig {
            sensor_enabled: true,
            sensor_type: SensorType::NormallyClosed,
            relay_polarity: RelayPolarity::ActiveHigh,
            ..DoorConfig::default()
        };

        door.init_pins(&config).await.unwrap();

        assert_eq!(mock.output_level(20), Some(Level::Low));
        assert_eq!(mock.input_pull(10), Some(Pull::Up));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pins_configured_100ms_apart() {
        let mock = MockGpio::new();
        let mut door = controller(&mock);
        door.init_pins(&DoorConfig::default()).await.unwrap();

        let at: Vec<_> = mock
            .events()
            .iter()
            .map(|e| match e {
                GpioEvent::ConfigureOutput { at, .. } => *at,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(at[1] - at[0], Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_is_exactly_one_second() {
        let mock = MockGpio::new();
        let mut door = controller(&mock);
        door.init_pins(&DoorConfig::default()).await.unwrap();

        door.pulse(0, RelayPolarity::ActiveLow).await.unwrap();

        let writes: Vec<_> = mock
            .events_for(20)
            .into_iter()
            .filter_map(|e| match e {
                GpioEvent::Write { level, at, .. } => Some((level, at)),
                _ => None,
            })
            .collect();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].0, Level::Low);
        assert_eq!(writes[1].0, Level::High);
        assert_eq!(writes[1].1 - writes[0].1, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_pulse_rejects_unknown_relay() {
        let mock = MockGpio::new();
        let mut door = controller(&mock);
        assert!(door.pulse(2, RelayPolarity::ActiveLow).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_status_maps_levels() {
        let mock = MockGpio::new();
        let mut door = controller(&mock);
        let config = DoorConfig {
            sensor_enabled: true,
            ..DoorConfig::default()
        };
        door.init_pins(&config).await.unwrap();

        mock.set_input_level(10, Level::High);
        assert_eq!(door.read_status(SensorType::NormallyOpen).unwrap(), DoorStatus::Closed);
        mock.set_input_level(10, Level::Low);
        assert_eq!(door.read_status(SensorType::NormallyOpen).unwrap(), DoorStatus::Open);
    }

    #[tokio::test]
    async fn test_unavailable_backend_reports_errors() {
        let mut door = DoorController::new(
            Box::new(Unavailable::new("no /dev/gpiomem")),
            PINS,
            RelayTiming::from(&DoorHardwareConfig::default()),
        );
        assert!(door.init_pins(&DoorConfig::default()).await.is_err());
        assert!(door.release(RelayPolarity::ActiveLow).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_drives_idle() {
        let mock = MockGpio::new();
        let mut door = controller(&mock);
        door.init_pins(&DoorConfig::default()).await.unwrap();

        let mut gpio = mock.clone();
        gpio.write(21, Level::Low).unwrap();
        door.release(RelayPolarity::ActiveLow).unwrap();

        assert_eq!(mock.output_level(20), Some(Level::High));
        assert_eq!(mock.output_level(21), Some(Level::High));
    }
}

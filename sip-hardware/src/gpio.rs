//! Digital pin access for the door relays and sensor
//!
//! Pins are addressed by BCM GPIO number. Relay pins are held as outputs for
//! the life of the backend; reconfiguring a pin releases the previous handle
//! first.

use rppal::gpio::{Gpio, InputPin, OutputPin};
use sip_core::{Level, Pull, Result, SipError};
use std::collections::HashMap;
use tracing::debug;

/// Trait for digital pin access
///
/// This trait enables testing of the door controller without real hardware
/// by allowing mock implementations.
pub trait GpioBackend: Send {
    /// Configure `pin` as an output driven to `initial`
    fn configure_output(&mut self, pin: u8, initial: Level) -> Result<()>;

    /// Drive a configured output pin
    fn write(&mut self, pin: u8, level: Level) -> Result<()>;

    /// Configure `pin` as an input with the given pull resistor
    fn configure_input(&mut self, pin: u8, pull: Pull) -> Result<()>;

    /// Sample a configured input pin
    fn read(&mut self, pin: u8) -> Result<Level>;
}

/// GPIO backend on the Raspberry Pi's `/dev/gpiomem`
pub struct RppalGpio {
    gpio: Gpio,
    outputs: HashMap<u8, OutputPin>,
    inputs: HashMap<u8, InputPin>,
}

impl RppalGpio {
    /// Open the GPIO peripheral
    pub fn open() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| SipError::Hardware(format!("GPIO: {}", e)))?;
        debug!("GPIO peripheral opened");
        Ok(Self {
            gpio,
            outputs: HashMap::new(),
            inputs: HashMap::new(),
        })
    }

    fn release(&mut self, pin: u8) {
        self.outputs.remove(&pin);
        self.inputs.remove(&pin);
    }

    fn pin_error(pin: u8, err: rppal::gpio::Error) -> SipError {
        SipError::Gpio {
            pin,
            reason: err.to_string(),
        }
    }
}

fn to_rppal(level: Level) -> rppal::gpio::Level {
    match level {
        Level::Low => rppal::gpio::Level::Low,
        Level::High => rppal::gpio::Level::High,
    }
}

fn from_rppal(level: rppal::gpio::Level) -> Level {
    match level {
        rppal::gpio::Level::Low => Level::Low,
        rppal::gpio::Level::High => Level::High,
    }
}

impl GpioBackend for RppalGpio {
    fn configure_output(&mut self, pin: u8, initial: Level) -> Result<()> {
        self.release(pin);
        let raw = self.gpio.get(pin).map_err(|e| Self::pin_error(pin, e))?;
        let mut output = match initial {
            Level::Low => raw.into_output_low(),
            Level::High => raw.into_output_high(),
        };
        // Relays must stay released after the daemon exits
        output.set_reset_on_drop(false);
        debug!("GPIO{} configured as output, initial {}", pin, initial);
        self.outputs.insert(pin, output);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<()> {
        let output = self.outputs.get_mut(&pin).ok_or_else(|| SipError::Gpio {
            pin,
            reason: "not configured as output".to_string(),
        })?;
        output.write(to_rppal(level));
        Ok(())
    }

    fn configure_input(&mut self, pin: u8, pull: Pull) -> Result<()> {
        self.release(pin);
        let raw = self.gpio.get(pin).map_err(|e| Self::pin_error(pin, e))?;
        let input = match pull {
            Pull::Up => raw.into_input_pullup(),
            Pull::Down => raw.into_input_pulldown(),
        };
        debug!("GPIO{} configured as input, pull {:?}", pin, pull);
        self.inputs.insert(pin, input);
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level> {
        let input = self.inputs.get(&pin).ok_or_else(|| SipError::Gpio {
            pin,
            reason: "not configured as input".to_string(),
        })?;
        Ok(from_rppal(input.read()))
    }
}

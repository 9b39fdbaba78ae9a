//! sip-hardware
//!
//! Hardware abstraction crate with the GPIO backends used by the door plugin
//! and the SSD1306 text display used by the OLED plugin. The daemon only talks to
//! the [`GpioBackend`] and [`TextDisplay`] traits, so the real drivers can be
//! swapped for the in-memory ones in mock mode and in tests.
//
//! Public API:
//! - `gpio::GpioBackend`, `gpio::RppalGpio`: digital pin access
//! - `display::TextDisplay`, `display::Ssd1306Display`: three-line text output
//! - `mock::{MockGpio, MemoryDisplay}`: in-memory stand-ins
//! - `Unavailable`: backend for hardware that failed to open

pub mod display;
pub mod gpio;
pub mod mock;

pub use display::{Ssd1306Display, TextDisplay};
pub use gpio::{GpioBackend, RppalGpio};
pub use mock::{GpioEvent, MemoryDisplay, MockGpio, ShownFrame};

use sip_core::{Level, Pull, Result, SipError};

/// Stand-in for hardware that could not be opened.
///
/// Every call fails with the reason recorded at startup, so callers log the
/// failure and carry on without the device.
#[derive(Debug, Clone)]
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> SipError {
        SipError::Hardware(format!("device unavailable: {}", self.reason))
    }
}

impl GpioBackend for Unavailable {
    fn configure_output(&mut self, _pin: u8, _initial: Level) -> Result<()> {
        Err(self.error())
    }

    fn write(&mut self, _pin: u8, _level: Level) -> Result<()> {
        Err(self.error())
    }

    fn configure_input(&mut self, _pin: u8, _pull: Pull) -> Result<()> {
        Err(self.error())
    }

    fn read(&mut self, _pin: u8) -> Result<Level> {
        Err(self.error())
    }
}

impl TextDisplay for Unavailable {
    fn set_address(&mut self, _address: u8) -> Result<()> {
        Ok(())
    }

    fn show(&mut self, _lines: &[String]) -> Result<()> {
        Err(self.error())
    }

    fn clear(&mut self) -> Result<()> {
        Err(self.error())
    }
}

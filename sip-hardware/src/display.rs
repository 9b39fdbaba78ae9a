//! Text output on the status display
//!
//! The SSD1306 panel is driven through the `ssd1306` crate in buffered
//! graphics mode. Text is drawn into its framebuffer with `embedded-graphics`
//! and pushed to the panel on every [`TextDisplay::show`].

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c as I2cBus;
use rppal::i2c::I2c;
use sip_core::{Result, SipError};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use tracing::debug;

/// Panel height in pixels
pub const HEIGHT: usize = 32;

/// Height of one text row in pixels
pub const LINE_HEIGHT: i32 = 10;

/// Rows that fit on the panel
pub const MAX_LINES: usize = HEIGHT / LINE_HEIGHT as usize;

/// A display that shows a few lines of text
pub trait TextDisplay: Send {
    /// Change the bus address used for subsequent writes
    fn set_address(&mut self, address: u8) -> Result<()>;

    /// Replace the screen contents with `lines`, top to bottom
    fn show(&mut self, lines: &[String]) -> Result<()>;

    /// Blank the screen
    fn clear(&mut self) -> Result<()>;
}

fn error(address: u8, what: &str, e: impl std::fmt::Debug) -> SipError {
    SipError::Hardware(format!(
        "SSD1306 at {:#04x}: {} failed: {:?}",
        address, what, e
    ))
}

type Driver<B> =
    Ssd1306<I2CInterface<B>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>;

fn driver<B: I2cBus>(bus: B, address: u8) -> Driver<B> {
    Ssd1306::new(
        I2CDisplayInterface::new_custom_address(bus, address),
        DisplaySize128x32,
        DisplayRotation::Rotate0,
    )
    .into_buffered_graphics_mode()
}

/// [`TextDisplay`] on a 128x32 SSD1306 panel.
///
/// The panel is initialized on the first write, again after an address
/// change, and again after any failed write.
pub struct Ssd1306Display<B: I2cBus> {
    // Only `None` while the bus is moved between drivers
    driver: Option<Driver<B>>,
    address: u8,
    initialized: bool,
}

impl Ssd1306Display<I2c> {
    /// Open `/dev/i2c-<bus>` for a panel at `address`
    pub fn open(bus: u8, address: u8) -> Result<Self> {
        let i2c = I2c::with_bus(bus)
            .map_err(|e| SipError::Hardware(format!("I2C bus {}: {}", bus, e)))?;
        Ok(Self::new(i2c, address))
    }
}

impl<B: I2cBus> Ssd1306Display<B> {
    pub fn new(bus: B, address: u8) -> Self {
        Self {
            driver: Some(driver(bus, address)),
            address,
            initialized: false,
        }
    }

    /// Current bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    fn draw(&mut self, lines: &[String]) -> Result<()> {
        let address = self.address;
        let Some(driver) = self.driver.as_mut() else {
            return Err(SipError::Hardware(format!(
                "SSD1306 at {:#04x}: driver lost",
                address
            )));
        };

        if !self.initialized {
            if let Err(e) = driver.init() {
                return Err(error(address, "init", e));
            }
            debug!("SSD1306 initialized at {:#04x}", address);
            self.initialized = true;
        }

        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        driver.clear_buffer();
        for (row, line) in lines.iter().take(MAX_LINES).enumerate() {
            let origin = Point::new(0, row as i32 * LINE_HEIGHT);
            if let Err(e) = Text::with_baseline(line, origin, style, Baseline::Top).draw(driver) {
                return Err(error(address, "draw", e));
            }
        }

        if let Err(e) = driver.flush() {
            // The panel may have been power cycled
            self.initialized = false;
            return Err(error(address, "flush", e));
        }
        Ok(())
    }
}

impl<B: I2cBus + Send> TextDisplay for Ssd1306Display<B> {
    fn set_address(&mut self, address: u8) -> Result<()> {
        if address == self.address {
            return Ok(());
        }
        if let Some(old) = self.driver.take() {
            let bus = old.release().release();
            self.driver = Some(driver(bus, address));
        }
        debug!(
            "SSD1306 address changed from {:#04x} to {:#04x}",
            self.address, address
        );
        self.address = address;
        self.initialized = false;
        Ok(())
    }

    fn show(&mut self, lines: &[String]) -> Result<()> {
        self.draw(lines)
    }

    fn clear(&mut self) -> Result<()> {
        self.draw(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Control byte preceding display RAM data
    const DATA: u8 = 0x40;
    /// Control byte preceding a command stream
    const COMMAND: u8 = 0x00;

    #[derive(Debug)]
    struct BusError;

    impl embedded_hal::i2c::Error for BusError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Records every write as `(address, bytes)`
    #[derive(Clone, Default)]
    struct RecordingBus {
        writes: Arc<Mutex<Vec<(u8, Vec<u8>)>>>,
        fail: Arc<AtomicBool>,
    }

    impl RecordingBus {
        fn take(&self) -> Vec<(u8, Vec<u8>)> {
            std::mem::take(&mut *self.writes.lock().unwrap())
        }

        fn ram(writes: &[(u8, Vec<u8>)]) -> Vec<u8> {
            writes
                .iter()
                .filter(|(_, bytes)| bytes[0] == DATA)
                .flat_map(|(_, bytes)| bytes[1..].to_vec())
                .collect()
        }

        fn commands(writes: &[(u8, Vec<u8>)]) -> usize {
            writes.iter().filter(|(_, bytes)| bytes[0] == COMMAND).count()
        }
    }

    impl ErrorType for RecordingBus {
        type Error = BusError;
    }

    impl I2cBus for RecordingBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> std::result::Result<(), BusError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(BusError);
            }
            let mut writes = self.writes.lock().unwrap();
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    fn lit_rows(ram: &[u8]) -> Vec<bool> {
        (0..HEIGHT)
            .map(|y| (0..128).any(|x| ram[x + (y / 8) * 128] & (1 << (y % 8)) != 0))
            .collect()
    }

    #[test]
    fn test_three_lines_fit() {
        assert_eq!(MAX_LINES, 3);
    }

    #[test]
    fn test_show_draws_each_line_in_its_row() {
        let bus = RecordingBus::default();
        let mut display = Ssd1306Display::new(bus.clone(), 0x3C);
        display
            .show(&["Name:".to_string(), String::new(), "Irrigation".to_string()])
            .unwrap();

        let writes = bus.take();
        assert!(writes.iter().all(|(address, _)| *address == 0x3C));
        let ram = RecordingBus::ram(&writes);
        assert_eq!(ram.len(), 512);
        let rows = lit_rows(&ram);
        assert!(rows[0..10].iter().any(|r| *r));
        assert!(rows[10..20].iter().all(|r| !*r));
        assert!(rows[20..30].iter().any(|r| *r));
    }

    #[test]
    fn test_clear_blanks_panel() {
        let bus = RecordingBus::default();
        let mut display = Ssd1306Display::new(bus.clone(), 0x3C);
        display.show(&["ALARM!:".to_string()]).unwrap();
        bus.take();
        display.clear().unwrap();

        let ram = RecordingBus::ram(&bus.take());
        assert!(!ram.is_empty());
        assert!(ram.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_panel_initialized_once() {
        let bus = RecordingBus::default();
        let mut display = Ssd1306Display::new(bus.clone(), 0x3C);
        display.show(&["a".to_string()]).unwrap();
        let first = bus.take();
        display.show(&["b".to_string()]).unwrap();
        let second = bus.take();

        // Later writes only set the draw area
        assert!(RecordingBus::commands(&first) > RecordingBus::commands(&second));
        assert_eq!(RecordingBus::ram(&second).len(), 512);
    }

    #[test]
    fn test_address_change_moves_writes() {
        let bus = RecordingBus::default();
        let mut display = Ssd1306Display::new(bus.clone(), 0x3C);
        display.show(&["a".to_string()]).unwrap();
        bus.take();
        display.show(&["a".to_string()]).unwrap();
        let steady = RecordingBus::commands(&bus.take());

        display.set_address(0x3D).unwrap();
        assert_eq!(display.address(), 0x3D);
        display.show(&["a".to_string()]).unwrap();

        let writes = bus.take();
        assert!(!writes.is_empty());
        assert!(writes.iter().all(|(address, _)| *address == 0x3D));
        assert!(RecordingBus::commands(&writes) > steady);
        assert_eq!(RecordingBus::ram(&writes).len(), 512);
    }

    #[test]
    fn test_failed_write_reports_and_recovers() {
        let bus = RecordingBus::default();
        let mut display = Ssd1306Display::new(bus.clone(), 0x3C);
        display.show(&["a".to_string()]).unwrap();

        bus.fail.store(true, Ordering::SeqCst);
        let err = display.show(&["b".to_string()]).unwrap_err();
        assert!(err.to_string().contains("0x3c"));

        bus.fail.store(false, Ordering::SeqCst);
        bus.take();
        display.show(&["b".to_string()]).unwrap();
        assert_eq!(RecordingBus::ram(&bus.take()).len(), 512);
    }
}

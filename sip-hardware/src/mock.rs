//! In-memory hardware for mock mode and tests
//!
//! Both types are cheap handles over shared state: clone one into the daemon
//! and keep the other to inspect what the daemon did. Only the most recent
//! [`HISTORY_LIMIT`] events and frames are kept, so a long-running `--mock`
//! daemon stays at a fixed size.

use crate::display::TextDisplay;
use crate::gpio::GpioBackend;
use sip_core::{Level, Pull, Result, SipError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

/// Recorded GPIO events and display frames kept per mock
pub const HISTORY_LIMIT: usize = 1024;

fn record<T>(history: &mut VecDeque<T>, item: T) {
    if history.len() == HISTORY_LIMIT {
        history.pop_front();
    }
    history.push_back(item);
}

/// A pin operation recorded by [`MockGpio`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioEvent {
    ConfigureOutput { pin: u8, level: Level, at: Instant },
    Write { pin: u8, level: Level, at: Instant },
    ConfigureInput { pin: u8, pull: Pull, at: Instant },
}

impl GpioEvent {
    pub fn pin(&self) -> u8 {
        match *self {
            GpioEvent::ConfigureOutput { pin, .. }
            | GpioEvent::Write { pin, .. }
            | GpioEvent::ConfigureInput { pin, .. } => pin,
        }
    }
}

#[derive(Debug, Default)]
struct MockGpioState {
    outputs: HashMap<u8, Level>,
    inputs: HashMap<u8, Pull>,
    input_levels: HashMap<u8, Level>,
    events: VecDeque<GpioEvent>,
}

/// Simulated GPIO that records every operation
#[derive(Debug, Clone, Default)]
pub struct MockGpio {
    state: Arc<Mutex<MockGpioState>>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockGpioState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the level an input pin reads
    pub fn set_input_level(&self, pin: u8, level: Level) {
        self.state().input_levels.insert(pin, level);
    }

    /// Current level of an output pin
    pub fn output_level(&self, pin: u8) -> Option<Level> {
        self.state().outputs.get(&pin).copied()
    }

    /// Pull configured on an input pin
    pub fn input_pull(&self, pin: u8) -> Option<Pull> {
        self.state().inputs.get(&pin).copied()
    }

    /// Recorded operations, oldest first
    pub fn events(&self) -> Vec<GpioEvent> {
        self.state().events.iter().copied().collect()
    }

    /// Recorded operations on one pin
    pub fn events_for(&self, pin: u8) -> Vec<GpioEvent> {
        self.events().into_iter().filter(|e| e.pin() == pin).collect()
    }

    /// How many times `pin` has been configured as an output
    pub fn output_configurations(&self, pin: u8) -> usize {
        self.events_for(pin)
            .iter()
            .filter(|e| matches!(e, GpioEvent::ConfigureOutput { .. }))
            .count()
    }
}

impl GpioBackend for MockGpio {
    fn configure_output(&mut self, pin: u8, initial: Level) -> Result<()> {
        let mut state = self.state();
        state.inputs.remove(&pin);
        state.outputs.insert(pin, initial);
        record(
            &mut state.events,
            GpioEvent::ConfigureOutput {
                pin,
                level: initial,
                at: Instant::now(),
            },
        );
        debug!("mock GPIO{} -> output {}", pin, initial);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<()> {
        let mut state = self.state();
        let Some(slot) = state.outputs.get_mut(&pin) else {
            return Err(SipError::Gpio {
                pin,
                reason: "not configured as output".to_string(),
            });
        };
        *slot = level;
        record(
            &mut state.events,
            GpioEvent::Write {
                pin,
                level,
                at: Instant::now(),
            },
        );
        debug!("mock GPIO{} = {}", pin, level);
        Ok(())
    }

    fn configure_input(&mut self, pin: u8, pull: Pull) -> Result<()> {
        let mut state = self.state();
        state.outputs.remove(&pin);
        state.inputs.insert(pin, pull);
        record(
            &mut state.events,
            GpioEvent::ConfigureInput {
                pin,
                pull,
                at: Instant::now(),
            },
        );
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level> {
        let state = self.state();
        let Some(pull) = state.inputs.get(&pin) else {
            return Err(SipError::Gpio {
                pin,
                reason: "not configured as input".to_string(),
            });
        };
        // An unconnected input floats to its pull level
        let idle = match pull {
            Pull::Up => Level::High,
            Pull::Down => Level::Low,
        };
        Ok(state.input_levels.get(&pin).copied().unwrap_or(idle))
    }
}

/// A frame shown on a [`MemoryDisplay`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownFrame {
    pub address: u8,
    pub lines: Vec<String>,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MemoryDisplayState {
    address: u8,
    frames: VecDeque<ShownFrame>,
    fail_next: Option<String>,
    fail_always: Option<String>,
}

/// Display that keeps recent frames in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDisplay {
    state: Arc<Mutex<MemoryDisplayState>>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryDisplayState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Recent frames, oldest first. A cleared screen is an empty frame.
    pub fn frames(&self) -> Vec<ShownFrame> {
        self.state().frames.iter().cloned().collect()
    }

    /// First line of each recent frame
    pub fn headlines(&self) -> Vec<String> {
        self.state()
            .frames
            .iter()
            .map(|f| f.lines.first().cloned().unwrap_or_default())
            .collect()
    }

    /// Make the next `show` fail with `reason`
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.state().fail_next = Some(reason.into());
    }

    /// Make every `show` fail with `reason` until [`MemoryDisplay::recover`]
    pub fn fail_always(&self, reason: impl Into<String>) {
        self.state().fail_always = Some(reason.into());
    }

    pub fn recover(&self) {
        self.state().fail_always = None;
    }
}

impl TextDisplay for MemoryDisplay {
    fn set_address(&mut self, address: u8) -> Result<()> {
        self.state().address = address;
        Ok(())
    }

    fn show(&mut self, lines: &[String]) -> Result<()> {
        let mut state = self.state();
        if let Some(reason) = state.fail_next.take() {
            return Err(SipError::Display(reason));
        }
        if let Some(reason) = &state.fail_always {
            return Err(SipError::Display(reason.clone()));
        }
        let frame = ShownFrame {
            address: state.address,
            lines: lines.to_vec(),
            at: Instant::now(),
        };
        debug!("memory display: {:?}", frame.lines);
        record(&mut state.frames, frame);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.show(&[])
    }
}

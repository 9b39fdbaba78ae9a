//! SIP Plugins Core Library
//!
//! Shared types, plugin records, and utilities for the door and OLED plugins.
//! This crate is used by both the hardware crate and the daemon.

pub mod api;
pub mod config;
pub mod door;
pub mod error;
pub mod oled;
pub mod pins;
pub mod signal;
pub mod types;

// Re-export commonly used types
pub use config::{default_config_path, default_data_dir, StaticConfig};
pub use door::{DoorAction, DoorConfig, DoorSettingsForm, DoorStatus, RelayPolarity, SensorType};
pub use error::*;
pub use oled::{OledConfig, Panel};
pub use signal::Signal;
pub use types::*;

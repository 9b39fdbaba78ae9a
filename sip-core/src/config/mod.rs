//! Configuration types for the plugin daemon
//!
//! # Architecture
//!
//! Configuration is split into:
//! - [`StaticConfig`] - Server, host identity, and pin assignments, loaded once at startup
//! - [`crate::DoorConfig`] - Door plugin settings, mutable via the settings page
//! - [`crate::OledConfig`] - OLED plugin settings, mutable via the settings page
//!
//! Each plugin record is stored in its own JSON file within the data directory.

mod paths;
mod static_config;

pub use paths::{default_config_path, default_data_dir, DOOR_FILE, OLED_FILE};
pub use static_config::{DoorHardwareConfig, HostConfig, OledHardwareConfig, ServerConfig, StaticConfig};

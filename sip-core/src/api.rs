//! API models for the plugin daemon's JSON endpoints
//!
//! The settings pages and actions are plain HTML and redirects; the JSON
//! models here cover the readouts and the host-facing endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ApiResponse<T> {
    #[serde(rename = "success")]
    Success { data: T },
    #[serde(rename = "error")]
    Error { error: String },
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    /// Create an error response
    pub fn error(error: String) -> Self {
        Self::Error { error }
    }
}

/// Entry in the host's plugin menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Label shown in the menu
    pub label: String,
    /// Page the entry links to
    pub href: String,
}

impl MenuEntry {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Daemon information response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    /// Daemon version
    pub version: String,
    /// Daemon uptime in seconds
    pub uptime: u64,
    /// Whether the GPIO backend is simulated
    pub mock_hardware: bool,
    /// Registered plugin menu entries
    pub plugins: Vec<MenuEntry>,
}

/// What the irrigation host is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Program {
    #[default]
    Idle,
    RunOnce,
    Manual,
    /// A numbered user program
    Scheduled(u32),
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Program::Idle => write!(f, "Idle"),
            Program::RunOnce => write!(f, "Run-once"),
            Program::Manual => write!(f, "Manual Mode"),
            Program::Scheduled(n) => write!(f, "Prog: {}", n),
        }
    }
}

/// Host state read by the status panels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatus {
    /// Whether the rain sensor is in use
    pub rain_sensor: bool,
    /// Program currently running
    pub program: Program,
    /// Running flag per station, station 1 first
    pub stations: Vec<bool>,
}

/// Partial update of [`HostStatus`]; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_sensor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stations: Option<Vec<bool>>,
}

impl HostStatus {
    /// Apply a partial update
    pub fn apply(&mut self, update: HostUpdateRequest) {
        if let Some(rain_sensor) = update.rain_sensor {
            self.rain_sensor = rain_sensor;
        }
        if let Some(program) = update.program {
            self.program = program;
        }
        if let Some(stations) = update.stations {
            self.stations = stations;
        }
    }
}

/// Result of publishing a signal through the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResponse {
    /// Bus name of the signal
    pub signal: String,
    /// Number of subscribers that received it
    pub receivers: usize,
}

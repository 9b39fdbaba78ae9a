//! The slice of irrigation-host state the plugins read
//!
//! Identity comes from the static config, the mutable part is updated through
//! the API, and machine facts (IP, CPU temperature, uptime, clock) are read
//! from the operating system whenever a snapshot is taken.

use sip_core::api::{HostStatus, HostUpdateRequest};
use sip_core::config::HostConfig;
use sip_core::unix_now;
use std::net::{IpAddr, UdpSocket};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";
const PROC_UPTIME: &str = "/proc/uptime";

/// Shared host state
pub(crate) struct HostState {
    identity: HostConfig,
    http_port: u16,
    status: RwLock<HostStatus>,
}

/// Everything a status panel may show, captured at one instant
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HostSnapshot {
    pub name: String,
    pub version: String,
    pub http_port: u16,
    pub ip: Option<IpAddr>,
    /// Formatted temperature with unit, e.g. `48.3 C`
    pub cpu_temp: Option<String>,
    /// Formatted system uptime
    pub uptime: Option<String>,
    /// Wall clock, unix seconds
    pub now: u64,
    pub status: HostStatus,
}

impl HostState {
    pub fn new(identity: HostConfig, http_port: u16) -> Self {
        Self {
            identity,
            http_port,
            status: RwLock::new(HostStatus::default()),
        }
    }

    pub async fn status(&self) -> HostStatus {
        self.status.read().await.clone()
    }

    pub async fn update(&self, update: HostUpdateRequest) -> HostStatus {
        let mut status = self.status.write().await;
        status.apply(update);
        debug!("Host status updated: {:?}", *status);
        status.clone()
    }

    /// Capture identity, host status and machine facts
    pub async fn snapshot(&self) -> HostSnapshot {
        HostSnapshot {
            name: self.identity.name.clone(),
            version: self.identity.version.clone(),
            http_port: self.http_port,
            ip: local_ip(),
            cpu_temp: cpu_temperature(Path::new(THERMAL_ZONE), &self.identity.temp_unit),
            uptime: system_uptime(Path::new(PROC_UPTIME)),
            now: unix_now(),
            status: self.status().await,
        }
    }
}

/// Address of the interface that routes to the outside world.
///
/// Connecting a UDP socket sends nothing; it only selects a route.
fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("10.255.255.255:1").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// Read a millidegree thermal zone and format it in `unit` (`C` or `F`)
fn cpu_temperature(zone: &Path, unit: &str) -> Option<String> {
    let raw = std::fs::read_to_string(zone).ok()?;
    let millis: f64 = raw.trim().parse().ok()?;
    Some(format_temperature(millis / 1000.0, unit))
}

fn format_temperature(celsius: f64, unit: &str) -> String {
    if unit.eq_ignore_ascii_case("F") {
        format!("{:.1} F", celsius * 1.8 + 32.0)
    } else {
        format!("{:.1} C", celsius)
    }
}

fn system_uptime(proc_uptime: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(proc_uptime).ok()?;
    let secs: f64 = raw.split_whitespace().next()?.parse().ok()?;
    Some(format_uptime(secs as u64))
}

/// `H:MM:SS`, prefixed with `N day(s), ` once past a day
pub(crate) fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

/// UTC date (`dd.mm.YYYY`) and time (`HH:MM:SS`) of a unix timestamp
pub(crate) fn format_clock(unix: u64) -> (String, String) {
    let days = (unix / 86_400) as i64;
    let secs = unix % 86_400;
    let (year, month, day) = civil_from_days(days);
    (
        format!("{:02}.{:02}.{:04}", day, month, year),
        format!(
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        ),
    )
}

/// Gregorian (year, month, day) for days since 1970-01-01.
///
/// Howard Hinnant's `civil_from_days`.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

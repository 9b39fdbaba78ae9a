//! Text content of every screen the reporter can show

use crate::host::{format_clock, HostSnapshot};
use sip_core::api::Program;
use sip_core::Panel;

const UNKNOWN: &str = "Unknown";

/// Something to put on the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Screen {
    /// A panel of the normal rotation
    Panel(Panel),
    /// Alarm raised by the host, with its message
    Alarm(String),
    /// A program has just been scheduled
    ScheduleStarted,
}

/// Rendered screen: up to three lines, plus text for the status log
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub lines: Vec<String>,
    pub status: Option<String>,
}

impl Frame {
    fn new(lines: [String; 3], status: Option<String>) -> Self {
        Self {
            lines: lines.into(),
            status,
        }
    }
}

/// Render `screen` from a host snapshot
pub(crate) fn render(screen: &Screen, host: &HostSnapshot) -> Frame {
    match screen {
        Screen::Panel(panel) => render_panel(*panel, host),
        Screen::Alarm(txt) => Frame::new(["ALARM!:".into(), txt.clone(), String::new()], None),
        Screen::ScheduleStarted => Frame::new(
            ["New program:".into(), "Running".into(), "...".into()],
            Some("New Program Running / ".into()),
        ),
    }
}

fn render_panel(panel: Panel, host: &HostSnapshot) -> Frame {
    // Heading and value panels share one layout
    let simple = |heading: &str, value: String, status_heading: &str| {
        let status = format!("{} / {}", status_heading, value);
        Frame::new([heading.into(), value, String::new()], Some(status))
    };

    match panel {
        Panel::Name => Frame::new(
            ["Name:".into(), host.name.clone(), "Irrigation syst.".into()],
            Some("SIP. / Irrigation syst.".into()),
        ),
        Panel::SoftwareVersion => simple("Software SIP:", host.version.clone(), "Software SIP:"),
        Panel::IpAddress => simple(
            "My IP is:",
            host.ip.map_or_else(|| UNKNOWN.to_string(), |ip| ip.to_string()),
            "My IP is:",
        ),
        Panel::Port => simple("Port IP:", host.http_port.to_string(), "Port IP:"),
        Panel::CpuTemp => simple(
            "CPU temperature:",
            host.cpu_temp.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            "CPU temperature:",
        ),
        Panel::DateTime => {
            let (date, time) = format_clock(host.now);
            let status = format!("{} {}", date, time);
            Frame::new(["Date Time:".into(), date, time], Some(status))
        }
        Panel::Uptime => simple(
            "System run Time:",
            host.uptime.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            "System run time:",
        ),
        Panel::RainSensor => simple(
            "Rain sensor:",
            if host.status.rain_sensor { "Active" } else { "Inactive" }.to_string(),
            "Rain sensor:",
        ),
        Panel::RunningStations => Frame::new(
            [
                "Running Stations:".into(),
                host.status.program.to_string(),
                running_stations(host),
            ],
            None,
        ),
    }
}

/// `S1 S3 ...` for every running station; empty while idle
fn running_stations(host: &HostSnapshot) -> String {
    if host.status.program == Program::Idle {
        return String::new();
    }
    host.status
        .stations
        .iter()
        .enumerate()
        .filter(|(_, running)| **running)
        .map(|(i, _)| format!("S{}", i + 1))
        .collect::<Vec<_>>()
        .join(" ")
}

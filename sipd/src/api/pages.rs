//! HTML for the plugin pages
//!
//! Plain server-rendered forms. The settings forms submit with GET, matching
//! the host's plugin conventions.

use crate::host::format_clock;
use sip_core::api::MenuEntry;
use sip_core::{DoorConfig, OledConfig, Panel};
use std::fmt::Write;

/// Escape text for HTML element content and attribute values
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(title),
        body = body
    )
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        "<p><label><input type=\"checkbox\" name=\"{}\" value=\"on\"{}> {}</label></p>\n",
        name,
        if checked { " checked" } else { "" },
        escape(label)
    )
}

fn select(name: &str, label: &str, options: &[(&str, &str)], current: &str) -> String {
    let mut html = format!("<p><label>{} <select name=\"{}\">", escape(label), name);
    for (value, text) in options {
        // write! to String is infallible
        let _ = write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            value,
            if *value == current { " selected" } else { "" },
            escape(text)
        );
    }
    html.push_str("</select></label></p>\n");
    html
}

/// Plugin menu
pub(crate) fn menu(entries: &[MenuEntry]) -> String {
    let mut body = String::from("<ul>\n");
    for entry in entries {
        let _ = writeln!(
            body,
            "<li><a href=\"{}\">{}</a></li>",
            escape(&entry.href),
            escape(&entry.label)
        );
    }
    body.push_str("</ul>\n");
    layout("Plugins", &body)
}

/// Door settings page with the two action buttons
pub(crate) fn door_settings(door: &DoorConfig) -> String {
    let last = match door.last_actuated {
        Some(unix) => {
            let (date, time) = format_clock(unix);
            format!("{} {}", date, time)
        }
        None => "never".to_string(),
    };

    let mut body = format!(
        "<p>Door status: <strong>{}</strong>, last actuated: {}</p>\n",
        door.status, last
    );
    body.push_str("<form action=\"/dooru\" method=\"get\">\n");
    body.push_str(&checkbox("enabled", "Enable door control", door.enabled));
    body.push_str(&checkbox("o_full", "Allow full open", door.open_full));
    body.push_str(&checkbox("o_semi", "Allow semi open", door.open_semi));
    body.push_str(&checkbox("o_sens", "Door sensor fitted", door.sensor_enabled));
    body.push_str(&select(
        "sens_t",
        "Sensor type",
        &[
            ("NO", "Normally open"),
            ("NC", "Normally closed"),
        ],
        &door.sensor_type.to_string(),
    ));
    body.push_str(&select(
        "active",
        "Relay polarity",
        &[
            ("low", "Active low"),
            ("high", "Active high"),
        ],
        &door.relay_polarity.to_string(),
    ));
    body.push_str("<p><button type=\"submit\">Submit</button></p>\n</form>\n");
    body.push_str(
        "<p><a href=\"/doorf\">Full open</a> | <a href=\"/doors\">Semi open</a></p>\n",
    );
    layout("Door control", &body)
}

/// OLED settings page
pub(crate) fn oled_settings(oled: &OledConfig) -> String {
    let mut body = String::from("<form action=\"/oleda\" method=\"get\">\n");
    body.push_str(&checkbox("use_oled", "Use OLED display", oled.enabled));
    let _ = writeln!(
        body,
        "<p><label>I2C address <input type=\"text\" name=\"address\" value=\"0x{:02x}\"></label></p>",
        oled.address
    );
    for panel in Panel::OPTIONAL {
        body.push_str(&checkbox(panel.key(), panel_label(panel), oled.shows(panel)));
    }
    body.push_str("<p><button type=\"submit\">Submit</button></p>\n</form>\n");
    let _ = writeln!(
        body,
        "<h2>Status</h2>\n<pre>{}</pre>\n<p><a href=\"/oledj\">JSON</a></p>",
        escape(&oled.status)
    );
    layout("OLED Settings", &body)
}

fn panel_label(panel: Panel) -> &'static str {
    match panel {
        Panel::Name => "System name",
        Panel::SoftwareVersion => "Software version",
        Panel::IpAddress => "IP address",
        Panel::Port => "HTTP port",
        Panel::CpuTemp => "CPU temperature",
        Panel::DateTime => "Date and time",
        Panel::Uptime => "Uptime",
        Panel::RainSensor => "Rain sensor",
        Panel::RunningStations => "Running stations",
    }
}

//! Default path resolution for configuration files
//!
//! Uses XDG Base Directory specification when available, with sensible fallbacks.

use std::path::PathBuf;

/// File name of the door plugin record within the data directory
pub const DOOR_FILE: &str = "door.json";

/// File name of the OLED plugin record within the data directory
pub const OLED_FILE: &str = "oled_adj.json";

/// Returns the default path for the static configuration file.
///
/// Uses XDG config directory if available:
/// - Linux/macOS: `~/.config/sip-plugins/config.toml`
/// - Fallback: `/etc/sip-plugins/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("sip-plugins")
        .join("config.toml")
}

/// Returns the default data directory for the plugin records.
///
/// Uses XDG data directory if available:
/// - Linux/macOS: `~/.local/share/sip-plugins`
/// - Fallback: `/var/lib/sip-plugins`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/var/lib"))
        .join("sip-plugins")
}

//! OLED status plugin
//!
//! Owns the settings side of the display: the form handler, the JSON readout
//! and the reload handle of the background [`OledReporter`].

mod panels;
mod reporter;
mod rotation;
mod status;

pub(crate) use reporter::{OledReporter, ReporterTiming, SharedDisplay};
pub(crate) use status::StatusLog;

use crate::config::RuntimeConfig;
use sip_core::{OledConfig, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

/// OLED plugin state shared by the HTTP handlers
pub(crate) struct OledPlugin {
    config: Arc<RuntimeConfig>,
    status: StatusLog,
    reload: Arc<Notify>,
}

impl OledPlugin {
    pub fn new(config: Arc<RuntimeConfig>, status: StatusLog, reload: Arc<Notify>) -> Self {
        Self {
            config,
            status,
            reload,
        }
    }

    /// Stored settings with the live status text
    pub async fn readout(&self) -> OledConfig {
        let mut oled = self.config.oled().await;
        oled.status = self.status.get();
        oled
    }

    /// Apply the settings form, save it, and wake the reporter.
    ///
    /// The current status text is saved along with the settings.
    pub async fn update_settings(&self, form: &HashMap<String, String>) -> Result<()> {
        let mut oled = self.config.oled().await;
        oled.apply_form(form)?;
        oled.status = self.status.get();

        self.config.set_oled(oled.clone()).await;
        self.config.save_oled().await?;
        self.reload.notify_one();

        info!(
            "OLED settings updated: {}, address 0x{:02x}, {} panel(s)",
            if oled.enabled { "enabled" } else { "disabled" },
            oled.address,
            oled.rotation().len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sip_core::config::StaticConfig;
    use sip_core::Panel;
    use tempfile::TempDir;

    async fn plugin(temp_dir: &TempDir) -> (OledPlugin, Arc<RuntimeConfig>, StatusLog, Arc<Notify>) {
        let static_config = StaticConfig::with_data_dir(temp_dir.path().to_path_buf());
        let config = Arc::new(RuntimeConfig::from_static(static_config).await.unwrap());
        let status = StatusLog::new();
        let reload = Arc::new(Notify::new());
        let plugin = OledPlugin::new(config.clone(), status.clone(), reload.clone());
        (plugin, config, status, reload)
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_update_saves_and_notifies() {
        let temp_dir = TempDir::new().unwrap();
        let (plugin, config, status, reload) = plugin(&temp_dir).await;
        status.push("Port IP: / 8080");

        plugin
            .update_settings(&form(&[("use_oled", "on"), ("address", "0x3d"), ("d_ip", "on")]))
            .await
            .unwrap();

        let saved = OledConfig::from_json(&std::fs::read_to_string(config.oled_path()).unwrap())
            .unwrap();
        assert!(saved.enabled);
        assert_eq!(saved.address, 0x3D);
        assert_eq!(saved.rotation(), vec![Panel::Name, Panel::IpAddress]);
        assert_eq!(saved.status, "Port IP: / 8080");

        // A permit is stored for the reporter
        tokio::time::timeout(std::time::Duration::from_millis(10), reload.notified())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (plugin, config, _, _) = plugin(&temp_dir).await;

        let result = plugin
            .update_settings(&form(&[("use_oled", "on"), ("address", "200")]))
            .await;
        assert!(result.is_err());
        assert_eq!(config.oled().await, OledConfig::default());
    }

    #[tokio::test]
    async fn test_readout_has_live_status() {
        let temp_dir = TempDir::new().unwrap();
        let (plugin, _, status, _) = plugin(&temp_dir).await;
        status.push("SIP. / Irrigation syst.");

        assert_eq!(plugin.readout().await.status, "SIP. / Irrigation syst.");
    }
}

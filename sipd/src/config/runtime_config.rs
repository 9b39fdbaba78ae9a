//! Runtime configuration management
//!
//! Combines static configuration with the two plugin records, providing
//! thread-safe access and independent save operations.

use sip_core::config::{StaticConfig, DOOR_FILE, OLED_FILE};
use sip_core::{DoorConfig, OledConfig, Result, SipError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Runtime configuration combining static config and plugin records.
///
/// Static config is read once at startup and remains immutable.
/// Plugin records can be modified through the settings pages and are saved
/// independently. Files are rewritten in place.
pub(crate) struct RuntimeConfig {
    /// Static configuration (immutable after load)
    static_config: StaticConfig,

    /// Door plugin record with independent locking
    door: RwLock<DoorConfig>,

    /// OLED plugin record with independent locking
    oled: RwLock<OledConfig>,

    /// Door record writes since load
    #[cfg(test)]
    door_saves: std::sync::atomic::AtomicUsize,
}

impl RuntimeConfig {
    /// Load all configuration from disk.
    ///
    /// If config file doesn't exist, creates with defaults.
    /// If data directory doesn't exist, creates it.
    /// If plugin records don't exist, creates them with defaults.
    pub async fn load(config_path: &Path) -> Result<Self> {
        info!("Loading configuration from: {}", config_path.display());

        let static_config = Self::load_static_config(config_path).await?;
        Self::from_static(static_config).await
    }

    /// Build runtime configuration around an already parsed static config.
    pub async fn from_static(static_config: StaticConfig) -> Result<Self> {
        Self::ensure_data_dir(&static_config.data_dir).await?;

        let door = Self::load_record(
            &static_config.data_dir.join(DOOR_FILE),
            DoorConfig::default,
            DoorConfig::to_json,
            DoorConfig::from_json,
        )
        .await?;
        let oled = Self::load_record(
            &static_config.data_dir.join(OLED_FILE),
            OledConfig::default,
            OledConfig::to_json,
            OledConfig::from_json,
        )
        .await?;

        info!(
            "Configuration loaded: door {}, oled {}",
            if door.enabled { "enabled" } else { "disabled" },
            if oled.enabled { "enabled" } else { "disabled" },
        );

        Ok(Self {
            static_config,
            door: RwLock::new(door),
            oled: RwLock::new(oled),
            #[cfg(test)]
            door_saves: Default::default(),
        })
    }

    /// Load static config from TOML file, creating with defaults if missing.
    async fn load_static_config(path: &Path) -> Result<StaticConfig> {
        if !path.exists() {
            info!(
                "Static config not found at {}. Creating with defaults.",
                path.display()
            );

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    SipError::Config(format!(
                        "Failed to create config directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }

            let config = StaticConfig::default();
            let toml_str = config
                .to_toml()
                .map_err(|e| SipError::Config(format!("Failed to serialize config: {}", e)))?;

            fs::write(path, &toml_str)
                .await
                .map_err(|e| SipError::Config(format!("Failed to write config file: {}", e)))?;

            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SipError::Config(format!("Failed to read config file: {}", e)))?;

        StaticConfig::from_toml(&content)
            .map_err(|e| SipError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Ensure data directory exists and is writable.
    async fn ensure_data_dir(data_dir: &Path) -> Result<()> {
        if !data_dir.exists() {
            info!("Creating data directory: {}", data_dir.display());
            fs::create_dir_all(data_dir).await.map_err(|e| {
                SipError::Config(format!(
                    "Failed to create data directory '{}': {}. \
                     Please create it manually or check permissions.",
                    data_dir.display(),
                    e
                ))
            })?;
        }

        let test_file = data_dir.join(".write_test");
        fs::write(&test_file, "test").await.map_err(|e| {
            SipError::Config(format!(
                "Data directory '{}' is not writable: {}",
                data_dir.display(),
                e
            ))
        })?;
        let _ = fs::remove_file(&test_file).await;

        Ok(())
    }

    /// Load a JSON plugin record, creating it with defaults if missing.
    ///
    /// A record that fails to parse is left on disk for inspection and the
    /// defaults are used for this run.
    async fn load_record<T>(
        path: &Path,
        default: fn() -> T,
        to_json: fn(&T) -> Result<String>,
        from_json: fn(&str) -> Result<T>,
    ) -> Result<T> {
        if !path.exists() {
            debug!("{} not found. Creating with defaults.", path.display());
            let data = default();
            Self::write_file(path, &to_json(&data)?).await?;
            return Ok(data);
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            SipError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        match from_json(&content) {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!(
                    "Failed to parse {}: {}. Using defaults until settings are saved.",
                    path.display(),
                    e
                );
                Ok(default())
            }
        }
    }

    async fn write_file(path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).await.map_err(|e| {
            SipError::Config(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Get the static configuration.
    pub fn static_config(&self) -> &StaticConfig {
        &self.static_config
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.static_config.data_dir
    }

    /// Path of the door record.
    pub fn door_path(&self) -> PathBuf {
        self.data_dir().join(DOOR_FILE)
    }

    /// Path of the OLED record.
    pub fn oled_path(&self) -> PathBuf {
        self.data_dir().join(OLED_FILE)
    }

    /// Snapshot of the door record.
    pub async fn door(&self) -> DoorConfig {
        self.door.read().await.clone()
    }

    /// Replace the door record in memory.
    pub async fn set_door(&self, door: DoorConfig) {
        *self.door.write().await = door;
    }

    /// Save the door record to disk.
    pub async fn save_door(&self) -> Result<()> {
        let json = self.door.read().await.to_json()?;
        Self::write_file(&self.door_path(), &json).await?;
        #[cfg(test)]
        self.door_saves
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        debug!("Door settings saved");
        Ok(())
    }

    /// Number of successful door record writes
    #[cfg(test)]
    pub fn door_saves(&self) -> usize {
        self.door_saves.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Snapshot of the OLED record.
    pub async fn oled(&self) -> OledConfig {
        self.oled.read().await.clone()
    }

    /// Replace the OLED record in memory.
    pub async fn set_oled(&self, oled: OledConfig) {
        *self.oled.write().await = oled;
    }

    /// Save the OLED record to disk.
    pub async fn save_oled(&self) -> Result<()> {
        let json = self.oled.read().await.to_json()?;
        Self::write_file(&self.oled_path(), &json).await?;
        debug!("OLED settings saved");
        Ok(())
    }
}

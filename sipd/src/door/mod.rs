//! Door plugin
//!
//! Opens a door fully or partially by pulsing one of two relays, optionally
//! samples a position sensor afterwards, and announces every actuation on the
//! signal bus.

mod controller;

pub(crate) use controller::{DoorController, RelayTiming};

use crate::bus::SignalBus;
use crate::config::RuntimeConfig;
use sip_core::{unix_now, DoorAction, DoorSettingsForm, DoorStatus, Result, Signal};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Door plugin state shared by the HTTP handlers
pub(crate) struct DoorPlugin {
    /// Held for a whole actuation or settings update
    controller: Mutex<DoorController>,
    config: Arc<RuntimeConfig>,
    bus: SignalBus,
}

impl DoorPlugin {
    pub fn new(controller: DoorController, config: Arc<RuntimeConfig>, bus: SignalBus) -> Self {
        Self {
            controller: Mutex::new(controller),
            config,
            bus,
        }
    }

    /// Configure the pins from the stored settings
    pub async fn initialize(&self) -> Result<()> {
        let door = self.config.door().await;
        self.controller.lock().await.init_pins(&door).await
    }

    /// Run one actuation to completion.
    ///
    /// Returns the recorded status, or `None` when the settings do not allow
    /// `action`.
    pub async fn open(&self, action: DoorAction) -> Result<Option<DoorStatus>> {
        let mut controller = self.controller.lock().await;
        let mut door = self.config.door().await;

        if !door.allows(action) {
            info!("Door {} skipped: disabled in settings", action);
            return Ok(None);
        }

        info!("Door {}", action);
        controller
            .pulse(action.relay(), door.relay_polarity)
            .await?;

        if action == DoorAction::SemiOpen {
            tokio::time::sleep(controller.timing().semi_open_settle).await;
        }

        // The door has moved, so the actuation is recorded even if the
        // sensor cannot be read
        let (status, sensor_error) = if door.sensor_enabled {
            match controller.read_status(door.sensor_type) {
                Ok(status) => (status, None),
                Err(e) => {
                    warn!("Door sensor read failed after {}: {}", action, e);
                    (DoorStatus::Unknown, Some(e))
                }
            }
        } else {
            (DoorStatus::Open, None)
        };

        door.last_actuated = Some(unix_now());
        door.status = status;
        self.config.set_door(door).await;

        self.bus.emit(Signal::DoorActuated { status });
        self.config.save_door().await?;

        if let Some(e) = sensor_error {
            return Err(e);
        }

        info!("Door {} complete, status {}", action, status);
        Ok(Some(status))
    }

    /// Apply the settings form, returning whether anything changed.
    ///
    /// A change re-initializes the pins once and rewrites the record once.
    /// A pin failure is logged and the new settings are still saved.
    pub async fn update_settings(&self, form: &DoorSettingsForm) -> Result<bool> {
        let mut controller = self.controller.lock().await;
        let mut door = self.config.door().await;

        if !door.apply_form(form)? {
            debug!("Door settings unchanged");
            return Ok(false);
        }

        self.config.set_door(door.clone()).await;
        if let Err(e) = controller.init_pins(&door).await {
            warn!("Door pin re-initialization failed: {}", e);
        }
        self.config.save_door().await?;

        info!("Door settings updated");
        Ok(true)
    }

    /// Return both relays to idle
    pub async fn release(&self) -> Result<()> {
        let polarity = self.config.door().await.relay_polarity;
        self.controller.lock().await.release(polarity)
    }
}

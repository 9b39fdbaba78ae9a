//! Shutdown handling for graceful daemon termination
//!
//! Returns the door relays to idle so no motor is left powered, then stops
//! the OLED reporter, which blanks the display on its way out.

use crate::door::DoorPlugin;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How long the reporter gets to notice the shutdown flag
const REPORTER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Release the hardware before the daemon exits.
///
/// # Arguments
///
/// * `door` - Door plugin whose relays are returned to idle
/// * `shutdown` - Flag observed by every hold of the OLED reporter
/// * `reporter` - Handle of the spawned OLED reporter task
pub async fn stop_plugins(
    door: &DoorPlugin,
    shutdown: &watch::Sender<bool>,
    reporter: JoinHandle<()>,
) {
    match door.release().await {
        Ok(()) => info!("Door relays released"),
        Err(e) => warn!("Failed to release door relays: {}", e),
    }

    // Fails only when the reporter already exited
    let _ = shutdown.send(true);

    match tokio::time::timeout(REPORTER_STOP_TIMEOUT, reporter).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("OLED reporter task failed: {}", e),
        Err(_) => warn!("OLED reporter did not stop within {:?}", REPORTER_STOP_TIMEOUT),
    }
}

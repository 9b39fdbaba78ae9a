//! In-process signal bus
//!
//! Plugins publish [`Signal`]s and any number of tasks subscribe. A slow
//! subscriber loses the oldest signals rather than blocking publishers.

use sip_core::Signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default number of signals buffered per subscriber
pub(crate) const DEFAULT_CAPACITY: usize = 32;

/// Publish/subscribe handle shared by the plugins and the API
#[derive(Clone)]
pub(crate) struct SignalBus {
    tx: broadcast::Sender<Signal>,
}

impl SignalBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a signal, returning how many subscribers received it.
    ///
    /// Publishing with nobody listening is not an error.
    pub fn emit(&self, signal: Signal) -> usize {
        let name = signal.name();
        match self.tx.send(signal) {
            Ok(receivers) => {
                debug!("Signal '{}' delivered to {} receiver(s)", name, receivers);
                receivers
            }
            Err(_) => {
                debug!("Signal '{}' emitted with no receivers", name);
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }

    /// Spawn a subscriber that traces every signal.
    pub fn spawn_logger(&self) -> JoinHandle<()> {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(signal) => debug!("bus: {:?}", signal),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Signal logger lagged, {} signal(s) skipped", n)
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

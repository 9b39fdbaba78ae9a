//! Background worker that drives the status display
//!
//! Cycles through the enabled panels and lets the host preempt the rotation
//! with an alarm or a "program scheduled" notice. Every hold can be cut short
//! by a signal, a settings reload, or shutdown.

use super::panels::{render, Screen};
use super::rotation::Rotation;
use super::status::StatusLog;
use crate::bus::SignalBus;
use crate::config::RuntimeConfig;
use crate::host::HostState;
use rand::Rng;
use sip_core::config::OledHardwareConfig;
use sip_core::{Panel, Result, Signal};
use sip_hardware::TextDisplay;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Display shared behind one lock
pub(crate) type SharedDisplay = Arc<Mutex<Box<dyn TextDisplay>>>;

/// Hold durations of the reporter
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReporterTiming {
    pub panel_dwell: Duration,
    pub alarm_dwell: Duration,
    pub schedule_dwell: Duration,
    pub error_backoff: Duration,
    pub startup_delay_min_secs: u64,
    pub startup_delay_max_secs: u64,
}

impl From<&OledHardwareConfig> for ReporterTiming {
    fn from(config: &OledHardwareConfig) -> Self {
        Self {
            panel_dwell: config.panel_dwell(),
            alarm_dwell: config.alarm_dwell(),
            schedule_dwell: config.schedule_dwell(),
            error_backoff: config.error_backoff(),
            startup_delay_min_secs: config.startup_delay_min_secs,
            startup_delay_max_secs: config.startup_delay_max_secs,
        }
    }
}

impl ReporterTiming {
    fn startup_delay(&self) -> Duration {
        let (min, max) = (self.startup_delay_min_secs, self.startup_delay_max_secs);
        if min >= max {
            return Duration::from_secs(min);
        }
        Duration::from_secs(rand::thread_rng().gen_range(min..=max))
    }
}

/// What the next render shows
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Alarm(String),
    ScheduleStarted,
    ScheduleRunning,
}

/// Why a hold ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Elapsed,
    Preempted,
    Reloaded,
    Shutdown,
}

/// The OLED status worker
pub(crate) struct OledReporter {
    display: SharedDisplay,
    config: Arc<RuntimeConfig>,
    host: Arc<HostState>,
    status: StatusLog,
    signals: broadcast::Receiver<Signal>,
    signals_open: bool,
    reload: Arc<Notify>,
    shutdown: watch::Receiver<bool>,
    timing: ReporterTiming,
    rotation: Rotation,
    mode: Mode,
}

impl OledReporter {
    /// Create the worker, subscribing to `bus` immediately so no signal
    /// published before the task starts is missed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        display: SharedDisplay,
        config: Arc<RuntimeConfig>,
        host: Arc<HostState>,
        status: StatusLog,
        bus: &SignalBus,
        reload: Arc<Notify>,
        shutdown: watch::Receiver<bool>,
        timing: ReporterTiming,
    ) -> Self {
        Self {
            display,
            config,
            host,
            status,
            signals: bus.subscribe(),
            signals_open: true,
            reload,
            shutdown,
            timing,
            rotation: Rotation::new(vec![Panel::Name]),
            mode: Mode::Normal,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        let delay = self.timing.startup_delay();
        debug!("OLED reporter starting in {:?}", delay);
        if self.hold(delay).await == Wake::Shutdown {
            return self.finish().await;
        }

        self.apply_settings().await;
        info!("OLED reporter active");

        loop {
            let dwell = if self.config.oled().await.enabled {
                match self.step().await {
                    Ok(dwell) => dwell,
                    Err(e) => {
                        warn!("OLED render failed: {}", e);
                        self.status
                            .push(&format!("OLED plugin encountered error: {}", e));
                        self.timing.error_backoff
                    }
                }
            } else {
                self.mode = Mode::Normal;
                self.timing.panel_dwell
            };

            if self.hold(dwell).await == Wake::Shutdown {
                break;
            }
        }

        self.finish().await;
    }

    /// Render the next screen and return how long to hold it
    async fn step(&mut self) -> Result<Duration> {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => {
                let (panel, wrapped) = self.rotation.current();
                if wrapped {
                    self.status.clear();
                }
                self.show(Screen::Panel(panel)).await?;
                self.rotation.advance();
                Ok(self.timing.panel_dwell)
            }
            Mode::Alarm(txt) => {
                self.rotation.restart();
                self.show(Screen::Alarm(txt)).await?;
                Ok(self.timing.alarm_dwell)
            }
            Mode::ScheduleStarted => {
                self.show(Screen::ScheduleStarted).await?;
                self.mode = Mode::ScheduleRunning;
                Ok(self.timing.schedule_dwell)
            }
            Mode::ScheduleRunning => {
                self.rotation.restart();
                self.show(Screen::Panel(Panel::RunningStations)).await?;
                Ok(self.timing.schedule_dwell)
            }
        }
    }

    async fn show(&mut self, screen: Screen) -> Result<()> {
        let host = self.host.snapshot().await;
        let frame = render(&screen, &host);
        self.display.lock().await.show(&frame.lines)?;
        debug!("OLED shows {:?}", frame.lines);
        if let Some(status) = frame.status {
            self.status.push(&status);
        }
        Ok(())
    }

    /// Wait for `dwell` unless something more urgent comes up
    async fn hold(&mut self, dwell: Duration) -> Wake {
        if *self.shutdown.borrow() {
            return Wake::Shutdown;
        }
        let deadline = Instant::now() + dwell;

        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => return Wake::Elapsed,
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        return Wake::Shutdown;
                    }
                }
                _ = self.reload.notified() => {
                    self.apply_settings().await;
                    return Wake::Reloaded;
                }
                received = self.signals.recv(), if self.signals_open => {
                    if let Some(wake) = self.on_signal(received).await {
                        return wake;
                    }
                }
            }
        }
    }

    async fn on_signal(&mut self, received: std::result::Result<Signal, RecvError>) -> Option<Wake> {
        let mode = match received {
            Ok(Signal::AlarmToggled { txt }) => Mode::Alarm(txt),
            Ok(Signal::StationsScheduled) => Mode::ScheduleStarted,
            Ok(_) => return None,
            Err(RecvError::Lagged(n)) => {
                warn!("OLED reporter missed {} signal(s)", n);
                return None;
            }
            Err(RecvError::Closed) => {
                self.signals_open = false;
                return None;
            }
        };

        if !self.config.oled().await.enabled {
            debug!("OLED disabled, ignoring {:?}", mode);
            return None;
        }
        self.mode = mode;
        Some(Wake::Preempted)
    }

    /// Pick up the stored settings: panel list and bus address
    async fn apply_settings(&mut self) {
        let oled = self.config.oled().await;
        self.rotation.set_panels(oled.rotation());
        if let Err(e) = self.display.lock().await.set_address(oled.address) {
            warn!("Failed to set OLED address 0x{:02x}: {}", oled.address, e);
        }
        debug!(
            "OLED settings applied: address 0x{:02x}, {} panel(s)",
            oled.address,
            self.rotation.panels().len()
        );
    }

    async fn finish(self) {
        if let Err(e) = self.display.lock().await.clear() {
            debug!("Could not clear OLED on shutdown: {}", e);
        }
        info!("OLED reporter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oled::status::STATUS_LINES;
    use sip_core::config::{HostConfig, StaticConfig};
    use sip_core::OledConfig;
    use sip_hardware::MemoryDisplay;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        config: Arc<RuntimeConfig>,
        display: MemoryDisplay,
        status: StatusLog,
        bus: SignalBus,
        reload: Arc<Notify>,
        shutdown: watch::Sender<bool>,
        handle: JoinHandle<()>,
    }

    fn timing() -> ReporterTiming {
        ReporterTiming {
            startup_delay_min_secs: 0,
            startup_delay_max_secs: 0,
            ..ReporterTiming::from(&OledHardwareConfig::default())
        }
    }

    /// Only the name and software version panels
    fn short_rotation() -> OledConfig {
        OledConfig {
            enabled: true,
            d_ip: false,
            d_port: false,
            d_cpu_temp: false,
            d_date_time: false,
            d_uptime: false,
            d_rain_sensor: false,
            d_running_stations: false,
            ..OledConfig::default()
        }
    }

    async fn start(oled: OledConfig, before_start: impl FnOnce(&MemoryDisplay)) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let static_config = StaticConfig::with_data_dir(temp_dir.path().to_path_buf());
        let config = Arc::new(RuntimeConfig::from_static(static_config).await.unwrap());
        config.set_oled(oled).await;

        let display = MemoryDisplay::new();
        before_start(&display);
        let shared: SharedDisplay = Arc::new(Mutex::new(Box::new(display.clone())));
        let host = Arc::new(HostState::new(HostConfig::default(), 8080));
        let status = StatusLog::new();
        let bus = SignalBus::default();
        let reload = Arc::new(Notify::new());
        let (shutdown, shutdown_rx) = watch::channel(false);

        let handle = OledReporter::new(
            shared,
            config.clone(),
            host,
            status.clone(),
            &bus,
            reload.clone(),
            shutdown_rx,
            timing(),
        )
        .spawn();

        Fixture {
            _temp_dir: temp_dir,
            config,
            display,
            status,
            bus,
            reload,
            shutdown,
            handle,
        }
    }

    async fn sleep_secs(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotation_wraps_and_clears_status() {
        let f = start(short_rotation(), |_| {}).await;

        sleep_secs(5).await;
        assert_eq!(f.display.headlines(), vec!["Name:", "Software SIP:"]);
        assert!(f.status.get().starts_with("SIP. / Irrigation syst.\nSoftware SIP: / "));

        sleep_secs(4).await;
        assert_eq!(
            f.display.headlines(),
            vec!["Name:", "Software SIP:", "Name:"]
        );
        assert_eq!(f.status.get(), "SIP. / Irrigation syst.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panels_held_four_seconds() {
        let f = start(short_rotation(), |_| {}).await;

        sleep_secs(9).await;
        let frames = f.display.frames();
        assert_eq!(frames[1].at - frames[0].at, Duration::from_secs(4));
        assert_eq!(frames[2].at - frames[1].at, Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_alarm_preempts_and_restarts_rotation() {
        let f = start(OledConfig {
            enabled: true,
            ..OledConfig::default()
        }, |_| {})
        .await;

        sleep_secs(5).await;
        assert_eq!(f.display.headlines(), vec!["Name:", "Software SIP:"]);

        f.bus.emit(Signal::AlarmToggled {
            txt: "Rain detected".to_string(),
        });
        sleep_secs(1).await;
        let frames = f.display.frames();
        assert_eq!(frames[2].lines[..2], ["ALARM!:", "Rain detected"]);

        // Held 20 s, then back to the first panel
        sleep_secs(18).await;
        assert_eq!(f.display.frames().len(), 3);
        sleep_secs(2).await;
        assert_eq!(f.display.headlines()[3], "Name:");
        let frames = f.display.frames();
        assert_eq!(frames[3].at - frames[2].at, Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_shows_both_screens() {
        let f = start(short_rotation(), |_| {}).await;

        sleep_secs(1).await;
        f.bus.emit(Signal::StationsScheduled);
        sleep_secs(11).await;

        assert_eq!(
            f.display.headlines(),
            vec!["Name:", "New program:", "Running Stations:", "Name:"]
        );
        assert!(f.status.get().contains("New Program Running / "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_signals_ignored_while_disabled() {
        let f = start(OledConfig::default(), |_| {}).await;

        f.bus.emit(Signal::AlarmToggled {
            txt: "Frost".to_string(),
        });
        sleep_secs(30).await;
        assert!(f.display.frames().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_failure_backs_off() {
        let f = start(short_rotation(), |display| display.fail_next("bus error")).await;

        sleep_secs(59).await;
        assert!(f.display.frames().is_empty());
        assert!(f
            .status
            .get()
            .starts_with("OLED plugin encountered error: "));

        sleep_secs(2).await;
        assert_eq!(f.display.headlines(), vec!["Name:"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_failures_keep_status_bounded() {
        let f = start(short_rotation(), |display| display.fail_always("unplugged")).await;

        // One failed render per backoff, stop halfway through one
        sleep_secs(60 * (STATUS_LINES as u64 + 10) + 30).await;
        let status = f.status.get();
        assert_eq!(status.lines().count(), STATUS_LINES);
        assert!(status
            .lines()
            .all(|line| line.starts_with("OLED plugin encountered error: ")));

        f.display.recover();
        sleep_secs(31).await;
        assert_eq!(f.display.headlines(), vec!["Name:"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_cuts_hold_short() {
        let f = start(OledConfig {
            enabled: true,
            ..OledConfig::default()
        }, |_| {})
        .await;

        sleep_secs(1).await;
        let mut oled = f.config.oled().await;
        oled.address = 0x3D;
        oled.d_sw_version = false;
        f.config.set_oled(oled).await;
        f.reload.notify_one();
        sleep_secs(1).await;

        let frames = f.display.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].lines[0], "My IP is:");
        assert_eq!(frames[1].address, 0x3D);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_clears_display() {
        let f = start(short_rotation(), |_| {}).await;
        sleep_secs(1).await;

        f.shutdown.send(true).unwrap();
        f.handle.await.unwrap();

        let frames = f.display.frames();
        assert!(frames.last().unwrap().lines.is_empty());
    }
}

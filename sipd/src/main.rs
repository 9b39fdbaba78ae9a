//! SIP plugin daemon
//!
//! Runs the door relay and OLED status plugins of a SIP irrigation
//! controller behind one HTTP server.
//!
//! # Hardware
//!
//! The door plugin drives two relays and reads an optional position sensor
//! over GPIO. The OLED plugin rotates status panels on an SSD1306 display on
//! the I2C bus. With `--mock` both are simulated in memory. When the real
//! hardware cannot be opened the daemon keeps running without it and logs
//! every failed call.

mod api;
mod bus;
mod config;
mod door;
mod host;
mod oled;
mod shutdown;

use anyhow::Result;
use api::AppState;
use bus::SignalBus;
use clap::Parser;
use config::RuntimeConfig;
use door::{DoorController, DoorPlugin, RelayTiming};
use host::HostState;
use oled::{OledPlugin, OledReporter, ReporterTiming, SharedDisplay, StatusLog};
use sip_core::config::default_config_path;
use sip_hardware::{
    GpioBackend, MemoryDisplay, MockGpio, RppalGpio, Ssd1306Display, TextDisplay, Unavailable,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{watch, Mutex, Notify};
use tracing::{error, info, warn};

/// SIP door and OLED plugin daemon
#[derive(Parser, Debug)]
#[command(name = "sipd")]
#[command(version, about = "SIP door and OLED plugin daemon", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable mock mode (in-memory GPIO and display)
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    info!("SIP plugin daemon starting...");

    // Determine config path: CLI flag > env var > default
    let config_path = args.config.unwrap_or_else(|| {
        std::env::var("SIP_PLUGINS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path())
    });

    // Step 1: Load and validate configuration
    let runtime_config = Arc::new(RuntimeConfig::load(&config_path).await?);
    info!("Configuration loaded successfully");
    info!("  Static config: {}", config_path.display());
    info!("  Data directory: {}", runtime_config.data_dir().display());

    let static_config = runtime_config.static_config();
    let errors = config::validate(static_config);
    if !errors.is_empty() {
        for e in &errors {
            error!("Configuration validation failed: {}", e);
        }
        std::process::exit(1);
    }
    let pins = config::resolve_door_pins(&static_config.door)?;
    info!(
        "Door pins: relays GPIO{}/GPIO{}, sensor GPIO{}",
        pins.relays[0], pins.relays[1], pins.sensor
    );

    let port = args.port.unwrap_or(static_config.server.port);
    let bind_addr = format!("{}:{}", args.bind, port);

    // Step 2: Open the hardware
    let gpio = open_gpio(args.mock);
    let oled_address = runtime_config.oled().await.address;
    let display = open_display(args.mock, static_config.oled.i2c_bus, oled_address);

    // Step 3: Shared plumbing
    let bus = SignalBus::default();
    bus.spawn_logger();
    let host = Arc::new(HostState::new(static_config.host.clone(), port));
    let status = StatusLog::new();
    let reload = Arc::new(Notify::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Step 4: Plugins
    let controller = DoorController::new(gpio, pins, RelayTiming::from(&static_config.door));
    let door = DoorPlugin::new(controller, runtime_config.clone(), bus.clone());
    if let Err(e) = door.initialize().await {
        warn!("Door pins could not be initialized, continuing: {}", e);
    }

    let reporter = OledReporter::new(
        display,
        runtime_config.clone(),
        host.clone(),
        status.clone(),
        &bus,
        reload.clone(),
        shutdown_rx,
        ReporterTiming::from(&static_config.oled),
    )
    .spawn();
    let oled = OledPlugin::new(runtime_config.clone(), status, reload);

    let app_state = AppState::new(runtime_config.clone(), door, oled, host, bus, args.mock);
    let door_for_shutdown = app_state.door.clone();

    let app = api::create_router(app_state);

    // Start server
    info!("Starting server on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("SIP plugin daemon listening on {}", bind_addr);
    info!("Server ready!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown::stop_plugins(&door_for_shutdown, &shutdown_tx, reporter).await;

    info!("Server shutdown complete");
    Ok(())
}

/// Open the relay GPIO, falling back to a backend that reports every call as failed
fn open_gpio(mock: bool) -> Box<dyn GpioBackend> {
    if mock {
        info!("Mock mode: simulated GPIO");
        return Box::new(MockGpio::new());
    }

    match RppalGpio::open() {
        Ok(gpio) => Box::new(gpio),
        Err(e) => {
            warn!("GPIO unavailable, door plugin runs without relays: {}", e);
            Box::new(Unavailable::new(e.to_string()))
        }
    }
}

/// Open the OLED display on `/dev/i2c-<bus>`
fn open_display(mock: bool, bus: u8, address: u8) -> SharedDisplay {
    let display: Box<dyn TextDisplay> = if mock {
        info!("Mock mode: in-memory display");
        Box::new(MemoryDisplay::new())
    } else {
        match Ssd1306Display::open(bus, address) {
            Ok(display) => Box::new(display),
            Err(e) => {
                warn!("OLED unavailable, status panels are not shown: {}", e);
                Box::new(Unavailable::new(e.to_string()))
            }
        }
    };
    Arc::new(Mutex::new(display))
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

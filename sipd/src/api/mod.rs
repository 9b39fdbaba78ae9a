//! API module for the plugin daemon
//!
//! Serves the plugin settings pages and actions, the JSON readouts, and the
//! host-facing signal and state endpoints.

pub(crate) mod handlers;
mod pages;

use crate::bus::SignalBus;
use crate::config::RuntimeConfig;
use crate::door::DoorPlugin;
use crate::host::HostState;
use crate::oled::OledPlugin;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across all handlers
#[derive(Clone)]
pub(crate) struct AppState {
    /// Runtime configuration (static config + plugin records)
    pub config: Arc<RuntimeConfig>,
    /// Door relay plugin
    pub door: Arc<DoorPlugin>,
    /// OLED status plugin
    pub oled: Arc<OledPlugin>,
    /// Host state read by the panels
    pub host: Arc<HostState>,
    /// Signal bus shared with the plugins
    pub bus: SignalBus,
    /// Whether GPIO and display are simulated
    pub mock_hardware: bool,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Arc<RuntimeConfig>,
        door: DoorPlugin,
        oled: OledPlugin,
        host: Arc<HostState>,
        bus: SignalBus,
        mock_hardware: bool,
    ) -> Self {
        Self {
            config,
            door: Arc::new(door),
            oled: Arc::new(oled),
            host,
            bus,
            mock_hardware,
            start_time: Instant::now(),
        }
    }
}

/// Create the main router with all endpoints
pub(crate) fn create_router(state: AppState) -> Router {
    info!("Setting up API router...");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(64 * 1024));

    Router::new()
        // Plugin menu
        .route("/", get(handlers::info::menu))
        // Door plugin
        .route("/door", get(handlers::door::settings_page))
        .route("/dooru", get(handlers::door::update_settings))
        .route("/doorf", get(handlers::door::full_open))
        .route("/doors", get(handlers::door::semi_open))
        // OLED plugin
        .route("/oled", get(handlers::oled::settings_page))
        .route("/oledj", get(handlers::oled::settings_json))
        .route("/oleda", get(handlers::oled::update_settings))
        // Host-facing endpoints
        .route("/api/v0/info", get(handlers::info::get_info))
        .route("/api/v0/signal/alarm", get(handlers::signals::alarm))
        .route(
            "/api/v0/signal/stations_scheduled",
            get(handlers::signals::stations_scheduled),
        )
        .route(
            "/api/v0/host",
            get(handlers::host::get_host).post(handlers::host::update_host),
        )
        .layer(middleware_stack)
        .with_state(state)
}

/// Error handling utilities
pub(crate) mod error {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use sip_core::api::ApiResponse;
    use sip_core::SipError;

    use tracing::error;

    /// Custom error type for API responses
    #[derive(Debug)]
    pub struct ApiError {
        pub status_code: StatusCode,
        pub message: String,
    }

    impl ApiError {
        /// Create a new API error
        pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
            Self {
                status_code,
                message: message.into(),
            }
        }

        /// Create a bad request error
        pub fn bad_request(message: impl Into<String>) -> Self {
            Self::new(StatusCode::BAD_REQUEST, message)
        }

        /// Create an internal server error
        pub fn internal_error(message: impl Into<String>) -> Self {
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
        }

        /// Create a service unavailable error (for hardware issues)
        pub fn service_unavailable(message: impl Into<String>) -> Self {
            Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
        }
    }

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            error!("API Error {}: {}", self.status_code, self.message);

            let response: ApiResponse<()> = ApiResponse::error(self.message);

            (self.status_code, Json(response)).into_response()
        }
    }

    /// Convert SipError to ApiError
    impl From<SipError> for ApiError {
        fn from(err: SipError) -> Self {
            match err {
                SipError::InvalidInput(msg) => Self::bad_request(msg),
                SipError::InvalidHeaderPin(_) => Self::bad_request(err.to_string()),
                SipError::Hardware(_) | SipError::Gpio { .. } | SipError::Display(_) => {
                    Self::service_unavailable(err.to_string())
                }
                _ => Self::internal_error(err.to_string()),
            }
        }
    }
}

/// Helper macros for common responses
#[macro_export]
macro_rules! api_ok {
    ($data:expr) => {
        Ok(axum::Json(sip_core::api::ApiResponse::success($data)))
    };
}

#[macro_export]
macro_rules! api_fail {
    ($message:expr) => {
        Err($crate::api::error::ApiError::bad_request($message))
    };
}

//! Signals raised by the irrigation host

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::{api_fail, api_ok};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sip_core::api::{ApiResponse, SignalResponse};
use sip_core::Signal;
use tracing::debug;

/// Query parameters for the alarm endpoint.
#[derive(Deserialize)]
pub(crate) struct AlarmQuery {
    /// Alarm message shown on the display
    pub txt: Option<String>,
}

fn publish(state: &AppState, signal: Signal) -> SignalResponse {
    let name = signal.name().to_string();
    let receivers = state.bus.emit(signal);
    SignalResponse {
        signal: name,
        receivers,
    }
}

/// Publish `alarm_toggled`.
///
/// # Endpoint
///
/// `GET /api/v0/signal/alarm?txt=Rain%20detected`
pub(crate) async fn alarm(
    State(state): State<AppState>,
    Query(params): Query<AlarmQuery>,
) -> Result<Json<ApiResponse<SignalResponse>>, ApiError> {
    debug!("Request: GET /api/v0/signal/alarm");

    let Some(txt) = params.txt else {
        return api_fail!("Missing 'txt' parameter");
    };

    api_ok!(publish(&state, Signal::AlarmToggled { txt }))
}

/// Publish `stations_scheduled`.
///
/// # Endpoint
///
/// `GET /api/v0/signal/stations_scheduled`
pub(crate) async fn stations_scheduled(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SignalResponse>>, ApiError> {
    debug!("Request: GET /api/v0/signal/stations_scheduled");
    api_ok!(publish(&state, Signal::StationsScheduled))
}

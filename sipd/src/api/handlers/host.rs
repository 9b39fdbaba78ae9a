//! Modelled irrigation-host state

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::api_ok;
use axum::{extract::State, Json};
use sip_core::api::{ApiResponse, HostStatus, HostUpdateRequest};
use tracing::debug;

/// Current rain sensor, program and station flags.
///
/// # Endpoint
///
/// `GET /api/v0/host`
pub(crate) async fn get_host(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HostStatus>>, ApiError> {
    debug!("Request: GET /api/v0/host");
    api_ok!(state.host.status().await)
}

/// Partially update the host state. Absent fields are left unchanged.
///
/// # Endpoint
///
/// `POST /api/v0/host`
///
/// # Request Body
///
/// ```json
/// {"rain_sensor": true, "program": {"scheduled": 2}, "stations": [true, false]}
/// ```
pub(crate) async fn update_host(
    State(state): State<AppState>,
    Json(update): Json<HostUpdateRequest>,
) -> Result<Json<ApiResponse<HostStatus>>, ApiError> {
    debug!("Request: POST /api/v0/host {:?}", update);
    api_ok!(state.host.update(update).await)
}

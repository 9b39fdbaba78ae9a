//! OLED plugin pages and settings

use crate::api::error::ApiError;
use crate::api::{pages, AppState};
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Json,
};
use sip_core::OledConfig;
use std::collections::HashMap;
use tracing::debug;

/// OLED settings page, showing the live status text.
///
/// # Endpoint
///
/// `GET /oled`
pub(crate) async fn settings_page(State(state): State<AppState>) -> Html<String> {
    debug!("Request: GET /oled");
    Html(pages::oled_settings(&state.oled.readout().await))
}

/// OLED settings and live status in the `oled_adj.json` shape.
///
/// # Endpoint
///
/// `GET /oledj`
pub(crate) async fn settings_json(State(state): State<AppState>) -> Json<OledConfig> {
    debug!("Request: GET /oledj");
    Json(state.oled.readout().await)
}

/// Save the OLED settings form and wake the reporter.
///
/// # Endpoint
///
/// `GET /oleda?use_oled=on&address=0x3c&d_ip=on`
///
/// # Behavior
///
/// - Unticked panel switches are absent and read as `off`
/// - An absent address keeps the current one
/// - Success redirects to `/`
/// - Invalid values do not redirect: the response is 400 with a JSON
///   `{"status": "error", "error": ...}` body and nothing is changed
pub(crate) async fn update_settings(
    State(state): State<AppState>,
    Query(form): Query<HashMap<String, String>>,
) -> Result<Redirect, ApiError> {
    debug!("Request: GET /oleda {:?}", form);

    state.oled.update_settings(&form).await?;
    Ok(Redirect::to("/"))
}

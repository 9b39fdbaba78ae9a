//! Plugin menu and daemon information

use crate::api::error::ApiError;
use crate::api::{pages, AppState};
use crate::api_ok;
use axum::{extract::State, response::Html, Json};
use sip_core::api::{ApiResponse, InfoResponse, MenuEntry};
use tracing::debug;

/// Menu entries registered by the plugins
pub(crate) fn plugin_menu() -> Vec<MenuEntry> {
    vec![
        MenuEntry::new("Door control", "/door"),
        MenuEntry::new("OLED Settings", "/oled"),
    ]
}

/// Plugin menu page.
///
/// # Endpoint
///
/// `GET /`
pub(crate) async fn menu() -> Html<String> {
    debug!("Request: GET /");
    Html(pages::menu(&plugin_menu()))
}

/// Daemon version, uptime and hardware mode.
///
/// # Endpoint
///
/// `GET /api/v0/info`
pub(crate) async fn get_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<InfoResponse>>, ApiError> {
    debug!("Request: GET /api/v0/info");

    api_ok!(InfoResponse {
        version: state.config.static_config().host.version.clone(),
        uptime: state.start_time.elapsed().as_secs(),
        mock_hardware: state.mock_hardware,
        plugins: plugin_menu(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_string, create_test_app};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_menu_lists_plugins() {
        let app = create_test_app().await;

        let response = app
            .router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response.into_body()).await;
        assert!(body.contains("<a href=\"/door\">Door control</a>"));
        assert!(body.contains("<a href=\"/oled\">OLED Settings</a>"));
    }

    #[tokio::test]
    async fn test_info() {
        let app = create_test_app().await;

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/v0/info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response.into_body()).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["mock_hardware"], true);
        assert_eq!(json["data"]["plugins"].as_array().unwrap().len(), 2);
    }
}

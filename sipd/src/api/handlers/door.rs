//! Door plugin pages and actions

use crate::api::error::ApiError;
use crate::api::{pages, AppState};
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use sip_core::{DoorAction, DoorSettingsForm};
use tracing::{debug, error, info};

/// Door settings page.
///
/// # Endpoint
///
/// `GET /door`
pub(crate) async fn settings_page(State(state): State<AppState>) -> Html<String> {
    debug!("Request: GET /door");
    Html(pages::door_settings(&state.config.door().await))
}

/// Save the door settings form.
///
/// Re-initializes the pins and rewrites `door.json` only when a field
/// changed.
///
/// # Endpoint
///
/// `GET /dooru?enabled=on&o_full=on&sens_t=NO&active=low`
///
/// # Behavior
///
/// - Unticked checkboxes are absent from the query and read as `off`
/// - Absent selects keep their current value
/// - Success redirects to `/`
/// - Invalid values do not redirect: the response is 400 with a JSON
///   `{"status": "error", "error": ...}` body and nothing is changed
pub(crate) async fn update_settings(
    State(state): State<AppState>,
    Query(form): Query<DoorSettingsForm>,
) -> Result<Redirect, ApiError> {
    debug!("Request: GET /dooru {:?}", form);

    state.door.update_settings(&form).await?;
    Ok(Redirect::to("/"))
}

/// Open the door fully.
///
/// # Endpoint
///
/// `GET /doorf`
pub(crate) async fn full_open(State(state): State<AppState>) -> Redirect {
    debug!("Request: GET /doorf");
    actuate(&state, DoorAction::FullOpen).await;
    Redirect::to("/door")
}

/// Open the door partially.
///
/// # Endpoint
///
/// `GET /doors`
pub(crate) async fn semi_open(State(state): State<AppState>) -> Redirect {
    debug!("Request: GET /doors");
    actuate(&state, DoorAction::SemiOpen).await;
    Redirect::to("/door")
}

/// Run an actuation on its own task so a dropped request cannot leave a
/// relay energized. Failures are logged; the client is redirected either way.
async fn actuate(state: &AppState, action: DoorAction) {
    let door = state.door.clone();
    let task = tokio::spawn(async move { door.open(action).await });

    match task.await {
        Ok(Ok(Some(status))) => info!("Door {} recorded status {}", action, status),
        Ok(Ok(None)) => {}
        Ok(Err(e)) => error!("Door {} failed: {}", action, e),
        Err(e) => error!("Door {} task failed: {}", action, e),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_string, create_test_app};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use sip_core::{DoorConfig, DoorStatus, Level, RelayPolarity};
    use tower::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_settings_page() {
        let app = create_test_app().await;

        let response = app.router.oneshot(get("/door")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response.into_body()).await;
        assert!(body.contains("<form action=\"/dooru\""));
        assert!(body.contains("name=\"o_full\" value=\"on\" checked"));
    }

    #[tokio::test]
    async fn test_update_redirects_to_menu() {
        let app = create_test_app().await;

        let response = app
            .router
            .oneshot(get("/dooru?enabled=on&o_full=on&o_semi=on&sens_t=NC&active=high"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let door = app.state.config.door().await;
        assert!(door.enabled);
        assert!(door.open_semi);
        assert!(!door.sensor_enabled);
        assert_eq!(door.relay_polarity, RelayPolarity::ActiveHigh);
        assert_eq!(app.gpio.output_level(20), Some(Level::Low));
    }

    #[tokio::test]
    async fn test_update_rejects_bad_values() {
        let app = create_test_app().await;

        let response = app
            .router
            .oneshot(get("/dooru?enabled=on&active=sideways"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::LOCATION).is_none());
        let body = body_string(response.into_body()).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["error"].as_str().unwrap().contains("sideways"));
        assert_eq!(app.state.config.door().await, DoorConfig::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_open_redirects_to_door_page() {
        let app = create_test_app().await;
        app.router
            .clone()
            .oneshot(get("/dooru?enabled=on&o_full=on"))
            .await
            .unwrap();

        let response = app.router.oneshot(get("/doorf")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/door");

        let door = app.state.config.door().await;
        assert_eq!(door.status, DoorStatus::Open);
        assert!(door.last_actuated.is_some());
        assert_eq!(app.gpio.output_level(20), Some(Level::High));
    }

    #[tokio::test]
    async fn test_disabled_semi_open_still_redirects() {
        let app = create_test_app().await;

        let response = app.router.oneshot(get("/doors")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/door");
        assert!(app.state.config.door().await.last_actuated.is_none());
    }
}

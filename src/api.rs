use crate::{
    error::AppError,
    location::controller::{ControllerState, MockLocationController, StatsSnapshot},
    schedule::window::{is_active, ScheduleWindow},
    time::TimeProvider,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct AppState {
    pub controller: Arc<MockLocationController>,
    pub window: ScheduleWindow,
    pub time_provider: Arc<dyn TimeProvider>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusResponse {
    pub state: ControllerState,
    pub scheduled_active: bool,
    pub schedule: String,
    pub latitude: f64,
    pub longitude: f64,
    pub stats: StatsSnapshot,
}

impl StatusResponse {
    fn new(app_state: &AppState) -> Self {
        let coordinate = app_state.controller.coordinate();
        Self {
            state: app_state.controller.state(),
            scheduled_active: is_active(&app_state.window, app_state.time_provider.minute_of_day()).unwrap_or(false),
            schedule: app_state.window.to_string(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            stats: app_state.controller.stats(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn get_state(State(app_state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse::new(&app_state))
}

pub async fn start(State(app_state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, AppError> {
    info!("Start requested over HTTP.");
    app_state.controller.start().await?;
    Ok(Json(StatusResponse::new(&app_state)))
}

pub async fn stop(State(app_state): State<Arc<AppState>>) -> Json<StatusResponse> {
    info!("Stop requested over HTTP.");
    app_state.controller.stop().await;
    Json(StatusResponse::new(&app_state))
}

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/start", post(start))
        .route("/stop", post(stop))
        .with_state(app_state)
}

use crate::monitor::{MonitorStatus, SharedMonitorStatus};
use axum::{extract::State, response::Json, routing::get, Router};
use std::sync::Arc;

/// State for the health endpoint
#[derive(Clone)]
pub struct HealthAppState {
    pub monitor_status: SharedMonitorStatus,
}

pub fn create_health_router(state: HealthAppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .with_state(Arc::new(state))
}

/// GET /health - change monitor status
async fn get_health(State(state): State<Arc<HealthAppState>>) -> Json<MonitorStatus> {
    Json(state.monitor_status.lock().await.clone())
}

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::engine::Monitor;
use crate::models::{Target, TargetState};
use crate::registry::RegistryError;

/// Inbound shape for add/remove, matching the persisted schema's field
/// names. Whitespace on description and ip is trimmed before it reaches
/// the registry.
#[derive(Debug, Deserialize)]
pub struct TargetForm {
    #[serde(default)]
    pub description: String,
    pub ip: String,
    pub port: u16,
}

impl TargetForm {
    fn into_target(self) -> Target {
        Target::new(self.description.trim(), self.ip.trim(), self.port)
    }
}

#[derive(Debug, Serialize)]
pub struct TargetRow {
    pub description: String,
    pub ip: String,
    pub port: u16,
    pub state: TargetState,
    pub last_checked: Option<DateTime<Utc>>,
}

pub struct ApiError(RegistryError);

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            RegistryError::EmptyHost | RegistryError::InvalidPort => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RegistryError::Duplicate(_) => StatusCode::CONFLICT,
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

pub async fn list_targets(State(monitor): State<Arc<Monitor>>) -> Json<Vec<TargetRow>> {
    let rows = monitor
        .snapshot()
        .await
        .into_iter()
        .map(|(target, entry)| TargetRow {
            description: target.label,
            ip: target.host,
            port: target.port,
            state: entry.state,
            last_checked: entry.last_checked,
        })
        .collect();
    Json(rows)
}

pub async fn add_target(
    State(monitor): State<Arc<Monitor>>,
    Json(form): Json<TargetForm>,
) -> Result<StatusCode, ApiError> {
    monitor.add_target(form.into_target()).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_target(
    State(monitor): State<Arc<Monitor>>,
    Json(form): Json<TargetForm>,
) -> Result<StatusCode, ApiError> {
    monitor.remove_target(&form.into_target()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_now(State(monitor): State<Arc<Monitor>>) -> StatusCode {
    monitor.spawn_cycle();
    StatusCode::ACCEPTED
}

pub fn create_router(monitor: Arc<Monitor>) -> Router {
    Router::new()
        .route(
            "/api/targets",
            get(list_targets).post(add_target).delete(remove_target),
        )
        .route("/api/check", post(check_now))
        .with_state(monitor)
}

pub async fn start_server(port: u16, monitor: Arc<Monitor>) {
    let app = create_router(monitor);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("API listening on http://localhost:{}", addr.port());
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind API port");
    axum::serve(listener, app).await.unwrap();
}

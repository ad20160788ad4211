use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::warn;

use crate::AppState;

#[utoipa::path(
    get,
    path = "/_health",
    tag = "health",
    responses((status = 200, description = "Healthy"), (status = 503, description = "Unhealthy"))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let database = match state.db.ping().await {
        Ok(()) => "Healthy",
        Err(err) => {
            warn!(error = %err, "database health check failed");
            "Unhealthy"
        },
    };

    let status =
        if database == "Healthy" { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(json!({ "status": database, "checks": { "database": database } })))
}

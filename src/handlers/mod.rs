// Two route tiers: public (no auth) and protected (JWT auth).
pub mod protected;
pub mod public;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

use crate::database;
use crate::services::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "attend-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match database::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
            })),
        ),
        Err(err) => {
            tracing::warn!("health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "unreachable",
                })),
            )
        }
    }
}

/// GET /api/v1/info - API description for discovery
pub async fn info() -> Json<Value> {
    Json(json!({
        "name": "attend-api",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "School attendance and classroom management API",
    }))
}

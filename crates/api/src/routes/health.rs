//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: u64,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let start = std::time::Instant::now();
    persistence::db::ping(&state.pool).await.map_err(|e| {
        tracing::error!(error = %e, "Health check failed to reach the database");
        ApiError::ServiceUnavailable("Database unavailable".to_string())
    })?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            connected: true,
            latency_ms: start.elapsed().as_millis() as u64,
        },
    }))
}

/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse { status: "alive" })
}

/// GET /api/health/ready
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    persistence::db::ping(&state.pool)
        .await
        .map_err(|_| ApiError::ServiceUnavailable("Database unavailable".to_string()))?;
    Ok(Json(StatusResponse { status: "ready" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_live() {
        let Json(body) = live().await;
        assert_eq!(body.status, "alive");
    }

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_value(HealthResponse {
            status: "healthy",
            version: "0.3.0",
            database: DatabaseHealth {
                connected: true,
                latency_ms: 3,
            },
        })
        .unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"]["connected"], true);
        assert_eq!(json["database"]["latency_ms"], 3);
    }
}

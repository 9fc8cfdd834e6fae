use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde_json::json;

use crate::models::{AppState, StatusResponse};

/// Health check: row count plus the singleton refresh timestamp, which is
/// null until the first refresh has run.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let total = state.countries.count().await;
    let last = state.status.last_refreshed().await;
    match (total, last) {
        (Ok(total_countries), Ok(last_refreshed_at)) => (
            StatusCode::OK,
            Json(StatusResponse {
                total_countries,
                last_refreshed_at,
            }),
        )
            .into_response(),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("health check failed: {e:?}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "message": "Service is unavailable" })),
            )
                .into_response()
        }
    }
}

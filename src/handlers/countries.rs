use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use http::{header, StatusCode};
use serde_json::json;
use validator::Validate;

use crate::models::{AppState, CountryQuery, NewCountry, RefreshResponse, UpdateCountry};
use crate::{summary, Result};

pub async fn refresh(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let processed = state.refresher.refresh().await?;
    Ok((StatusCode::OK, Json(RefreshResponse::new(processed))))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> Result<impl IntoResponse> {
    let countries = state.countries.list(&query).await?;
    Ok((StatusCode::OK, Json(countries)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let country = state.countries.get(&name).await?;
    Ok((StatusCode::OK, Json(country)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewCountry>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let country = state.countries.insert(&payload).await?;
    Ok((StatusCode::CREATED, Json(country)))
}

pub async fn update_one(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<UpdateCountry>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let country = state.countries.update(&name, &payload).await?;
    Ok((StatusCode::OK, Json(country)))
}

pub async fn delete_one(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    state.countries.delete(&name).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Country deleted successfully" })),
    ))
}

/// Serves whatever artifact the last refresh left in the cache directory.
pub async fn image(State(state): State<AppState>) -> impl IntoResponse {
    let path = state.cache_dir.join(summary::SUMMARY_FILE);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/svg+xml")], bytes).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Summary image not found" })),
        )
            .into_response(),
    }
}

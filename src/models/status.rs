use chrono::{DateTime, Utc};
use serde::Serialize;

/// GET /status body.
#[derive(Serialize, Debug)]
pub struct StatusResponse {
    pub total_countries: i64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// POST /countries/refresh success body.
#[derive(Serialize, Debug)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub countries_processed: usize,
}

impl RefreshResponse {
    pub fn new(countries_processed: usize) -> Self {
        Self {
            status: "success",
            message: "Countries cache refreshed successfully.",
            countries_processed,
        }
    }
}

//! API endpoints.

mod auth;
mod bookings;
mod places;
mod reviews;

use axum::{Json, Router, routing::get};
use serde_json::json;

use crate::middleware::AppState;

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "time": chrono::Utc::now().to_rfc3339() }))
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router())
        .nest("/places", places::router())
        .nest("/bookings", bookings::router())
        .nest("/reviews", reviews::router())
}

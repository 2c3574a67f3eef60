//! Review endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use templatehub_common::AppResult;
use templatehub_core::{CreateReviewInput, ReviewView};
use templatehub_db::entities::Role;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Review creation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub place_id: String,
    pub rating: i32,
    pub comment: String,
}

/// Create a review for a purchased listing.
async fn create_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> AppResult<ApiResponse<ReviewView>> {
    user.require_role(Role::Visitor)?;

    let input = CreateReviewInput {
        listing_id: req.place_id,
        rating: req.rating,
        comment: req.comment,
    };

    let review = state.review_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(review))
}

/// Public reviews of a listing, newest first.
async fn reviews_for_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ReviewView>>> {
    let reviews = state.review_service.list_for_listing(&place_id).await?;
    Ok(ApiResponse::ok(reviews))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/place/{place_id}", get(reviews_for_place))
}

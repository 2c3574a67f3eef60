//! Catalog endpoints for template listings.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use templatehub_common::{AppError, AppResult};
use templatehub_core::{
    CreateListingInput, ImageUpload, ListingDetail, ListingSummary, OwnedListing, StoredImage,
};
use templatehub_db::{entities::Role, repositories::ListingFilter};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Catalog list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Substring match on the category label.
    pub category: Option<String>,
    pub max_price: Option<Decimal>,
}

/// Listing create/update payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub delivery_url: Option<String>,
}

impl From<PlaceRequest> for CreateListingInput {
    fn from(req: PlaceRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            category: req.category,
            price: req.price,
            image_url: req.image_url,
            delivery_url: req.delivery_url,
        }
    }
}

/// Public catalog list with optional filters.
async fn list_places(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<ListingSummary>>> {
    let filter = ListingFilter {
        category: query.category.filter(|c| !c.trim().is_empty()),
        max_price: query.max_price,
    };

    let listings = state.catalog_service.list(&filter).await?;
    Ok(ApiResponse::ok(listings))
}

/// Public listing detail. The delivery link only appears for the owner.
async fn get_place(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ListingDetail>> {
    let requester = user.as_ref().map(|u| (u.id.as_str(), u.role));
    let detail = state.catalog_service.get(&id, requester).await?;
    Ok(ApiResponse::ok(detail))
}

/// The caller's own listings.
async fn my_places(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OwnedListing>>> {
    user.require_role(Role::Owner)?;

    let listings = state.catalog_service.my_listings(&user.id).await?;
    Ok(ApiResponse::ok(listings))
}

/// Create a listing.
async fn create_place(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PlaceRequest>,
) -> AppResult<ApiResponse<OwnedListing>> {
    user.require_role(Role::Owner)?;

    let listing = state.catalog_service.create(&user.id, req.into()).await?;
    Ok(ApiResponse::ok(listing.into()))
}

/// Update a listing the caller owns.
async fn update_place(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PlaceRequest>,
) -> AppResult<ApiResponse<OwnedListing>> {
    user.require_role(Role::Owner)?;

    let listing = state
        .catalog_service
        .update(&user.id, &id, req.into())
        .await?;
    Ok(ApiResponse::ok(listing.into()))
}

/// Upload images to a listing the caller owns.
async fn upload_images(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<Vec<StoredImage>>> {
    user.require_role(Role::Owner)?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        // Only file fields carry a filename; skip any stray form values
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
            .to_vec();

        files.push(ImageUpload {
            file_name,
            content_type,
            data,
        });
    }

    let saved = state.media_service.upload_images(&user.id, &id, files).await?;
    Ok(ApiResponse::ok(saved))
}

/// Delete one image from a listing the caller owns.
async fn delete_image(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    user.require_role(Role::Owner)?;

    state
        .media_service
        .delete_image(&user.id, &id, &image_id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_places).post(create_place))
        .route("/my", get(my_places))
        .route("/{id}", get(get_place).put(update_place))
        .route("/{id}/images", post(upload_images))
        .route("/{id}/images/{image_id}", delete(delete_image))
}

//! Order/payment endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use templatehub_common::AppResult;
use templatehub_core::{
    CreateOrderInput, CreateOrderResponse, OrderRecord, OrderSummary, VerifyPaymentInput,
};
use templatehub_db::entities::Role;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

const fn default_quantity() -> i32 {
    1
}

/// Order creation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub place_id: String,

    /// Optional; the backend defaults it to today.
    pub use_date: Option<NaiveDate>,

    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Payment verification payload, echoing the gateway checkout result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub booking_id: String,
    /// Gateway order id.
    pub order_id: String,
    /// Gateway payment id.
    pub payment_id: String,
    pub signature: String,
}

/// Create a pending order and open a gateway order for it.
async fn create_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> AppResult<ApiResponse<CreateOrderResponse>> {
    let input = CreateOrderInput {
        listing_id: req.place_id,
        use_date: req.use_date,
        quantity: req.quantity,
    };

    let response = state.order_service.create(&user.id, user.role, input).await?;
    Ok(ApiResponse::ok(response))
}

/// Verify a gateway payment signature and confirm the order.
async fn verify_payment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<VerifyPaymentRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let input = VerifyPaymentInput {
        order_id: req.booking_id,
        gateway_order_id: req.order_id,
        payment_id: req.payment_id,
        signature: req.signature,
    };

    state.order_service.verify_payment(&user.id, input).await?;
    Ok(ApiResponse::ok(serde_json::json!({
        "message": "Payment verified and purchase confirmed."
    })))
}

/// The caller's own orders.
async fn my_bookings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OrderSummary>>> {
    user.require_role(Role::Visitor)?;

    let orders = state.order_service.my_orders(&user.id).await?;
    Ok(ApiResponse::ok(orders))
}

/// Orders against one of the caller's listings.
async fn bookings_for_place(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> AppResult<ApiResponse<Vec<OrderRecord>>> {
    user.require_role(Role::Owner)?;

    let orders = state.order_service.listing_orders(&user.id, &place_id).await?;
    Ok(ApiResponse::ok(orders))
}

/// Every order in the system.
async fn all_bookings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OrderRecord>>> {
    user.require_role(Role::Admin)?;

    let orders = state.order_service.all_orders().await?;
    Ok(ApiResponse::ok(orders))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/verifyPayment", post(verify_payment))
        .route("/my", get(my_bookings))
        .route("/place/{place_id}", get(bookings_for_place))
        .route("/all", get(all_bookings))
}

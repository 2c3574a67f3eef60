//! Order service: the order/payment workflow.
//!
//! An order moves Created, to Pending payment, to Confirmed. There is no
//! cancellation or refund path: an order whose payment never completes
//! simply stays pending. Order creation is not idempotent either; a
//! double submission creates two pending orders.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use templatehub_common::{AppError, AppResult, IdGenerator, config::PaymentConfig};
use templatehub_db::{
    entities::{Role, listing, order, user},
    repositories::{ListingImageRepository, ListingRepository, OrderRepository, UserRepository},
};
use validator::Validate;

use crate::services::payment::{PaymentService, payment_signature, signature_matches};

/// Order service for business logic.
#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    listing_repo: ListingRepository,
    image_repo: ListingImageRepository,
    user_repo: UserRepository,
    payment: PaymentService,
    payment_secret: String,
    currency: String,
    id_gen: IdGenerator,
}

/// Input for creating an order.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    #[validate(length(min = 1))]
    pub listing_id: String,

    /// Optional; defaults to today.
    pub use_date: Option<NaiveDate>,

    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
}

/// Response to a created order: everything the client needs to open the
/// gateway's hosted checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// The gateway's id for this charge.
    pub gateway_order_id: String,
    /// Charge in integer minor units.
    pub amount: i64,
    pub currency: String,
    pub message: String,
}

/// Input for verifying a payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentInput {
    pub order_id: String,
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Listing fields echoed on an order row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListingRef {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
}

/// A buyer's own order, as shown on their dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub use_date: NaiveDate,
    pub quantity: i32,
    pub payment_confirmed: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<OrderListingRef>,
    /// Only present once this order's payment is confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
}

/// Buyer identity on an owner/admin order dump.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBuyer {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A full order row for owners and admins. No redaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub listing_id: String,
    pub user_id: String,
    pub use_date: NaiveDate,
    pub quantity: i32,
    pub payment_confirmed: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<OrderBuyer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<OrderListingRef>,
}

/// Charge for an order in integer minor units, computed once at order time
/// from the listing's current price.
fn amount_minor_units(price: Decimal, quantity: i32) -> Option<i64> {
    (price * Decimal::from(quantity) * Decimal::from(100))
        .round()
        .to_i64()
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub fn new(
        order_repo: OrderRepository,
        listing_repo: ListingRepository,
        image_repo: ListingImageRepository,
        user_repo: UserRepository,
        payment: PaymentService,
        config: &PaymentConfig,
    ) -> Self {
        Self {
            order_repo,
            listing_repo,
            image_repo,
            user_repo,
            payment,
            payment_secret: config.key_secret.clone(),
            currency: config.currency.clone(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a pending order and open a gateway order for it.
    ///
    /// The local row is written before the gateway is called; if the gateway
    /// call fails the row stays pending and the error surfaces to the
    /// caller. There is no compensating delete.
    pub async fn create(
        &self,
        user_id: &str,
        role: Role,
        input: CreateOrderInput,
    ) -> AppResult<CreateOrderResponse> {
        input.validate()?;

        let listing = self.listing_repo.get_by_id(&input.listing_id).await?;

        if role == Role::Owner && listing.owner_id == user_id {
            return Err(AppError::BadRequest(
                "Sellers cannot buy their own template".to_string(),
            ));
        }

        let use_date = input
            .use_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let model = order::ActiveModel {
            id: Set(self.id_gen.generate()),
            listing_id: Set(listing.id.clone()),
            user_id: Set(user_id.to_string()),
            use_date: Set(use_date),
            quantity: Set(input.quantity),
            payment_confirmed: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let order = self.order_repo.create(model).await?;

        let amount = amount_minor_units(listing.price, order.quantity)
            .filter(|amount| *amount > 0)
            .ok_or_else(|| AppError::BadRequest("Invalid order amount".to_string()))?;

        let receipt = format!("order_{}", order.id);
        let gateway_order = self
            .payment
            .create_order(amount, &self.currency, &receipt)
            .await?;

        tracing::info!(
            order_id = %order.id,
            gateway_order_id = %gateway_order.id,
            amount,
            "Opened gateway order"
        );

        Ok(CreateOrderResponse {
            order_id: order.id,
            gateway_order_id: gateway_order.id,
            amount,
            currency: self.currency.clone(),
            message: "Order created. Pending payment.".to_string(),
        })
    }

    /// Verify a gateway payment and confirm the order.
    ///
    /// The order must belong to the caller. The expected signature is
    /// recomputed server-side; on mismatch the order is left untouched.
    /// Re-verifying an already confirmed order just re-sets the flag.
    pub async fn verify_payment(&self, user_id: &str, input: VerifyPaymentInput) -> AppResult<()> {
        let order = self
            .order_repo
            .find_by_id(&input.order_id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or_else(|| AppError::OrderNotFound(input.order_id.clone()))?;

        let expected = payment_signature(
            &self.payment_secret,
            &input.gateway_order_id,
            &input.payment_id,
        );
        if !signature_matches(&expected, &input.signature) {
            return Err(AppError::BadRequest("Invalid payment signature".to_string()));
        }

        let mut active: order::ActiveModel = order.into();
        active.payment_confirmed = Set(true);
        let order = self.order_repo.update(active).await?;

        tracing::info!(order_id = %order.id, "Payment confirmed");

        Ok(())
    }

    /// The caller's orders, newest first, with listing context.
    ///
    /// The delivery link appears on exactly the rows whose payment is
    /// confirmed — not listing-wide.
    pub async fn my_orders(&self, user_id: &str) -> AppResult<Vec<OrderSummary>> {
        let orders = self.order_repo.find_by_user(user_id).await?;

        let listing_ids: Vec<String> = orders.iter().map(|o| o.listing_id.clone()).collect();
        let listings = self.listing_repo.find_by_ids(&listing_ids).await?;
        let thumbs = self.image_repo.first_urls_by_listing(&listing_ids).await?;

        let listing_by_id: std::collections::HashMap<&str, &listing::Model> =
            listings.iter().map(|l| (l.id.as_str(), l)).collect();

        Ok(orders
            .into_iter()
            .map(|order| {
                let listing = listing_by_id.get(order.listing_id.as_str()).copied();

                let delivery_url = if order.payment_confirmed {
                    listing.and_then(|l| l.delivery_url.clone())
                } else {
                    None
                };

                let thumb_url = thumbs
                    .get(&order.listing_id)
                    .cloned()
                    .or_else(|| {
                        listing
                            .map(|l| l.image_url.clone())
                            .filter(|url| !url.is_empty())
                    });

                OrderSummary {
                    id: order.id,
                    use_date: order.use_date,
                    quantity: order.quantity,
                    payment_confirmed: order.payment_confirmed,
                    created_at: order.created_at.to_rfc3339(),
                    listing: listing.map(|l| OrderListingRef {
                        id: l.id.clone(),
                        name: l.name.clone(),
                        price: l.price,
                        category: l.category.clone(),
                    }),
                    delivery_url,
                    thumb_url,
                }
            })
            .collect())
    }

    /// Orders against one of the caller's listings. Owner only.
    pub async fn listing_orders(
        &self,
        owner_id: &str,
        listing_id: &str,
    ) -> AppResult<Vec<OrderRecord>> {
        let listing = self.listing_repo.get_by_id(listing_id).await?;
        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden("Not your template".to_string()));
        }

        let orders = self.order_repo.find_by_listing(listing_id).await?;
        self.to_records(orders).await
    }

    /// Every order in the system. Admin only.
    pub async fn all_orders(&self) -> AppResult<Vec<OrderRecord>> {
        let orders = self.order_repo.find_all().await?;
        self.to_records(orders).await
    }

    async fn to_records(&self, orders: Vec<order::Model>) -> AppResult<Vec<OrderRecord>> {
        let user_ids: Vec<String> = orders.iter().map(|o| o.user_id.clone()).collect();
        let listing_ids: Vec<String> = orders.iter().map(|o| o.listing_id.clone()).collect();

        let buyers = self.user_repo.find_by_ids(&user_ids).await?;
        let listings = self.listing_repo.find_by_ids(&listing_ids).await?;

        let buyer_by_id: std::collections::HashMap<&str, &user::Model> =
            buyers.iter().map(|u| (u.id.as_str(), u)).collect();
        let listing_by_id: std::collections::HashMap<&str, &listing::Model> =
            listings.iter().map(|l| (l.id.as_str(), l)).collect();

        Ok(orders
            .into_iter()
            .map(|order| OrderRecord {
                buyer: buyer_by_id.get(order.user_id.as_str()).map(|u| OrderBuyer {
                    id: u.id.clone(),
                    name: u.name.clone(),
                    email: u.email.clone(),
                }),
                listing: listing_by_id
                    .get(order.listing_id.as_str())
                    .map(|l| OrderListingRef {
                        id: l.id.clone(),
                        name: l.name.clone(),
                        price: l.price,
                        category: l.category.clone(),
                    }),
                id: order.id,
                listing_id: order.listing_id,
                user_id: order.user_id,
                use_date: order.use_date,
                quantity: order.quantity,
                payment_confirmed: order.payment_confirmed,
                created_at: order.created_at.to_rfc3339(),
            })
            .collect())
    }
}

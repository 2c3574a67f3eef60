//! Order repository.

use std::sync::Arc;

use crate::entities::{Order, order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use templatehub_common::{AppError, AppResult};

/// Order repository for database operations.
#[derive(Clone)]
pub struct OrderRepository {
    db: Arc<DatabaseConnection>,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an order by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<order::Model>> {
        Order::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Orders placed by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<order::Model>> {
        Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Orders against a listing, newest first.
    pub async fn find_by_listing(&self, listing_id: &str) -> AppResult<Vec<order::Model>> {
        Order::find()
            .filter(order::Column::ListingId.eq(listing_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every order in the system, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<order::Model>> {
        Order::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A confirmed order by this user on this listing, if any.
    ///
    /// Existence gates review eligibility.
    pub async fn find_confirmed(
        &self,
        user_id: &str,
        listing_id: &str,
    ) -> AppResult<Option<order::Model>> {
        Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::ListingId.eq(listing_id))
            .filter(order::Column::PaymentConfirmed.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new order.
    pub async fn create(&self, model: order::ActiveModel) -> AppResult<order::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an order.
    pub async fn update(&self, model: order::ActiveModel) -> AppResult<order::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

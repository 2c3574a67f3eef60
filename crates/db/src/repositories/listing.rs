//! Listing repository.

use std::sync::Arc;

use crate::entities::{Listing, listing};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use templatehub_common::{AppError, AppResult};

/// Catalog listing filter.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Substring match on the category label.
    pub category: Option<String>,
    /// Upper bound on the unit price.
    pub max_price: Option<Decimal>,
}

/// Listing repository for database operations.
#[derive(Clone)]
pub struct ListingRepository {
    db: Arc<DatabaseConnection>,
}

impl ListingRepository {
    /// Create a new listing repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a listing by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<listing::Model>> {
        Listing::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a listing by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<listing::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ListingNotFound(id.to_string()))
    }

    /// Find listings by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<listing::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Listing::find()
            .filter(listing::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List listings matching the catalog filter, newest first.
    pub async fn list(&self, filter: &ListingFilter) -> AppResult<Vec<listing::Model>> {
        let mut query = Listing::find();

        if let Some(ref category) = filter.category {
            query = query.filter(listing::Column::Category.contains(category));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(listing::Column::Price.lte(max_price));
        }

        query
            .order_by_desc(listing::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find listings owned by a user, newest first.
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<listing::Model>> {
        Listing::find()
            .filter(listing::Column::OwnerId.eq(owner_id))
            .order_by_desc(listing::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new listing.
    pub async fn create(&self, model: listing::ActiveModel) -> AppResult<listing::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a listing.
    pub async fn update(&self, model: listing::ActiveModel) -> AppResult<listing::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

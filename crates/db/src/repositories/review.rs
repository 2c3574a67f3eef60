//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, review, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use templatehub_common::{AppError, AppResult};

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Reviews of a listing with their authors, newest first.
    pub async fn find_by_listing_with_users(
        &self,
        listing_id: &str,
    ) -> AppResult<Vec<(review::Model, Option<user::Model>)>> {
        Review::find()
            .filter(review::Column::ListingId.eq(listing_id))
            .order_by_desc(review::Column::CreatedAt)
            .find_also_related(crate::entities::User)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All reviews for a set of listings, for rating aggregation.
    pub async fn find_for_listings(
        &self,
        listing_ids: &[String],
    ) -> AppResult<Vec<review::Model>> {
        if listing_ids.is_empty() {
            return Ok(vec![]);
        }

        Review::find()
            .filter(review::Column::ListingId.is_in(listing_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use std::sync::Arc;

    fn create_test_review(id: &str, listing_id: &str, rating: i32) -> review::Model {
        review::Model {
            id: id.to_string(),
            listing_id: listing_id.to_string(),
            user_id: "user1".to_string(),
            rating,
            comment: "Exactly what I needed, clean layout.".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_for_listings() {
        let r1 = create_test_review("r1", "listing1", 5);
        let r2 = create_test_review("r2", "listing1", 4);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let result = repo
            .find_for_listings(&["listing1".to_string()])
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_find_for_listings_empty_input_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ReviewRepository::new(db);
        let result = repo.find_for_listings(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_create_review() {
        let review = create_test_review("r1", "listing1", 5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[review.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);

        let active = review::ActiveModel {
            id: Set("r1".to_string()),
            listing_id: Set("listing1".to_string()),
            user_id: Set("user1".to_string()),
            rating: Set(5),
            comment: Set("Exactly what I needed, clean layout.".to_string()),
            created_at: Set(Utc::now().into()),
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.rating, 5);
    }
}

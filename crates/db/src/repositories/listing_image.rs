//! Listing image repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{ListingImage, listing_image};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use templatehub_common::{AppError, AppResult};

/// Listing image repository for database operations.
#[derive(Clone)]
pub struct ListingImageRepository {
    db: Arc<DatabaseConnection>,
}

impl ListingImageRepository {
    /// Create a new listing image repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an image by ID, scoped to a listing.
    pub async fn find_by_id_and_listing(
        &self,
        image_id: &str,
        listing_id: &str,
    ) -> AppResult<Option<listing_image::Model>> {
        ListingImage::find_by_id(image_id)
            .filter(listing_image::Column::ListingId.eq(listing_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Images of a listing in display order (insertion order breaks ties).
    pub async fn find_by_listing(
        &self,
        listing_id: &str,
    ) -> AppResult<Vec<listing_image::Model>> {
        ListingImage::find()
            .filter(listing_image::Column::ListingId.eq(listing_id))
            .order_by_asc(listing_image::Column::SortOrder)
            .order_by_asc(listing_image::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// First image URL per listing, for thumbnails on list pages.
    pub async fn first_urls_by_listing(
        &self,
        listing_ids: &[String],
    ) -> AppResult<HashMap<String, String>> {
        if listing_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let images = ListingImage::find()
            .filter(listing_image::Column::ListingId.is_in(listing_ids.to_vec()))
            .order_by_asc(listing_image::Column::SortOrder)
            .order_by_asc(listing_image::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut first = HashMap::new();
        for image in images {
            first.entry(image.listing_id).or_insert(image.url);
        }
        Ok(first)
    }

    /// Next free sort order for a listing: max existing + 1, or 0.
    pub async fn next_sort_order(&self, listing_id: &str) -> AppResult<i32> {
        let highest = ListingImage::find()
            .filter(listing_image::Column::ListingId.eq(listing_id))
            .order_by_desc(listing_image::Column::SortOrder)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(highest.map_or(0, |image| image.sort_order + 1))
    }

    /// Create a new image record.
    pub async fn create(
        &self,
        model: listing_image::ActiveModel,
    ) -> AppResult<listing_image::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an image record.
    pub async fn delete(&self, model: listing_image::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_image(id: &str, listing_id: &str, sort_order: i32) -> listing_image::Model {
        listing_image::Model {
            id: id.to_string(),
            listing_id: listing_id.to_string(),
            url: format!("/files/templates/{listing_id}/{id}.png"),
            storage_key: format!("templates/{listing_id}/{id}.png"),
            sort_order,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_next_sort_order_starts_at_zero() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<listing_image::Model>::new()])
                .into_connection(),
        );

        let repo = ListingImageRepository::new(db);
        assert_eq!(repo.next_sort_order("listing1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_next_sort_order_is_max_plus_one() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_image("img3", "listing1", 4)]])
                .into_connection(),
        );

        let repo = ListingImageRepository::new(db);
        assert_eq!(repo.next_sort_order("listing1").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_first_urls_picks_lowest_sort_order() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_image("img1", "listing1", 0),
                    create_test_image("img2", "listing1", 1),
                    create_test_image("img9", "listing2", 3),
                ]])
                .into_connection(),
        );

        let repo = ListingImageRepository::new(db);
        let first = repo
            .first_urls_by_listing(&["listing1".to_string(), "listing2".to_string()])
            .await
            .unwrap();

        assert_eq!(
            first.get("listing1").unwrap(),
            "/files/templates/listing1/img1.png"
        );
        assert_eq!(
            first.get("listing2").unwrap(),
            "/files/templates/listing2/img9.png"
        );
    }

    #[tokio::test]
    async fn test_first_urls_empty_input_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ListingImageRepository::new(db);
        let first = repo.first_urls_by_listing(&[]).await.unwrap();

        assert!(first.is_empty());
    }
}

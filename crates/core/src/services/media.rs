//! Media service: the ordered image collection attached to a listing.
//!
//! Image bytes live in object storage; the database row keeps the public URL
//! and the storage key needed to delete the object again.

use sea_orm::Set;
use serde::Serialize;
use templatehub_common::{
    AppError, AppResult, IdGenerator, StorageService, generate_storage_key,
};
use templatehub_db::{
    entities::listing_image,
    repositories::{ListingImageRepository, ListingRepository},
};

/// Media service for business logic.
#[derive(Clone)]
pub struct MediaService {
    listing_repo: ListingRepository,
    image_repo: ListingImageRepository,
    storage: StorageService,
    id_gen: IdGenerator,
}

/// One uploaded file, as decoded from the multipart request.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A stored image, as returned to the uploader.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub id: String,
    pub url: String,
    pub sort_order: i32,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(
        listing_repo: ListingRepository,
        image_repo: ListingImageRepository,
        storage: StorageService,
    ) -> Self {
        Self {
            listing_repo,
            image_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append uploaded images to a listing the caller owns.
    ///
    /// Files are handled one at a time: each is uploaded to storage and its
    /// row persisted before the next file is touched. Sort orders continue
    /// from the highest existing one (starting at 0). Empty files are
    /// skipped; a non-image content type fails the whole request.
    pub async fn upload_images(
        &self,
        owner_id: &str,
        listing_id: &str,
        files: Vec<ImageUpload>,
    ) -> AppResult<Vec<StoredImage>> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No files uploaded".to_string()));
        }

        let listing = self.listing_repo.get_by_id(listing_id).await?;
        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden("Not your template".to_string()));
        }

        let mut next_order = self.image_repo.next_sort_order(listing_id).await?;

        let mut saved = Vec::new();
        for file in files {
            if !file.content_type.starts_with("image/") {
                return Err(AppError::BadRequest("Only images are allowed".to_string()));
            }
            if file.data.is_empty() {
                continue;
            }

            let image_id = self.id_gen.generate();
            let key = generate_storage_key(listing_id, &image_id, &file.file_name);
            let stored = self
                .storage
                .upload(&key, &file.data, &file.content_type)
                .await?;

            let model = listing_image::ActiveModel {
                id: Set(image_id),
                listing_id: Set(listing_id.to_string()),
                url: Set(stored.url),
                storage_key: Set(stored.key),
                sort_order: Set(next_order),
                created_at: Set(chrono::Utc::now().into()),
            };

            let image = self.image_repo.create(model).await?;
            next_order += 1;

            saved.push(StoredImage {
                id: image.id,
                url: image.url,
                sort_order: image.sort_order,
            });
        }

        Ok(saved)
    }

    /// Delete one image from a listing the caller owns.
    ///
    /// The storage object goes first, then the database row.
    pub async fn delete_image(
        &self,
        owner_id: &str,
        listing_id: &str,
        image_id: &str,
    ) -> AppResult<()> {
        let listing = self.listing_repo.get_by_id(listing_id).await?;
        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden("Not your template".to_string()));
        }

        let image = self
            .image_repo
            .find_by_id_and_listing(image_id, listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        self.storage.delete(&image.storage_key).await?;
        self.image_repo.delete(image).await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::{Arc, Mutex};
    use templatehub_common::{StorageBackend, StoredObject};
    use templatehub_db::entities::listing;

    /// Records uploads and deletes instead of touching a filesystem.
    #[derive(Default)]
    struct RecordingStorage {
        uploads: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StorageBackend for RecordingStorage {
        async fn upload(
            &self,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> AppResult<StoredObject> {
            self.uploads.lock().unwrap().push(key.to_string());
            Ok(StoredObject {
                key: key.to_string(),
                url: format!("/files/{key}"),
                size: data.len() as u64,
                content_type: content_type.to_string(),
            })
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/files/{key}")
        }
    }

    fn test_listing(owner_id: &str) -> listing::Model {
        listing::Model {
            id: "listing1".to_string(),
            name: "Minimal Resume".to_string(),
            description: "A clean single-page resume template.".to_string(),
            category: "resume".to_string(),
            price: "50.00".parse().unwrap(),
            image_url: String::new(),
            delivery_url: None,
            owner_id: owner_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_image(id: &str, sort_order: i32) -> listing_image::Model {
        listing_image::Model {
            id: id.to_string(),
            listing_id: "listing1".to_string(),
            url: format!("/files/templates/listing1/{id}.png"),
            storage_key: format!("templates/listing1/{id}.png"),
            sort_order,
            created_at: Utc::now().into(),
        }
    }

    fn create_service(
        db: Arc<sea_orm::DatabaseConnection>,
        storage: Arc<RecordingStorage>,
    ) -> MediaService {
        MediaService::new(
            ListingRepository::new(Arc::clone(&db)),
            ListingImageRepository::new(db),
            storage,
        )
    }

    fn png_upload(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file_list() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let storage = Arc::new(RecordingStorage::default());
        let service = create_service(db, Arc::clone(&storage));

        let result = service.upload_images("owner1", "listing1", vec![]).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_upload_rejects_foreign_listing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_listing("owner1")]])
                .into_connection(),
        );
        let storage = Arc::new(RecordingStorage::default());
        let service = create_service(db, Arc::clone(&storage));

        let result = service
            .upload_images("intruder", "listing1", vec![png_upload("a.png")])
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_content_type() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_listing("owner1")]])
                .append_query_results([Vec::<listing_image::Model>::new()])
                .into_connection(),
        );
        let storage = Arc::new(RecordingStorage::default());
        let service = create_service(db, Arc::clone(&storage));

        let upload = ImageUpload {
            file_name: "notes.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![1],
        };
        let result = service
            .upload_images("owner1", "listing1", vec![upload])
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_continues_sort_order_from_existing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_listing("owner1")]])
                // highest existing sort order is 2
                .append_query_results([[test_image("old", 2)]])
                // inserted row comes back
                .append_query_results([[test_image("new", 3)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let storage = Arc::new(RecordingStorage::default());
        let service = create_service(db, Arc::clone(&storage));

        let saved = service
            .upload_images("owner1", "listing1", vec![png_upload("cover.png")])
            .await
            .unwrap();

        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].sort_order, 3);
        assert_eq!(storage.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_storage_object_and_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_listing("owner1")]])
                .append_query_results([[test_image("img1", 0)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let storage = Arc::new(RecordingStorage::default());
        let service = create_service(db, Arc::clone(&storage));

        service
            .delete_image("owner1", "listing1", "img1")
            .await
            .unwrap();

        assert_eq!(
            storage.deletes.lock().unwrap().as_slice(),
            ["templates/listing1/img1.png"]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_image_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_listing("owner1")]])
                .append_query_results([Vec::<listing_image::Model>::new()])
                .into_connection(),
        );
        let storage = Arc::new(RecordingStorage::default());
        let service = create_service(db, Arc::clone(&storage));

        let result = service.delete_image("owner1", "listing1", "ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(storage.deletes.lock().unwrap().is_empty());
    }
}

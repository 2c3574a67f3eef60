//! Catalog service: listing browse, detail and owner CRUD.

use rust_decimal::Decimal;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use templatehub_common::{AppError, AppResult, IdGenerator};
use templatehub_db::{
    entities::{Role, listing, listing_image},
    repositories::{
        ListingFilter, ListingImageRepository, ListingRepository, ReviewRepository, UserRepository,
    },
};
use validator::Validate;

use crate::services::review::ReviewView;

/// Hosts a delivery link may point at. Exact match, except the content-host
/// suffix which admits any subdomain.
const ALLOWED_DELIVERY_HOSTS: [&str; 2] = ["drive.google.com", "docs.google.com"];
const ALLOWED_DELIVERY_SUFFIX: &str = ".googleusercontent.com";

/// Highest unit price a listing may carry.
const MAX_PRICE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Catalog service for business logic.
#[derive(Clone)]
pub struct CatalogService {
    listing_repo: ListingRepository,
    image_repo: ListingImageRepository,
    review_repo: ReviewRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating or updating a listing.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingInput {
    #[validate(length(min = 2, max = 150))]
    pub name: String,

    #[validate(length(min = 10, max = 4000))]
    pub description: String,

    #[validate(length(min = 1, max = 150))]
    pub category: String,

    pub price: Decimal,

    #[validate(url)]
    pub image_url: Option<String>,

    pub delivery_url: Option<String>,
}

/// A catalog row as shown on the public list page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub image_url: String,
    pub average_rating: f64,
    pub review_count: usize,
}

/// Listing owner reference.
#[derive(Debug, Clone, Serialize)]
pub struct ListingOwner {
    pub id: String,
    pub name: String,
}

/// An image as presented on the detail page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingImageView {
    pub id: String,
    pub url: String,
    pub sort_order: i32,
}

/// Full listing detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub image_url: String,
    /// Present only for the listing's owner (edit form); buyers get the link
    /// through their confirmed orders instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<ListingOwner>,
    pub reviews: Vec<ReviewView>,
    pub images: Vec<ListingImageView>,
}

/// A listing as shown on the owner's dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedListing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub image_url: String,
    pub delivery_url: Option<String>,
    pub owner_id: String,
}

impl From<listing::Model> for OwnedListing {
    fn from(l: listing::Model) -> Self {
        Self {
            id: l.id,
            name: l.name,
            description: l.description,
            category: l.category,
            price: l.price,
            image_url: l.image_url,
            delivery_url: l.delivery_url,
            owner_id: l.owner_id,
        }
    }
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(
        listing_repo: ListingRepository,
        image_repo: ListingImageRepository,
        review_repo: ReviewRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            listing_repo,
            image_repo,
            review_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Public catalog list with optional category/price filters.
    ///
    /// Rating averages are rounded to one decimal; the delivery link is
    /// never part of this view.
    pub async fn list(&self, filter: &ListingFilter) -> AppResult<Vec<ListingSummary>> {
        let listings = self.listing_repo.list(filter).await?;
        let ids: Vec<String> = listings.iter().map(|l| l.id.clone()).collect();

        let first_images = self.image_repo.first_urls_by_listing(&ids).await?;
        let reviews = self.review_repo.find_for_listings(&ids).await?;

        let mut rating_sums: std::collections::HashMap<&str, (i64, usize)> =
            std::collections::HashMap::new();
        for review in &reviews {
            let entry = rating_sums.entry(review.listing_id.as_str()).or_insert((0, 0));
            entry.0 += i64::from(review.rating);
            entry.1 += 1;
        }

        Ok(listings
            .into_iter()
            .map(|l| {
                let (sum, count) = rating_sums.get(l.id.as_str()).copied().unwrap_or((0, 0));
                let average = if count == 0 {
                    0.0
                } else {
                    let raw = sum as f64 / count as f64;
                    (raw * 10.0).round() / 10.0
                };

                let image_url = first_images
                    .get(&l.id)
                    .filter(|url| !url.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| l.image_url.clone());

                ListingSummary {
                    id: l.id,
                    name: l.name,
                    description: l.description,
                    category: l.category,
                    price: l.price,
                    image_url,
                    average_rating: average,
                    review_count: count,
                }
            })
            .collect())
    }

    /// Listing detail with reviews and images.
    ///
    /// `requester` is the authenticated caller, if any; the delivery link is
    /// included only for the owning Owner.
    pub async fn get(
        &self,
        id: &str,
        requester: Option<(&str, Role)>,
    ) -> AppResult<ListingDetail> {
        let listing = self.listing_repo.get_by_id(id).await?;

        let can_see_delivery_url = matches!(
            requester,
            Some((user_id, Role::Owner)) if user_id == listing.owner_id
        );

        let owner = self
            .user_repo
            .find_by_id(&listing.owner_id)
            .await?
            .map(|u| ListingOwner { id: u.id, name: u.name });

        let reviews = self
            .review_repo
            .find_by_listing_with_users(&listing.id)
            .await?
            .into_iter()
            .map(|(review, author)| ReviewView {
                id: review.id,
                rating: review.rating,
                comment: review.comment,
                created_at: review.created_at.to_rfc3339(),
                user: crate::services::review::ReviewAuthor {
                    id: review.user_id,
                    name: author.map(|u| u.name).unwrap_or_default(),
                },
            })
            .collect();

        let images = self
            .image_repo
            .find_by_listing(&listing.id)
            .await?
            .into_iter()
            .map(|image: listing_image::Model| ListingImageView {
                id: image.id,
                url: image.url,
                sort_order: image.sort_order,
            })
            .collect();

        Ok(ListingDetail {
            id: listing.id,
            name: listing.name,
            description: listing.description,
            category: listing.category,
            price: listing.price,
            image_url: listing.image_url,
            delivery_url: if can_see_delivery_url {
                listing.delivery_url
            } else {
                None
            },
            owner,
            reviews,
            images,
        })
    }

    /// The caller's own listings, delivery link included.
    pub async fn my_listings(&self, owner_id: &str) -> AppResult<Vec<OwnedListing>> {
        Ok(self
            .listing_repo
            .find_by_owner(owner_id)
            .await?
            .into_iter()
            .map(OwnedListing::from)
            .collect())
    }

    /// Create a listing owned by the caller.
    pub async fn create(
        &self,
        owner_id: &str,
        input: CreateListingInput,
    ) -> AppResult<listing::Model> {
        input.validate()?;
        validate_price(input.price)?;
        validate_delivery_url(input.delivery_url.as_deref())?;

        let model = listing::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            description: Set(input.description),
            category: Set(input.category),
            price: Set(input.price),
            image_url: Set(input.image_url.unwrap_or_default()),
            delivery_url: Set(input
                .delivery_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())),
            owner_id: Set(owner_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.listing_repo.create(model).await
    }

    /// Update a listing owned by the caller.
    pub async fn update(
        &self,
        owner_id: &str,
        listing_id: &str,
        input: CreateListingInput,
    ) -> AppResult<listing::Model> {
        input.validate()?;
        validate_price(input.price)?;
        validate_delivery_url(input.delivery_url.as_deref())?;

        let listing = self.listing_repo.get_by_id(listing_id).await?;
        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "You cannot edit a template you don't own".to_string(),
            ));
        }

        let mut active: listing::ActiveModel = listing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.category = Set(input.category);
        active.price = Set(input.price);
        active.image_url = Set(input.image_url.unwrap_or_default());
        active.delivery_url = Set(input
            .delivery_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.listing_repo.update(active).await
    }
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO || price > MAX_PRICE {
        return Err(AppError::Validation(
            "Price must be between 0 and 10000000".to_string(),
        ));
    }
    Ok(())
}

/// Validate a delivery link against the host allow-list.
///
/// Empty/absent links are fine; a present link must be an absolute URL whose
/// host is allow-listed.
fn validate_delivery_url(delivery_url: Option<&str>) -> AppResult<()> {
    let Some(raw) = delivery_url else { return Ok(()) };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    if !is_allowed_delivery_url(trimmed) {
        return Err(AppError::Validation(
            "Please provide a valid Google Drive / Google Docs link".to_string(),
        ));
    }
    Ok(())
}

fn is_allowed_delivery_url(raw: &str) -> bool {
    let Ok(parsed) = url::Url::parse(raw) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();

    ALLOWED_DELIVERY_HOSTS.contains(&host.as_str()) || host.ends_with(ALLOWED_DELIVERY_SUFFIX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use templatehub_db::entities::review;

    fn create_service(db: Arc<sea_orm::DatabaseConnection>) -> CatalogService {
        CatalogService::new(
            ListingRepository::new(Arc::clone(&db)),
            ListingImageRepository::new(Arc::clone(&db)),
            ReviewRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    fn test_listing(id: &str, owner_id: &str, delivery_url: Option<&str>) -> listing::Model {
        listing::Model {
            id: id.to_string(),
            name: "Minimal Resume".to_string(),
            description: "A clean single-page resume template.".to_string(),
            category: "resume".to_string(),
            price: "50.00".parse().unwrap(),
            image_url: "https://img.example.com/legacy.png".to_string(),
            delivery_url: delivery_url.map(ToString::to_string),
            owner_id: owner_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_review(id: &str, listing_id: &str, rating: i32) -> review::Model {
        review::Model {
            id: id.to_string(),
            listing_id: listing_id.to_string(),
            user_id: "user1".to_string(),
            rating,
            comment: "Exactly what I needed, clean layout.".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_allowed_delivery_hosts() {
        assert!(is_allowed_delivery_url("https://drive.google.com/file/d/abc/view"));
        assert!(is_allowed_delivery_url("https://docs.google.com/document/d/abc"));
        assert!(is_allowed_delivery_url("https://lh3.googleusercontent.com/d/abc"));
    }

    #[test]
    fn test_lookalike_delivery_hosts_rejected() {
        assert!(!is_allowed_delivery_url("https://drive.google.com.evil.example.com/x"));
        assert!(!is_allowed_delivery_url("https://xgoogleusercontent.com/x"));
        assert!(!is_allowed_delivery_url("https://dropbox.com/s/abc"));
        assert!(!is_allowed_delivery_url("not a url"));
    }

    #[test]
    fn test_delivery_host_match_is_case_insensitive() {
        assert!(is_allowed_delivery_url("https://Drive.Google.Com/file/d/abc"));
    }

    #[test]
    fn test_empty_delivery_url_passes_validation() {
        assert!(validate_delivery_url(None).is_ok());
        assert!(validate_delivery_url(Some("   ")).is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(validate_price("-1".parse().unwrap()).is_err());
        assert!(validate_price("0".parse().unwrap()).is_ok());
        assert!(validate_price("10000000".parse().unwrap()).is_ok());
        assert!(validate_price("10000001".parse().unwrap()).is_err());
    }

    #[tokio::test]
    async fn test_list_aggregates_ratings_rounded_to_one_decimal() {
        let listing = test_listing("l1", "owner1", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[listing]])
                .append_query_results([Vec::<listing_image::Model>::new()])
                .append_query_results([[
                    test_review("r1", "l1", 5),
                    test_review("r2", "l1", 4),
                ]])
                .into_connection(),
        );
        let service = create_service(db);

        let rows = service.list(&ListingFilter::default()).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].average_rating, 4.5);
        assert_eq!(rows[0].review_count, 2);
        // No uploaded images: fall back to the legacy single image
        assert_eq!(rows[0].image_url, "https://img.example.com/legacy.png");
    }

    #[tokio::test]
    async fn test_list_without_reviews_reports_zero() {
        let listing = test_listing("l1", "owner1", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[listing]])
                .append_query_results([Vec::<listing_image::Model>::new()])
                .append_query_results([Vec::<review::Model>::new()])
                .into_connection(),
        );
        let service = create_service(db);

        let rows = service.list(&ListingFilter::default()).await.unwrap();
        assert_eq!(rows[0].average_rating, 0.0);
        assert_eq!(rows[0].review_count, 0);
    }

    #[tokio::test]
    async fn test_get_hides_delivery_url_from_public() {
        let listing = test_listing("l1", "owner1", Some("https://drive.google.com/file/d/x"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[listing]])
                .append_query_results([Vec::<templatehub_db::entities::user::Model>::new()])
                .append_query_results([Vec::<(
                    review::Model,
                    templatehub_db::entities::user::Model,
                )>::new()])
                .append_query_results([Vec::<listing_image::Model>::new()])
                .into_connection(),
        );
        let service = create_service(db);

        let detail = service.get("l1", None).await.unwrap();
        assert!(detail.delivery_url.is_none());
    }

    #[tokio::test]
    async fn test_get_shows_delivery_url_to_owning_owner() {
        let listing = test_listing("l1", "owner1", Some("https://drive.google.com/file/d/x"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[listing]])
                .append_query_results([Vec::<templatehub_db::entities::user::Model>::new()])
                .append_query_results([Vec::<(
                    review::Model,
                    templatehub_db::entities::user::Model,
                )>::new()])
                .append_query_results([Vec::<listing_image::Model>::new()])
                .into_connection(),
        );
        let service = create_service(db);

        let detail = service.get("l1", Some(("owner1", Role::Owner))).await.unwrap();
        assert_eq!(
            detail.delivery_url.as_deref(),
            Some("https://drive.google.com/file/d/x")
        );
    }

    #[tokio::test]
    async fn test_get_hides_delivery_url_from_other_owner() {
        let listing = test_listing("l1", "owner1", Some("https://drive.google.com/file/d/x"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[listing]])
                .append_query_results([Vec::<templatehub_db::entities::user::Model>::new()])
                .append_query_results([Vec::<(
                    review::Model,
                    templatehub_db::entities::user::Model,
                )>::new()])
                .append_query_results([Vec::<listing_image::Model>::new()])
                .into_connection(),
        );
        let service = create_service(db);

        let detail = service
            .get("l1", Some(("owner2", Role::Owner)))
            .await
            .unwrap();
        assert!(detail.delivery_url.is_none());
    }

    #[tokio::test]
    async fn test_update_foreign_listing_is_forbidden() {
        let listing = test_listing("l1", "owner1", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[listing]])
                .into_connection(),
        );
        let service = create_service(db);

        let input = CreateListingInput {
            name: "Minimal Resume".to_string(),
            description: "A clean single-page resume template.".to_string(),
            category: "resume".to_string(),
            price: "50.00".parse().unwrap(),
            image_url: None,
            delivery_url: None,
        };

        let result = service.update("owner2", "l1", input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}

//! Review service.
//!
//! Reviews are gated behind a confirmed purchase: a user may only review a
//! listing they hold at least one payment-confirmed order for.

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use templatehub_common::{AppError, AppResult, IdGenerator};
use templatehub_db::{
    entities::{review, user},
    repositories::{OrderRepository, ReviewRepository, UserRepository},
};

/// Minimum length of a review comment, after trimming.
const MIN_COMMENT_LEN: usize = 10;

/// Review service for business logic.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    order_repo: OrderRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a review.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub listing_id: String,
    pub rating: i32,
    pub comment: String,
}

/// Review author reference.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewAuthor {
    pub id: String,
    pub name: String,
}

/// A review as presented by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
    pub user: ReviewAuthor,
}

impl ReviewView {
    fn from_model(review: review::Model, author: Option<&user::Model>) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_rfc3339(),
            user: ReviewAuthor {
                id: review.user_id,
                name: author.map(|u| u.name.clone()).unwrap_or_default(),
            },
        }
    }
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub fn new(
        review_repo: ReviewRepository,
        order_repo: OrderRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            review_repo,
            order_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a review for a listing the user has a confirmed purchase of.
    pub async fn create(&self, user_id: &str, input: CreateReviewInput) -> AppResult<ReviewView> {
        if !(1..=5).contains(&input.rating) {
            return Err(AppError::BadRequest(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let comment = input.comment.trim();
        if comment.len() < MIN_COMMENT_LEN {
            return Err(AppError::BadRequest(
                "Comment must be at least 10 characters".to_string(),
            ));
        }

        let eligible = self
            .order_repo
            .find_confirmed(user_id, &input.listing_id)
            .await?
            .is_some();
        if !eligible {
            return Err(AppError::BadRequest(
                "You can only review templates you have purchased".to_string(),
            ));
        }

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            listing_id: Set(input.listing_id),
            user_id: Set(user_id.to_string()),
            rating: Set(input.rating),
            comment: Set(comment.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let review = self.review_repo.create(model).await?;
        let author = self.user_repo.find_by_id(user_id).await?;

        Ok(ReviewView::from_model(review, author.as_ref()))
    }

    /// Reviews of a listing, newest first.
    pub async fn list_for_listing(&self, listing_id: &str) -> AppResult<Vec<ReviewView>> {
        let rows = self
            .review_repo
            .find_by_listing_with_users(listing_id)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(review, author)| ReviewView::from_model(review, author.as_ref()))
            .collect())
    }
}

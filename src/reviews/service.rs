use std::sync::Arc;

use validator::Validate;

use crate::attractions::AttractionRepository;
use crate::error::is_unique_violation;
use crate::reviews::{
    CreateReviewRequest, RatingAggregator, Review, ReviewRepository, ServiceError,
    UpdateReviewRequest,
};

/// Service layer for review business logic
///
/// Every successful create, update or delete is followed by a rating
/// recompute for the affected attraction.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    attractions: Arc<dyn AttractionRepository>,
    aggregator: RatingAggregator,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        attractions: Arc<dyn AttractionRepository>,
        aggregator: RatingAggregator,
    ) -> Self {
        Self {
            reviews,
            attractions,
            aggregator,
        }
    }

    pub async fn create_review(
        &self,
        attraction_id: i32,
        user_id: i32,
        request: CreateReviewRequest,
    ) -> Result<Review, ServiceError> {
        request.validate()?;

        if self.attractions.find_by_id(attraction_id).await?.is_none() {
            return Err(ServiceError::AttractionNotFound(attraction_id));
        }

        if self
            .reviews
            .find_by_user_and_attraction(user_id, attraction_id)
            .await?
            .is_some()
        {
            tracing::warn!(
                "User {} attempted a second review of attraction {}",
                user_id,
                attraction_id
            );
            return Err(ServiceError::DuplicateReview);
        }

        let review = self
            .reviews
            .create(attraction_id, user_id, request.review.trim(), request.rating)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::DuplicateReview
                } else {
                    ServiceError::DatabaseError(e)
                }
            })?;

        tracing::info!(
            "Created review id={} for attraction {} by user {}",
            review.id,
            attraction_id,
            user_id
        );

        self.refresh_ratings(attraction_id).await;
        Ok(review)
    }

    pub async fn update_review(
        &self,
        user_id: i32,
        review_id: i32,
        request: UpdateReviewRequest,
    ) -> Result<Review, ServiceError> {
        request.validate()?;

        let existing = self.owned_review(user_id, review_id).await?;
        let attraction_id = existing.attraction_id;

        let updated = self
            .reviews
            .update(
                review_id,
                request.review.as_deref().map(str::trim),
                request.rating,
            )
            .await?
            .ok_or(ServiceError::NotFound(review_id))?;

        tracing::info!("Updated review id={}", review_id);

        self.refresh_ratings(attraction_id).await;
        Ok(updated)
    }

    pub async fn delete_review(&self, user_id: i32, review_id: i32) -> Result<(), ServiceError> {
        let existing = self.owned_review(user_id, review_id).await?;
        let attraction_id = existing.attraction_id;

        self.reviews
            .delete(review_id)
            .await?
            .ok_or(ServiceError::NotFound(review_id))?;

        tracing::info!("Deleted review id={}", review_id);

        self.refresh_ratings(attraction_id).await;
        Ok(())
    }

    /// Reviews of an attraction, newest first
    pub async fn list_reviews(&self, attraction_id: i32) -> Result<Vec<Review>, ServiceError> {
        if self.attractions.find_by_id(attraction_id).await?.is_none() {
            return Err(ServiceError::AttractionNotFound(attraction_id));
        }
        Ok(self.reviews.find_by_attraction(attraction_id).await?)
    }

    pub async fn get_review(&self, review_id: i32) -> Result<Review, ServiceError> {
        self.reviews
            .find_by_id(review_id)
            .await?
            .ok_or(ServiceError::NotFound(review_id))
    }

    async fn owned_review(&self, user_id: i32, review_id: i32) -> Result<Review, ServiceError> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or(ServiceError::NotFound(review_id))?;

        if review.user_id != user_id {
            tracing::warn!(
                "User {} attempted to modify review {} owned by user {}",
                user_id,
                review_id,
                review.user_id
            );
            return Err(ServiceError::Forbidden);
        }

        Ok(review)
    }

    /// Recomputes on a spawned task so a dropped request cannot skip it
    ///
    /// A failed recompute is logged; the review write has already succeeded.
    async fn refresh_ratings(&self, attraction_id: i32) {
        let aggregator = self.aggregator.clone();
        let recompute = tokio::spawn(async move { aggregator.recompute(attraction_id).await });

        match recompute.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!(
                "Failed to recompute ratings for attraction {}: {:?}",
                attraction_id,
                e
            ),
            Err(e) => tracing::error!(
                "Rating recompute task for attraction {} did not finish: {}",
                attraction_id,
                e
            ),
        }
    }
}

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::reviews::Review;

const REVIEW_COLUMNS: &str = "id, review, rating, attraction_id, user_id, created_at, updated_at";

/// Persistence operations on reviews
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(
        &self,
        attraction_id: i32,
        user_id: i32,
        review: &str,
        rating: f64,
    ) -> DbResult<Review>;

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Review>>;

    /// Duplicate detection for the one-review-per-user rule
    async fn find_by_user_and_attraction(
        &self,
        user_id: i32,
        attraction_id: i32,
    ) -> DbResult<Option<Review>>;

    /// Newest first
    async fn find_by_attraction(&self, attraction_id: i32) -> DbResult<Vec<Review>>;

    /// Applies the given fields; `None` if the review no longer exists
    async fn update(
        &self,
        id: i32,
        review: Option<&str>,
        rating: Option<f64>,
    ) -> DbResult<Option<Review>>;

    /// Removes the review and returns the removed row
    async fn delete(&self, id: i32) -> DbResult<Option<Review>>;

    /// Every rating value for an attraction (for aggregation)
    async fn ratings_for_attraction(&self, attraction_id: i32) -> DbResult<Vec<f64>>;
}

/// Repository for database operations on reviews
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn create(
        &self,
        attraction_id: i32,
        user_id: i32,
        review: &str,
        rating: f64,
    ) -> DbResult<Review> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (review, rating, attraction_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(review)
        .bind(rating)
        .bind(attraction_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Review>> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_by_user_and_attraction(
        &self,
        user_id: i32,
        attraction_id: i32,
    ) -> DbResult<Option<Review>> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE user_id = $1 AND attraction_id = $2",
            REVIEW_COLUMNS
        ))
        .bind(user_id)
        .bind(attraction_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_by_attraction(&self, attraction_id: i32) -> DbResult<Vec<Review>> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE attraction_id = $1 ORDER BY created_at DESC, id DESC",
            REVIEW_COLUMNS
        ))
        .bind(attraction_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update(
        &self,
        id: i32,
        review: Option<&str>,
        rating: Option<f64>,
    ) -> DbResult<Option<Review>> {
        // COALESCE keeps the stored value for fields absent from the patch
        sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
            SET review = COALESCE($1, review),
                rating = COALESCE($2, rating),
                updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(review)
        .bind(rating)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: i32) -> DbResult<Option<Review>> {
        sqlx::query_as::<_, Review>(&format!(
            "DELETE FROM reviews WHERE id = $1 RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn ratings_for_attraction(&self, attraction_id: i32) -> DbResult<Vec<f64>> {
        sqlx::query_scalar::<_, f64>("SELECT rating FROM reviews WHERE attraction_id = $1")
            .bind(attraction_id)
            .fetch_all(&self.pool)
            .await
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Domain model representing a review in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i32,
    pub review: String,
    #[schema(example = 4.0)]
    pub rating: f64,
    pub attraction_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a review; the attraction comes from the path
/// and the author from the token
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateReviewRequest {
    #[validate(
        length(max = 2000, message = "Review must not exceed 2000 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "Canopy walk was unforgettable")]
    pub review: String,
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    #[schema(example = 5.0)]
    pub rating: f64,
}

/// Request DTO for updating an existing review
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateReviewRequest {
    #[validate(
        length(max = 2000, message = "Review must not exceed 2000 characters"),
        custom = "validate_not_blank"
    )]
    pub review: Option<String>,
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,
}

use thiserror::Error;

use crate::error::ApiError;

/// Service-level errors for the review write path
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Review {0} not found")]
    NotFound(i32),

    #[error("Duplicate review: user has already reviewed this attraction")]
    DuplicateReview,

    /// Acting user is not the review's author
    #[error("User does not own this review")]
    Forbidden,

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Attraction {0} not found")]
    AttractionNotFound(i32),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => ApiError::not_found("Review", id),
            ServiceError::DuplicateReview => ApiError::Conflict {
                message: "User has already reviewed this attraction".to_string(),
            },
            ServiceError::Forbidden => {
                ApiError::Forbidden("User does not own this review".to_string())
            }
            ServiceError::ValidationError(errors) => ApiError::ValidationError(errors),
            ServiceError::AttractionNotFound(id) => ApiError::not_found("Attraction", id),
            ServiceError::DatabaseError(e) => ApiError::DatabaseError(e),
        }
    }
}

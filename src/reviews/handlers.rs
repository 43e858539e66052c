// HTTP handlers for review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::reviews::{CreateReviewRequest, Review, UpdateReviewRequest};
use crate::AppState;

/// Review an attraction as the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/attractions/{id}/reviews",
    params(("id" = i32, Path, description = "Attraction ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Attraction not found"),
        (status = 409, description = "User already reviewed this attraction")
    ),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(attraction_id): Path<i32>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let review = state
        .reviews
        .create_review(attraction_id, user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    get,
    path = "/api/v1/attractions/{id}/reviews",
    params(("id" = i32, Path, description = "Attraction ID")),
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<Review>),
        (status = 404, description = "Attraction not found")
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(attraction_id): Path<i32>,
) -> Result<Json<Vec<Review>>, ApiError> {
    Ok(Json(state.reviews.list_reviews(attraction_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review found", body = Review),
        (status = 404, description = "Review not found")
    ),
    tag = "reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<i32>,
) -> Result<Json<Review>, ApiError> {
    Ok(Json(state.reviews.get_review(review_id).await?))
}

/// Edit a review (author only)
#[utoipa::path(
    patch,
    path = "/api/v1/reviews/{id}",
    params(("id" = i32, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    tag = "reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(review_id): Path<i32>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    let review = state
        .reviews
        .update_review(user.user_id, review_id, request)
        .await?;

    Ok(Json(review))
}

/// Delete a review (author only)
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    tag = "reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(review_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.reviews.delete_review(user.user_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

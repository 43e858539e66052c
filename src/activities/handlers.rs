// HTTP handlers for activity endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::activities::{Activity, CreateActivityRequest, UpdateActivityRequest};
use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::query::{ListParams, Page};
use crate::AppState;

/// Add an activity to an attraction (operator or admin)
#[utoipa::path(
    post,
    path = "/api/v1/attractions/{id}/activities",
    params(("id" = i32, Path, description = "Attraction ID")),
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity created", body = Activity),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Operator role required"),
        (status = 404, description = "Attraction not found"),
        (status = 409, description = "Name already used at this attraction")
    ),
    tag = "activities"
)]
pub async fn create_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(attraction_id): Path<i32>,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    user.require_role(Role::Operator)?;
    tracing::debug!("Creating activity for attraction {}", attraction_id);

    let activity = state.activities.create(attraction_id, payload).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

#[utoipa::path(
    get,
    path = "/api/v1/attractions/{id}/activities",
    params(("id" = i32, Path, description = "Attraction ID"), ListParams),
    responses(
        (status = 200, description = "Page of the attraction's activities"),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Attraction not found")
    ),
    tag = "activities"
)]
pub async fn list_activities(
    State(state): State<AppState>,
    Path(attraction_id): Path<i32>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Activity>>, ApiError> {
    Ok(Json(state.activities.list(attraction_id, params).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/activities/{id}",
    params(("id" = i32, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity found", body = Activity),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Activity not found")
    ),
    tag = "activities"
)]
pub async fn get_activity(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Activity>, ApiError> {
    Ok(Json(state.activities.get(id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/activities/{id}",
    params(("id" = i32, Path, description = "Activity ID")),
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Activity updated", body = Activity),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Operator role required"),
        (status = 404, description = "Activity not found"),
        (status = 409, description = "Name already used at this attraction")
    ),
    tag = "activities"
)]
pub async fn update_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateActivityRequest>,
) -> Result<Json<Activity>, ApiError> {
    user.require_role(Role::Operator)?;
    Ok(Json(state.activities.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/activities/{id}",
    params(("id" = i32, Path, description = "Activity ID")),
    responses(
        (status = 204, description = "Activity deleted"),
        (status = 403, description = "Operator role required"),
        (status = 404, description = "Activity not found")
    ),
    tag = "activities"
)]
pub async fn delete_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    user.require_role(Role::Operator)?;
    state.activities.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// HTTP handlers for destination endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::auth::{AuthenticatedUser, Role};
use crate::destinations::{CreateDestinationRequest, Destination, DestinationDetail};
use crate::error::ApiError;
use crate::query::{ListParams, Page};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/destinations",
    request_body = CreateDestinationRequest,
    responses(
        (status = 201, description = "Destination created", body = Destination),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Name already in use")
    ),
    tag = "destinations"
)]
pub async fn create_destination(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateDestinationRequest>,
) -> Result<(StatusCode, Json<Destination>), ApiError> {
    user.require_role(Role::Admin)?;
    let destination = state.destinations.create(payload).await?;
    Ok((StatusCode::CREATED, Json(destination)))
}

#[utoipa::path(
    get,
    path = "/api/v1/destinations",
    params(ListParams),
    responses(
        (status = 200, description = "Page of destinations"),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "destinations"
)]
pub async fn list_destinations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Destination>>, ApiError> {
    Ok(Json(state.destinations.list(params).await?))
}

/// Get a destination with its attractions
#[utoipa::path(
    get,
    path = "/api/v1/destinations/{id}",
    params(("id" = i32, Path, description = "Destination ID")),
    responses(
        (status = 200, description = "Destination with an `attractions` array"),
        (status = 404, description = "Destination not found")
    ),
    tag = "destinations"
)]
pub async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DestinationDetail>, ApiError> {
    Ok(Json(state.destinations.get(id).await?))
}

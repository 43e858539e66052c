// HTTP handlers for attraction endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::attractions::{
    Attraction, AttractionDetail, CreateAttractionRequest, UpdateAttractionRequest,
};
use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::query::{ListParams, Page};
use crate::AppState;

/// Create an attraction (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/attractions",
    request_body = CreateAttractionRequest,
    responses(
        (status = 201, description = "Attraction created", body = Attraction),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Name already in use")
    ),
    tag = "attractions"
)]
pub async fn create_attraction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateAttractionRequest>,
) -> Result<(StatusCode, Json<Attraction>), ApiError> {
    user.require_role(Role::Admin)?;
    tracing::debug!("Creating attraction: {}", payload.name);

    let attraction = state.attractions.create(payload).await?;
    Ok((StatusCode::CREATED, Json(attraction)))
}

/// List attractions with search, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/attractions",
    params(ListParams),
    responses(
        (status = 200, description = "Page of attractions: {results, page, limit, totalPages, totalResults}"),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "attractions"
)]
pub async fn list_attractions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Attraction>>, ApiError> {
    let page = state.attractions.list(params).await?;
    tracing::debug!(
        "Listed {} of {} attractions",
        page.results.len(),
        page.total_results
    );
    Ok(Json(page))
}

/// The five best rated attractions
#[utoipa::path(
    get,
    path = "/api/v1/attractions/top-5",
    responses(
        (status = 200, description = "Top rated attractions", body = Vec<Attraction>)
    ),
    tag = "attractions"
)]
pub async fn top_attractions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Attraction>>, ApiError> {
    Ok(Json(state.attractions.top_rated().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/attractions/slug/{slug}",
    params(("slug" = String, Path, description = "Attraction slug")),
    responses(
        (status = 200, description = "Attraction found", body = Attraction),
        (status = 404, description = "No attraction with this slug")
    ),
    tag = "attractions"
)]
pub async fn get_attraction_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Attraction>, ApiError> {
    Ok(Json(state.attractions.get_by_slug(&slug).await?))
}

/// Get an attraction with its reviews embedded
#[utoipa::path(
    get,
    path = "/api/v1/attractions/{id}",
    params(("id" = i32, Path, description = "Attraction ID")),
    responses(
        (status = 200, description = "Attraction with a `reviews` array"),
        (status = 404, description = "Attraction not found")
    ),
    tag = "attractions"
)]
pub async fn get_attraction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AttractionDetail>, ApiError> {
    tracing::debug!("Fetching attraction with id: {}", id);
    Ok(Json(state.attractions.get(id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/attractions/{id}",
    params(("id" = i32, Path, description = "Attraction ID")),
    request_body = UpdateAttractionRequest,
    responses(
        (status = 200, description = "Attraction updated", body = Attraction),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Attraction not found"),
        (status = 409, description = "Name already in use")
    ),
    tag = "attractions"
)]
pub async fn update_attraction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAttractionRequest>,
) -> Result<Json<Attraction>, ApiError> {
    user.require_role(Role::Admin)?;
    Ok(Json(state.attractions.update(id, payload).await?))
}

/// Delete an attraction and its reviews
#[utoipa::path(
    delete,
    path = "/api/v1/attractions/{id}",
    params(("id" = i32, Path, description = "Attraction ID")),
    responses(
        (status = 204, description = "Attraction deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Attraction not found")
    ),
    tag = "attractions"
)]
pub async fn delete_attraction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    user.require_role(Role::Admin)?;
    state.attractions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

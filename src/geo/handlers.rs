// HTTP handlers for radius and distance queries

use axum::{
    extract::{Path, State},
    Json,
};

use crate::attractions::Attraction;
use crate::destinations::Destination;
use crate::error::ApiError;
use crate::geo::{GeoResults, PlaceDistance};
use crate::AppState;

fn parse_distance(raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid distance '{}'", raw)))
}

/// Attractions within a radius of a point
#[utoipa::path(
    get,
    path = "/api/v1/attractions-within/{distance}/center/{lat_lng}/unit/{unit}",
    params(
        ("distance" = f64, Path, description = "Radius in the given unit"),
        ("lat_lng" = String, Path, description = "Centre as `lat,lng`", example = "34.05,-118.25"),
        ("unit" = String, Path, description = "`mi` for miles; anything else is kilometres")
    ),
    responses(
        (status = 200, description = "{results, data} with matching attractions"),
        (status = 400, description = "Malformed distance or coordinates")
    ),
    tag = "geo"
)]
pub async fn attractions_within(
    State(state): State<AppState>,
    Path((distance, lat_lng, unit)): Path<(String, String, String)>,
) -> Result<Json<GeoResults<Attraction>>, ApiError> {
    let distance = parse_distance(&distance)?;
    let attractions = state
        .attraction_geo
        .find_within_radius(distance, &lat_lng, &unit)
        .await?;
    Ok(Json(attractions.into()))
}

/// Distance from a point to every located attraction, nearest first
#[utoipa::path(
    get,
    path = "/api/v1/distances/{lat_lng}/unit/{unit}",
    params(
        ("lat_lng" = String, Path, description = "Origin as `lat,lng`"),
        ("unit" = String, Path, description = "`mi` for miles; anything else is kilometres")
    ),
    responses(
        (status = 200, description = "{results, data} with `{id, name, distance}` rows"),
        (status = 400, description = "Malformed coordinates")
    ),
    tag = "geo"
)]
pub async fn attraction_distances(
    State(state): State<AppState>,
    Path((lat_lng, unit)): Path<(String, String)>,
) -> Result<Json<GeoResults<PlaceDistance>>, ApiError> {
    let distances = state
        .attraction_geo
        .find_distances(&lat_lng, &unit)
        .await?;
    Ok(Json(distances.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/destinations-within/{distance}/center/{lat_lng}/unit/{unit}",
    params(
        ("distance" = f64, Path, description = "Radius in the given unit"),
        ("lat_lng" = String, Path, description = "Centre as `lat,lng`"),
        ("unit" = String, Path, description = "`mi` for miles; anything else is kilometres")
    ),
    responses(
        (status = 200, description = "{results, data} with matching destinations"),
        (status = 400, description = "Malformed distance or coordinates")
    ),
    tag = "geo"
)]
pub async fn destinations_within(
    State(state): State<AppState>,
    Path((distance, lat_lng, unit)): Path<(String, String, String)>,
) -> Result<Json<GeoResults<Destination>>, ApiError> {
    let distance = parse_distance(&distance)?;
    let destinations = state
        .destination_geo
        .find_within_radius(distance, &lat_lng, &unit)
        .await?;
    Ok(Json(destinations.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/destination-distances/{lat_lng}/unit/{unit}",
    params(
        ("lat_lng" = String, Path, description = "Origin as `lat,lng`"),
        ("unit" = String, Path, description = "`mi` for miles; anything else is kilometres")
    ),
    responses(
        (status = 200, description = "{results, data} with `{id, name, distance}` rows"),
        (status = 400, description = "Malformed coordinates")
    ),
    tag = "geo"
)]
pub async fn destination_distances(
    State(state): State<AppState>,
    Path((lat_lng, unit)): Path<(String, String)>,
) -> Result<Json<GeoResults<PlaceDistance>>, ApiError> {
    let distances = state
        .destination_geo
        .find_distances(&lat_lng, &unit)
        .await?;
    Ok(Json(distances.into()))
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_coordinates, validate_point_type};

/// A point on the sphere in degrees
///
/// Longitude and latitude are named fields so they cannot be swapped by
/// position; GeoJSON and SQL bindings both go through this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// GeoJSON coordinate order: `[lng, lat]`
    pub fn coordinates(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// Unit requested by the client for radius and distance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

impl DistanceUnit {
    /// "mi" selects miles; every other value is treated as kilometres
    pub fn from_param(unit: &str) -> Self {
        if unit == "mi" {
            DistanceUnit::Miles
        } else {
            DistanceUnit::Kilometers
        }
    }
}

fn point_type() -> String {
    "Point".to_string()
}

/// GeoJSON point as stored on attractions and destinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct GeoLocation {
    #[serde(rename = "type", default = "point_type")]
    #[validate(custom = "validate_point_type")]
    #[schema(example = "Point")]
    pub kind: String,
    /// `[lng, lat]`
    #[validate(custom = "validate_coordinates")]
    #[schema(example = json!([-1.3833, 5.3583]))]
    pub coordinates: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GeoLocation {
    pub fn from_point(point: GeoPoint, address: Option<String>, description: Option<String>) -> Self {
        Self {
            kind: point_type(),
            coordinates: point.coordinates().to_vec(),
            address,
            description,
        }
    }

    /// The point, if the coordinates form a `[lng, lat]` pair
    pub fn point(&self) -> Option<GeoPoint> {
        match self.coordinates.as_slice() {
            [lng, lat] => Some(GeoPoint::new(*lng, *lat)),
            _ => None,
        }
    }
}

/// Row of a nearest-point query: only name and distance are projected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlaceDistance {
    pub id: i32,
    pub name: String,
    /// Distance from the query point in the requested unit
    pub distance: f64,
}

/// Envelope for geo query responses
#[derive(Debug, Serialize)]
pub struct GeoResults<T> {
    pub results: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for GeoResults<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            results: data.len(),
            data,
        }
    }
}

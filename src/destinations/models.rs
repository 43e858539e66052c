use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::attractions::Attraction;
use crate::geo::{GeoLocation, GeoPoint};
use crate::validation::validate_not_blank;

/// Destination: a region grouping attractions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub location: GeoLocation,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct DestinationRow {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub location_lng: f64,
    pub location_lat: f64,
    pub location_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DestinationRow> for Destination {
    fn from(row: DestinationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            summary: row.summary,
            location: GeoLocation::from_point(
                GeoPoint::new(row.location_lng, row.location_lat),
                None,
                row.location_description,
            ),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Destination with the attractions that reference it
#[derive(Debug, Serialize)]
pub struct DestinationDetail {
    #[serde(flatten)]
    pub destination: Destination,
    pub attractions: Vec<Attraction>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateDestinationRequest {
    #[validate(
        length(min = 1, max = 120, message = "Name must be between 1 and 120 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "Volta Region")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub summary: String,
    #[validate]
    pub location: GeoLocation,
}

/// Validated destination fields ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewDestination {
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub point: GeoPoint,
    pub location_description: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::geo::{GeoLocation, GeoPoint};
use crate::reviews::Review;
use crate::validation::validate_not_blank;

/// Average given to an attraction with no reviews
pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;
pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Rounds to one decimal (half away from zero) and clamps to [1, 5]
///
/// Applied whenever a ratings average is stored, never during aggregation.
pub fn normalize_ratings_average(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    rounded.clamp(MIN_RATING, MAX_RATING)
}

/// Denormalized review statistics written onto an attraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub ratings_quantity: i32,
    /// Unrounded arithmetic mean
    pub ratings_average: f64,
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self {
            ratings_quantity: 0,
            ratings_average: DEFAULT_RATINGS_AVERAGE,
        }
    }
}

impl RatingSummary {
    /// The average as it is persisted
    pub fn stored_average(&self) -> f64 {
        normalize_ratings_average(self.ratings_average)
    }
}

/// Domain model for an attraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attraction {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub is_accessible_for_free: bool,
    pub public_access: bool,
    pub slogan: Option<String>,
    pub location: Option<GeoLocation>,
    pub destination_id: Option<i32>,
    #[schema(example = 4.5)]
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat database row; the location columns fold into a GeoJSON point
#[derive(Debug, FromRow)]
pub struct AttractionRow {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub is_accessible_for_free: bool,
    pub public_access: bool,
    pub slogan: Option<String>,
    pub location_lng: Option<f64>,
    pub location_lat: Option<f64>,
    pub location_address: Option<String>,
    pub location_description: Option<String>,
    pub destination_id: Option<i32>,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AttractionRow> for Attraction {
    fn from(row: AttractionRow) -> Self {
        let location = match (row.location_lng, row.location_lat) {
            (Some(lng), Some(lat)) => Some(GeoLocation::from_point(
                GeoPoint::new(lng, lat),
                row.location_address,
                row.location_description,
            )),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            summary: row.summary,
            description: row.description,
            opening_hours: row.opening_hours,
            is_accessible_for_free: row.is_accessible_for_free,
            public_access: row.public_access,
            slogan: row.slogan,
            location,
            destination_id: row.destination_id,
            ratings_average: row.ratings_average,
            ratings_quantity: row.ratings_quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Attraction with its reviews embedded
#[derive(Debug, Serialize)]
pub struct AttractionDetail {
    #[serde(flatten)]
    pub attraction: Attraction,
    pub reviews: Vec<Review>,
}

fn default_public_access() -> bool {
    true
}

/// Request DTO for creating an attraction
///
/// Ratings fields are absent on purpose: unknown fields are rejected so a
/// client cannot set them.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateAttractionRequest {
    #[validate(
        length(min = 1, max = 120, message = "Name must be between 1 and 120 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "Kakum National Park")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub summary: String,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub is_accessible_for_free: bool,
    #[serde(default = "default_public_access")]
    pub public_access: bool,
    pub slogan: Option<String>,
    #[validate]
    pub location: Option<GeoLocation>,
    pub destination_id: Option<i32>,
}

/// Request DTO for a partial attraction update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAttractionRequest {
    #[validate(
        length(min = 1, max = 120, message = "Name must be between 1 and 120 characters"),
        custom = "validate_not_blank"
    )]
    pub name: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub summary: Option<String>,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub is_accessible_for_free: Option<bool>,
    pub public_access: Option<bool>,
    pub slogan: Option<String>,
    #[validate]
    pub location: Option<GeoLocation>,
    pub destination_id: Option<i32>,
}

/// Every client-writable attraction field, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct AttractionDraft {
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub is_accessible_for_free: bool,
    pub public_access: bool,
    pub slogan: Option<String>,
    pub location: Option<GeoLocation>,
    pub destination_id: Option<i32>,
}

impl AttractionDraft {
    pub fn from_request(request: CreateAttractionRequest, slug: String) -> Self {
        Self {
            name: request.name.trim().to_string(),
            slug,
            summary: request.summary.trim().to_string(),
            description: request.description,
            opening_hours: request.opening_hours,
            is_accessible_for_free: request.is_accessible_for_free,
            public_access: request.public_access,
            slogan: request.slogan,
            location: request.location,
            destination_id: request.destination_id,
        }
    }

    /// Merges a patch over the current record
    pub fn merged(existing: Attraction, patch: UpdateAttractionRequest, slug: String) -> Self {
        Self {
            name: patch
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or(existing.name),
            slug,
            summary: patch
                .summary
                .map(|s| s.trim().to_string())
                .unwrap_or(existing.summary),
            description: patch.description.or(existing.description),
            opening_hours: patch.opening_hours.or(existing.opening_hours),
            is_accessible_for_free: patch
                .is_accessible_for_free
                .unwrap_or(existing.is_accessible_for_free),
            public_access: patch.public_access.unwrap_or(existing.public_access),
            slogan: patch.slogan.or(existing.slogan),
            location: patch.location.or(existing.location),
            destination_id: patch.destination_id.or(existing.destination_id),
        }
    }

    /// Location columns in table order: lng, lat, address, description
    pub fn location_columns(&self) -> (Option<f64>, Option<f64>, Option<String>, Option<String>) {
        match &self.location {
            Some(location) => {
                let point = location.point();
                (
                    point.map(|p| p.lng),
                    point.map(|p| p.lat),
                    location.address.clone(),
                    location.description.clone(),
                )
            }
            None => (None, None, None, None),
        }
    }
}

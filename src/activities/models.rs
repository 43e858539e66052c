use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::geo::{GeoLocation, GeoPoint};
use crate::validation::validate_not_blank;

/// How demanding an activity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

/// Domain model for an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i32,
    pub name: String,
    pub slug: String,
    #[schema(example = 45.0)]
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: String,
    pub description: Option<String>,
    /// Length of the activity in hours
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub start_location: Option<GeoLocation>,
    pub attraction_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct ActivityRow {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: String,
    pub description: Option<String>,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub start_lng: Option<f64>,
    pub start_lat: Option<f64>,
    pub start_address: Option<String>,
    pub start_description: Option<String>,
    pub attraction_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        let start_location = match (row.start_lng, row.start_lat) {
            (Some(lng), Some(lat)) => Some(GeoLocation::from_point(
                GeoPoint::new(lng, lat),
                row.start_address,
                row.start_description,
            )),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            price: row.price,
            price_discount: row.price_discount,
            summary: row.summary,
            description: row.description,
            duration: row.duration,
            max_group_size: row.max_group_size,
            difficulty: row.difficulty,
            start_location,
            attraction_id: row.attraction_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request DTO for adding an activity; the attraction comes from the path
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateActivityRequest {
    #[validate(
        length(min = 10, max = 40, message = "Name must be between 10 and 40 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "Canopy Walkway Tour")]
    pub name: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "Discount must not be negative"))]
    pub price_discount: Option<f64>,
    #[validate(custom = "validate_not_blank")]
    pub summary: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1"))]
    pub duration: i32,
    #[validate(range(min = 1, message = "Group size must be at least 1"))]
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    #[validate]
    pub start_location: Option<GeoLocation>,
}

/// Request DTO for a partial activity update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateActivityRequest {
    #[validate(
        length(min = 10, max = 40, message = "Name must be between 10 and 40 characters"),
        custom = "validate_not_blank"
    )]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, message = "Discount must not be negative"))]
    pub price_discount: Option<f64>,
    #[validate(custom = "validate_not_blank")]
    pub summary: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1"))]
    pub duration: Option<i32>,
    #[validate(range(min = 1, message = "Group size must be at least 1"))]
    pub max_group_size: Option<i32>,
    pub difficulty: Option<Difficulty>,
    #[validate]
    pub start_location: Option<GeoLocation>,
}

/// Every writable activity field, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDraft {
    pub name: String,
    pub slug: String,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: String,
    pub description: Option<String>,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub start_location: Option<GeoLocation>,
    pub attraction_id: i32,
}

impl ActivityDraft {
    pub fn from_request(request: CreateActivityRequest, attraction_id: i32, slug: String) -> Self {
        Self {
            name: request.name.trim().to_string(),
            slug,
            price: request.price,
            price_discount: request.price_discount,
            summary: request.summary.trim().to_string(),
            description: request.description,
            duration: request.duration,
            max_group_size: request.max_group_size,
            difficulty: request.difficulty,
            start_location: request.start_location,
            attraction_id,
        }
    }

    pub fn merged(existing: Activity, patch: UpdateActivityRequest, slug: String) -> Self {
        Self {
            name: patch
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or(existing.name),
            slug,
            price: patch.price.unwrap_or(existing.price),
            price_discount: patch.price_discount.or(existing.price_discount),
            summary: patch
                .summary
                .map(|s| s.trim().to_string())
                .unwrap_or(existing.summary),
            description: patch.description.or(existing.description),
            duration: patch.duration.unwrap_or(existing.duration),
            max_group_size: patch.max_group_size.unwrap_or(existing.max_group_size),
            difficulty: patch.difficulty.unwrap_or(existing.difficulty),
            start_location: patch.start_location.or(existing.start_location),
            attraction_id: existing.attraction_id,
        }
    }

    /// A discount, when present, must undercut the price
    pub fn discount_below_price(&self) -> bool {
        self.price_discount.map_or(true, |discount| discount < self.price)
    }

    /// Start location columns in table order: lng, lat, address, description
    pub fn start_location_columns(
        &self,
    ) -> (Option<f64>, Option<f64>, Option<String>, Option<String>) {
        match &self.start_location {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn create_body() -> serde_json::Value {
        serde_json::json!({
            "name": "Canopy Walkway Tour",
            "price": 45.0,
            "summary": "Seven bridges above the forest floor",
            "duration": 2,
            "maxGroupSize": 12,
            "difficulty": "medium",
        })
    }

    #[test]
    fn test_difficulty_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Difficult).unwrap(), "\"difficult\"");
        assert!(serde_json::from_str::<Difficulty>("\"hard\"").is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateActivityRequest = serde_json::from_value(create_body()).unwrap();
        assert!(request.validate().is_ok());

        let mut body = create_body();
        body["name"] = "Short".into();
        body["maxGroupSize"] = 0.into();
        let request: CreateActivityRequest = serde_json::from_value(body).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("name"));
        assert!(errors.errors().contains_key("max_group_size"));
    }

    #[test]
    fn test_create_request_rejects_attraction_in_body() {
        let mut body = create_body();
        body["attractionId"] = 3.into();
        assert!(serde_json::from_value::<CreateActivityRequest>(body).is_err());
    }

    #[test]
    fn test_discount_below_price() {
        let request: CreateActivityRequest = serde_json::from_value(create_body()).unwrap();
        let mut draft = ActivityDraft::from_request(request, 1, "canopy-walkway-tour".into());
        assert!(draft.discount_below_price());

        draft.price_discount = Some(30.0);
        assert!(draft.discount_below_price());

        draft.price_discount = Some(45.0);
        assert!(!draft.discount_below_price());
    }

    #[test]
    fn test_row_folds_start_location() {
        let now = Utc::now();
        let row = ActivityRow {
            id: 1,
            name: "Canopy Walkway Tour".into(),
            slug: "canopy-walkway-tour".into(),
            price: 45.0,
            price_discount: None,
            summary: "Bridges".into(),
            description: None,
            duration: 2,
            max_group_size: 12,
            difficulty: Difficulty::Easy,
            start_lng: Some(-1.38),
            start_lat: Some(5.35),
            start_address: None,
            start_description: Some("Visitor centre".into()),
            attraction_id: 4,
            created_at: now,
            updated_at: now,
        };
        let activity = Activity::from(row);
        let start = activity.start_location.unwrap();
        assert_eq!(start.coordinates, vec![-1.38, 5.35]);
        assert_eq!(start.description.as_deref(), Some("Visitor centre"));
    }
}

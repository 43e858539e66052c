use std::sync::Arc;

use crate::error::ApiError;
use crate::geo::{
    distance_multiplier, parse_lat_lng, radius_in_radians, DistanceUnit, GeoRepository,
    PlaceDistance,
};

/// Translates radius/point request parameters into spherical queries
pub struct GeoResolver<T> {
    repository: Arc<dyn GeoRepository<Place = T>>,
}

impl<T> Clone for GeoResolver<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<T: Send> GeoResolver<T> {
    pub fn new(repository: Arc<dyn GeoRepository<Place = T>>) -> Self {
        Self { repository }
    }

    /// All records within `distance` (in `unit`) of the `"lat,lng"` centre
    pub async fn find_within_radius(
        &self,
        distance: f64,
        lat_lng: &str,
        unit: &str,
    ) -> Result<Vec<T>, ApiError> {
        let center = parse_lat_lng(lat_lng)?;

        if !distance.is_finite() || distance < 0.0 {
            return Err(ApiError::bad_request(
                "Distance must be a non-negative number",
            ));
        }

        let unit = DistanceUnit::from_param(unit);
        let radius = radius_in_radians(distance, unit);

        tracing::debug!(
            "Radius query: center=({}, {}) radius={} rad unit={:?}",
            center.lng,
            center.lat,
            radius,
            unit
        );

        let places = self.repository.find_within_sphere(center, radius).await?;

        tracing::debug!("Radius query returned {} records", places.len());
        Ok(places)
    }

    /// Every located record with its distance from the `"lat,lng"` point, nearest first
    pub async fn find_distances(
        &self,
        lat_lng: &str,
        unit: &str,
    ) -> Result<Vec<PlaceDistance>, ApiError> {
        let center = parse_lat_lng(lat_lng)?;
        let multiplier = distance_multiplier(DistanceUnit::from_param(unit));

        let mut distances = self.repository.geo_near(center, multiplier).await?;

        // Store order is not trusted; nearest-first is part of the contract
        distances.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        Ok(distances)
    }
}

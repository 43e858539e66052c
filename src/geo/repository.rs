use async_trait::async_trait;

use crate::error::DbResult;
use crate::geo::{GeoPoint, PlaceDistance};

/// Spherical queries over a point-indexed collection
#[async_trait]
pub trait GeoRepository: Send + Sync {
    type Place: Send;

    /// Every record whose point lies within `radius_radians` of `center` (inclusive)
    async fn find_within_sphere(
        &self,
        center: GeoPoint,
        radius_radians: f64,
    ) -> DbResult<Vec<Self::Place>>;

    /// Every located record with its distance from `center`, nearest first
    ///
    /// Distances are metres multiplied by `distance_multiplier`.
    async fn geo_near(&self, center: GeoPoint, distance_multiplier: f64) -> DbResult<Vec<PlaceDistance>>;
}

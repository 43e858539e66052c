use std::sync::Arc;

use validator::Validate;

use crate::attractions::AttractionRepository;
use crate::destinations::{
    CreateDestinationRequest, Destination, DestinationDetail, DestinationRepository,
    NewDestination,
};
use crate::error::{is_unique_violation, ApiError};
use crate::query::{ListParams, Page, QueryValidator, SortField};
use crate::validation::slugify;

const SORTABLE_FIELDS: &[SortField] = &[SortField::Name, SortField::CreatedAt];

#[derive(Clone)]
pub struct DestinationService {
    destinations: Arc<dyn DestinationRepository>,
    attractions: Arc<dyn AttractionRepository>,
}

impl DestinationService {
    pub fn new(
        destinations: Arc<dyn DestinationRepository>,
        attractions: Arc<dyn AttractionRepository>,
    ) -> Self {
        Self {
            destinations,
            attractions,
        }
    }

    pub async fn create(&self, request: CreateDestinationRequest) -> Result<Destination, ApiError> {
        request.validate()?;

        let name = request.name.trim().to_string();
        if self.destinations.name_taken(&name).await? {
            tracing::warn!("Attempt to create duplicate destination: {}", name);
            return Err(duplicate_name(&name));
        }

        let point = request
            .location
            .point()
            .ok_or_else(|| ApiError::bad_request("Location must be a [lng, lat] point"))?;

        let destination = NewDestination {
            slug: slugify(&name),
            summary: request.summary.trim().to_string(),
            point,
            location_description: request.location.description,
            name,
        };

        let created = self.destinations.create(&destination).await.map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name(&destination.name)
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

        tracing::info!("Created destination id={} slug={}", created.id, created.slug);
        Ok(created)
    }

    /// The destination with its attractions embedded
    pub async fn get(&self, id: i32) -> Result<DestinationDetail, ApiError> {
        let destination = self
            .destinations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Destination", id))?;

        let attractions = self.attractions.list_by_destination(id).await?;

        Ok(DestinationDetail {
            destination,
            attractions,
        })
    }

    pub async fn list(&self, params: ListParams) -> Result<Page<Destination>, ApiError> {
        let mut query = QueryValidator::validate(params, SORTABLE_FIELDS)?;
        query.destination_id = None;
        Ok(self.destinations.list(&query).await?)
    }
}

fn duplicate_name(name: &str) -> ApiError {
    ApiError::Conflict {
        message: format!("Destination with name '{}' already exists", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn request(name: &str, lng: f64, lat: f64) -> CreateDestinationRequest {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "summary": "Lakes and falls",
            "location": {"type": "Point", "coordinates": [lng, lat], "description": "East"},
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_with_attractions() {
        let store = MemoryStore::new();
        let service = DestinationService::new(store.destinations(), store.attractions());

        let destination = service.create(request("Volta Region", 0.47, 6.6)).await.unwrap();
        assert_eq!(destination.slug, "volta-region");
        assert_eq!(destination.location.description.as_deref(), Some("East"));

        store
            .seed_attraction("Wli Falls", Some((0.59, 7.12)), Some(destination.id))
            .await;
        store.seed_attraction("Mole", None, None).await;

        let detail = service.get(destination.id).await.unwrap();
        assert_eq!(detail.attractions.len(), 1);
        assert_eq!(detail.attractions[0].name, "Wli Falls");
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = MemoryStore::new();
        let service = DestinationService::new(store.destinations(), store.attractions());

        service.create(request("Volta", 0.47, 6.6)).await.unwrap();
        let result = service.create(request("Volta", 1.0, 6.0)).await;
        assert!(matches!(result, Err(ApiError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_list_rejects_ratings_sort() {
        let store = MemoryStore::new();
        let service = DestinationService::new(store.destinations(), store.attractions());
        let params = ListParams {
            sort_by: Some("ratingsAverage:desc".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.list(params).await,
            Err(ApiError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_missing_destination() {
        let store = MemoryStore::new();
        let service = DestinationService::new(store.destinations(), store.attractions());
        assert!(matches!(service.get(1).await, Err(ApiError::NotFound { .. })));
    }
}

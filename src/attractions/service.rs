use std::sync::Arc;

use validator::Validate;

use crate::attractions::{
    Attraction, AttractionDetail, AttractionDraft, AttractionRepository, CreateAttractionRequest,
    UpdateAttractionRequest,
};
use crate::destinations::DestinationRepository;
use crate::error::{is_unique_violation, ApiError};
use crate::query::{ListParams, ListQuery, Page, QueryValidator, SortField};
use crate::reviews::ReviewRepository;
use crate::validation::slugify;

/// Size of the "top rated" shortcut listing
pub const TOP_RATED_LIMIT: u32 = 5;

const SORTABLE_FIELDS: &[SortField] = &[
    SortField::Name,
    SortField::RatingsAverage,
    SortField::RatingsQuantity,
    SortField::CreatedAt,
];

/// Attraction CRUD and read models
#[derive(Clone)]
pub struct AttractionService {
    attractions: Arc<dyn AttractionRepository>,
    reviews: Arc<dyn ReviewRepository>,
    destinations: Arc<dyn DestinationRepository>,
}

impl AttractionService {
    pub fn new(
        attractions: Arc<dyn AttractionRepository>,
        reviews: Arc<dyn ReviewRepository>,
        destinations: Arc<dyn DestinationRepository>,
    ) -> Self {
        Self {
            attractions,
            reviews,
            destinations,
        }
    }

    pub async fn create(&self, request: CreateAttractionRequest) -> Result<Attraction, ApiError> {
        request.validate()?;

        let name = request.name.trim();
        if self.attractions.name_taken(name, None).await? {
            return Err(duplicate_name(name));
        }
        self.ensure_destination(request.destination_id).await?;

        let slug = slugify(name);
        self.ensure_slug_free(&slug, None).await?;
        let draft = AttractionDraft::from_request(request, slug);

        let attraction = self
            .attractions
            .create(&draft)
            .await
            .map_err(|e| unique_to_conflict(e, &draft.name))?;

        tracing::info!(
            "Created attraction id={} slug={}",
            attraction.id,
            attraction.slug
        );
        Ok(attraction)
    }

    /// The attraction with its reviews, newest first
    pub async fn get(&self, id: i32) -> Result<AttractionDetail, ApiError> {
        let attraction = self
            .attractions
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Attraction", id))?;

        let reviews = self.reviews.find_by_attraction(id).await?;

        Ok(AttractionDetail {
            attraction,
            reviews,
        })
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Attraction, ApiError> {
        self.attractions
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: "Attraction".to_string(),
                id: format!("slug '{}'", slug),
            })
    }

    pub async fn list(&self, params: ListParams) -> Result<Page<Attraction>, ApiError> {
        let query = QueryValidator::validate(params, SORTABLE_FIELDS)?;
        tracing::debug!("Listing attractions: {:?}", query);
        Ok(self.attractions.list(&query).await?)
    }

    pub async fn top_rated(&self) -> Result<Vec<Attraction>, ApiError> {
        let page = self
            .attractions
            .list(&ListQuery::top_rated(TOP_RATED_LIMIT))
            .await?;
        Ok(page.results)
    }

    pub async fn update(
        &self,
        id: i32,
        patch: UpdateAttractionRequest,
    ) -> Result<Attraction, ApiError> {
        patch.validate()?;

        let existing = self
            .attractions
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Attraction", id))?;

        if let Some(name) = patch.name.as_deref().map(str::trim) {
            if name != existing.name && self.attractions.name_taken(name, Some(id)).await? {
                return Err(duplicate_name(name));
            }
        }
        self.ensure_destination(patch.destination_id).await?;

        let slug = match patch.name.as_deref() {
            Some(name) => slugify(name),
            None => existing.slug.clone(),
        };
        if slug != existing.slug {
            self.ensure_slug_free(&slug, Some(id)).await?;
        }
        let draft = AttractionDraft::merged(existing, patch, slug);

        let attraction = self
            .attractions
            .update(id, &draft)
            .await
            .map_err(|e| unique_to_conflict(e, &draft.name))?
            .ok_or_else(|| ApiError::not_found("Attraction", id))?;

        tracing::info!("Updated attraction id={}", id);
        Ok(attraction)
    }

    pub async fn delete(&self, id: i32) -> Result<(), ApiError> {
        if !self.attractions.delete(id).await? {
            return Err(ApiError::not_found("Attraction", id));
        }
        tracing::info!("Deleted attraction id={} with its reviews", id);
        Ok(())
    }

    /// Slugs address attractions, so two names may not share one
    async fn ensure_slug_free(&self, slug: &str, exclude_id: Option<i32>) -> Result<(), ApiError> {
        if self.attractions.slug_taken(slug, exclude_id).await? {
            tracing::warn!("Attraction slug '{}' is already in use", slug);
            return Err(ApiError::Conflict {
                message: format!("Attraction slug '{}' is already in use", slug),
            });
        }
        Ok(())
    }

    async fn ensure_destination(&self, destination_id: Option<i32>) -> Result<(), ApiError> {
        if let Some(destination_id) = destination_id {
            if self.destinations.find_by_id(destination_id).await?.is_none() {
                return Err(ApiError::not_found("Destination", destination_id));
            }
        }
        Ok(())
    }
}

fn duplicate_name(name: &str) -> ApiError {
    tracing::warn!("Attempt to create duplicate attraction: {}", name);
    ApiError::Conflict {
        message: format!("Attraction with name '{}' already exists", name),
    }
}

fn unique_to_conflict(error: sqlx::Error, name: &str) -> ApiError {
    if is_unique_violation(&error) {
        duplicate_name(name)
    } else {
        ApiError::DatabaseError(error)
    }
}

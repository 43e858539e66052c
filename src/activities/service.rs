use std::sync::Arc;

use validator::Validate;

use crate::activities::{
    Activity, ActivityDraft, ActivityRepository, CreateActivityRequest, UpdateActivityRequest,
};
use crate::attractions::AttractionRepository;
use crate::error::{is_unique_violation, ApiError};
use crate::query::{ListParams, Page, QueryValidator, SortField};
use crate::validation::slugify;

const SORTABLE_FIELDS: &[SortField] = &[SortField::Name, SortField::CreatedAt];

/// Activities offered at attractions
#[derive(Clone)]
pub struct ActivityService {
    activities: Arc<dyn ActivityRepository>,
    attractions: Arc<dyn AttractionRepository>,
}

impl ActivityService {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        attractions: Arc<dyn AttractionRepository>,
    ) -> Self {
        Self {
            activities,
            attractions,
        }
    }

    pub async fn create(
        &self,
        attraction_id: i32,
        request: CreateActivityRequest,
    ) -> Result<Activity, ApiError> {
        request.validate()?;
        self.ensure_attraction(attraction_id).await?;

        let name = request.name.trim();
        if self.activities.name_taken(attraction_id, name, None).await? {
            return Err(duplicate_name(name));
        }

        let slug = slugify(name);
        let draft = ActivityDraft::from_request(request, attraction_id, slug);
        ensure_discount(&draft)?;

        let activity = self
            .activities
            .create(&draft)
            .await
            .map_err(|e| unique_to_conflict(e, &draft.name))?;

        tracing::info!(
            "Created activity id={} for attraction {}",
            activity.id,
            attraction_id
        );
        Ok(activity)
    }

    /// One page of an attraction's activities
    pub async fn list(
        &self,
        attraction_id: i32,
        params: ListParams,
    ) -> Result<Page<Activity>, ApiError> {
        self.ensure_attraction(attraction_id).await?;

        let mut query = QueryValidator::validate(params, SORTABLE_FIELDS)?;
        query.destination_id = None;
        query.attraction_id = Some(attraction_id);
        Ok(self.activities.list(&query).await?)
    }

    pub async fn get(&self, id: i32) -> Result<Activity, ApiError> {
        self.activities
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Activity", id))
    }

    pub async fn update(&self, id: i32, patch: UpdateActivityRequest) -> Result<Activity, ApiError> {
        patch.validate()?;

        let existing = self.get(id).await?;

        if let Some(name) = patch.name.as_deref().map(str::trim) {
            if name != existing.name
                && self
                    .activities
                    .name_taken(existing.attraction_id, name, Some(id))
                    .await?
            {
                return Err(duplicate_name(name));
            }
        }

        let slug = match patch.name.as_deref() {
            Some(name) => slugify(name),
            None => existing.slug.clone(),
        };
        let draft = ActivityDraft::merged(existing, patch, slug);
        ensure_discount(&draft)?;

        let activity = self
            .activities
            .update(id, &draft)
            .await
            .map_err(|e| unique_to_conflict(e, &draft.name))?
            .ok_or_else(|| ApiError::not_found("Activity", id))?;

        tracing::info!("Updated activity id={}", id);
        Ok(activity)
    }

    pub async fn delete(&self, id: i32) -> Result<(), ApiError> {
        if !self.activities.delete(id).await? {
            return Err(ApiError::not_found("Activity", id));
        }
        tracing::info!("Deleted activity id={}", id);
        Ok(())
    }

    async fn ensure_attraction(&self, attraction_id: i32) -> Result<(), ApiError> {
        if self.attractions.find_by_id(attraction_id).await?.is_none() {
            return Err(ApiError::not_found("Attraction", attraction_id));
        }
        Ok(())
    }
}

fn ensure_discount(draft: &ActivityDraft) -> Result<(), ApiError> {
    if draft.discount_below_price() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Discount price ({}) should be below regular price ({})",
            draft.price_discount.unwrap_or_default(),
            draft.price
        )))
    }
}

fn duplicate_name(name: &str) -> ApiError {
    tracing::warn!("Attempt to create duplicate activity: {}", name);
    ApiError::Conflict {
        message: format!("Activity with name '{}' already exists at this attraction", name),
    }
}

fn unique_to_conflict(error: sqlx::Error, name: &str) -> ApiError {
    if is_unique_violation(&error) {
        duplicate_name(name)
    } else {
        ApiError::DatabaseError(error)
    }
}

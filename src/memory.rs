// In-memory repositories for tests
// Same contracts as the PostgreSQL repositories; geo queries use the in-process haversine

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::activities::{Activity, ActivityDraft, ActivityRepository};
use crate::attractions::{Attraction, AttractionDraft, AttractionRepository, RatingSummary};
use crate::destinations::{Destination, DestinationRepository, NewDestination};
use crate::error::DbResult;
use crate::geo::{
    distance_in_meters, within_sphere, GeoLocation, GeoPoint, GeoRepository, PlaceDistance,
};
use crate::query::{ListQuery, Page, SortField, SortOrder};
use crate::reviews::{Review, ReviewRepository};

#[derive(Default)]
struct MemoryState {
    attractions: BTreeMap<i32, Attraction>,
    reviews: BTreeMap<i32, Review>,
    destinations: BTreeMap<i32, Destination>,
    activities: BTreeMap<i32, Activity>,
    next_id: i32,
}

impl MemoryState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared backing store; each accessor hands out a repository view over it
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    pub fn attractions(&self) -> Arc<dyn AttractionRepository> {
        Arc::new(MemoryAttractions(self.clone()))
    }

    pub fn attraction_geo(&self) -> Arc<dyn GeoRepository<Place = Attraction>> {
        Arc::new(MemoryAttractions(self.clone()))
    }

    pub fn activities(&self) -> Arc<dyn ActivityRepository> {
        Arc::new(MemoryActivities(self.clone()))
    }

    pub fn reviews(&self) -> Arc<dyn ReviewRepository> {
        Arc::new(MemoryReviews(self.clone()))
    }

    pub fn destinations(&self) -> Arc<dyn DestinationRepository> {
        Arc::new(MemoryDestinations(self.clone()))
    }

    pub fn destination_geo(&self) -> Arc<dyn GeoRepository<Place = Destination>> {
        Arc::new(MemoryDestinations(self.clone()))
    }

    /// Inserts an attraction; `location` is `(lng, lat)`
    pub async fn seed_attraction(
        &self,
        name: &str,
        location: Option<(f64, f64)>,
        destination_id: Option<i32>,
    ) -> Attraction {
        let draft = AttractionDraft {
            name: name.to_string(),
            slug: crate::validation::slugify(name),
            summary: format!("All about {}", name),
            description: None,
            opening_hours: None,
            is_accessible_for_free: false,
            public_access: true,
            slogan: None,
            location: location
                .map(|(lng, lat)| GeoLocation::from_point(GeoPoint::new(lng, lat), None, None)),
            destination_id,
        };
        self.attractions().create(&draft).await.unwrap()
    }

    /// Inserts a destination at `(lng, lat)`
    pub async fn seed_destination(&self, name: &str, lng: f64, lat: f64) -> Destination {
        let destination = NewDestination {
            name: name.to_string(),
            slug: crate::validation::slugify(name),
            summary: format!("All about {}", name),
            point: GeoPoint::new(lng, lat),
            location_description: None,
        };
        self.destinations().create(&destination).await.unwrap()
    }

    /// Inserts a review without recomputing the attraction's ratings
    pub async fn seed_review(&self, attraction_id: i32, user_id: i32, rating: f64) -> Review {
        self.reviews()
            .create(attraction_id, user_id, "Seeded review", rating)
            .await
            .unwrap()
    }

    /// Overwrites stored ratings directly, bypassing aggregation
    pub async fn set_ratings(&self, attraction_id: i32, average: f64, quantity: i32) {
        let mut state = self.state();
        let attraction = state.attractions.get_mut(&attraction_id).unwrap();
        attraction.ratings_average = average;
        attraction.ratings_quantity = quantity;
    }
}

fn paginate<T>(items: Vec<T>, query: &ListQuery) -> Page<T> {
    let total = items.len() as i64;
    let results = items
        .into_iter()
        .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
        .take(query.limit as usize)
        .collect();
    Page::new(results, query, total)
}

fn ordered(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn name_matches(name: &str, needle: &Option<String>) -> bool {
    needle
        .as_ref()
        .map_or(true, |n| name.to_lowercase().contains(&n.to_lowercase()))
}

struct MemoryAttractions(MemoryStore);

impl MemoryAttractions {
    fn located(&self) -> Vec<(Attraction, GeoPoint)> {
        self.0
            .state()
            .attractions
            .values()
            .filter_map(|a| {
                let point = a.location.as_ref()?.point()?;
                Some((a.clone(), point))
            })
            .collect()
    }
}

#[async_trait]
impl AttractionRepository for MemoryAttractions {
    async fn create(&self, draft: &AttractionDraft) -> DbResult<Attraction> {
        let mut state = self.0.state();
        let id = state.next_id();
        let now = Utc::now();
        let summary = RatingSummary::default();
        let attraction = Attraction {
            id,
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            opening_hours: draft.opening_hours.clone(),
            is_accessible_for_free: draft.is_accessible_for_free,
            public_access: draft.public_access,
            slogan: draft.slogan.clone(),
            location: draft.location.clone(),
            destination_id: draft.destination_id,
            ratings_average: summary.stored_average(),
            ratings_quantity: summary.ratings_quantity,
            created_at: now,
            updated_at: now,
        };
        state.attractions.insert(id, attraction.clone());
        Ok(attraction)
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Attraction>> {
        Ok(self.0.state().attractions.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Attraction>> {
        Ok(self
            .0
            .state()
            .attractions
            .values()
            .find(|a| a.slug == slug)
            .cloned())
    }

    async fn list(&self, query: &ListQuery) -> DbResult<Page<Attraction>> {
        let mut items: Vec<Attraction> = self
            .0
            .state()
            .attractions
            .values()
            .filter(|a| name_matches(&a.name, &query.name))
            .filter(|a| query.destination_id.map_or(true, |d| a.destination_id == Some(d)))
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let ordering = match query.sort_field {
                SortField::Name => a.name.cmp(&b.name),
                SortField::RatingsAverage => a.ratings_average.total_cmp(&b.ratings_average),
                SortField::RatingsQuantity => a.ratings_quantity.cmp(&b.ratings_quantity),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            ordered(ordering, query.sort_order).then(a.id.cmp(&b.id))
        });

        Ok(paginate(items, query))
    }

    async fn list_by_destination(&self, destination_id: i32) -> DbResult<Vec<Attraction>> {
        let mut items: Vec<Attraction> = self
            .0
            .state()
            .attractions
            .values()
            .filter(|a| a.destination_id == Some(destination_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn update(&self, id: i32, draft: &AttractionDraft) -> DbResult<Option<Attraction>> {
        let mut state = self.0.state();
        let Some(attraction) = state.attractions.get_mut(&id) else {
            return Ok(None);
        };
        attraction.name = draft.name.clone();
        attraction.slug = draft.slug.clone();
        attraction.summary = draft.summary.clone();
        attraction.description = draft.description.clone();
        attraction.opening_hours = draft.opening_hours.clone();
        attraction.is_accessible_for_free = draft.is_accessible_for_free;
        attraction.public_access = draft.public_access;
        attraction.slogan = draft.slogan.clone();
        attraction.location = draft.location.clone();
        attraction.destination_id = draft.destination_id;
        attraction.updated_at = Utc::now();
        Ok(Some(attraction.clone()))
    }

    async fn delete(&self, id: i32) -> DbResult<bool> {
        let mut state = self.0.state();
        let removed = state.attractions.remove(&id).is_some();
        if removed {
            state.reviews.retain(|_, r| r.attraction_id != id);
            state.activities.retain(|_, a| a.attraction_id != id);
        }
        Ok(removed)
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> DbResult<bool> {
        Ok(self
            .0
            .state()
            .attractions
            .values()
            .any(|a| a.name == name && Some(a.id) != exclude_id))
    }

    async fn slug_taken(&self, slug: &str, exclude_id: Option<i32>) -> DbResult<bool> {
        Ok(self
            .0
            .state()
            .attractions
            .values()
            .any(|a| a.slug == slug && Some(a.id) != exclude_id))
    }

    async fn update_ratings(&self, id: i32, summary: &RatingSummary) -> DbResult<Option<Attraction>> {
        let mut state = self.0.state();
        let Some(attraction) = state.attractions.get_mut(&id) else {
            return Ok(None);
        };
        attraction.ratings_average = summary.stored_average();
        attraction.ratings_quantity = summary.ratings_quantity;
        attraction.updated_at = Utc::now();
        Ok(Some(attraction.clone()))
    }
}

#[async_trait]
impl GeoRepository for MemoryAttractions {
    type Place = Attraction;

    async fn find_within_sphere(
        &self,
        center: GeoPoint,
        radius_radians: f64,
    ) -> DbResult<Vec<Attraction>> {
        Ok(self
            .located()
            .into_iter()
            .filter(|(_, point)| within_sphere(center, *point, radius_radians))
            .map(|(attraction, _)| attraction)
            .collect())
    }

    async fn geo_near(&self, center: GeoPoint, distance_multiplier: f64) -> DbResult<Vec<PlaceDistance>> {
        let mut distances: Vec<PlaceDistance> = self
            .located()
            .into_iter()
            .map(|(attraction, point)| PlaceDistance {
                id: attraction.id,
                name: attraction.name,
                distance: distance_in_meters(center, point) * distance_multiplier,
            })
            .collect();
        distances.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(distances)
    }
}

struct MemoryReviews(MemoryStore);

#[async_trait]
impl ReviewRepository for MemoryReviews {
    async fn create(
        &self,
        attraction_id: i32,
        user_id: i32,
        review: &str,
        rating: f64,
    ) -> DbResult<Review> {
        let mut state = self.0.state();
        let id = state.next_id();
        let now = Utc::now();
        let review = Review {
            id,
            review: review.to_string(),
            rating,
            attraction_id,
            user_id,
            created_at: now,
            updated_at: now,
        };
        state.reviews.insert(id, review.clone());
        Ok(review)
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Review>> {
        Ok(self.0.state().reviews.get(&id).cloned())
    }

    async fn find_by_user_and_attraction(
        &self,
        user_id: i32,
        attraction_id: i32,
    ) -> DbResult<Option<Review>> {
        Ok(self
            .0
            .state()
            .reviews
            .values()
            .find(|r| r.user_id == user_id && r.attraction_id == attraction_id)
            .cloned())
    }

    async fn find_by_attraction(&self, attraction_id: i32) -> DbResult<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .0
            .state()
            .reviews
            .values()
            .filter(|r| r.attraction_id == attraction_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }

    async fn update(
        &self,
        id: i32,
        review: Option<&str>,
        rating: Option<f64>,
    ) -> DbResult<Option<Review>> {
        let mut state = self.0.state();
        let Some(existing) = state.reviews.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(text) = review {
            existing.review = text.to_string();
        }
        if let Some(rating) = rating {
            existing.rating = rating;
        }
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i32) -> DbResult<Option<Review>> {
        Ok(self.0.state().reviews.remove(&id))
    }

    async fn ratings_for_attraction(&self, attraction_id: i32) -> DbResult<Vec<f64>> {
        Ok(self
            .0
            .state()
            .reviews
            .values()
            .filter(|r| r.attraction_id == attraction_id)
            .map(|r| r.rating)
            .collect())
    }
}

struct MemoryDestinations(MemoryStore);

#[async_trait]
impl DestinationRepository for MemoryDestinations {
    async fn create(&self, destination: &NewDestination) -> DbResult<Destination> {
        let mut state = self.0.state();
        let id = state.next_id();
        let now = Utc::now();
        let created = Destination {
            id,
            name: destination.name.clone(),
            slug: destination.slug.clone(),
            summary: destination.summary.clone(),
            location: GeoLocation::from_point(
                destination.point,
                None,
                destination.location_description.clone(),
            ),
            created_at: now,
            updated_at: now,
        };
        state.destinations.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Destination>> {
        Ok(self.0.state().destinations.get(&id).cloned())
    }

    async fn list(&self, query: &ListQuery) -> DbResult<Page<Destination>> {
        let mut items: Vec<Destination> = self
            .0
            .state()
            .destinations
            .values()
            .filter(|d| name_matches(&d.name, &query.name))
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let ordering = match query.sort_field {
                SortField::Name => a.name.cmp(&b.name),
                _ => a.created_at.cmp(&b.created_at),
            };
            ordered(ordering, query.sort_order).then(a.id.cmp(&b.id))
        });

        Ok(paginate(items, query))
    }

    async fn name_taken(&self, name: &str) -> DbResult<bool> {
        Ok(self.0.state().destinations.values().any(|d| d.name == name))
    }
}

#[async_trait]
impl GeoRepository for MemoryDestinations {
    type Place = Destination;

    async fn find_within_sphere(
        &self,
        center: GeoPoint,
        radius_radians: f64,
    ) -> DbResult<Vec<Destination>> {
        Ok(self
            .0
            .state()
            .destinations
            .values()
            .filter(|d| {
                d.location
                    .point()
                    .is_some_and(|point| within_sphere(center, point, radius_radians))
            })
            .cloned()
            .collect())
    }

    async fn geo_near(&self, center: GeoPoint, distance_multiplier: f64) -> DbResult<Vec<PlaceDistance>> {
        let mut distances: Vec<PlaceDistance> = self
            .0
            .state()
            .destinations
            .values()
            .filter_map(|d| {
                let point = d.location.point()?;
                Some(PlaceDistance {
                    id: d.id,
                    name: d.name.clone(),
                    distance: distance_in_meters(center, point) * distance_multiplier,
                })
            })
            .collect();
        distances.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(distances)
    }
}

struct MemoryActivities(MemoryStore);

fn activity_from_draft(id: i32, draft: &ActivityDraft, created_at: chrono::DateTime<Utc>) -> Activity {
    Activity {
        id,
        name: draft.name.clone(),
        slug: draft.slug.clone(),
        price: draft.price,
        price_discount: draft.price_discount,
        summary: draft.summary.clone(),
        description: draft.description.clone(),
        duration: draft.duration,
        max_group_size: draft.max_group_size,
        difficulty: draft.difficulty,
        start_location: draft.start_location.clone(),
        attraction_id: draft.attraction_id,
        created_at,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl ActivityRepository for MemoryActivities {
    async fn create(&self, draft: &ActivityDraft) -> DbResult<Activity> {
        let mut state = self.0.state();
        let id = state.next_id();
        let activity = activity_from_draft(id, draft, Utc::now());
        state.activities.insert(id, activity.clone());
        Ok(activity)
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Activity>> {
        Ok(self.0.state().activities.get(&id).cloned())
    }

    async fn list(&self, query: &ListQuery) -> DbResult<Page<Activity>> {
        let mut items: Vec<Activity> = self
            .0
            .state()
            .activities
            .values()
            .filter(|a| name_matches(&a.name, &query.name))
            .filter(|a| query.attraction_id.map_or(true, |id| a.attraction_id == id))
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let ordering = match query.sort_field {
                SortField::Name => a.name.cmp(&b.name),
                _ => a.created_at.cmp(&b.created_at),
            };
            ordered(ordering, query.sort_order).then(a.id.cmp(&b.id))
        });

        Ok(paginate(items, query))
    }

    async fn update(&self, id: i32, draft: &ActivityDraft) -> DbResult<Option<Activity>> {
        let mut state = self.0.state();
        let Some(existing) = state.activities.get_mut(&id) else {
            return Ok(None);
        };
        *existing = activity_from_draft(id, draft, existing.created_at);
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i32) -> DbResult<bool> {
        Ok(self.0.state().activities.remove(&id).is_some())
    }

    async fn name_taken(
        &self,
        attraction_id: i32,
        name: &str,
        exclude_id: Option<i32>,
    ) -> DbResult<bool> {
        Ok(self.0.state().activities.values().any(|a| {
            a.attraction_id == attraction_id && a.name == name && Some(a.id) != exclude_id
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{radius_in_radians, DistanceUnit, EARTH_RADIUS_M};

    #[tokio::test]
    async fn test_containment_is_inclusive_and_bounded() {
        let store = MemoryStore::new();
        let origin = store.seed_attraction("Origin", Some((0.0, 0.0)), None).await;
        let near_lng = (9_000.0 / EARTH_RADIUS_M).to_degrees();
        let far_lng = (11_000.0 / EARTH_RADIUS_M).to_degrees();
        let near = store.seed_attraction("Near", Some((near_lng, 0.0)), None).await;
        store.seed_attraction("Far", Some((far_lng, 0.0)), None).await;
        store.seed_attraction("Nowhere", None, None).await;

        let geo = store.attraction_geo();
        let radius = radius_in_radians(10.0, DistanceUnit::Kilometers);
        let found = geo.find_within_sphere(GeoPoint::new(0.0, 0.0), radius).await.unwrap();
        let mut ids: Vec<i32> = found.iter().map(|a| a.id).collect();
        ids.sort();
        assert_eq!(ids, vec![origin.id, near.id]);

        let only_origin = geo.find_within_sphere(GeoPoint::new(0.0, 0.0), 0.0).await.unwrap();
        assert_eq!(only_origin.len(), 1);
        assert_eq!(only_origin[0].id, origin.id);
    }

    #[tokio::test]
    async fn test_geo_near_skips_unlocated() {
        let store = MemoryStore::new();
        store.seed_attraction("Located", Some((1.0, 1.0)), None).await;
        store.seed_attraction("Unlocated", None, None).await;

        let distances = store
            .attraction_geo()
            .geo_near(GeoPoint::new(1.0, 1.0), 0.001)
            .await
            .unwrap();
        assert_eq!(distances.len(), 1);
        assert_eq!(distances[0].distance, 0.0);
    }

    #[tokio::test]
    async fn test_deleting_attraction_cascades_reviews() {
        let store = MemoryStore::new();
        let attraction = store.seed_attraction("Kakum", None, None).await;
        let review = store.seed_review(attraction.id, 1, 4.0).await;

        assert!(store.attractions().delete(attraction.id).await.unwrap());
        assert!(store.reviews().find_by_id(review.id).await.unwrap().is_none());
    }
}

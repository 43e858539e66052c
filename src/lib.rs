pub mod activities;
pub mod attractions;
pub mod auth;
pub mod config;
pub mod db;
pub mod destinations;
pub mod error;
pub mod geo;
pub mod query;
pub mod reviews;
pub mod validation;

#[cfg(test)]
pub(crate) mod memory;

use axum::{
    extract::FromRef,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use activities::{ActivityRepository, ActivityService, PgActivityRepository};
use attractions::{Attraction, AttractionRepository, AttractionService, PgAttractionRepository};
use auth::TokenService;
use db::DbPool;
use destinations::{Destination, DestinationRepository, DestinationService, PgDestinationRepository};
use geo::{GeoRepository, GeoResolver};
use reviews::{PgReviewRepository, RatingAggregator, ReviewRepository, ReviewService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        attractions::handlers::create_attraction,
        attractions::handlers::list_attractions,
        attractions::handlers::top_attractions,
        attractions::handlers::get_attraction_by_slug,
        attractions::handlers::get_attraction,
        attractions::handlers::update_attraction,
        attractions::handlers::delete_attraction,
        reviews::handlers::create_review,
        reviews::handlers::list_reviews,
        reviews::handlers::get_review,
        reviews::handlers::update_review,
        reviews::handlers::delete_review,
        activities::handlers::create_activity,
        activities::handlers::list_activities,
        activities::handlers::get_activity,
        activities::handlers::update_activity,
        activities::handlers::delete_activity,
        geo::handlers::attractions_within,
        geo::handlers::attraction_distances,
        geo::handlers::destinations_within,
        geo::handlers::destination_distances,
        destinations::handlers::create_destination,
        destinations::handlers::list_destinations,
        destinations::handlers::get_destination,
        health,
    ),
    components(
        schemas(
            attractions::Attraction,
            attractions::CreateAttractionRequest,
            attractions::UpdateAttractionRequest,
            reviews::Review,
            reviews::CreateReviewRequest,
            reviews::UpdateReviewRequest,
            activities::Activity,
            activities::Difficulty,
            activities::CreateActivityRequest,
            activities::UpdateActivityRequest,
            destinations::Destination,
            destinations::CreateDestinationRequest,
            geo::GeoLocation,
            geo::PlaceDistance,
        )
    ),
    tags(
        (name = "attractions", description = "Attraction catalogue"),
        (name = "reviews", description = "User reviews and rating aggregation"),
        (name = "activities", description = "Activities offered at attractions"),
        (name = "destinations", description = "Destinations grouping attractions"),
        (name = "geo", description = "Radius and distance queries"),
        (name = "health", description = "Liveness")
    ),
    info(
        title = "Tourism API",
        version = "1.0.0",
        description = "Attractions, destinations, activities and reviews with geo-radius queries"
    )
)]
pub struct ApiDoc;

/// Repository implementations the services run on
pub struct Repositories {
    pub attractions: Arc<dyn AttractionRepository>,
    pub attraction_geo: Arc<dyn GeoRepository<Place = Attraction>>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub destinations: Arc<dyn DestinationRepository>,
    pub destination_geo: Arc<dyn GeoRepository<Place = Destination>>,
}

impl Repositories {
    pub fn postgres(pool: DbPool) -> Self {
        let attractions = Arc::new(PgAttractionRepository::new(pool.clone()));
        let destinations = Arc::new(PgDestinationRepository::new(pool.clone()));

        Self {
            attractions: attractions.clone(),
            attraction_geo: attractions,
            reviews: Arc::new(PgReviewRepository::new(pool.clone())),
            activities: Arc::new(PgActivityRepository::new(pool)),
            destinations: destinations.clone(),
            destination_geo: destinations,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub attractions: AttractionService,
    pub reviews: ReviewService,
    pub activities: ActivityService,
    pub destinations: DestinationService,
    pub attraction_geo: GeoResolver<Attraction>,
    pub destination_geo: GeoResolver<Destination>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(repositories: Repositories, tokens: Arc<TokenService>) -> Self {
        let Repositories {
            attractions,
            attraction_geo,
            reviews,
            activities,
            destinations,
            destination_geo,
        } = repositories;

        let aggregator = RatingAggregator::new(reviews.clone(), attractions.clone());

        Self {
            attractions: AttractionService::new(
                attractions.clone(),
                reviews.clone(),
                destinations.clone(),
            ),
            reviews: ReviewService::new(reviews, attractions.clone(), aggregator),
            activities: ActivityService::new(activities, attractions.clone()),
            destinations: DestinationService::new(destinations, attractions),
            attraction_geo: GeoResolver::new(attraction_geo),
            destination_geo: GeoResolver::new(destination_geo),
            tokens,
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/attractions",
            post(attractions::create_attraction).get(attractions::list_attractions),
        )
        .route("/attractions/top-5", get(attractions::top_attractions))
        .route(
            "/attractions/slug/:slug",
            get(attractions::get_attraction_by_slug),
        )
        .route(
            "/attractions/:id",
            get(attractions::get_attraction)
                .patch(attractions::update_attraction)
                .delete(attractions::delete_attraction),
        )
        .route(
            "/attractions/:id/reviews",
            post(reviews::create_review).get(reviews::list_reviews),
        )
        .route(
            "/attractions/:id/activities",
            post(activities::create_activity).get(activities::list_activities),
        )
        .route(
            "/activities/:id",
            get(activities::get_activity)
                .patch(activities::update_activity)
                .delete(activities::delete_activity),
        )
        .route(
            "/reviews/:id",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/attractions-within/:distance/center/:lat_lng/unit/:unit",
            get(geo::attractions_within),
        )
        .route(
            "/distances/:lat_lng/unit/:unit",
            get(geo::attraction_distances),
        )
        .route(
            "/destinations",
            post(destinations::create_destination).get(destinations::list_destinations),
        )
        .route("/destinations/:id", get(destinations::get_destination))
        .route(
            "/destinations-within/:distance/center/:lat_lng/unit/:unit",
            get(geo::destinations_within),
        )
        .route(
            "/destination-distances/:lat_lng/unit/:unit",
            get(geo::destination_distances),
        )
        .route("/health", get(health))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api_routes())
        .layer(cors)
        .with_state(state)
}

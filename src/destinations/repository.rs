use async_trait::async_trait;
use sqlx::PgPool;

use crate::destinations::{Destination, DestinationRow, NewDestination};
use crate::error::DbResult;
use crate::geo::{angular_distance_sql, GeoPoint, GeoRepository, PlaceDistance, EARTH_RADIUS_M};
use crate::query::{BindValue, ListQuery, Page, SqlQueryBuilder};

const DESTINATION_COLUMNS: &str = "id, name, slug, summary, location_lng, location_lat, \
    location_description, created_at, updated_at";

#[async_trait]
pub trait DestinationRepository: Send + Sync {
    async fn create(&self, destination: &NewDestination) -> DbResult<Destination>;

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Destination>>;

    async fn list(&self, query: &ListQuery) -> DbResult<Page<Destination>>;

    async fn name_taken(&self, name: &str) -> DbResult<bool>;
}

#[derive(Clone)]
pub struct PgDestinationRepository {
    pool: PgPool,
}

impl PgDestinationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DestinationRepository for PgDestinationRepository {
    async fn create(&self, destination: &NewDestination) -> DbResult<Destination> {
        let row = sqlx::query_as::<_, DestinationRow>(&format!(
            r#"
            INSERT INTO destinations (name, slug, summary, location_lng, location_lat, location_description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            DESTINATION_COLUMNS
        ))
        .bind(&destination.name)
        .bind(&destination.slug)
        .bind(&destination.summary)
        .bind(destination.point.lng)
        .bind(destination.point.lat)
        .bind(&destination.location_description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Destination>> {
        let row = sqlx::query_as::<_, DestinationRow>(&format!(
            "SELECT {} FROM destinations WHERE id = $1",
            DESTINATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Destination::from))
    }

    async fn list(&self, query: &ListQuery) -> DbResult<Page<Destination>> {
        let builder = SqlQueryBuilder::from_query("destinations", DESTINATION_COLUMNS, query);

        let (sql, params) = builder.build();
        let mut rows_query = sqlx::query_as::<_, DestinationRow>(&sql);
        for param in &params {
            rows_query = match param {
                BindValue::Text(value) => rows_query.bind(value),
                BindValue::Int(value) => rows_query.bind(*value),
            };
        }
        let rows = rows_query.fetch_all(&self.pool).await?;

        let (count_sql, count_params) = builder.build_count();
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in &count_params {
            count_query = match param {
                BindValue::Text(value) => count_query.bind(value),
                BindValue::Int(value) => count_query.bind(*value),
            };
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let results = rows.into_iter().map(Destination::from).collect();
        Ok(Page::new(results, query, total))
    }

    async fn name_taken(&self, name: &str) -> DbResult<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM destinations WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(taken)
    }
}

#[async_trait]
impl GeoRepository for PgDestinationRepository {
    type Place = Destination;

    async fn find_within_sphere(
        &self,
        center: GeoPoint,
        radius_radians: f64,
    ) -> DbResult<Vec<Destination>> {
        let rows = sqlx::query_as::<_, DestinationRow>(&format!(
            "SELECT {} FROM destinations WHERE {} <= $3",
            DESTINATION_COLUMNS,
            angular_distance_sql("location_lng", "location_lat", 1, 2)
        ))
        .bind(center.lng)
        .bind(center.lat)
        .bind(radius_radians)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Destination::from).collect())
    }

    async fn geo_near(&self, center: GeoPoint, distance_multiplier: f64) -> DbResult<Vec<PlaceDistance>> {
        let distances = sqlx::query_as::<_, PlaceDistance>(&format!(
            "SELECT id, name, {} * $3 * $4 AS distance FROM destinations ORDER BY distance",
            angular_distance_sql("location_lng", "location_lat", 1, 2)
        ))
        .bind(center.lng)
        .bind(center.lat)
        .bind(EARTH_RADIUS_M)
        .bind(distance_multiplier)
        .fetch_all(&self.pool)
        .await?;

        Ok(distances)
    }
}

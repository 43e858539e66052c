use async_trait::async_trait;
use sqlx::PgPool;

use crate::attractions::{Attraction, AttractionDraft, AttractionRow, RatingSummary};
use crate::error::DbResult;
use crate::geo::{angular_distance_sql, GeoPoint, GeoRepository, PlaceDistance, EARTH_RADIUS_M};
use crate::query::{BindValue, ListQuery, Page, SqlQueryBuilder};

const ATTRACTION_COLUMNS: &str = "id, name, slug, summary, description, opening_hours, \
    is_accessible_for_free, public_access, slogan, location_lng, location_lat, \
    location_address, location_description, destination_id, ratings_average, \
    ratings_quantity, created_at, updated_at";

/// Persistence operations on attractions
#[async_trait]
pub trait AttractionRepository: Send + Sync {
    async fn create(&self, draft: &AttractionDraft) -> DbResult<Attraction>;

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Attraction>>;

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Attraction>>;

    async fn list(&self, query: &ListQuery) -> DbResult<Page<Attraction>>;

    async fn list_by_destination(&self, destination_id: i32) -> DbResult<Vec<Attraction>>;

    /// Overwrites every client-writable field; `None` if the row is gone
    async fn update(&self, id: i32, draft: &AttractionDraft) -> DbResult<Option<Attraction>>;

    /// `true` if a row was removed; its reviews go with it
    async fn delete(&self, id: i32) -> DbResult<bool>;

    /// Whether another attraction already uses `name`
    async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> DbResult<bool>;

    /// Whether another attraction already uses `slug`
    async fn slug_taken(&self, slug: &str, exclude_id: Option<i32>) -> DbResult<bool>;

    /// Writes the review statistics; `None` if the attraction does not exist
    async fn update_ratings(&self, id: i32, summary: &RatingSummary) -> DbResult<Option<Attraction>>;
}

/// PostgreSQL implementation
#[derive(Clone)]
pub struct PgAttractionRepository {
    pool: PgPool,
}

impl PgAttractionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttractionRepository for PgAttractionRepository {
    async fn create(&self, draft: &AttractionDraft) -> DbResult<Attraction> {
        let (lng, lat, address, location_description) = draft.location_columns();

        let row = sqlx::query_as::<_, AttractionRow>(&format!(
            r#"
            INSERT INTO attractions (
                name, slug, summary, description, opening_hours, is_accessible_for_free,
                public_access, slogan, location_lng, location_lat, location_address,
                location_description, destination_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            ATTRACTION_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.summary)
        .bind(&draft.description)
        .bind(&draft.opening_hours)
        .bind(draft.is_accessible_for_free)
        .bind(draft.public_access)
        .bind(&draft.slogan)
        .bind(lng)
        .bind(lat)
        .bind(address)
        .bind(location_description)
        .bind(draft.destination_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Attraction>> {
        let row = sqlx::query_as::<_, AttractionRow>(&format!(
            "SELECT {} FROM attractions WHERE id = $1",
            ATTRACTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Attraction::from))
    }

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Attraction>> {
        let row = sqlx::query_as::<_, AttractionRow>(&format!(
            "SELECT {} FROM attractions WHERE slug = $1",
            ATTRACTION_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Attraction::from))
    }

    async fn list(&self, query: &ListQuery) -> DbResult<Page<Attraction>> {
        let builder = SqlQueryBuilder::from_query("attractions", ATTRACTION_COLUMNS, query);

        let (sql, params) = builder.build();
        let mut rows_query = sqlx::query_as::<_, AttractionRow>(&sql);
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

        let results = rows.into_iter().map(Attraction::from).collect();
        Ok(Page::new(results, query, total))
    }

    async fn list_by_destination(&self, destination_id: i32) -> DbResult<Vec<Attraction>> {
        let rows = sqlx::query_as::<_, AttractionRow>(&format!(
            "SELECT {} FROM attractions WHERE destination_id = $1 ORDER BY name",
            ATTRACTION_COLUMNS
        ))
        .bind(destination_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Attraction::from).collect())
    }

    async fn update(&self, id: i32, draft: &AttractionDraft) -> DbResult<Option<Attraction>> {
        let (lng, lat, address, location_description) = draft.location_columns();

        let row = sqlx::query_as::<_, AttractionRow>(&format!(
            r#"
            UPDATE attractions
            SET name = $1, slug = $2, summary = $3, description = $4, opening_hours = $5,
                is_accessible_for_free = $6, public_access = $7, slogan = $8,
                location_lng = $9, location_lat = $10, location_address = $11,
                location_description = $12, destination_id = $13, updated_at = NOW()
            WHERE id = $14
            RETURNING {}
            "#,
            ATTRACTION_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.summary)
        .bind(&draft.description)
        .bind(&draft.opening_hours)
        .bind(draft.is_accessible_for_free)
        .bind(draft.public_access)
        .bind(&draft.slogan)
        .bind(lng)
        .bind(lat)
        .bind(address)
        .bind(location_description)
        .bind(draft.destination_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Attraction::from))
    }

    async fn delete(&self, id: i32) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM attractions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> DbResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM attractions WHERE name = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn slug_taken(&self, slug: &str, exclude_id: Option<i32>) -> DbResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM attractions WHERE slug = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn update_ratings(&self, id: i32, summary: &RatingSummary) -> DbResult<Option<Attraction>> {
        let row = sqlx::query_as::<_, AttractionRow>(&format!(
            r#"
            UPDATE attractions
            SET ratings_average = $1, ratings_quantity = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            ATTRACTION_COLUMNS
        ))
        .bind(summary.stored_average())
        .bind(summary.ratings_quantity)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Attraction::from))
    }
}

#[async_trait]
impl GeoRepository for PgAttractionRepository {
    type Place = Attraction;

    async fn find_within_sphere(
        &self,
        center: GeoPoint,
        radius_radians: f64,
    ) -> DbResult<Vec<Attraction>> {
        let rows = sqlx::query_as::<_, AttractionRow>(&format!(
            r#"
            SELECT {}
            FROM attractions
            WHERE location_lng IS NOT NULL
              AND {} <= $3
            "#,
            ATTRACTION_COLUMNS,
            angular_distance_sql("location_lng", "location_lat", 1, 2)
        ))
        .bind(center.lng)
        .bind(center.lat)
        .bind(radius_radians)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Attraction::from).collect())
    }

    async fn geo_near(&self, center: GeoPoint, distance_multiplier: f64) -> DbResult<Vec<PlaceDistance>> {
        let distances = sqlx::query_as::<_, PlaceDistance>(&format!(
            r#"
            SELECT id, name, {} * $3 * $4 AS distance
            FROM attractions
            WHERE location_lng IS NOT NULL
            ORDER BY distance
            "#,
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

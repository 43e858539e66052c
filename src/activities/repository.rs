use async_trait::async_trait;
use sqlx::PgPool;

use crate::activities::{Activity, ActivityDraft, ActivityRow};
use crate::error::DbResult;
use crate::query::{BindValue, ListQuery, Page, SqlQueryBuilder};

const ACTIVITY_COLUMNS: &str = "id, name, slug, price, price_discount, summary, description, \
    duration, max_group_size, difficulty, start_lng, start_lat, start_address, \
    start_description, attraction_id, created_at, updated_at";

/// Persistence operations on activities
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn create(&self, draft: &ActivityDraft) -> DbResult<Activity>;

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Activity>>;

    /// Filtered page; `query.attraction_id` scopes it to one attraction
    async fn list(&self, query: &ListQuery) -> DbResult<Page<Activity>>;

    async fn update(&self, id: i32, draft: &ActivityDraft) -> DbResult<Option<Activity>>;

    async fn delete(&self, id: i32) -> DbResult<bool>;

    /// Whether the attraction already offers another activity called `name`
    async fn name_taken(
        &self,
        attraction_id: i32,
        name: &str,
        exclude_id: Option<i32>,
    ) -> DbResult<bool>;
}

/// PostgreSQL implementation
#[derive(Clone)]
pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn create(&self, draft: &ActivityDraft) -> DbResult<Activity> {
        let (lng, lat, address, start_description) = draft.start_location_columns();

        let row = sqlx::query_as::<_, ActivityRow>(&format!(
            r#"
            INSERT INTO activities (
                name, slug, price, price_discount, summary, description, duration,
                max_group_size, difficulty, start_lng, start_lat, start_address,
                start_description, attraction_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            ACTIVITY_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(draft.price)
        .bind(draft.price_discount)
        .bind(&draft.summary)
        .bind(&draft.description)
        .bind(draft.duration)
        .bind(draft.max_group_size)
        .bind(draft.difficulty)
        .bind(lng)
        .bind(lat)
        .bind(address)
        .bind(start_description)
        .bind(draft.attraction_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Activity>> {
        let row = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {} FROM activities WHERE id = $1",
            ACTIVITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Activity::from))
    }

    async fn list(&self, query: &ListQuery) -> DbResult<Page<Activity>> {
        let builder = SqlQueryBuilder::from_query("activities", ACTIVITY_COLUMNS, query);

        let (sql, params) = builder.build();
        let mut rows_query = sqlx::query_as::<_, ActivityRow>(&sql);
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

        let results = rows.into_iter().map(Activity::from).collect();
        Ok(Page::new(results, query, total))
    }

    async fn update(&self, id: i32, draft: &ActivityDraft) -> DbResult<Option<Activity>> {
        let (lng, lat, address, start_description) = draft.start_location_columns();

        let row = sqlx::query_as::<_, ActivityRow>(&format!(
            r#"
            UPDATE activities
            SET name = $1, slug = $2, price = $3, price_discount = $4, summary = $5,
                description = $6, duration = $7, max_group_size = $8, difficulty = $9,
                start_lng = $10, start_lat = $11, start_address = $12,
                start_description = $13, updated_at = NOW()
            WHERE id = $14
            RETURNING {}
            "#,
            ACTIVITY_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(draft.price)
        .bind(draft.price_discount)
        .bind(&draft.summary)
        .bind(&draft.description)
        .bind(draft.duration)
        .bind(draft.max_group_size)
        .bind(draft.difficulty)
        .bind(lng)
        .bind(lat)
        .bind(address)
        .bind(start_description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Activity::from))
    }

    async fn delete(&self, id: i32) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn name_taken(
        &self,
        attraction_id: i32,
        name: &str,
        exclude_id: Option<i32>,
    ) -> DbResult<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM activities
                WHERE attraction_id = $1 AND name = $2 AND id IS DISTINCT FROM $3
            )
            "#,
        )
        .bind(attraction_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }
}

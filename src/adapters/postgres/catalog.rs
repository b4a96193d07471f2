//! PostgreSQL implementation of CatalogRepository.
//!
//! Journeys keep their ordered course list in a `UUID[]` column.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::{Course, Journey};
use crate::domain::foundation::{CourseId, DomainError, JourneyId};
use crate::ports::CatalogRepository;

use super::{access_days_from_db, access_days_to_db, db_error, money};

/// PostgreSQL implementation of the CatalogRepository port.
#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    slug: String,
    title: String,
    description: Option<String>,
    price_cents: i64,
    currency: String,
    access_days: Option<i32>,
    published: bool,
}

impl TryFrom<CourseRow> for Course {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            id: CourseId::from_uuid(row.id),
            slug: row.slug,
            title: row.title,
            description: row.description,
            price: money(row.price_cents, &row.currency)?,
            access_days: access_days_from_db(row.access_days)?,
            published: row.published,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JourneyRow {
    id: Uuid,
    slug: String,
    title: String,
    description: Option<String>,
    price_cents: i64,
    currency: String,
    course_ids: Vec<Uuid>,
    access_days: Option<i32>,
    published: bool,
}

impl TryFrom<JourneyRow> for Journey {
    type Error = DomainError;

    fn try_from(row: JourneyRow) -> Result<Self, Self::Error> {
        Ok(Journey {
            id: JourneyId::from_uuid(row.id),
            slug: row.slug,
            title: row.title,
            description: row.description,
            price: money(row.price_cents, &row.currency)?,
            course_ids: row.course_ids.into_iter().map(CourseId::from_uuid).collect(),
            access_days: access_days_from_db(row.access_days)?,
            published: row.published,
        })
    }
}

const COURSE_COLUMNS: &str =
    "id, slug, title, description, price_cents, currency, access_days, published";
const JOURNEY_COLUMNS: &str =
    "id, slug, title, description, price_cents, currency, course_ids, access_days, published";

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_courses(&self, published_only: bool) -> Result<Vec<Course>, DomainError> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            "SELECT {} FROM courses WHERE published OR NOT $1 ORDER BY title",
            COURSE_COLUMNS
        ))
        .bind(published_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list courses", e))?;

        rows.into_iter().map(Course::try_from).collect()
    }

    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find course", e))?;

        row.map(Course::try_from).transpose()
    }

    async fn find_courses(&self, ids: &[CourseId]) -> Result<Vec<Course>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        // Keep the caller's order.
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM courses
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
            COURSE_COLUMNS
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find courses", e))?;

        rows.into_iter().map(Course::try_from).collect()
    }

    async fn list_journeys(&self, published_only: bool) -> Result<Vec<Journey>, DomainError> {
        let rows: Vec<JourneyRow> = sqlx::query_as(&format!(
            "SELECT {} FROM journeys WHERE published OR NOT $1 ORDER BY title",
            JOURNEY_COLUMNS
        ))
        .bind(published_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list journeys", e))?;

        rows.into_iter().map(Journey::try_from).collect()
    }

    async fn find_journey(&self, id: &JourneyId) -> Result<Option<Journey>, DomainError> {
        let row: Option<JourneyRow> = sqlx::query_as(&format!(
            "SELECT {} FROM journeys WHERE id = $1",
            JOURNEY_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find journey", e))?;

        row.map(Journey::try_from).transpose()
    }

    async fn find_journeys_containing(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Journey>, DomainError> {
        let rows: Vec<JourneyRow> = sqlx::query_as(&format!(
            "SELECT {} FROM journeys WHERE $1 = ANY(course_ids) ORDER BY title",
            JOURNEY_COLUMNS
        ))
        .bind(course_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find journeys for course", e))?;

        rows.into_iter().map(Journey::try_from).collect()
    }

    async fn save_course(&self, course: &Course) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO courses (
                id, slug, title, description, price_cents, currency, access_days, published
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                slug = EXCLUDED.slug,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                price_cents = EXCLUDED.price_cents,
                currency = EXCLUDED.currency,
                access_days = EXCLUDED.access_days,
                published = EXCLUDED.published,
                updated_at = NOW()
            "#,
        )
        .bind(course.id.as_uuid())
        .bind(&course.slug)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.price.amount_cents())
        .bind(course.price.currency())
        .bind(access_days_to_db(course.access_days)?)
        .bind(course.published)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save course", e))?;

        Ok(())
    }

    async fn save_journey(&self, journey: &Journey) -> Result<(), DomainError> {
        let course_ids: Vec<Uuid> = journey.course_ids.iter().map(|id| *id.as_uuid()).collect();

        sqlx::query(
            r#"
            INSERT INTO journeys (
                id, slug, title, description, price_cents, currency, course_ids,
                access_days, published
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                slug = EXCLUDED.slug,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                price_cents = EXCLUDED.price_cents,
                currency = EXCLUDED.currency,
                course_ids = EXCLUDED.course_ids,
                access_days = EXCLUDED.access_days,
                published = EXCLUDED.published,
                updated_at = NOW()
            "#,
        )
        .bind(journey.id.as_uuid())
        .bind(&journey.slug)
        .bind(&journey.title)
        .bind(&journey.description)
        .bind(journey.price.amount_cents())
        .bind(journey.price.currency())
        .bind(&course_ids)
        .bind(access_days_to_db(journey.access_days)?)
        .bind(journey.published)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save journey", e))?;

        Ok(())
    }
}

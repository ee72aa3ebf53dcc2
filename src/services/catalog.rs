//! Course catalog: listing, lookup, creation, and the bundled seed list.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::errors::AppError;
use crate::models::course::{Course, CourseLevel, CreateCourse};
use crate::models::pagination::{PagedResult, Pagination};

/// Catalog shipped with the binary and loaded on first start.
const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Filters for listing courses.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CourseFilters {
    pub category: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
}

impl CourseFilters {
    /// `category=all` means no category filter.
    fn effective_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }

    /// `level=all` means no level filter; any other value must name a level.
    fn effective_level(&self) -> Result<Option<CourseLevel>, AppError> {
        let Some(level) = self.level.as_deref().map(str::trim) else {
            return Ok(None);
        };
        match level.to_lowercase().as_str() {
            "" | "all" => Ok(None),
            "beginner" => Ok(Some(CourseLevel::Beginner)),
            "intermediate" => Ok(Some(CourseLevel::Intermediate)),
            "advanced" => Ok(Some(CourseLevel::Advanced)),
            _ => Err(AppError::Validation(format!("Unknown course level: {level}"))),
        }
    }

    fn effective_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"))
    }
}

/// Parse the bundled catalog into creation requests.
pub fn bundled_catalog() -> Result<Vec<CreateCourse>, AppError> {
    serde_json::from_str(BUNDLED_CATALOG)
        .map_err(|e| AppError::Internal(format!("Bundled catalog is invalid: {e}")))
}

/// Insert the bundled catalog, leaving existing ids untouched. Returns rows added.
pub async fn seed_bundled(pool: &PgPool) -> Result<u64, AppError> {
    let mut inserted = 0u64;
    for course in bundled_catalog()? {
        let result = sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, teacher_name, category, level,
                duration, total_lessons, thumbnail, video_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.teacher_name)
        .bind(&course.category)
        .bind(course.level)
        .bind(&course.duration)
        .bind(course.total_lessons)
        .bind(&course.thumbnail)
        .bind(&course.video_url)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }
    sync_id_sequence(pool).await?;

    if inserted > 0 {
        tracing::info!(inserted, "Seeded bundled course catalog");
    }
    Ok(inserted)
}

/// Keep the SERIAL sequence ahead of explicitly supplied ids.
async fn sync_id_sequence(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        "SELECT setval(pg_get_serial_sequence('courses', 'id'), COALESCE((SELECT MAX(id) FROM courses), 0) + 1, false)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Every catalog entry, ordered by id. This is the aggregator's join input.
pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY id ASC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {id} not found")))
}

/// List courses with filters and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &CourseFilters,
    pagination: &Pagination,
) -> Result<PagedResult<Course>, AppError> {
    let category = filters.effective_category();
    let level = filters.effective_level()?;
    let search = filters.effective_search();

    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if category.is_some() {
        param_index += 1;
        conditions.push(format!("category = ${param_index}"));
    }
    if level.is_some() {
        param_index += 1;
        conditions.push(format!("level = ${param_index}"));
    }
    if search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(title ILIKE ${param_index} OR description ILIKE ${param_index})"
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM courses {where_clause}");
    let data_sql = format!(
        "SELECT * FROM courses {where_clause} ORDER BY id ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Course>(&data_sql);

    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    if let Some(category) = category {
        bind_both!(category);
    }
    if let Some(level) = level {
        bind_both!(level);
    }
    if let Some(ref pattern) = search {
        bind_both!(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Add a course. An explicit id that already exists is a conflict.
pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, AppError> {
    input.validate()?;

    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (id, title, description, teacher_name, teacher_id, category, level,
            duration, total_lessons, thumbnail, video_url)
        VALUES (COALESCE($1, nextval(pg_get_serial_sequence('courses', 'id'))::INTEGER),
            $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(input.id)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(&input.teacher_name)
    .bind(input.teacher_id)
    .bind(&input.category)
    .bind(input.level)
    .bind(&input.duration)
    .bind(input.total_lessons)
    .bind(&input.thumbnail)
    .bind(&input.video_url)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::conflict_on_unique(
            e,
            format!("Course with id {} already exists", input.id.unwrap_or_default()),
        )
    })?;

    if input.id.is_some() {
        sync_id_sequence(pool).await?;
    }

    tracing::info!(course_id = course.id, title = %course.title, "Course created");
    Ok(course)
}

/// Upsert by id, used by bulk import. Returns true when a new row was created.
pub async fn upsert(pool: &PgPool, id: i32, input: &CreateCourse) -> Result<bool, AppError> {
    input.validate()?;

    let created: bool = sqlx::query_scalar(
        r#"
        INSERT INTO courses (id, title, description, teacher_name, teacher_id, category, level,
            duration, total_lessons, thumbnail, video_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            teacher_name = EXCLUDED.teacher_name,
            teacher_id = COALESCE(EXCLUDED.teacher_id, courses.teacher_id),
            category = EXCLUDED.category,
            level = EXCLUDED.level,
            duration = EXCLUDED.duration,
            total_lessons = EXCLUDED.total_lessons,
            thumbnail = EXCLUDED.thumbnail,
            video_url = EXCLUDED.video_url
        RETURNING (xmax = 0)
        "#,
    )
    .bind(id)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(&input.teacher_name)
    .bind(input.teacher_id)
    .bind(&input.category)
    .bind(input.level)
    .bind(&input.duration)
    .bind(input.total_lessons)
    .bind(&input.thumbnail)
    .bind(&input.video_url)
    .fetch_one(pool)
    .await?;

    sync_id_sequence(pool).await?;
    Ok(created)
}

fn youtube_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:youtu\.be/|[?&]v=)([^&?#/]+)").expect("static regex is valid")
    })
}

/// Rewrite a YouTube watch or short link into its embeddable form.
/// Other URLs are returned unchanged.
pub fn embed_url(url: &str) -> String {
    match youtube_id_pattern().captures(url).and_then(|c| c.get(1)) {
        Some(id) => format!("https://www.youtube.com/embed/{}", id.as_str()),
        None => url.to_string(),
    }
}

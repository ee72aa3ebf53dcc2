//! Enrollment membership: which catalog courses a user has joined.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;

/// Result of an enroll call. Enrolling twice is not an error.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnrollOutcome {
    pub course_id: i32,
    pub newly_enrolled: bool,
}

/// Course ids the user is enrolled in, oldest enrollment first.
pub async fn fetch_enrolled_course_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<i32>, AppError> {
    let ids = sqlx::query_scalar::<_, i32>(
        "SELECT course_id FROM enrollments WHERE user_id = $1 ORDER BY enrolled_at ASC, course_id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Whether the user holds an enrollment for the course.
pub async fn is_enrolled(pool: &PgPool, user_id: Uuid, course_id: i32) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Enroll a user in a course.
///
/// Adds the course to the enrollment set and creates the zero-valued
/// progress record in one transaction, so the two never diverge.
pub async fn enroll(pool: &PgPool, user_id: Uuid, course_id: i32) -> Result<EnrollOutcome, AppError> {
    let mut tx = pool.begin().await?;

    let course_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?;
    if !course_exists {
        return Err(AppError::NotFound(format!("Course {course_id} not found")));
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO enrollments (user_id, course_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, course_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if inserted > 0 {
        sqlx::query(
            r#"
            INSERT INTO course_progress
                (user_id, course_id, progress, completed_lessons, hours_studied,
                 completed, score, last_accessed, enrolled_at)
            VALUES ($1, $2, 0, 0, 0, false, 0, NOW(), NOW())
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let newly_enrolled = inserted > 0;
    if newly_enrolled {
        tracing::info!(user_id = %user_id, course_id, "User enrolled in course");
    } else {
        tracing::debug!(user_id = %user_id, course_id, "Enrollment already present");
    }

    Ok(EnrollOutcome {
        course_id,
        newly_enrolled,
    })
}

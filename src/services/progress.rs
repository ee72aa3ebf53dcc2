//! Per-course progress records: reads, learner updates, teacher scores.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::progress::{is_complete, CourseProgress, ProgressRow, ProgressUpdate};

const SELECT_PROGRESS: &str = r#"
    SELECT user_id, course_id, progress, completed_lessons, hours_studied,
           score, last_accessed, enrolled_at
    FROM course_progress
"#;

pub async fn fetch_course_progress(
    pool: &PgPool,
    user_id: Uuid,
    course_id: i32,
) -> Result<Option<CourseProgress>, AppError> {
    let sql = format!("{SELECT_PROGRESS} WHERE user_id = $1 AND course_id = $2");
    let row = sqlx::query_as::<_, ProgressRow>(&sql)
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(CourseProgress::from))
}

/// All progress records for a user keyed by course id.
pub async fn fetch_all_course_progress(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<HashMap<i32, CourseProgress>, AppError> {
    let sql = format!("{SELECT_PROGRESS} WHERE user_id = $1");
    let rows = sqlx::query_as::<_, ProgressRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let progress = CourseProgress::from(row);
            (progress.course_id, progress)
        })
        .collect())
}

/// Check a learner update against the course and the stored record.
fn validate_update(
    update: &ProgressUpdate,
    total_lessons: i32,
    current: &CourseProgress,
) -> Result<(), AppError> {
    if !(0.0..=100.0).contains(&update.progress) {
        return Err(AppError::Validation(
            "progress must be between 0 and 100".to_string(),
        ));
    }
    if update.completed_lessons < 0 || update.completed_lessons > total_lessons {
        return Err(AppError::Validation(format!(
            "completed_lessons must be between 0 and {total_lessons}"
        )));
    }
    if update.hours_studied < current.hours_studied {
        return Err(AppError::Validation(format!(
            "hours_studied cannot decrease below {}",
            current.hours_studied
        )));
    }
    Ok(())
}

/// Apply a learner's progress update. `completed` is derived, and
/// `last_accessed` is stamped with the current time.
pub async fn update_progress(
    pool: &PgPool,
    user_id: Uuid,
    course_id: i32,
    update: &ProgressUpdate,
) -> Result<CourseProgress, AppError> {
    let current = fetch_course_progress(pool, user_id, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Not enrolled in course {course_id}")))?;

    let total_lessons: i32 = sqlx::query_scalar("SELECT total_lessons FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {course_id} not found")))?;

    validate_update(update, total_lessons, &current)?;

    let row = sqlx::query_as::<_, ProgressRow>(
        r#"
        UPDATE course_progress
        SET progress = $3, completed_lessons = $4, hours_studied = $5,
            completed = $6, last_accessed = NOW()
        WHERE user_id = $1 AND course_id = $2
        RETURNING user_id, course_id, progress, completed_lessons, hours_studied,
                  score, last_accessed, enrolled_at
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(update.progress)
    .bind(update.completed_lessons)
    .bind(update.hours_studied)
    .bind(is_complete(update.progress))
    .fetch_one(pool)
    .await?;

    let updated = CourseProgress::from(row);
    tracing::info!(
        user_id = %user_id,
        course_id,
        progress = updated.progress,
        completed = updated.completed,
        "Course progress updated"
    );
    Ok(updated)
}

/// Set the course score a teacher assigned to a student.
pub async fn record_score(
    pool: &PgPool,
    user_id: Uuid,
    course_id: i32,
    score: f64,
) -> Result<CourseProgress, AppError> {
    if !(0.0..=100.0).contains(&score) {
        return Err(AppError::Validation(
            "score must be between 0 and 100".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, ProgressRow>(
        r#"
        UPDATE course_progress SET score = $3
        WHERE user_id = $1 AND course_id = $2
        RETURNING user_id, course_id, progress, completed_lessons, hours_studied,
                  score, last_accessed, enrolled_at
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(score)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!("Student is not enrolled in course {course_id}"))
    })?;

    tracing::info!(user_id = %user_id, course_id, score, "Course score recorded");
    Ok(row.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(hours: f64) -> CourseProgress {
        CourseProgress {
            course_id: 1,
            hours_studied: hours,
            ..CourseProgress::default()
        }
    }

    fn update(progress: f64, lessons: i32, hours: f64) -> ProgressUpdate {
        ProgressUpdate {
            progress,
            completed_lessons: lessons,
            hours_studied: hours,
        }
    }

    #[test]
    fn accepts_in_range_update() {
        assert!(validate_update(&update(50.0, 12, 4.0), 24, &current(3.5)).is_ok());
        assert!(validate_update(&update(100.0, 24, 3.5), 24, &current(3.5)).is_ok());
    }

    #[test]
    fn rejects_progress_over_100() {
        let err = validate_update(&update(100.5, 1, 1.0), 24, &current(0.0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(validate_update(&update(-1.0, 1, 1.0), 24, &current(0.0)).is_err());
    }

    #[test]
    fn rejects_more_lessons_than_course_has() {
        let err = validate_update(&update(50.0, 25, 1.0), 24, &current(0.0)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: completed_lessons must be between 0 and 24"
        );
    }

    #[test]
    fn rejects_decreasing_hours() {
        assert!(validate_update(&update(50.0, 1, 2.0), 24, &current(2.5)).is_err());
    }
}

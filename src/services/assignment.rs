//! Assignments and student submissions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::assignment::{
    Assignment, CreateAssignment, CreateSubmission, GradeSubmission, Submission,
};

/// Submission row enriched for the teacher's review queue.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentSubmission {
    pub id: Uuid,
    pub assignment_id: i32,
    pub assignment_title: String,
    pub student_id: Uuid,
    pub student_name: String,
    pub score: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

/// Every assignment, soonest deadline first.
pub async fn fetch_assignments(pool: &PgPool) -> Result<Vec<Assignment>, AppError> {
    let rows = sqlx::query_as::<_, Assignment>("SELECT * FROM assignments ORDER BY due_at ASC, id ASC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Assignment, AppError> {
    sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignment {id} not found")))
}

/// Submissions made by one user.
pub async fn fetch_submissions(pool: &PgPool, user_id: Uuid) -> Result<Vec<Submission>, AppError> {
    let rows = sqlx::query_as::<_, Submission>(
        "SELECT * FROM submissions WHERE student_id = $1 ORDER BY submitted_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn sync_id_sequence(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        "SELECT setval(pg_get_serial_sequence('assignments', 'id'), COALESCE((SELECT MAX(id) FROM assignments), 0) + 1, false)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create(pool: &PgPool, input: &CreateAssignment) -> Result<Assignment, AppError> {
    input.validate()?;

    let assignment = sqlx::query_as::<_, Assignment>(
        r#"
        INSERT INTO assignments (id, course_id, title, course, teacher_name, description,
            due_at, max_score, priority, category, attachments, estimated_time)
        VALUES (COALESCE($1, nextval(pg_get_serial_sequence('assignments', 'id'))::INTEGER),
            $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(input.id)
    .bind(input.course_id)
    .bind(input.title.trim())
    .bind(&input.course)
    .bind(&input.teacher_name)
    .bind(&input.description)
    .bind(input.due_at)
    .bind(input.max_score)
    .bind(input.priority)
    .bind(&input.category)
    .bind(&input.attachments)
    .bind(&input.estimated_time)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::conflict_on_unique(
            e,
            format!("Assignment with id {} already exists", input.id.unwrap_or_default()),
        )
    })?;

    if input.id.is_some() {
        sync_id_sequence(pool).await?;
    }

    tracing::info!(assignment_id = assignment.id, title = %assignment.title, "Assignment created");
    Ok(assignment)
}

/// Insert or replace an assignment by id. Returns true when newly created.
pub async fn upsert(pool: &PgPool, id: i32, input: &CreateAssignment) -> Result<bool, AppError> {
    input.validate()?;

    let created: bool = sqlx::query_scalar(
        r#"
        INSERT INTO assignments (id, course_id, title, course, teacher_name, description,
            due_at, max_score, priority, category, attachments, estimated_time)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id) DO UPDATE SET
            course_id = EXCLUDED.course_id,
            title = EXCLUDED.title,
            course = EXCLUDED.course,
            teacher_name = EXCLUDED.teacher_name,
            description = EXCLUDED.description,
            due_at = EXCLUDED.due_at,
            max_score = EXCLUDED.max_score,
            priority = EXCLUDED.priority,
            category = EXCLUDED.category,
            attachments = EXCLUDED.attachments,
            estimated_time = EXCLUDED.estimated_time
        RETURNING (xmax = 0)
        "#,
    )
    .bind(id)
    .bind(input.course_id)
    .bind(input.title.trim())
    .bind(&input.course)
    .bind(&input.teacher_name)
    .bind(&input.description)
    .bind(input.due_at)
    .bind(input.max_score)
    .bind(input.priority)
    .bind(&input.category)
    .bind(&input.attachments)
    .bind(&input.estimated_time)
    .fetch_one(pool)
    .await?;

    sync_id_sequence(pool).await?;
    Ok(created)
}

/// Hand in an assignment. One submission per (student, assignment).
pub async fn record_submission(
    pool: &PgPool,
    user_id: Uuid,
    assignment_id: i32,
    payload: &CreateSubmission,
) -> Result<Submission, AppError> {
    payload.validate()?;
    // Resolve first so an unknown id is a 404 rather than an FK violation.
    find_by_id(pool, assignment_id).await?;

    let submission = sqlx::query_as::<_, Submission>(
        r#"
        INSERT INTO submissions (assignment_id, student_id, link, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(assignment_id)
    .bind(user_id)
    .bind(payload.link.trim())
    .bind(&payload.content)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Assignment already submitted"))?;

    tracing::info!(
        submission_id = %submission.id,
        assignment_id,
        student_id = %user_id,
        "Assignment submitted"
    );
    Ok(submission)
}

fn check_grade(score: f64, max_score: f64) -> Result<(), AppError> {
    if !score.is_finite() || score < 0.0 || score > max_score {
        return Err(AppError::Validation(format!(
            "score must be between 0 and {max_score}"
        )));
    }
    Ok(())
}

/// Record a teacher's grade on a submission.
pub async fn grade_submission(
    pool: &PgPool,
    submission_id: Uuid,
    grade: &GradeSubmission,
) -> Result<Submission, AppError> {
    let max_score: f64 = sqlx::query_scalar(
        r#"
        SELECT a.max_score FROM submissions s
        JOIN assignments a ON a.id = s.assignment_id
        WHERE s.id = $1
        "#,
    )
    .bind(submission_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Submission {submission_id} not found")))?;

    check_grade(grade.score, max_score)?;

    let submission = sqlx::query_as::<_, Submission>(
        r#"
        UPDATE submissions SET score = $2, feedback = $3, graded_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(submission_id)
    .bind(grade.score)
    .bind(&grade.feedback)
    .fetch_one(pool)
    .await?;

    tracing::info!(submission_id = %submission_id, score = grade.score, "Submission graded");
    Ok(submission)
}

/// Ungraded submissions on assignments for courses the teacher owns.
pub async fn count_pending_reviews(pool: &PgPool, teacher_id: Uuid) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM submissions s
        JOIN assignments a ON a.id = s.assignment_id
        JOIN courses c ON c.id = a.course_id
        WHERE c.teacher_id = $1 AND s.score IS NULL
        "#,
    )
    .bind(teacher_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Latest submissions on the teacher's assignments.
pub async fn recent_submissions(
    pool: &PgPool,
    teacher_id: Uuid,
    limit: i64,
) -> Result<Vec<RecentSubmission>, AppError> {
    let rows = sqlx::query_as::<_, RecentSubmission>(
        r#"
        SELECT s.id, s.assignment_id, a.title AS assignment_title, s.student_id,
               u.name AS student_name, s.score, s.submitted_at
        FROM submissions s
        JOIN assignments a ON a.id = s.assignment_id
        JOIN courses c ON c.id = a.course_id
        JOIN users u ON u.id = s.student_id
        WHERE c.teacher_id = $1
        ORDER BY s.submitted_at DESC
        LIMIT $2
        "#,
    )
    .bind(teacher_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_within_max_score() {
        assert!(check_grade(0.0, 100.0).is_ok());
        assert!(check_grade(100.0, 100.0).is_ok());
        assert!(check_grade(42.5, 50.0).is_ok());
    }

    #[test]
    fn grade_outside_range_rejected() {
        assert!(check_grade(-1.0, 100.0).is_err());
        assert!(check_grade(50.5, 50.0).is_err());
        assert!(check_grade(f64::NAN, 100.0).is_err());
    }
}

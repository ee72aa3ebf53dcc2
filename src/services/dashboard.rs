//! Role dashboards: concurrent fetches followed by pure aggregation.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::achievement::Achievement;
use crate::models::assignment::{AssignmentCounts, AssignmentStatus, AssignmentWithStatus};
use crate::services::aggregator::{
    self, EnrolledCourse, GradeBand, OverallStats, STREAK_WINDOW_DAYS,
};
use crate::services::assignment::{self as assignments, RecentSubmission};
use crate::services::{achievement, catalog, enrollment, progress};

/// Pending assignments shown in the "due soon" list.
const DUE_SOON_LIMIT: usize = 5;
const RECENT_SUBMISSIONS_LIMIT: i64 = 5;
const TOP_COURSES_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub courses: Vec<EnrolledCourse>,
    pub stats: OverallStats,
    pub assignment_counts: AssignmentCounts,
    pub due_soon: Vec<AssignmentWithStatus>,
}

/// Enrolled course with its score band for the progress page.
#[derive(Debug, Serialize)]
pub struct CourseProgressCard {
    #[serde(flatten)]
    pub course: EnrolledCourse,
    pub grade_band: GradeBand,
}

#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub courses: Vec<CourseProgressCard>,
    pub stats: OverallStats,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Serialize)]
pub struct TeacherDashboard {
    pub total_students: i64,
    pub active_courses: i64,
    pub pending_reviews: i64,
    /// Mean progress percentage over every enrollment in the teacher's courses.
    pub average_completion: f64,
    pub recent_submissions: Vec<RecentSubmission>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_users: i64,
    pub active_courses: i64,
    pub teachers: i64,
    pub students: i64,
    /// Percent of students with any course accessed in the trailing window.
    pub student_engagement: f64,
    pub top_courses: Vec<TopCourse>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TopCourse {
    pub id: i32,
    pub title: String,
    pub teacher_name: String,
    pub students: i64,
}

/// Everything the student landing page shows.
pub async fn student_dashboard(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<StudentDashboard, AppError> {
    let (enrolled_ids, progress_map, catalog, all_assignments, submissions) = tokio::try_join!(
        enrollment::fetch_enrolled_course_ids(pool, user_id),
        progress::fetch_all_course_progress(pool, user_id),
        catalog::fetch_all(pool),
        assignments::fetch_assignments(pool),
        assignments::fetch_submissions(pool, user_id),
    )?;

    let courses = aggregator::compute_enrolled_courses(&enrolled_ids, &catalog, &progress_map);
    let stats = aggregator::compute_overall_stats(&courses, now);
    let merged =
        aggregator::merge_assignment_status(user_id, &all_assignments, &submissions, now);
    let assignment_counts = aggregator::assignment_counts(&merged);

    let due_soon = select_due_soon(merged);

    tracing::debug!(
        user_id = %user_id,
        courses = stats.total_courses,
        pending = assignment_counts.pending,
        "Student dashboard assembled"
    );

    Ok(StudentDashboard {
        courses,
        stats,
        assignment_counts,
        due_soon,
    })
}

/// Pending, not yet overdue, soonest first.
fn select_due_soon(merged: Vec<AssignmentWithStatus>) -> Vec<AssignmentWithStatus> {
    let mut due_soon: Vec<AssignmentWithStatus> = merged
        .into_iter()
        .filter(|a| a.status == AssignmentStatus::Pending && !a.is_overdue)
        .collect();
    due_soon.sort_by_key(|a| a.assignment.due_at);
    due_soon.truncate(DUE_SOON_LIMIT);
    due_soon
}

/// Progress page: per-course cards, overall stats, achievements.
pub async fn progress_view(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ProgressView, AppError> {
    let (enrolled_ids, progress_map, catalog, achievements) = tokio::try_join!(
        enrollment::fetch_enrolled_course_ids(pool, user_id),
        progress::fetch_all_course_progress(pool, user_id),
        catalog::fetch_all(pool),
        achievement::fetch_for_user(pool, user_id),
    )?;

    let enrolled = aggregator::compute_enrolled_courses(&enrolled_ids, &catalog, &progress_map);
    let stats = aggregator::compute_overall_stats(&enrolled, now);
    let courses = enrolled
        .into_iter()
        .map(|course| CourseProgressCard {
            grade_band: aggregator::grade_band(course.score),
            course,
        })
        .collect();

    Ok(ProgressView {
        courses,
        stats,
        achievements,
    })
}

pub async fn teacher_dashboard(pool: &PgPool, teacher_id: Uuid) -> Result<TeacherDashboard, AppError> {
    let (total_students, active_courses, pending_reviews, average_completion, recent_submissions) = tokio::try_join!(
        fetch_teacher_student_count(pool, teacher_id),
        fetch_teacher_course_count(pool, teacher_id),
        assignments::count_pending_reviews(pool, teacher_id),
        fetch_teacher_average_completion(pool, teacher_id),
        assignments::recent_submissions(pool, teacher_id, RECENT_SUBMISSIONS_LIMIT),
    )?;

    Ok(TeacherDashboard {
        total_students,
        active_courses,
        pending_reviews,
        average_completion,
        recent_submissions,
    })
}

pub async fn admin_dashboard(pool: &PgPool, now: DateTime<Utc>) -> Result<AdminDashboard, AppError> {
    let since = now - Duration::days(STREAK_WINDOW_DAYS);
    let (role_counts, active_courses, engaged_students, top_courses) = tokio::try_join!(
        fetch_role_counts(pool),
        fetch_course_count(pool),
        fetch_engaged_student_count(pool, since),
        fetch_top_courses(pool),
    )?;

    Ok(AdminDashboard {
        total_users: role_counts.total,
        active_courses,
        teachers: role_counts.teachers,
        students: role_counts.students,
        student_engagement: engagement_percent(engaged_students, role_counts.students),
        top_courses,
    })
}

/// Share of `part` in `whole` as a percentage, 0 when `whole` is 0.
fn engagement_percent(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

async fn fetch_teacher_student_count(pool: &PgPool, teacher_id: Uuid) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT e.user_id) FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE c.teacher_id = $1
        "#,
    )
    .bind(teacher_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

async fn fetch_teacher_course_count(pool: &PgPool, teacher_id: Uuid) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE teacher_id = $1")
        .bind(teacher_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

async fn fetch_teacher_average_completion(pool: &PgPool, teacher_id: Uuid) -> Result<f64, AppError> {
    let avg = sqlx::query_scalar::<_, f64>(
        r#"
        SELECT COALESCE(AVG(COALESCE(p.progress, 0)), 0)::DOUBLE PRECISION
        FROM course_progress p
        JOIN courses c ON c.id = p.course_id
        WHERE c.teacher_id = $1
        "#,
    )
    .bind(teacher_id)
    .fetch_one(pool)
    .await?;
    Ok(avg)
}

#[derive(sqlx::FromRow)]
struct RoleCounts {
    total: i64,
    teachers: i64,
    students: i64,
}

async fn fetch_role_counts(pool: &PgPool) -> Result<RoleCounts, AppError> {
    let row = sqlx::query_as::<_, RoleCounts>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE role = 'teacher') AS teachers,
            COUNT(*) FILTER (WHERE role = 'student') AS students
        FROM users
        WHERE is_active = true
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn fetch_course_count(pool: &PgPool) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

async fn fetch_engaged_student_count(pool: &PgPool, since: DateTime<Utc>) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT p.user_id) FROM course_progress p
        JOIN users u ON u.id = p.user_id
        WHERE u.role = 'student' AND u.is_active = true AND p.last_accessed >= $1
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

async fn fetch_top_courses(pool: &PgPool) -> Result<Vec<TopCourse>, AppError> {
    let rows = sqlx::query_as::<_, TopCourse>(
        r#"
        SELECT c.id, c.title, c.teacher_name, COUNT(e.user_id) AS students
        FROM courses c
        LEFT JOIN enrollments e ON e.course_id = c.id
        GROUP BY c.id, c.title, c.teacher_name
        ORDER BY students DESC, c.id ASC
        LIMIT $1
        "#,
    )
    .bind(TOP_COURSES_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignment::{Assignment, Priority};

    fn merged(id: i32, due_in_days: i64, status: AssignmentStatus) -> AssignmentWithStatus {
        let now = Utc::now();
        AssignmentWithStatus {
            assignment: Assignment {
                id,
                course_id: None,
                title: format!("Assignment {id}"),
                course: "Physics".to_string(),
                teacher_name: String::new(),
                description: String::new(),
                due_at: now + Duration::days(due_in_days),
                max_score: 100.0,
                priority: Priority::Medium,
                category: String::new(),
                attachments: vec![],
                estimated_time: String::new(),
                created_at: now,
            },
            status,
            submitted_at: None,
            score: None,
            feedback: None,
            link: None,
            days_until_due: due_in_days,
            is_overdue: due_in_days < 0 && status == AssignmentStatus::Pending,
        }
    }

    #[test]
    fn due_soon_keeps_open_pending_work_in_deadline_order() {
        let list = vec![
            merged(1, 9, AssignmentStatus::Pending),
            merged(2, -2, AssignmentStatus::Pending),
            merged(3, 1, AssignmentStatus::Submitted),
            merged(4, 3, AssignmentStatus::Pending),
        ];
        let ids: Vec<i32> = select_due_soon(list).iter().map(|a| a.assignment.id).collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn due_soon_is_capped() {
        let list = (1..=8).map(|i| merged(i, i as i64, AssignmentStatus::Pending)).collect();
        assert_eq!(select_due_soon(list).len(), DUE_SOON_LIMIT);
    }

    #[test]
    fn engagement_handles_no_students() {
        assert_eq!(engagement_percent(0, 0), 0.0);
        assert_eq!(engagement_percent(3, 4), 75.0);
    }
}

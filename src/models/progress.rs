//! Per-user, per-course progress records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;


/// Percent at or above which a course counts as completed.
pub const COMPLETION_THRESHOLD: f64 = 100.0;

/// Normalized progress for one (user, course) pair.
///
/// Every field is always populated; see [`ProgressRow`] for the nullable
/// shape read from storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CourseProgress {
    pub course_id: i32,
    pub progress: f64,
    pub completed_lessons: i32,
    pub hours_studied: f64,
    pub completed: bool,
    pub score: f64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub enrolled_at: Option<DateTime<Utc>>,
}

impl CourseProgress {
    /// Zero-valued record created alongside an enrollment.
    pub fn initial(course_id: i32, now: DateTime<Utc>) -> Self {
        Self {
            course_id,
            last_accessed: Some(now),
            enrolled_at: Some(now),
            ..Self::default()
        }
    }
}

/// `completed` is derived from the percentage, never trusted from storage.
pub fn is_complete(progress: f64) -> bool {
    progress >= COMPLETION_THRESHOLD
}

/// Raw `course_progress` row. Columns are nullable so that partially
/// written rows still load.
#[derive(Debug, Clone, FromRow)]
pub struct ProgressRow {
    pub user_id: Uuid,
    pub course_id: i32,
    pub progress: Option<f64>,
    pub completed_lessons: Option<i32>,
    pub hours_studied: Option<f64>,
    pub score: Option<f64>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub enrolled_at: Option<DateTime<Utc>>,
}

impl From<ProgressRow> for CourseProgress {
    fn from(row: ProgressRow) -> Self {
        let progress = finite_or_zero(row.progress);
        Self {
            course_id: row.course_id,
            progress,
            completed_lessons: row.completed_lessons.unwrap_or(0).max(0),
            hours_studied: finite_or_zero(row.hours_studied),
            completed: is_complete(progress),
            score: finite_or_zero(row.score),
            last_accessed: row.last_accessed,
            enrolled_at: row.enrolled_at,
        }
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Student-reported progress update. Every field is required and must be a
/// JSON number; a partial body is rejected rather than zeroed.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressUpdate {
    pub progress: f64,
    pub completed_lessons: i32,
    pub hours_studied: f64,
}

/// Teacher-assigned course score.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreUpdate {
    pub score: f64,
}

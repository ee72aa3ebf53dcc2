//! Course catalog model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::lenient;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "course_level")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    /// Case-insensitive parse; unknown values fall back to Beginner.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Beginner,
        }
    }
}

/// Catalog entry. Read-only reference data for the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Course {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub teacher_name: String,
    pub teacher_id: Option<Uuid>,
    pub category: String,
    pub level: CourseLevel,
    pub duration: String,
    pub total_lessons: i32,
    pub thumbnail: String,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for adding a catalog entry.
///
/// Numeric fields go through the lenient readers so that bundled and
/// uploaded catalog documents with stringly-typed numbers still load.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCourse {
    /// Explicit identifier; allocated from the sequence when absent.
    #[serde(default)]
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub teacher_name: String,
    #[serde(default)]
    pub teacher_id: Option<Uuid>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub duration: String,
    #[serde(deserialize_with = "lenient::i32_or_zero", default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_lessons: i32,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_is_forgiving() {
        assert_eq!(CourseLevel::parse_lenient("ADVANCED"), CourseLevel::Advanced);
        assert_eq!(CourseLevel::parse_lenient(" intermediate "), CourseLevel::Intermediate);
        assert_eq!(CourseLevel::parse_lenient("expert"), CourseLevel::Beginner);
    }

    #[test]
    fn create_course_reads_string_lesson_count() {
        let body: CreateCourse = serde_json::from_str(
            r#"{
                "id": 7,
                "title": "Organic Chemistry",
                "teacher_name": "Dr. Emily Davis",
                "category": "chemistry",
                "level": "Intermediate",
                "total_lessons": "24"
            }"#,
        )
        .unwrap();
        assert_eq!(body.id, Some(7));
        assert_eq!(body.total_lessons, 24);
        assert_eq!(body.level, CourseLevel::Intermediate);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn create_course_requires_title() {
        let body: CreateCourse = serde_json::from_str(
            r#"{"title": "", "teacher_name": "T", "category": "design"}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());
    }
}

//! Assignments, submissions and the derived per-user status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::lenient;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "assignment_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

/// Three-way classification of an assignment for one user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Assignment {
    pub id: i32,
    pub course_id: Option<i32>,
    pub title: String,
    pub course: String,
    pub teacher_name: String,
    pub description: String,
    pub due_at: DateTime<Utc>,
    pub max_score: f64,
    pub priority: Priority,
    pub category: String,
    pub attachments: Vec<String>,
    pub estimated_time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: i32,
    pub student_id: Uuid,
    pub link: String,
    pub content: Option<String>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub graded_at: Option<DateTime<Utc>>,
}

/// An assignment merged with the requesting user's submission.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentWithStatus {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub status: AssignmentStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub link: Option<String>,
    pub days_until_due: i64,
    pub is_overdue: bool,
}

/// Assignment tab counts.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AssignmentCounts {
    pub total: usize,
    pub pending: usize,
    pub submitted: usize,
    pub graded: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAssignment {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub course_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub course: String,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub description: String,
    pub due_at: DateTime<Utc>,
    #[serde(deserialize_with = "lenient::f64_or_zero", default)]
    #[validate(range(exclusive_min = 0.0, message = "must be positive"))]
    pub max_score: f64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub estimated_time: String,
}

/// A student's hand-in: a link to the work plus optional notes.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubmission {
    #[validate(url(message = "must be a valid URL"))]
    pub link: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradeSubmission {
    pub score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AssignmentStatus::Submitted).unwrap(),
            "\"submitted\""
        );
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
    }

    #[test]
    fn submission_link_must_be_url() {
        let ok = CreateSubmission {
            link: "https://drive.example.com/file/abc".to_string(),
            content: None,
        };
        assert!(ok.validate().is_ok());

        let empty = CreateSubmission {
            link: String::new(),
            content: None,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn create_assignment_rejects_zero_max_score() {
        let body: CreateAssignment = serde_json::from_str(
            r#"{
                "title": "Lab Report: Wave Interference",
                "course": "Physics Laboratory",
                "due_at": "2025-01-22T23:59:00Z",
                "max_score": "0"
            }"#,
        )
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn grade_without_numeric_score_is_rejected() {
        let missing = serde_json::from_str::<GradeSubmission>(r#"{"feedback": "Nice work"}"#);
        assert!(missing.is_err());
        let text = serde_json::from_str::<GradeSubmission>(r#"{"score": "ninety"}"#);
        assert!(text.is_err());
        let ok: GradeSubmission = serde_json::from_str(r#"{"score": 0}"#).unwrap();
        assert_eq!(ok.score, 0.0);
        assert!(ok.feedback.is_none());
    }

    #[test]
    fn priority_parse_defaults_to_medium() {
        assert_eq!(Priority::parse_lenient("HIGH"), Priority::High);
        assert_eq!(Priority::parse_lenient(""), Priority::Medium);
    }
}

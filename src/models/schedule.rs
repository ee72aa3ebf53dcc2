//! Class sessions and calendar events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "session_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Lecture,
    Lab,
    Discussion,
    Workshop,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "event_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Exam,
    Deadline,
    Special,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduleItem {
    pub id: i32,
    pub title: String,
    pub kind: SessionKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub teacher_name: String,
    pub room: String,
    pub students: i32,
    pub is_live: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UpcomingEvent {
    pub id: i32,
    pub title: String,
    pub date: NaiveDate,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateScheduleItem {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    pub kind: SessionKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub students: i32,
    #[serde(default)]
    pub is_live: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEvent {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    pub date: NaiveDate,
    pub kind: EventKind,
}

/// Query for `/schedule`: a single day, or an inclusive date range.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScheduleQuery {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

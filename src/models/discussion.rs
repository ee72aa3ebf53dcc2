//! Discussion forum threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::UserRole;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "discussion_category", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DiscussionCategory {
    Mathematics,
    ComputerScience,
    Physics,
    #[default]
    General,
}

impl DiscussionCategory {
    pub const ALL: [DiscussionCategory; 4] = [
        Self::Mathematics,
        Self::ComputerScience,
        Self::Physics,
        Self::General,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Discussion {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Option<Uuid>,
    pub author_name: String,
    pub author_role: UserRole,
    pub course: String,
    pub category: DiscussionCategory,
    pub tags: Vec<String>,
    pub replies: i32,
    pub likes: i32,
    pub is_pinned: bool,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// New thread form. Tags arrive as one comma-separated string.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDiscussion {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    #[serde(default)]
    pub category: DiscussionCategory,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub tags: String,
}

/// Per-category thread counts; `all` is the grand total.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CategoryCounts {
    pub all: i64,
    pub mathematics: i64,
    #[serde(rename = "computer-science")]
    pub computer_science: i64,
    pub physics: i64,
    pub general: i64,
}

impl CategoryCounts {
    pub fn add(&mut self, category: DiscussionCategory, count: i64) {
        self.all += count;
        match category {
            DiscussionCategory::Mathematics => self.mathematics += count,
            DiscussionCategory::ComputerScience => self.computer_science += count,
            DiscussionCategory::Physics => self.physics += count,
            DiscussionCategory::General => self.general += count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&DiscussionCategory::ComputerScience).unwrap(),
            "\"computer-science\""
        );
    }

    #[test]
    fn counts_accumulate_into_total() {
        let mut counts = CategoryCounts::default();
        counts.add(DiscussionCategory::Physics, 2);
        counts.add(DiscussionCategory::General, 3);
        assert_eq!(counts.all, 5);
        assert_eq!(counts.physics, 2);
        assert_eq!(counts.mathematics, 0);
    }

    #[test]
    fn create_defaults_to_general() {
        let body: CreateDiscussion =
            serde_json::from_str(r#"{"title": "Study group", "content": "Anyone?"}"#).unwrap();
        assert_eq!(body.category, DiscussionCategory::General);
        assert!(body.tags.is_empty());
    }
}

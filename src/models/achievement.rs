//! Learner achievements shown on the progress page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Achievement {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
    pub progress: Option<i32>,
    pub total: Option<i32>,
    pub color: String,
}

/// Icons the client knows how to draw. Anything else renders as `Award`.
pub const KNOWN_ICONS: [&str; 8] = [
    "Award",
    "BookOpen",
    "Calendar",
    "Clock",
    "Star",
    "Target",
    "TrendingUp",
    "Trophy",
];

pub fn normalize_icon(icon: &str) -> &str {
    if KNOWN_ICONS.contains(&icon) {
        icon
    } else {
        "Award"
    }
}

/// Starter set shown to a learner who has no stored achievements yet.
pub fn default_achievements() -> Vec<Achievement> {
    let entry = |n: u128, title: &str, description: &str, icon: &str, total: i32, color: &str| {
        Achievement {
            id: Uuid::from_u128(n),
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            earned: false,
            earned_at: None,
            progress: Some(0),
            total: Some(total),
            color: color.to_string(),
        }
    };

    vec![
        entry(
            1,
            "Perfect Attendance",
            "Attended all classes for 2 weeks straight",
            "Calendar",
            14,
            "blue",
        ),
        entry(
            2,
            "Quick Learner",
            "Completed 5 lessons in one day",
            "TrendingUp",
            5,
            "green",
        ),
        entry(
            3,
            "Top Performer",
            "Scored 90+ on 3 consecutive assignments",
            "Trophy",
            3,
            "yellow",
        ),
        entry(
            4,
            "Discussion Champion",
            "Participated in 10 forum discussions",
            "Star",
            10,
            "purple",
        ),
        entry(
            5,
            "Assignment Master",
            "Submit 15 assignments on time",
            "Target",
            15,
            "orange",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_unearned_defaults() {
        let defaults = default_achievements();
        assert_eq!(defaults.len(), 5);
        assert!(defaults.iter().all(|a| !a.earned && a.progress == Some(0)));
        assert_eq!(defaults[0].title, "Perfect Attendance");
        assert_eq!(defaults[0].total, Some(14));
        assert_eq!(defaults[4].total, Some(15));
    }

    #[test]
    fn unknown_icons_fall_back() {
        assert_eq!(normalize_icon("Trophy"), "Trophy");
        assert_eq!(normalize_icon("Rocket"), "Award");
    }
}

//! Dashboard aggregation over already-fetched records.
//!
//! Every function here is pure and synchronous: no I/O, no clock reads, no
//! failure path. Callers fetch enrollments, progress, assignments and
//! submissions first, then project them into dashboard figures. Missing
//! progress is treated as all-zero, never as an error.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::assignment::{
    Assignment, AssignmentCounts, AssignmentStatus, AssignmentWithStatus, Submission,
};
use crate::models::course::Course;
use crate::models::progress::CourseProgress;

/// Trailing window used for `current_streak`.
pub const STREAK_WINDOW_DAYS: i64 = 7;

/// A catalog entry joined with the user's progress on it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrolledCourse {
    pub id: i32,
    pub title: String,
    pub teacher_name: String,
    pub category: String,
    pub thumbnail: String,
    pub total_lessons: i32,
    pub progress: f64,
    pub completed_lessons: i32,
    pub hours_studied: f64,
    pub completed: bool,
    pub score: f64,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Scalar figures for the dashboard header.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct OverallStats {
    pub total_courses: usize,
    pub completed_courses: usize,
    pub total_hours: f64,
    pub average_score: f64,
    /// Always equal to `completed_courses`; certificates are not tracked separately.
    pub certificates: usize,
    /// Number of enrolled courses accessed within the last seven days.
    /// Not a run of consecutive study days, despite the name.
    pub current_streak: usize,
}

/// Colour band for a score on the progress page.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

/// Join the catalog with the enrolled set and per-course progress.
///
/// Output follows catalog order and holds each id at most once, however
/// often it appears in `enrolled_ids` or in the catalog.
pub fn compute_enrolled_courses(
    enrolled_ids: &[i32],
    catalog: &[Course],
    progress: &HashMap<i32, CourseProgress>,
) -> Vec<EnrolledCourse> {
    let enrolled: HashSet<i32> = enrolled_ids.iter().copied().collect();
    let mut seen = HashSet::with_capacity(enrolled.len());

    catalog
        .iter()
        .filter(|course| enrolled.contains(&course.id))
        .filter(|course| seen.insert(course.id))
        .map(|course| {
            let p = progress.get(&course.id);
            EnrolledCourse {
                id: course.id,
                title: course.title.clone(),
                teacher_name: course.teacher_name.clone(),
                category: course.category.clone(),
                thumbnail: course.thumbnail.clone(),
                total_lessons: course.total_lessons,
                progress: p.map_or(0.0, |p| finite(p.progress)),
                completed_lessons: p.map_or(0, |p| p.completed_lessons),
                hours_studied: p.map_or(0.0, |p| finite(p.hours_studied)),
                completed: p.is_some_and(|p| p.completed),
                score: p.map_or(0.0, |p| finite(p.score)),
                last_accessed: p.and_then(|p| p.last_accessed),
            }
        })
        .collect()
}

/// Reduce enrolled courses to the dashboard's scalar statistics.
pub fn compute_overall_stats(courses: &[EnrolledCourse], now: DateTime<Utc>) -> OverallStats {
    if courses.is_empty() {
        return OverallStats::default();
    }

    let completed_courses = courses.iter().filter(|c| c.completed).count();
    let total_hours: f64 = courses.iter().map(|c| finite(c.hours_studied)).sum();
    let score_sum: f64 = courses.iter().map(|c| finite(c.score)).sum();
    let cutoff = now - Duration::days(STREAK_WINDOW_DAYS);
    let current_streak = courses
        .iter()
        .filter(|c| c.last_accessed.is_some_and(|at| at >= cutoff))
        .count();

    OverallStats {
        total_courses: courses.len(),
        completed_courses,
        total_hours,
        average_score: score_sum / courses.len() as f64,
        certificates: completed_courses,
        current_streak,
    }
}

/// Classify each assignment for `user_id` as pending, submitted or graded.
///
/// Submissions belonging to other users are ignored. If the same user has
/// several submissions for one assignment, the latest one wins.
pub fn merge_assignment_status(
    user_id: Uuid,
    assignments: &[Assignment],
    submissions: &[Submission],
    now: DateTime<Utc>,
) -> Vec<AssignmentWithStatus> {
    let mut by_assignment: HashMap<i32, &Submission> = HashMap::new();
    for s in submissions.iter().filter(|s| s.student_id == user_id) {
        by_assignment
            .entry(s.assignment_id)
            .and_modify(|current| {
                if s.submitted_at > current.submitted_at {
                    *current = s;
                }
            })
            .or_insert(s);
    }

    assignments
        .iter()
        .map(|a| {
            let submission = by_assignment.get(&a.id).copied();
            let status = classify(submission);
            let days = days_until_due(a.due_at, now);
            AssignmentWithStatus {
                assignment: a.clone(),
                status,
                submitted_at: submission.map(|s| s.submitted_at),
                score: submission.and_then(|s| s.score),
                feedback: submission.and_then(|s| s.feedback.clone()),
                link: submission.map(|s| s.link.clone()),
                days_until_due: days,
                is_overdue: days < 0 && status == AssignmentStatus::Pending,
            }
        })
        .collect()
}

fn classify(submission: Option<&Submission>) -> AssignmentStatus {
    match submission {
        Some(s) if s.score.is_some() => AssignmentStatus::Graded,
        Some(_) => AssignmentStatus::Submitted,
        None => AssignmentStatus::Pending,
    }
}

/// Tab counts over a merged assignment list.
pub fn assignment_counts(merged: &[AssignmentWithStatus]) -> AssignmentCounts {
    merged
        .iter()
        .fold(AssignmentCounts::default(), |mut acc, a| {
            acc.total += 1;
            match a.status {
                AssignmentStatus::Pending => acc.pending += 1,
                AssignmentStatus::Submitted => acc.submitted += 1,
                AssignmentStatus::Graded => acc.graded += 1,
            }
            acc
        })
}

/// Whole days until `due`, rounded up. Negative once the deadline has passed.
pub fn days_until_due(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (due - now).num_seconds();
    let day = 86_400;
    if secs > 0 {
        (secs + day - 1) / day
    } else {
        // Ceiling toward zero for past deadlines: -0.5 days is 0, -1.5 is -1.
        secs / day
    }
}

/// Score band for the progress page: 90 and up is excellent, 80 good,
/// 70 fair, anything lower needs work.
pub fn grade_band(score: f64) -> GradeBand {
    if score >= 90.0 {
        GradeBand::Excellent
    } else if score >= 80.0 {
        GradeBand::Good
    } else if score >= 70.0 {
        GradeBand::Fair
    } else {
        GradeBand::NeedsWork
    }
}

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

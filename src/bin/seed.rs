//! Seed script for development: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Safe to re-run: existing accounts
//! only get their password reset, and sample content is added once.

use chrono::{Duration, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use studyhall::models::assignment::{CreateAssignment, Priority};
use studyhall::models::discussion::{CreateDiscussion, DiscussionCategory};
use studyhall::models::progress::ProgressUpdate;
use studyhall::models::schedule::{CreateEvent, CreateScheduleItem, EventKind, SessionKind};
use studyhall::models::user::{CreateUser, User, UserRole};
use studyhall::services::{assignment, auth, catalog, discussion, enrollment, progress, schedule};

const SEED_PASSWORD: &str = "Study123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")?;
    let pool = studyhall::db::create_pool(&db_url, 5).await?;
    studyhall::db::migrate(&pool).await?;

    println!("=== studyhall seed ===");

    let admin = ensure_user(&pool, "admin@studyhall.local", "Site Administrator", UserRole::Admin).await?;
    let teacher = ensure_user(&pool, "mike.chen@studyhall.local", "Prof. Mike Chen", UserRole::Teacher).await?;
    let student = ensure_user(&pool, "john.doe@studyhall.local", "John Doe", UserRole::Student).await?;
    println!("[done] Users: admin, teacher, student (password {SEED_PASSWORD})");

    let added = catalog::seed_bundled(&pool).await?;
    sqlx::query("UPDATE courses SET teacher_id = $1 WHERE teacher_name = $2 AND teacher_id IS NULL")
        .bind(teacher.id)
        .bind(&teacher.name)
        .execute(&pool)
        .await?;
    println!("[done] Catalog ({added} new courses)");

    seed_assignments(&pool).await?;
    seed_schedule(&pool).await?;
    seed_discussions(&pool, &teacher, &student).await?;
    seed_student_progress(&pool, student.id).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: {} / {SEED_PASSWORD}", admin.email);
    Ok(())
}

async fn ensure_user(pool: &PgPool, email: &str, name: &str, role: UserRole) -> anyhow::Result<User> {
    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if let Some(user) = existing {
        let hash = auth::hash_password(SEED_PASSWORD)?;
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&hash)
            .bind(user.id)
            .execute(pool)
            .await?;
        return Ok(user);
    }

    let user = auth::create_user(
        pool,
        &CreateUser {
            email: email.to_string(),
            password: SEED_PASSWORD.to_string(),
            name: name.to_string(),
            role,
        },
    )
    .await?;
    Ok(user)
}

async fn table_is_empty(pool: &PgPool, table: &str) -> anyhow::Result<bool> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(count == 0)
}

async fn seed_assignments(pool: &PgPool) -> anyhow::Result<()> {
    if !table_is_empty(pool, "assignments").await? {
        println!("[skip] Assignments already present");
        return Ok(());
    }

    let now = Utc::now();
    let samples = [
        ("Calculus Problem Set 5", "Advanced Mathematics", None, 3, 100.0, Priority::High, "Problem Set", "3 hours"),
        ("Programming Assignment 3: Binary Trees", "Algorithms and Data Structures", Some(5), 5, 150.0, Priority::High, "Programming", "6 hours"),
        ("Lab Report: Wave Interference", "Physics Laboratory", None, 7, 80.0, Priority::Medium, "Lab Report", "4 hours"),
        ("Statistics Project: Data Analysis", "Data Science Basics", Some(4), 10, 120.0, Priority::Medium, "Project", "8 hours"),
        ("Midterm Exam Review", "Advanced Mathematics", None, -1, 50.0, Priority::Low, "Review", "2 hours"),
        ("React Component Workshop", "React Fundamentals", Some(1), 2, 100.0, Priority::Medium, "Programming", "3 hours"),
    ];

    for (title, course, course_id, due_in_days, max_score, priority, category, estimated_time) in samples {
        assignment::create(
            pool,
            &CreateAssignment {
                id: None,
                course_id,
                title: title.to_string(),
                course: course.to_string(),
                teacher_name: "Prof. Mike Chen".to_string(),
                description: format!("{title} for {course}."),
                due_at: now + Duration::days(due_in_days),
                max_score,
                priority,
                category: category.to_string(),
                attachments: vec![],
                estimated_time: estimated_time.to_string(),
            },
        )
        .await?;
    }

    println!("[done] Created {} assignments", samples.len());
    Ok(())
}

async fn seed_schedule(pool: &PgPool) -> anyhow::Result<()> {
    if !table_is_empty(pool, "schedule_items").await? {
        println!("[skip] Schedule already present");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let at = |day_offset: i64, h: u32, m: u32| {
        let time = NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN);
        (today + Duration::days(day_offset)).and_time(time).and_utc()
    };

    let sessions = [
        ("Advanced Mathematics", SessionKind::Lecture, at(0, 9, 0), at(0, 10, 30), "Dr. Sarah Johnson", "Room 101", 45, false),
        ("Computer Science Lab", SessionKind::Lab, at(0, 11, 0), at(0, 12, 30), "Prof. Mike Chen", "Lab 205", 24, true),
        ("Physics Discussion", SessionKind::Discussion, at(0, 14, 0), at(0, 15, 0), "Dr. Emily Davis", "Virtual Room", 18, false),
        ("Statistics Workshop", SessionKind::Workshop, at(0, 15, 30), at(0, 17, 0), "Prof. Alex Wilson", "Room 301", 30, false),
        ("Linear Algebra", SessionKind::Lecture, at(1, 10, 0), at(1, 11, 30), "Dr. Sarah Johnson", "Room 102", 40, false),
    ];

    for (title, kind, starts_at, ends_at, teacher_name, room, students, is_live) in sessions {
        schedule::create_item(
            pool,
            &CreateScheduleItem {
                title: title.to_string(),
                kind,
                starts_at,
                ends_at,
                teacher_name: teacher_name.to_string(),
                room: room.to_string(),
                students,
                is_live,
            },
        )
        .await?;
    }

    let events = [
        ("Midterm Exams", 7, EventKind::Exam),
        ("Project Submission Deadline", 10, EventKind::Deadline),
        ("Guest Lecture: AI in Education", 13, EventKind::Special),
    ];
    for (title, in_days, kind) in events {
        schedule::create_event(
            pool,
            &CreateEvent {
                title: title.to_string(),
                date: today + Duration::days(in_days),
                kind,
            },
        )
        .await?;
    }

    println!("[done] Created {} sessions and {} events", sessions.len(), events.len());
    Ok(())
}

async fn seed_discussions(pool: &PgPool, teacher: &User, student: &User) -> anyhow::Result<()> {
    if !table_is_empty(pool, "discussions").await? {
        println!("[skip] Discussions already present");
        return Ok(());
    }

    let threads = [
        (student, "How to solve complex integration problems?", "Advanced Mathematics", DiscussionCategory::Mathematics, "calculus, integration, help"),
        (teacher, "Best practices for React component optimization", "React Fundamentals", DiscussionCategory::ComputerScience, "react, performance"),
        (student, "Understanding quantum mechanics principles", "Physics Laboratory", DiscussionCategory::Physics, "quantum, theory"),
        (student, "Study group for upcoming midterms", "General", DiscussionCategory::General, "study-group, midterms"),
    ];

    for (author, title, course, category, tags) in threads {
        discussion::create(
            pool,
            author,
            &CreateDiscussion {
                title: title.to_string(),
                content: format!("{title} Share your approach below."),
                category,
                course: course.to_string(),
                tags: tags.to_string(),
            },
        )
        .await?;
    }

    println!("[done] Created {} discussions", threads.len());
    Ok(())
}

async fn seed_student_progress(pool: &PgPool, student_id: Uuid) -> anyhow::Result<()> {
    let plan = [(1, 75.0, 18, 24.5), (3, 100.0, 18, 15.0), (4, 30.0, 9, 8.0)];

    for (course_id, pct, lessons, hours) in plan {
        let outcome = enrollment::enroll(pool, student_id, course_id).await?;
        if !outcome.newly_enrolled {
            continue;
        }
        progress::update_progress(
            pool,
            student_id,
            course_id,
            &ProgressUpdate {
                progress: pct,
                completed_lessons: lessons,
                hours_studied: hours,
            },
        )
        .await?;
        progress::record_score(pool, student_id, course_id, 60.0 + pct * 0.35).await?;
    }

    println!("[done] Enrolled sample student in {} courses", plan.len());
    Ok(())
}

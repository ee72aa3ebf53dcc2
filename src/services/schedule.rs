//! Class sessions and calendar events.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::AppError;
use crate::models::schedule::{CreateEvent, CreateScheduleItem, ScheduleItem, UpcomingEvent};

/// Longest range `/schedule?from=&to=` will return.
pub const MAX_RANGE_DAYS: i64 = 62;

/// UTC bounds `[start, end)` covering the inclusive date range.
fn day_bounds(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = from.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let end = to.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc() + Duration::days(1);
    (start, end)
}

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if to < from {
        return Err(AppError::Validation(
            "to must not be before from".to_string(),
        ));
    }
    if (to - from).num_days() > MAX_RANGE_DAYS {
        return Err(AppError::Validation(format!(
            "range must not exceed {MAX_RANGE_DAYS} days"
        )));
    }
    Ok(())
}

/// Sessions starting on `date`, in start order.
pub async fn list_for_day(pool: &PgPool, date: NaiveDate) -> Result<Vec<ScheduleItem>, AppError> {
    list_range(pool, date, date).await
}

/// Sessions starting within the inclusive date range.
pub async fn list_range(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<ScheduleItem>, AppError> {
    check_range(from, to)?;
    let (start, end) = day_bounds(from, to);

    let rows = sqlx::query_as::<_, ScheduleItem>(
        r#"
        SELECT * FROM schedule_items
        WHERE starts_at >= $1 AND starts_at < $2
        ORDER BY starts_at ASC, id ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Events on or after `from`, soonest first.
pub async fn upcoming_events(pool: &PgPool, from: NaiveDate) -> Result<Vec<UpcomingEvent>, AppError> {
    let rows = sqlx::query_as::<_, UpcomingEvent>(
        "SELECT * FROM upcoming_events WHERE date >= $1 ORDER BY date ASC, id ASC",
    )
    .bind(from)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create_item(pool: &PgPool, input: &CreateScheduleItem) -> Result<ScheduleItem, AppError> {
    input.validate()?;
    if input.ends_at <= input.starts_at {
        return Err(AppError::Validation(
            "ends_at must be after starts_at".to_string(),
        ));
    }

    let item = sqlx::query_as::<_, ScheduleItem>(
        r#"
        INSERT INTO schedule_items (title, kind, starts_at, ends_at, teacher_name, room,
            students, is_live)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(input.title.trim())
    .bind(input.kind)
    .bind(input.starts_at)
    .bind(input.ends_at)
    .bind(&input.teacher_name)
    .bind(&input.room)
    .bind(input.students)
    .bind(input.is_live)
    .fetch_one(pool)
    .await?;

    tracing::info!(item_id = item.id, starts_at = %item.starts_at, "Schedule item created");
    Ok(item)
}

pub async fn create_event(pool: &PgPool, input: &CreateEvent) -> Result<UpcomingEvent, AppError> {
    input.validate()?;

    let event = sqlx::query_as::<_, UpcomingEvent>(
        "INSERT INTO upcoming_events (title, date, kind) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(input.title.trim())
    .bind(input.date)
    .bind(input.kind)
    .fetch_one(pool)
    .await?;

    tracing::info!(event_id = event.id, date = %event.date, "Upcoming event created");
    Ok(event)
}

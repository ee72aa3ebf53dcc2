//! Learner achievements.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::achievement::{default_achievements, normalize_icon, Achievement};

/// Stored achievements for a user, or the starter set when none exist.
pub async fn fetch_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Achievement>, AppError> {
    let stored = sqlx::query_as::<_, Achievement>(
        r#"
        SELECT id, title, description, icon, earned, earned_at, progress, total, color
        FROM achievements
        WHERE user_id = $1
        ORDER BY earned DESC, title ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    if stored.is_empty() {
        tracing::debug!(user_id = %user_id, "No stored achievements, using defaults");
        return Ok(default_achievements());
    }

    Ok(stored
        .into_iter()
        .map(|mut a| {
            a.icon = normalize_icon(&a.icon).to_string();
            a
        })
        .collect())
}

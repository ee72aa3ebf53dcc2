//! Discussion forum threads.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::discussion::{CategoryCounts, CreateDiscussion, Discussion, DiscussionCategory};
use crate::models::user::User;

/// `?category=&search=` filters for the thread list.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DiscussionFilters {
    pub category: Option<DiscussionCategory>,
    pub search: Option<String>,
}

/// Split a comma-separated tag string, trimming each tag and dropping blanks.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Threads matching the filters. Pinned first, then newest.
pub async fn list(pool: &PgPool, filters: &DiscussionFilters) -> Result<Vec<Discussion>, AppError> {
    let search = filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if filters.category.is_some() {
        param_index += 1;
        conditions.push(format!("category = ${param_index}"));
    }
    if search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(title ILIKE ${param_index} OR content ILIKE ${param_index})"
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT * FROM discussions {where_clause} ORDER BY is_pinned DESC, created_at DESC"
    );
    let mut query = sqlx::query_as::<_, Discussion>(&sql);
    if let Some(category) = filters.category {
        query = query.bind(category);
    }
    if let Some(ref pattern) = search {
        query = query.bind(pattern);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Start a thread. New threads are created pinned.
pub async fn create(
    pool: &PgPool,
    author: &User,
    input: &CreateDiscussion,
) -> Result<Discussion, AppError> {
    input.validate()?;
    let tags = split_tags(&input.tags);

    let discussion = sqlx::query_as::<_, Discussion>(
        r#"
        INSERT INTO discussions (title, content, author_id, author_name, author_role,
            course, category, tags, is_pinned)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true)
        RETURNING *
        "#,
    )
    .bind(input.title.trim())
    .bind(input.content.trim())
    .bind(author.id)
    .bind(&author.name)
    .bind(author.role)
    .bind(input.course.trim())
    .bind(input.category)
    .bind(&tags)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        discussion_id = %discussion.id,
        author_id = %author.id,
        tag_count = tags.len(),
        "Discussion created"
    );
    Ok(discussion)
}

/// Thread counts per category, including zero for empty categories.
pub async fn category_counts(pool: &PgPool) -> Result<CategoryCounts, AppError> {
    let rows = sqlx::query_as::<_, (DiscussionCategory, i64)>(
        "SELECT category, COUNT(*) FROM discussions GROUP BY category",
    )
    .fetch_all(pool)
    .await?;

    let mut counts = CategoryCounts::default();
    for (category, count) in rows {
        counts.add(category, count);
    }
    Ok(counts)
}

pub async fn like(pool: &PgPool, id: Uuid) -> Result<Discussion, AppError> {
    sqlx::query_as::<_, Discussion>(
        r#"
        UPDATE discussions SET likes = likes + 1, last_activity = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Discussion {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            split_tags(" calculus,  derivatives ,, help ,"),
            vec!["calculus", "derivatives", "help"]
        );
    }

    #[test]
    fn empty_tag_string_yields_nothing() {
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }

    #[test]
    fn single_tag_without_commas() {
        assert_eq!(split_tags("react"), vec!["react"]);
    }
}

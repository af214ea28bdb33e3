//! Article repository
//!
//! Database operations for articles, including the compare-and-swap
//! approval write that guarantees the pending-to-approved transition
//! happens exactly once even under concurrent approvers.

use crate::models::{Article, ArticleSource, UpdateArticleInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a new pending article
    async fn create(&self, title: &str, content: &str, source: ArticleSource) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Update title and/or content; approval fields are never touched
    async fn update_content(&self, id: i64, input: &UpdateArticleInput) -> Result<Article>;

    /// Delete an article
    async fn delete(&self, id: i64) -> Result<()>;

    /// Mark a pending article approved.
    ///
    /// Returns `true` when this call performed the transition and `false`
    /// when the article was already approved (or missing). The write is a
    /// single guarded UPDATE, so of any number of concurrent approvers
    /// exactly one sees `true`.
    async fn approve(&self, id: i64, editor_id: i64, at: DateTime<Utc>) -> Result<bool>;

    /// List pending articles, newest first
    async fn list_pending(&self) -> Result<Vec<Article>>;

    /// List approved articles, newest first
    async fn list_approved(&self) -> Result<Vec<Article>>;

    /// List approved articles from the reader's subscribed sources,
    /// newest first. Computed live against the current subscription and
    /// approval state.
    async fn list_feed(&self, reader_id: i64) -> Result<Vec<Article>>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: SqlitePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

const ARTICLE_COLUMNS: &str =
    "id, title, content, author_id, publisher_id, approved, approved_by, approved_at, created_at, updated_at";

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, title: &str, content: &str, source: ArticleSource) -> Result<Article> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, content, author_id, publisher_id, approved, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(source.author_id())
        .bind(source.publisher_id())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create article")?;

        Ok(Article {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            content: content.to_string(),
            source,
            approved: false,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_article(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_content(&self, id: i64, input: &UpdateArticleInput) -> Result<Article> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article not found"))?;

        let now = Utc::now();
        let new_title = input.title.as_ref().unwrap_or(&existing.title);
        let new_content = input.content.as_ref().unwrap_or(&existing.content);

        sqlx::query("UPDATE articles SET title = ?, content = ?, updated_at = ? WHERE id = ?")
            .bind(new_title)
            .bind(new_content)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update article")?;

        Ok(Article {
            title: new_title.clone(),
            content: new_content.clone(),
            updated_at: now,
            ..existing
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?;
        Ok(())
    }

    async fn approve(&self, id: i64, editor_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET approved = 1, approved_by = ?, approved_at = ?, updated_at = ?
            WHERE id = ? AND approved = 0
            "#,
        )
        .bind(editor_id)
        .bind(at)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to approve article")?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_pending(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE approved = 0 ORDER BY created_at DESC, id DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list pending articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn list_approved(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE approved = 1 ORDER BY created_at DESC, id DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list approved articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn list_feed(&self, reader_id: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM articles
            WHERE approved = 1
              AND (
                author_id IN (
                    SELECT journalist_id FROM journalist_subscriptions WHERE reader_id = ?
                )
                OR publisher_id IN (
                    SELECT publisher_id FROM publisher_subscriptions WHERE reader_id = ?
                )
              )
            ORDER BY created_at DESC, id DESC
            "#,
            ARTICLE_COLUMNS
        ))
        .bind(reader_id)
        .bind(reader_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list feed articles")?;

        rows.iter().map(row_to_article).collect()
    }
}

/// Map a database row to an Article
fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let author_id: Option<i64> = row.get("author_id");
    let publisher_id: Option<i64> = row.get("publisher_id");
    let source = ArticleSource::from_columns(author_id, publisher_id)
        .context("Invalid article source columns")?;

    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        source,
        approved: row.get("approved"),
        approved_by: row.get("approved_by"),
        approved_at: row.get("approved_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

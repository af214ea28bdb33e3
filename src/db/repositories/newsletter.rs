//! Newsletter repository
//!
//! Database operations for newsletters and their article references.
//! Article membership is a plain pair table; re-adding an article is a
//! no-op rather than an error.

use crate::models::{
    Article, ArticleSource, CreateNewsletterInput, Newsletter, UpdateNewsletterInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Newsletter repository trait
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Create a newsletter owned by the given journalist
    async fn create(&self, author_id: i64, input: &CreateNewsletterInput) -> Result<Newsletter>;

    /// Get newsletter by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Newsletter>>;

    /// Update title and/or description
    async fn update(&self, id: i64, input: &UpdateNewsletterInput) -> Result<Newsletter>;

    /// Delete a newsletter
    async fn delete(&self, id: i64) -> Result<()>;

    /// Add an article reference (no-op when already present)
    async fn add_article(&self, newsletter_id: i64, article_id: i64) -> Result<()>;

    /// Remove an article reference
    async fn remove_article(&self, newsletter_id: i64, article_id: i64) -> Result<()>;

    /// List all referenced articles, newest first
    async fn list_articles(&self, newsletter_id: i64) -> Result<Vec<Article>>;

    /// List only approved referenced articles, newest first
    async fn list_approved_articles(&self, newsletter_id: i64) -> Result<Vec<Article>>;

    /// List newsletters owned by a journalist, newest first
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Newsletter>>;
}

/// SQLx-based newsletter repository implementation
pub struct SqlxNewsletterRepository {
    pool: SqlitePool,
}

impl SqlxNewsletterRepository {
    /// Create a new SQLx newsletter repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn NewsletterRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsletterRepository for SqlxNewsletterRepository {
    async fn create(&self, author_id: i64, input: &CreateNewsletterInput) -> Result<Newsletter> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO newsletters (title, description, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(author_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create newsletter")?;

        Ok(Newsletter {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            description: input.description.clone(),
            author_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Newsletter>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, author_id, created_at, updated_at
            FROM newsletters
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get newsletter by ID")?;

        Ok(row.map(|row| row_to_newsletter(&row)))
    }

    async fn update(&self, id: i64, input: &UpdateNewsletterInput) -> Result<Newsletter> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Newsletter not found"))?;

        let now = Utc::now();
        let new_title = input.title.as_ref().unwrap_or(&existing.title);
        let new_description = input.description.as_ref().unwrap_or(&existing.description);

        sqlx::query("UPDATE newsletters SET title = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(new_title)
            .bind(new_description)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update newsletter")?;

        Ok(Newsletter {
            title: new_title.clone(),
            description: new_description.clone(),
            updated_at: now,
            ..existing
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM newsletters WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete newsletter")?;
        Ok(())
    }

    async fn add_article(&self, newsletter_id: i64, article_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO newsletter_articles (newsletter_id, article_id) VALUES (?, ?)",
        )
        .bind(newsletter_id)
        .bind(article_id)
        .execute(&self.pool)
        .await
        .context("Failed to add article to newsletter")?;
        Ok(())
    }

    async fn remove_article(&self, newsletter_id: i64, article_id: i64) -> Result<()> {
        sqlx::query(
            "DELETE FROM newsletter_articles WHERE newsletter_id = ? AND article_id = ?",
        )
        .bind(newsletter_id)
        .bind(article_id)
        .execute(&self.pool)
        .await
        .context("Failed to remove article from newsletter")?;
        Ok(())
    }

    async fn list_articles(&self, newsletter_id: i64) -> Result<Vec<Article>> {
        self.query_articles(newsletter_id, false).await
    }

    async fn list_approved_articles(&self, newsletter_id: i64) -> Result<Vec<Article>> {
        self.query_articles(newsletter_id, true).await
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Newsletter>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, author_id, created_at, updated_at
            FROM newsletters
            WHERE author_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list newsletters by author")?;

        Ok(rows.iter().map(row_to_newsletter).collect())
    }
}

impl SqlxNewsletterRepository {
    async fn query_articles(&self, newsletter_id: i64, approved_only: bool) -> Result<Vec<Article>> {
        let filter = if approved_only { "AND a.approved = 1" } else { "" };
        let rows = sqlx::query(&format!(
            r#"
            SELECT a.id, a.title, a.content, a.author_id, a.publisher_id, a.approved,
                   a.approved_by, a.approved_at, a.created_at, a.updated_at
            FROM articles a
            INNER JOIN newsletter_articles na ON na.article_id = a.id
            WHERE na.newsletter_id = ? {}
            ORDER BY a.created_at DESC, a.id DESC
            "#,
            filter
        ))
        .bind(newsletter_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list newsletter articles")?;

        let mut articles = Vec::new();
        for row in &rows {
            let author_id: Option<i64> = row.get("author_id");
            let publisher_id: Option<i64> = row.get("publisher_id");
            articles.push(Article {
                id: row.get("id"),
                title: row.get("title"),
                content: row.get("content"),
                source: ArticleSource::from_columns(author_id, publisher_id)
                    .context("Invalid article source columns")?,
                approved: row.get("approved"),
                approved_by: row.get("approved_by"),
                approved_at: row.get("approved_at"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            });
        }
        Ok(articles)
    }
}

fn row_to_newsletter(row: &sqlx::sqlite::SqliteRow) -> Newsletter {
    Newsletter {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

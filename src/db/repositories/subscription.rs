//! Subscription repository
//!
//! Database operations for the reader subscription edges. The two edge
//! kinds (reader-to-journalist, reader-to-publisher) live in separate
//! tables; all operations take a `SubscriptionTarget` and dispatch on it.

use crate::db::repositories::user::row_to_user;
use crate::models::{SubscriptionTarget, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Add a subscription edge (no-op when already present)
    async fn add(&self, reader_id: i64, target: SubscriptionTarget) -> Result<()>;

    /// Remove a subscription edge
    async fn remove(&self, reader_id: i64, target: SubscriptionTarget) -> Result<()>;

    /// Check whether the edge exists
    async fn exists(&self, reader_id: i64, target: SubscriptionTarget) -> Result<bool>;

    /// All active readers subscribed to the target
    async fn subscribers_of(&self, target: SubscriptionTarget) -> Result<Vec<User>>;

    /// Whether the reader has any subscription edge at all
    async fn has_any(&self, reader_id: i64) -> Result<bool>;
}

/// SQLx-based subscription repository implementation
pub struct SqlxSubscriptionRepository {
    pool: SqlitePool,
}

impl SqlxSubscriptionRepository {
    /// Create a new SQLx subscription repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SubscriptionRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Table and target column for each edge kind
fn edge_table(target: SubscriptionTarget) -> (&'static str, &'static str) {
    match target {
        SubscriptionTarget::Journalist(_) => ("journalist_subscriptions", "journalist_id"),
        SubscriptionTarget::Publisher(_) => ("publisher_subscriptions", "publisher_id"),
    }
}

#[async_trait]
impl SubscriptionRepository for SqlxSubscriptionRepository {
    async fn add(&self, reader_id: i64, target: SubscriptionTarget) -> Result<()> {
        let (table, column) = edge_table(target);
        sqlx::query(&format!(
            "INSERT OR IGNORE INTO {} (reader_id, {}) VALUES (?, ?)",
            table, column
        ))
        .bind(reader_id)
        .bind(target.id())
        .execute(&self.pool)
        .await
        .context("Failed to add subscription")?;
        Ok(())
    }

    async fn remove(&self, reader_id: i64, target: SubscriptionTarget) -> Result<()> {
        let (table, column) = edge_table(target);
        sqlx::query(&format!(
            "DELETE FROM {} WHERE reader_id = ? AND {} = ?",
            table, column
        ))
        .bind(reader_id)
        .bind(target.id())
        .execute(&self.pool)
        .await
        .context("Failed to remove subscription")?;
        Ok(())
    }

    async fn exists(&self, reader_id: i64, target: SubscriptionTarget) -> Result<bool> {
        let (table, column) = edge_table(target);
        let row = sqlx::query(&format!(
            "SELECT COUNT(*) as count FROM {} WHERE reader_id = ? AND {} = ?",
            table, column
        ))
        .bind(reader_id)
        .bind(target.id())
        .fetch_one(&self.pool)
        .await
        .context("Failed to check subscription")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn subscribers_of(&self, target: SubscriptionTarget) -> Result<Vec<User>> {
        let (table, column) = edge_table(target);
        let rows = sqlx::query(&format!(
            r#"
            SELECT u.id, u.username, u.email, u.display_name, u.password_hash, u.role, u.is_active, u.created_at, u.updated_at
            FROM users u
            INNER JOIN {} s ON s.reader_id = u.id
            WHERE s.{} = ? AND u.role = 'reader' AND u.is_active = 1
            ORDER BY u.id
            "#,
            table, column
        ))
        .bind(target.id())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subscribers")?;

        let mut users = Vec::new();
        for row in &rows {
            users.push(row_to_user(row)?);
        }
        Ok(users)
    }

    async fn has_any(&self, reader_id: i64) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM journalist_subscriptions WHERE reader_id = ?)
              + (SELECT COUNT(*) FROM publisher_subscriptions WHERE reader_id = ?) as count
            "#,
        )
        .bind(reader_id)
        .bind(reader_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count subscriptions")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

//! Publisher repository
//!
//! Database operations for publishers and their staff membership.

use crate::db::repositories::user::row_to_user;
use crate::models::{CreatePublisherInput, MemberRole, Publisher, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Publisher repository trait
#[async_trait]
pub trait PublisherRepository: Send + Sync {
    /// Create a new publisher
    async fn create(&self, input: &CreatePublisherInput) -> Result<Publisher>;

    /// Get publisher by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Publisher>>;

    /// Check if a publisher name is taken
    async fn exists_by_name(&self, name: &str) -> Result<bool>;

    /// List all publishers ordered by name
    async fn list(&self) -> Result<Vec<Publisher>>;

    /// Add a staff member; replaces the member's previous role if present
    async fn add_member(&self, publisher_id: i64, user_id: i64, role: MemberRole) -> Result<()>;

    /// List staff members with the given role
    async fn list_members(&self, publisher_id: i64, role: MemberRole) -> Result<Vec<User>>;
}

/// SQLx-based publisher repository implementation
pub struct SqlxPublisherRepository {
    pool: SqlitePool,
}

impl SqlxPublisherRepository {
    /// Create a new SQLx publisher repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PublisherRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PublisherRepository for SqlxPublisherRepository {
    async fn create(&self, input: &CreatePublisherInput) -> Result<Publisher> {
        let now = Utc::now();
        let description = input.description.clone().unwrap_or_default();
        let website = input.website.clone().unwrap_or_default();

        let result = sqlx::query(
            r#"
            INSERT INTO publishers (name, description, website, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&description)
        .bind(&website)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create publisher")?;

        Ok(Publisher {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            description,
            website,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Publisher>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, website, created_at, updated_at
            FROM publishers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get publisher by ID")?;

        Ok(row.map(|row| row_to_publisher(&row)))
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM publishers WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check publisher name")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn list(&self) -> Result<Vec<Publisher>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, website, created_at, updated_at
            FROM publishers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list publishers")?;

        Ok(rows.iter().map(row_to_publisher).collect())
    }

    async fn add_member(&self, publisher_id: i64, user_id: i64, role: MemberRole) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO publisher_members (publisher_id, user_id, member_role)
            VALUES (?, ?, ?)
            ON CONFLICT (publisher_id, user_id) DO UPDATE SET member_role = excluded.member_role
            "#,
        )
        .bind(publisher_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to add publisher member")?;
        Ok(())
    }

    async fn list_members(&self, publisher_id: i64, role: MemberRole) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.email, u.display_name, u.password_hash, u.role, u.is_active, u.created_at, u.updated_at
            FROM users u
            INNER JOIN publisher_members pm ON pm.user_id = u.id
            WHERE pm.publisher_id = ? AND pm.member_role = ?
            ORDER BY u.username
            "#,
        )
        .bind(publisher_id)
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list publisher members")?;

        let mut users = Vec::new();
        for row in &rows {
            users.push(row_to_user(row)?);
        }
        Ok(users)
    }
}

fn row_to_publisher(row: &sqlx::sqlite::SqliteRow) -> Publisher {
    Publisher {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        website: row.get("website"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::UserRole;

    async fn setup() -> (SqlxPublisherRepository, SqlxUserRepository) {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        (
            SqlxPublisherRepository::new(pool.clone()),
            SqlxUserRepository::new(pool),
        )
    }

    fn input(name: &str) -> CreatePublisherInput {
        CreatePublisherInput {
            name: name.to_string(),
            description: None,
            website: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (repo, _) = setup().await;

        let created = repo.create(&input("Daily Planet")).await.expect("create");
        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("get")
            .expect("publisher exists");
        assert_eq!(found.name, "Daily Planet");
    }

    #[tokio::test]
    async fn test_exists_by_name() {
        let (repo, _) = setup().await;
        repo.create(&input("Gazette")).await.expect("create");

        assert!(repo.exists_by_name("Gazette").await.expect("check"));
        assert!(!repo.exists_by_name("Bugle").await.expect("check"));
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let (repo, _) = setup().await;
        repo.create(&input("Zeitung")).await.expect("create");
        repo.create(&input("Bugle")).await.expect("create");

        let publishers = repo.list().await.expect("list");
        assert_eq!(publishers.len(), 2);
        assert_eq!(publishers[0].name, "Bugle");
        assert_eq!(publishers[1].name, "Zeitung");
    }

    #[tokio::test]
    async fn test_members() {
        let (repo, users) = setup().await;
        let publisher = repo.create(&input("Herald")).await.expect("create");

        let journalist = users
            .create(&User::new(
                "jane".to_string(),
                "jane@example.com".to_string(),
                "hash".to_string(),
                UserRole::Journalist,
            ))
            .await
            .expect("user");

        repo.add_member(publisher.id, journalist.id, MemberRole::Journalist)
            .await
            .expect("add member");

        let journalists = repo
            .list_members(publisher.id, MemberRole::Journalist)
            .await
            .expect("list members");
        assert_eq!(journalists.len(), 1);
        assert_eq!(journalists[0].username, "jane");

        let editors = repo
            .list_members(publisher.id, MemberRole::Editor)
            .await
            .expect("list members");
        assert!(editors.is_empty());
    }
}

//! Database layer
//!
//! SQLite persistence for the Dispatch core: pool creation, embedded
//! migrations, and the entity repositories.
//!
//! # Usage
//!
//! ```ignore
//! use dispatch_core::config::DatabaseConfig;
//! use dispatch_core::db::{create_pool, migrations};
//!
//! let config = DatabaseConfig::default();
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};

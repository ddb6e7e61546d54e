//! # community-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `community-core`. It handles:
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use community_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use community_db::repositories::PgMuteRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let mutes = PgMuteRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, ping, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgAuditLogRepository, PgGroupRepository, PgMembershipRepository, PgMessageRepository,
    PgModerationLogRepository, PgMuteRepository, PgNotificationRepository, PgPostRepository,
    PgRoomRepository, PgUserRepository,
};

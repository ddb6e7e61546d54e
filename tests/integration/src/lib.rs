//! Integration test utilities for the community API
//!
//! Spawns the real server against the database named by `DATABASE_URL`
//! and seeds users, spaces and content straight through the repositories.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod user;

pub use user::{NewUser, UniqueField, UpdateUserProfile, UserRecord, UserRepository};

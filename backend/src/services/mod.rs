//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod cliq;
pub mod notification;
pub mod user;

pub use cliq::{CliqClient, CliqTokens};
pub use notification::{CliqNotification, NotificationService};
pub use user::UserService;

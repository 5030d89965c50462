//! Shared types for the Flock workspace
//!
//! Data models and DTOs used by the server (and any future clients).
//! DB row types gate their sqlx derives behind the `db` feature.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

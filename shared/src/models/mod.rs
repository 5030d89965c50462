//! Data models
//!
//! Shared between the server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Hierarchy/member/service IDs are `i64`; user IDs are UUID strings.

pub mod attendance;
pub mod church;
pub mod hierarchy;
pub mod leader;
pub mod member;
pub mod role;
pub mod service;
pub mod user;

// Re-exports
pub use attendance::*;
pub use church::*;
pub use hierarchy::*;
pub use leader::*;
pub use member::*;
pub use role::*;
pub use service::*;
pub use user::*;

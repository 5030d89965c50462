//! Flock Server — church attendance and membership management
//!
//! # Module structure
//!
//! ```text
//! flock-server/src/
//! ├── core/          # configuration, state, server
//! ├── auth/          # JWT, argon2, request middleware
//! ├── rbac/          # hierarchy-scoped authorization
//! ├── leadership/    # leader assignment workflow
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # pool, migrations, repositories
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod leadership;
pub mod rbac;
pub mod utils;

// Re-export the types most callers need.
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro — structured events on the "security" target.
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and initialize logging. Called once at startup, before
/// anything reads configuration.
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}

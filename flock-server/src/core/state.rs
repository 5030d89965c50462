//! Server state
//!
//! Shared handles for the whole request pipeline. Cloning is shallow (a
//! pool handle and two Arcs), so every handler gets its own copy.

use std::sync::Arc;

use sqlx::SqlitePool;

use shared::models::Role;

use crate::auth::{JwtService, hash_password};
use crate::core::Config;
use crate::db;
use crate::db::repository::{church, user as user_repo};
use crate::utils::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Connect, migrate, and seed. The seed is idempotent: the church row
    /// is created only when absent, and the bootstrap admin only while the
    /// users table is empty, so restarts never duplicate anything.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Cannot create work dir: {e}")))?;

        let pool = db::connect(&config.database_url).await?;
        let state = Self {
            config: Arc::new(config.clone()),
            pool,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
        };
        state.bootstrap().await?;
        Ok(state)
    }

    /// State over an existing pool, for tests.
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        Self {
            config: Arc::new(config.clone()),
            pool,
            jwt_service: Arc::new(JwtService::with_config(config.jwt)),
        }
    }

    /// Seed the church row and, on an empty users table, the bootstrap
    /// admin. Safe to call repeatedly.
    pub async fn bootstrap(&self) -> AppResult<()> {
        let church = church::ensure(
            &self.pool,
            &self.config.church_name,
            self.config.church_address.as_deref(),
        )
        .await?;
        tracing::info!(church_id = church.id, name = %church.name, "church ready");

        if user_repo::count(&self.pool).await? == 0 {
            let hashed = hash_password(&self.config.admin_password)?;
            let admin = user_repo::create(
                &self.pool,
                user_repo::NewUser {
                    email: self.config.admin_email.clone(),
                    username: Some("admin".to_string()),
                    password: hashed,
                    first_name: None,
                    last_name: None,
                    role: Role::Admin,
                    group_id: None,
                    pcf_id: None,
                    cell_id: None,
                    member_id: None,
                    force_password_change: true,
                },
            )
            .await?;
            tracing::warn!(
                user_id = %admin.id,
                email = %admin.email,
                "seeded bootstrap admin; change its password on first login"
            );
        }

        Ok(())
    }
}

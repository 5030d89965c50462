use crate::auth::JwtConfig;

/// Server configuration.
///
/// Every field can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/flock | work directory (database, logs) |
/// | DATABASE_URL | sqlite:{WORK_DIR}/flock.db | sqlx SQLite URL |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | CHURCH_NAME | — | church row seeded at first start |
/// | CHURCH_ADDRESS | — | optional address for the church row |
/// | ADMIN_EMAIL | admin@flock.local | bootstrap admin login |
/// | ADMIN_PASSWORD | change-me-on-first-login | bootstrap admin password |
///
/// JWT settings come from [`JwtConfig`] (`JWT_SECRET` and friends).
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_url: String,
    pub http_port: u16,
    pub jwt: JwtConfig,
    pub environment: String,
    pub church_name: String,
    pub church_address: Option<String>,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    /// Load from environment variables, with defaults for anything unset.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/flock".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{work_dir}/flock.db"));

        Self {
            work_dir,
            database_url,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            church_name: std::env::var("CHURCH_NAME")
                .unwrap_or_else(|_| "Christ Embassy Abuja Zone 1".into()),
            church_address: std::env::var("CHURCH_ADDRESS").ok(),
            admin_email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@flock.local".into()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "change-me-on-first-login".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

use crate::auth::JwtConfig;

/// Server configuration
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Work directory (database, ratecard archive, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | DATABASE_PATH | <WORK_DIR>/ratecard.db | SQLite database file |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | ADMIN_USERNAME | admin | Seeded admin account name |
/// | ADMIN_PASSWORD | admin | Seeded admin account password |
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory; the ratecard archive lives under it
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Explicit database file path; defaults to `<work_dir>/ratecard.db`
    pub database_path: Option<String>,
    /// Running environment: development | staging | production
    pub environment: String,
    /// JWT authentication settings
    pub jwt: JwtConfig,
    /// Seeded admin account, created when the admin table is empty
    pub admin_username: String,
    pub admin_password: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults when unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::from_env(),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".into()),
        }
    }

    /// Resolved database file path
    pub fn database_file(&self) -> String {
        self.database_path
            .clone()
            .unwrap_or_else(|| format!("{}/ratecard.db", self.work_dir))
    }
}

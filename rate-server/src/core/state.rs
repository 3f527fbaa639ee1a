use std::sync::Arc;

use dashmap::DashMap;
use shared::models::RateType;
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::auth::{JwtService, hash_password};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository as repo;
use crate::services::StorageService;
use crate::utils::AppError;

/// In-flight import markers, keyed by (country id, rate type).
///
/// Two concurrent imports for the same key would interleave partial
/// writes; the second one is rejected while the marker is held.
pub type ImportLocks = Arc<DashMap<(i64, RateType), ()>>;

/// Server state - shared handles for all services
///
/// Cloning is shallow (Arc-backed), one clone per request is cheap.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite database service
    pub db: DbService,
    /// JWT authentication service
    pub jwt_service: Arc<JwtService>,
    /// Ratecard archive storage
    pub storage: StorageService,
    /// In-flight ratecard import markers
    pub import_locks: ImportLocks,
}

impl ServerState {
    /// Initialize all services: work dir, database (with migrations),
    /// seeded admin account, JWT and archive storage.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create work dir {}: {e}",
                config.work_dir
            ))
        })?;

        let db = DbService::new(&config.database_file()).await?;
        ensure_default_admin(&db.pool, config).await?;

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service: Arc::new(JwtService::new(config.jwt.clone())),
            storage: StorageService::new(&config.work_dir),
            import_locks: Arc::new(DashMap::new()),
        })
    }

    /// Database connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }
}

/// Seed the configured admin account when the admin table is empty.
async fn ensure_default_admin(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    if repo::admin_user::count(pool).await? > 0 {
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password)?;
    repo::admin_user::create(pool, &config.admin_username, &password_hash, now_millis()).await?;
    tracing::warn!(
        username = %config.admin_username,
        "Seeded admin account; change ADMIN_PASSWORD before exposing this server"
    );
    Ok(())
}

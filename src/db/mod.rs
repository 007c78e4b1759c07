use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::entities::{app_config, landingsplasser, vass_vann};

pub mod migrator;
pub mod repositories;

// Pool tuning shared by the server and the CLI.
const POOL_MAX_DEFAULT: u32 = 5;
const POOL_MIN_DEFAULT: u32 = 1;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);
const CONNECTION_LIFETIME: Duration = Duration::from_secs(600);

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    /// Connect with default pool sizing. Tests and one-off commands use this.
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::connect(db_url, POOL_MAX_DEFAULT, POOL_MIN_DEFAULT).await
    }

    /// Connect with the pool limits from the `[database]` config section.
    pub async fn from_config(database: &DatabaseConfig) -> Result<Self> {
        Self::connect(
            &database.url,
            database.max_connections,
            database.min_connections,
        )
        .await
    }

    async fn connect(db_url: &str, pool_max: u32, pool_min: u32) -> Result<Self> {
        // Local SQLite databases are created on first use; the hosted
        // Postgres backend already exists.
        if let Some(raw_path) = db_url.strip_prefix("sqlite:")
            && !db_url.contains(":memory:")
        {
            let file = Path::new(raw_path);
            if let Some(parent) = file.parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !file.exists() {
                std::fs::File::create(file)?;
            }
        }

        let mut options = ConnectOptions::new(db_url.to_string());
        options
            .max_connections(pool_max)
            .min_connections(pool_min)
            .connect_timeout(CONNECT_TIMEOUT)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(IDLE_TIMEOUT)
            .max_lifetime(CONNECTION_LIFETIME)
            .sqlx_logging(false);

        let conn = Database::connect(options).await?;
        info!("Database pool ready ({pool_min}..{pool_max} connections)");

        Ok(Self { conn })
    }

    /// Apply migrations. Meant for local and test databases; the hosted
    /// backend owns the live schema, so the server never calls this unless
    /// configured to.
    pub async fn migrate(&self) -> Result<()> {
        use sea_orm_migration::MigratorTrait;

        migrator::Migrator::up(&self.conn, None).await?;
        info!("Migrations applied");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let probe = Statement::from_string(backend, "SELECT 1".to_string());
        self.conn.query_one(probe).await?;
        Ok(())
    }

    fn search_repo(&self) -> repositories::search::SearchRepository {
        repositories::search::SearchRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profiles::ProfileRepository {
        repositories::profiles::ProfileRepository::new(self.conn.clone())
    }

    fn app_config_repo(&self) -> repositories::app_config::AppConfigRepository {
        repositories::app_config::AppConfigRepository::new(self.conn.clone())
    }

    fn archive_repo(&self) -> repositories::archive::ArchiveRepository {
        repositories::archive::ArchiveRepository::new(self.conn.clone())
    }

    pub async fn waters_matching(&self, term: &str) -> Result<Vec<vass_vann::Model>> {
        self.search_repo().waters_matching(term).await
    }

    pub async fn landing_sites_matching(&self, term: &str) -> Result<Vec<landingsplasser::Model>> {
        self.search_repo().landing_sites_matching(term).await
    }

    pub async fn water_sample(&self) -> Result<Vec<vass_vann::Model>> {
        self.search_repo().water_sample().await
    }

    pub async fn landing_site_sample(&self) -> Result<Vec<landingsplasser::Model>> {
        self.search_repo().landing_site_sample().await
    }

    pub async fn can_edit_markers(&self, user_id: Uuid) -> Result<bool> {
        self.profile_repo().can_edit_markers(user_id).await
    }

    pub async fn app_config(&self) -> Result<Option<app_config::Model>> {
        self.app_config_repo().get().await
    }

    pub async fn archive_table_exists(&self, table: &str) -> Result<bool> {
        self.archive_repo().table_exists(table).await
    }
}

//! PostgreSQL connection pool and schema management.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::{MigrationStatus, MigratorTrait};

use super::HealthCheck;
use crate::config::Config;
use crate::errors::AppResult;

pub mod migrations;

pub use migrations::Migrator;

/// Shared SeaORM pool
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open the pool and bring the schema up to date.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let db = Self::open(config).await?;
        db.migrate_up().await?;
        tracing::info!("Database connected and migrations applied");
        Ok(db)
    }

    /// Open the pool without touching the schema.
    pub async fn open(config: &Config) -> Result<Self, DbErr> {
        let connection = SeaDatabase::connect(&config.database_url).await?;
        Ok(Self { connection })
    }

    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    pub async fn migrate_up(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Revert the most recent migration only.
    pub async fn migrate_down(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Every known migration with whether it has been applied.
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        Ok(Migrator::get_migration_with_status(&self.connection)
            .await?
            .iter()
            .map(|m| (m.name().to_string(), m.status() == MigrationStatus::Applied))
            .collect())
    }

    /// Drop every table, then re-run all migrations.
    pub async fn reset(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }
}

#[async_trait]
impl HealthCheck for Database {
    async fn ping(&self) -> AppResult<()> {
        self.connection.execute_unprepared("SELECT 1").await?;
        Ok(())
    }
}

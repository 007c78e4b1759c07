use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::constants::archive::CONFIG_ROW_ID;
use crate::entities::app_config;

pub struct AppConfigRepository {
    conn: DatabaseConnection,
}

impl AppConfigRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The singleton active-season row.
    pub async fn get(&self) -> Result<Option<app_config::Model>> {
        app_config::Entity::find_by_id(CONFIG_ROW_ID)
            .one(&self.conn)
            .await
            .context("Failed to read app_config")
    }
}

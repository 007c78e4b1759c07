use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::entities::user_profiles;

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Profile row for an authenticated user, if one exists.
    pub async fn profile(&self, user_id: Uuid) -> Result<Option<user_profiles::Model>> {
        user_profiles::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user profile")
    }

    /// Whether the user may edit markers and archive seasons.
    /// A missing profile row counts as no.
    pub async fn can_edit_markers(&self, user_id: Uuid) -> Result<bool> {
        let profile = self.profile(user_id).await?;
        Ok(profile.is_some_and(|p| p.can_edit_markers))
    }
}

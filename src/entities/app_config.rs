use sea_orm::entity::prelude::*;

/// Singleton row (id = 1) pointing the frontend at the active table set.
///
/// `active_year = "current"` means the live, unarchived tables. The row is
/// only ever rewritten by the generated archive SQL, never by this service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "app_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub active_year: String,
    pub active_prefix: String,
    pub updated_at: Option<DateTimeUtc>,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

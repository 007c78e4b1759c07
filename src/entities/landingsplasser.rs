use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "landingsplasser")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Site designation shown on the map, e.g. "LP-12 Storvatnet".
    pub lp: Option<String>,

    /// Short dispatch code, e.g. "ST-3".
    pub kode: Option<String>,

    pub lat: f64,
    pub lng: f64,
    pub notes: Option<String>,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

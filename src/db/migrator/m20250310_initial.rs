use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(VassVann)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Landingsplasser)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AppConfig)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Seed the singleton pointer at the live tables.
        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(AppConfig)
            .columns([
                crate::entities::app_config::Column::Id,
                crate::entities::app_config::Column::ActiveYear,
                crate::entities::app_config::Column::ActivePrefix,
            ])
            .values_panic([
                crate::constants::archive::CONFIG_ROW_ID.into(),
                "current".into(),
                "".into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppConfig).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Landingsplasser).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VassVann).to_owned())
            .await?;

        Ok(())
    }
}

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let store = Store::from_config(&config.database).await?;
    store.migrate().await?;

    println!("✓ Migrations applied to {}", config.database.url);
    Ok(())
}

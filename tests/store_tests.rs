//! Integration tests for the Store facade against an in-memory SQLite
//! database, covering migrations, capability lookups and the archive probe.

use kalkops::db::Store;
use kalkops::entities::{user_profiles, vass_vann};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use uuid::Uuid;

async fn spawn_store() -> Store {
    let store = Store::new("sqlite::memory:")
        .await
        .expect("failed to connect");
    store.migrate().await.expect("failed to migrate");
    store
}

fn water(id: i32, name: &str) -> vass_vann::ActiveModel {
    vass_vann::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        lat: Set(60.1),
        lng: Set(7.2),
        tonn: Set(None),
        status: Set(None),
        created_at: Set(None),
    }
}

#[tokio::test]
async fn test_migrations_seed_the_active_season_pointer() {
    let store = spawn_store().await;

    let config = store
        .app_config()
        .await
        .expect("failed to query app_config")
        .expect("app_config row should be seeded by migrations");

    assert_eq!(config.id, 1);
    assert_eq!(config.active_year, "current");
    assert_eq!(config.active_prefix, "");
    assert_eq!(config.updated_by, None);
}

#[tokio::test]
async fn test_can_edit_markers_requires_a_profile_row() {
    let store = spawn_store().await;

    let editor = Uuid::from_u128(10);
    let viewer = Uuid::from_u128(11);
    let unknown = Uuid::from_u128(12);

    user_profiles::ActiveModel {
        id: Set(editor),
        email: Set("editor@kalkops.no".to_string()),
        can_edit_markers: Set(true),
        created_at: Set(None),
    }
    .insert(&store.conn)
    .await
    .expect("failed to seed editor");

    user_profiles::ActiveModel {
        id: Set(viewer),
        email: Set("viewer@kalkops.no".to_string()),
        can_edit_markers: Set(false),
        created_at: Set(None),
    }
    .insert(&store.conn)
    .await
    .expect("failed to seed viewer");

    assert!(store.can_edit_markers(editor).await.expect("editor lookup"));
    assert!(!store.can_edit_markers(viewer).await.expect("viewer lookup"));
    assert!(
        !store
            .can_edit_markers(unknown)
            .await
            .expect("unknown lookup")
    );
}

#[tokio::test]
async fn test_water_matching_is_case_insensitive_and_capped() {
    let store = spawn_store().await;

    for (id, name) in [(1, "Storvatnet"), (2, "Litlevatnet"), (3, "STORTJERNA")] {
        water(id, name)
            .insert(&store.conn)
            .await
            .expect("failed to seed water");
    }

    let hits = store.waters_matching("stor").await.expect("search failed");
    let names: Vec<&str> = hits.iter().map(|w| w.name.as_str()).collect();
    assert!(names.contains(&"Storvatnet"));
    assert!(names.contains(&"STORTJERNA"));
    assert!(!names.contains(&"Litlevatnet"));

    for id in 100..120 {
        water(id, &format!("Samlevatn {id}"))
            .insert(&store.conn)
            .await
            .expect("failed to seed water");
    }

    let capped = store
        .waters_matching("samlevatn")
        .await
        .expect("search failed");
    assert_eq!(capped.len(), 10);
}

#[tokio::test]
async fn test_archive_probe_sees_only_existing_tables() {
    let store = spawn_store().await;

    assert!(
        !store
            .archive_table_exists("2024_vass_vann")
            .await
            .expect("probe failed")
    );

    store
        .conn
        .execute_unprepared(r#"CREATE TABLE "2024_vass_vann" (id INTEGER PRIMARY KEY)"#)
        .await
        .expect("failed to create archived table");

    assert!(
        store
            .archive_table_exists("2024_vass_vann")
            .await
            .expect("probe failed")
    );
}

#[tokio::test]
async fn test_ping_reports_a_healthy_connection() {
    let store = spawn_store().await;
    store.ping().await.expect("ping failed");
}

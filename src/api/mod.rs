use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SearchService, SupabaseAuthService};

mod archive;
mod auth;
mod error;
mod observability;
mod search;
mod system;
mod validation;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub search_service: SearchService,

    pub auth: Arc<dyn AuthService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::from_config(&config.database).await?;

    // The hosted backend owns the live schema; migrations only run when a
    // local database opts in.
    if config.database.run_migrations {
        store.migrate().await?;
    }

    let auth: Arc<dyn AuthService> = Arc::new(SupabaseAuthService::new(&config.auth)?);

    Ok(Arc::new(AppState {
        search_service: SearchService::new(store.clone()),
        store,
        auth,
        config,
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    let api = Router::new()
        .route("/search", get(search::search))
        .route("/archive", get(archive::get_archive_config))
        .route("/archive", post(archive::generate_archive))
        .route("/list-archives", get(archive::list_archives))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready));

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_metrics))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    layer.allow_origin(origins)
}

pub mod api;
pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod services;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::{Cli, Commands};
pub use config::Config;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config)?;
    // The recorder has to exist before the first counter! fires.
    let prometheus_handle = install_metrics_recorder(&config)?;

    match Cli::parse().command {
        None | Some(Commands::Serve) => run_server(config, prometheus_handle).await,

        Some(Commands::Migrate) => cli::cmd_migrate(&config).await,

        Some(Commands::ArchiveSql {
            year,
            prefix,
            tables,
            updated_by,
        }) => cli::cmd_archive_sql(year, prefix, tables, updated_by),

        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Wrote config.toml. Adjust it and start the server again.");
            } else {
                println!("config.toml already exists, leaving it as is.");
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let mut directives = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        directives.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    if config.observability.loki_enabled {
        let endpoint =
            url::Url::parse(&config.observability.loki_url).context("Loki URL is not valid")?;
        let mut loki = tracing_loki::builder();
        for (key, value) in &config.observability.loki_labels {
            loki = loki.label(key, value)?;
        }
        let (layer, task) = loki.build_url(endpoint)?;
        tokio::spawn(task);
        registry.with(layer).init();
        info!("Shipping logs to Loki at {}", config.observability.loki_url);
    } else {
        registry.init();
    }

    Ok(())
}

fn install_metrics_recorder(config: &Config) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Could not install the Prometheus recorder")?;
    info!("Prometheus recorder installed, /metrics is live");
    Ok(Some(handle))
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Kalkops v{} starting", env!("CARGO_PKG_VERSION"));

    if !config.server.enabled {
        anyhow::bail!("Refusing to start: server.enabled is off in the config");
    }

    let port = config.server.port;
    let state = api::create_app_state(config, prometheus_handle).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("API listening on http://0.0.0.0:{port}");

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server exited: {e}");
        }
    });

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping"),
        Err(e) => error!("Could not listen for Ctrl+C: {e}"),
    }

    server.abort();
    info!("Server stopped");

    Ok(())
}

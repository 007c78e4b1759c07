use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Drop the noisiest connection-retry targets from the log filter.
    pub suppress_connection_errors: bool,

    /// Tokio worker threads. Zero sizes the runtime from the CPU count.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,

    /// Apply bundled migrations on startup. Leave off against the hosted
    /// backend, which owns the live schema.
    pub run_migrations: bool,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/kalkops.db".to_string(),
            run_migrations: false,
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base URL of the Supabase project (tokens are verified against its
    /// GoTrue endpoint).
    pub url: String,

    pub anon_key: String,

    pub request_timeout_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: "change-me".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 4000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    /// Static labels attached to every Loki log line.
    pub loki_labels: HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: HashMap::from([("app".to_string(), "kalkops".to_string())]),
        }
    }
}

impl Config {
    /// First config file found on the search path, or the defaults.
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                info!("Using config at {}", path.display());
                Self::load_from_path(&path)
            }
            None => {
                info!("No config.toml on the search path, running on defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        toml::from_str(&raw).with_context(|| format!("{} is not valid TOML", path.display()))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Wrote config to {}", path.display());
        Ok(())
    }

    /// `./config.toml`, then the platform config dir, then `~/.kalkops/`.
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("kalkops").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".kalkops").join("config.toml"));
        }

        paths
    }

    /// Writes a default `config.toml` in the working directory unless one
    /// already exists. Returns whether a file was created.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = PathBuf::from("config.toml");
        if path.exists() {
            return Ok(false);
        }

        Self::default().save_to_path(&path)?;
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.server.enabled {
            url::Url::parse(&self.auth.url)
                .with_context(|| format!("Invalid Supabase URL: {}", self.auth.url))?;

            if self.auth.anon_key.is_empty() {
                anyhow::bail!("Supabase anon key cannot be empty when the server is enabled");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.port, 4000);
        assert!(!config.database.run_migrations);
        assert!(config.database.url.starts_with("sqlite:"));
        assert!(config.observability.metrics_enabled);
        assert!(!config.observability.loki_enabled);
    }

    #[test]
    fn test_toml_round_trip() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.auth.request_timeout_seconds, 10);
        assert_eq!(parsed.general.worker_threads, 2);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [database]
            url = "postgres://localhost/kalkops"

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(parsed.database.url, "postgres://localhost/kalkops");
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.general.log_level, "info");
        assert_eq!(parsed.auth.url, "http://localhost:54321");
    }

    #[test]
    fn test_validate_auth_settings() {
        let mut config = Config::default();
        config.auth.url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.anon_key = String::new();
        assert!(config.validate().is_err());

        // A disabled server skips the auth checks entirely.
        let mut config = Config::default();
        config.server.enabled = false;
        config.auth.url = "not a url".to_string();
        assert!(config.validate().is_ok());
    }
}

//! Daemon configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `REPORTFLOW_*` environment variables (`__` separates sections, e.g.
//! `REPORTFLOW_SERVER__PORT=9000`).

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use reportflow_api_http::HttpServerConfig;
use reportflow_infra_fal::FalConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "~/.reportflow/config.toml";
const DEFAULT_DB_URL: &str = "sqlite://~/.reportflow/reportflow.db";
const ENV_PREFIX: &str = "REPORTFLOW";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub worker: WorkerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub pdf_app: String,
    pub analysis_app: String,
    pub timeout_secs: u64,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let fal = FalConfig::default();

    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.request_timeout_secs", 30)?
        .set_default("database.url", DEFAULT_DB_URL)?
        .set_default(
            "database.max_connections",
            reportflow_infra_sqlite::DEFAULT_MAX_CONNECTIONS,
        )?
        .set_default("worker.base_url", fal.base_url)?
        .set_default("worker.pdf_app", fal.pdf_app)?
        .set_default("worker.analysis_app", fal.analysis_app)?
        .set_default("worker.timeout_secs", fal.timeout.as_secs())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load from `REPORTFLOW_CONFIG` (or the default path, if present) and the environment
    pub fn load() -> Result<Self> {
        let path = config_path();

        let mut settings: Settings = defaults()?
            .add_source(File::from(path.clone()).required(false))
            .add_source(environment())
            .build()
            .and_then(|c| c.try_deserialize::<Settings>())
            .with_context(|| format!("Failed to load configuration ({})", path.display()))?;

        // Conventional variable for the hosted queue
        if settings.worker.api_key.is_none() {
            settings.worker.api_key = std::env::var("FAL_KEY").ok().filter(|k| !k.is_empty());
        }

        settings.finalize()
    }

    fn finalize(mut self) -> Result<Self> {
        self.database.url = expand_database_url(&self.database.url);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be greater than 0");
        }
        if self.database.url.trim().is_empty() {
            bail!("database.url must not be empty");
        }
        if self.worker.base_url.trim().is_empty() {
            bail!("worker.base_url must not be empty");
        }
        if self.worker.pdf_app.trim().is_empty() || self.worker.analysis_app.trim().is_empty() {
            bail!("worker.pdf_app and worker.analysis_app must not be empty");
        }
        Ok(())
    }

    pub fn http_server(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            request_timeout: Duration::from_secs(self.server.request_timeout_secs),
        }
    }

    pub fn fal(&self) -> FalConfig {
        let config = FalConfig::new(self.worker.base_url.clone())
            .with_apps(self.worker.pdf_app.clone(), self.worker.analysis_app.clone())
            .with_timeout(Duration::from_secs(self.worker.timeout_secs));

        match &self.worker.api_key {
            Some(key) => config.with_api_key(key.clone()),
            None => config,
        }
    }
}

fn config_path() -> PathBuf {
    let raw = std::env::var("REPORTFLOW_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// Expand a leading `~` in the path part of a SQLite URL
fn expand_database_url(url: &str) -> String {
    match url.strip_prefix("sqlite://") {
        Some(path) => format!("sqlite://{}", shellexpand::tilde(path)),
        None => shellexpand::tilde(url).into_owned(),
    }
}

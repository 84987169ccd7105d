//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge compiled defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_SCHEDULER__INTERVAL_SECS=60`). Provides helpers to expand `~` and
//! `${VAR}` in configured paths.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The whole typed settings tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.validate()?;
        match env {
            "prod" | "production" => {
                if settings.store.database_url.contains(":memory:") {
                    anyhow::bail!("store.database_url must point at a real database in {}", env);
                }
            }
            "dev" | "development" => {}
            "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub index: IndexSettings,
    pub scheduler: SchedulerSettings,
    pub search: SearchSettings,
    pub store: StoreSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::Result<()> {
        if self.index.path.trim().is_empty() {
            return Err(crate::Error::InvalidConfig("index.path must not be empty".into()));
        }
        if self.scheduler.interval_secs == 0 {
            return Err(crate::Error::InvalidConfig("scheduler.interval_secs must be positive".into()));
        }
        if self.scheduler.job_name.trim().is_empty() {
            return Err(crate::Error::InvalidConfig("scheduler.job_name must not be empty".into()));
        }
        if self.search.limit == 0 {
            return Err(crate::Error::InvalidConfig("search.limit must be positive".into()));
        }
        if self.store.max_connections == 0 {
            return Err(crate::Error::InvalidConfig("store.max_connections must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub path: String,
    /// Wipe the on-disk index before opening it.
    pub rebuild_on_start: bool,
    /// Drop documents whose rows vanished from the content store on each run.
    pub prune_stale: bool,
    pub writer_memory_bytes: usize,
}

impl IndexSettings {
    pub fn resolved_path(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            path: "saloon.search.index".to_string(),
            rebuild_on_start: false,
            prune_stale: true,
            writer_memory_bytes: 50_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub interval_secs: u64,
    pub job_name: String,
}

impl SchedulerSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self { interval_secs: 30 * 60, job_name: "index-db".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub limit: usize,
    pub highlight: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { limit: crate::types::DEFAULT_SEARCH_SIZE, highlight: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { database_url: "sqlite://saloon.db".to_string(), max_connections: 5 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

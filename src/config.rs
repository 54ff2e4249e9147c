use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::DEFAULT_TIMEZONE;
use crate::utils;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-d/%-m/%y, %-I:%M %p";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
    /// IANA name, e.g. `Australia/Sydney`.
    pub timezone: Option<String>,
    /// chrono format used for notification timestamps.
    pub timestamp_format: Option<String>,
}

impl AppConfig {
    /// Environment variables win over the file: `TMDB_API_KEY`,
    /// `TMDB_BASE_URL`, `FFFINDER_TZ`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = env_value("TMDB_API_KEY") {
            self.tmdb_api_key = Some(key);
        }
        if let Some(url) = env_value("TMDB_BASE_URL") {
            self.tmdb_base_url = Some(url);
        }
        if let Some(tz) = env_value("FFFINDER_TZ") {
            self.timezone = Some(tz);
        }
        self
    }

    pub fn timezone(&self) -> Tz {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_TIMEZONE,
            Some(name) => name.parse::<Tz>().unwrap_or_else(|err| {
                tracing::warn!(timezone = name, %err, "unknown timezone, using default");
                DEFAULT_TIMEZONE
            }),
        }
    }

    pub fn timestamp_format(&self) -> &str {
        self.timestamp_format
            .as_deref()
            .filter(|fmt| !fmt.trim().is_empty())
            .unwrap_or(DEFAULT_TIMESTAMP_FORMAT)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<AppConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        Self::load_from(utils::config_path())
    }

    /// A missing or unreadable file yields the default config.
    pub fn load_from(path: PathBuf) -> Self {
        let data = read_config(&path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), %err, "failed to read config, using defaults");
            AppConfig::default()
        });
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> AppConfig {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update<F>(&self, transform: F) -> Result<AppConfig, ConfigError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    utils::ensure_parent(path)?;
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

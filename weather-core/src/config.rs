use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::{BucketDescriptor, DEFAULT_REGION};
use crate::provider::OPENWEATHER_CURRENT_URL;

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const BUCKET_ENV: &str = "AWS_BUCKET_NAME";

/// Configuration stored on disk. Every field is optional; environment
/// variables take precedence over the file.
///
/// Example TOML:
/// ```toml
/// openweather_api_key = "..."
/// bucket_name = "my-weather-archive"
/// region = "us-west-2"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub openweather_api_key: Option<String>,
    pub bucket_name: Option<String>,
    /// Region constraint used when the bucket has to be created.
    pub region: Option<String>,
    /// Override for the current-weather endpoint.
    pub endpoint: Option<String>,
}

/// Fully resolved values the archiver runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub bucket: BucketDescriptor,
    pub endpoint: String,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-archive", "weather-archive")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values looked up by variable name. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(API_KEY_ENV) {
            self.openweather_api_key = Some(key);
        }
        if let Some(bucket) = get(BUCKET_ENV) {
            self.bucket_name = Some(bucket);
        }

        self
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Turn the layered config into runnable settings.
    ///
    /// A missing bucket name is an error. A missing API key is only logged:
    /// every request then fails with an authentication error from the API.
    pub fn resolve(&self) -> Result<Settings> {
        let bucket_name = self.bucket_name.clone().ok_or_else(|| {
            anyhow!(
                "No bucket configured.\n\
                 Hint: set {BUCKET_ENV} or run `weather-archive configure`."
            )
        })?;

        let api_key = match &self.openweather_api_key {
            Some(key) => key.clone(),
            None => {
                tracing::warn!("{API_KEY_ENV} is not set; weather requests will be rejected");
                String::new()
            }
        };

        Ok(Settings {
            api_key,
            bucket: BucketDescriptor::new(bucket_name, self.region()),
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| OPENWEATHER_CURRENT_URL.to_string()),
        })
    }
}

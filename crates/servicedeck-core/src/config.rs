//! Application configuration management.
//!
//! Endpoint base addresses come from, in order of precedence, environment
//! variables, the persisted config file and fixed default URLs.
//!
//! Configuration is stored at `~/.config/servicedeck/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/log directory paths
const APP_NAME: &str = "servicedeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_USER_API_URL: &str = "http://localhost:5001/users";
pub const DEFAULT_PRODUCT_API_URL: &str = "http://localhost:5002/products";
pub const DEFAULT_CACHE_API_URL: &str = "http://localhost:5000";

pub const USER_API_URL_ENV: &str = "SERVICEDECK_USER_API_URL";
pub const PRODUCT_API_URL_ENV: &str = "SERVICEDECK_PRODUCT_API_URL";
pub const CACHE_API_URL_ENV: &str = "SERVICEDECK_CACHE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub user_api_url: Option<String>,
    pub product_api_url: Option<String>,
    pub cache_api_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Ok(serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for log files
    pub fn log_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Resolve endpoints against the process environment
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::resolve(self, |name| std::env::var(name).ok())
    }
}

/// Resolved base addresses of the remote services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Users collection (GET list, POST create)
    pub users: String,
    /// Products collection (GET list, POST create)
    pub products: String,
    /// Base of the cache service; serves `/time` and `/cache`
    pub cache_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            users: DEFAULT_USER_API_URL.to_string(),
            products: DEFAULT_PRODUCT_API_URL.to_string(),
            cache_base: DEFAULT_CACHE_API_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Resolve each endpoint: `env` lookup, then `config`, then the default.
    /// Blank values are treated as unset.
    pub fn resolve<F>(config: &Config, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &str, configured: &Option<String>, default: &str| {
            env(var)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| configured.clone().filter(|v| !v.trim().is_empty()))
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            users: pick(USER_API_URL_ENV, &config.user_api_url, DEFAULT_USER_API_URL),
            products: pick(PRODUCT_API_URL_ENV, &config.product_api_url, DEFAULT_PRODUCT_API_URL),
            cache_base: pick(CACHE_API_URL_ENV, &config.cache_api_url, DEFAULT_CACHE_API_URL),
        }
    }
}

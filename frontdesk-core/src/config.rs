use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Centralized configuration for the frontdesk system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontdeskConfig {
    pub database: DatabaseConfig,
    pub admin: Option<AdminSeedConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Maximum pool connections (small by default, front-desk traffic is serial)
    pub max_connections: Option<u32>,
    /// Busy timeout in seconds before a locked statement fails
    pub busy_timeout_secs: Option<u64>,
}

/// Seed credentials for the default admin account.
///
/// The shipped default ("admin" / "admin123") is a known liability;
/// deployments should override it here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeedConfig {
    pub username: String,
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("frontdesk.db"),
            max_connections: None,
            busy_timeout_secs: None,
        }
    }
}

impl FrontdeskConfig {
    /// Load config from ~/.frontdesk/config.toml
    ///
    /// Fails hard with an actionable error if the config doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| CoreError::config(format!("invalid TOML in {:?}: {}", path, e)))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get config file path: $FRONTDESK_CONFIG or ~/.frontdesk/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var("FRONTDESK_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".frontdesk/config.toml")
    }

    /// Admin seed username, falling back to the shipped default
    pub fn admin_username(&self) -> &str {
        self.admin
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("admin")
    }

    /// Admin seed password, falling back to the shipped default
    pub fn admin_password(&self) -> &str {
        self.admin
            .as_ref()
            .map(|a| a.password.as_str())
            .unwrap_or("admin123")
    }
}

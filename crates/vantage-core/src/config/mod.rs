//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Vantage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub access: AccessConfig,
}

/// Console API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(skip)]
    pub token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Access control behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Whether the deployment enforces entity-level access control
    pub entity_access_enabled: bool,
    /// Re-check entity permissions after each relevant mutation rather
    /// than only when a view opens
    pub revalidate_on_change: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                token: None,
                base_url: "http://localhost:8400".to_string(),
                timeout_secs: 30,
            },
            access: AccessConfig {
                entity_access_enabled: false,
                revalidate_on_change: true,
            },
        }
    }
}

impl ApiConfig {
    /// API tokens come from the environment only, never the config file
    pub fn resolved_token(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;
        Ok(env::var("VANTAGE_API_TOKEN").ok())
    }

    pub fn redacted_token(&self) -> anyhow::Result<Option<String>> {
        self.resolved_token().map(|opt| {
            opt.map(|token| {
                if token.len() <= 4 {
                    "***".to_string()
                } else {
                    let suffix = &token[token.len() - 4..];
                    format!("***{}", suffix)
                }
            })
        })
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.token.is_some() {
            return Err(anyhow!(
                "API tokens must be provided via the VANTAGE_API_TOKEN environment variable, not stored in configuration"
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("VANTAGE_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow!("Could not determine home directory"))?
                .join(".vantage")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Persist configuration to the config file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.enforce_env_only()?;
        if self.api.base_url.is_empty() {
            return Err(anyhow!("api.base_url must not be empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Get a configuration value by dotted key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "api.base_url" => Ok(self.api.base_url.clone()),
            "api.timeout_secs" => Ok(self.api.timeout_secs.to_string()),
            "api.token" => Ok(self
                .api
                .redacted_token()?
                .unwrap_or_else(|| "<unset>".to_string())),
            "access.entity_access_enabled" => Ok(self.access.entity_access_enabled.to_string()),
            "access.revalidate_on_change" => Ok(self.access.revalidate_on_change.to_string()),
            _ => Err(anyhow!("Unknown configuration key: {}", key)),
        }
    }

    /// Set a configuration value by dotted key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "api.base_url" => {
                self.api.base_url = value.to_string();
            }
            "api.timeout_secs" => {
                self.api.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout value: {}", value))?;
            }
            "api.token" => {
                return Err(anyhow!(
                    "API tokens are environment-only; set VANTAGE_API_TOKEN instead"
                ));
            }
            "access.entity_access_enabled" => {
                self.access.entity_access_enabled = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "access.revalidate_on_change" => {
                self.access.revalidate_on_change = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            _ => return Err(anyhow!("Unknown configuration key: {}", key)),
        }
        self.validate()
    }

    /// List all configuration values as key/value pairs
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "api.base_url",
            "api.timeout_secs",
            "api.token",
            "access.entity_access_enabled",
            "access.revalidate_on_change",
        ];
        keys.iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults, removing the config file
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

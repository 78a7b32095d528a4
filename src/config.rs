//! Layered configuration for the NEWT client
//!
//! Configuration is read from TOML files in increasing priority:
//! 1. System: `/etc/newt/config.toml`
//! 2. User: `~/.config/newt/config.toml` (platform config directory)
//! 3. Local: `newt.toml` in the current directory
//!
//! Later files override earlier ones key by key; missing files are skipped.

pub mod client;

pub use client::ClientConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,

    pub client: ClientConfig,
}

impl Default for NewtConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            client: ClientConfig::default(),
        }
    }
}

/// Locations searched for configuration files
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub system: PathBuf,
    pub user: Option<PathBuf>,
    pub local: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPaths {
    pub fn new() -> Self {
        Self {
            system: PathBuf::from("/etc/newt/config.toml"),
            user: dirs::config_dir().map(|dir| dir.join("newt").join("config.toml")),
            local: PathBuf::from("newt.toml"),
        }
    }

    /// Paths that exist, lowest priority first
    pub fn existing_paths(&self) -> Vec<&PathBuf> {
        let mut paths = vec![&self.system];
        if let Some(user) = &self.user {
            paths.push(user);
        }
        paths.push(&self.local);
        paths.into_iter().filter(|p| p.exists()).collect()
    }

    pub fn user_config_dir(&self) -> Option<&Path> {
        self.user.as_deref().and_then(Path::parent)
    }
}

impl NewtConfig {
    /// Load from the standard locations
    pub fn load() -> Result<Self> {
        Self::load_with_paths(&ConfigPaths::new())
    }

    pub fn load_with_paths(paths: &ConfigPaths) -> Result<Self> {
        let files: Vec<PathBuf> = paths.existing_paths().into_iter().cloned().collect();
        Self::load_from_files(&files)
    }

    /// Merge the given files in order; later files win
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Table::new();
        for path in files {
            if !path.exists() {
                continue;
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let table: toml::Table = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            merge_tables(&mut merged, table);
        }

        toml::Value::Table(merged)
            .try_into()
            .context("Invalid configuration")
    }

    /// Install the process logger at the configured `log_level`
    pub fn init_logging(&self) {
        crate::logging::init_logging(&self.log_level);
    }

    /// Check the configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        let client = &self.client;
        match Url::parse(&client.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(format!(
                "client.base_url must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => errors.push(format!("client.base_url is not a valid URL: {}", e)),
        }

        if client.machines.is_empty() {
            errors.push("client.machines must not be empty".to_string());
        }
        for machine in &client.machines {
            if !client.systems.contains(machine) {
                errors.push(format!(
                    "client.machines entry '{}' is missing from client.systems",
                    machine
                ));
            }
        }

        if client.download_chunk_size == 0 {
            errors.push("client.download_chunk_size must be greater than 0".to_string());
        }

        if client.timeout_secs == Some(0) {
            errors.push("client.timeout_secs must be greater than 0 when set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Commented default configuration suitable for writing to disk
    pub fn generate_default_config() -> String {
        let body = Self::default().to_toml().unwrap_or_default();
        format!(
            "# NEWT client configuration\n\
             # Files are merged in order: /etc/newt/config.toml, ~/.config/newt/config.toml, ./newt.toml\n\n{}",
            body
        )
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                } else {
                    base.insert(key, toml::Value::Table(incoming));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

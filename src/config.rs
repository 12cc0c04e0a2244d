//! Configuration Management
//!
//! Handles persistent configuration storage for prismctl. Passwords are never
//! written to disk; they come from the command line or `PRISM_PASSWORD`.

use crate::prism::auth;
use crate::prism::http::{TransportOptions, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Last used Prism host (IP or DNS name of a CVM or the cluster VIP)
    #[serde(default)]
    pub host: Option<String>,
    /// Last used Prism user
    #[serde(default)]
    pub username: Option<String>,
    /// Skip TLS certificate validation
    #[serde(default)]
    pub insecure: bool,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Reuse the server's session cookie after the first request
    #[serde(default)]
    pub session: bool,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prismctl").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective host (CLI > config > PRISM_HOST)
    pub fn effective_host(&self) -> Option<String> {
        self.host.clone().or_else(auth::get_default_host)
    }

    /// Get effective username (CLI > config > PRISM_USERNAME > "admin")
    pub fn effective_username(&self) -> String {
        self.username
            .clone()
            .or_else(auth::get_default_username)
            .unwrap_or_else(|| "admin".to_string())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Transport settings derived from this configuration
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            accept_invalid_certs: self.insecure,
            timeout: self.timeout(),
            cookie_store: self.session,
        }
    }

    /// Set host and save
    pub fn set_host(&mut self, host: &str) -> Result<()> {
        self.host = Some(host.to_string());
        self.save()
    }

    /// Set username and save
    pub fn set_username(&mut self, username: &str) -> Result<()> {
        self.username = Some(username.to_string());
        self.save()
    }
}

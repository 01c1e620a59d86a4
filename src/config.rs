//! Target Configuration
//!
//! YAML file naming the arrays this exporter may scrape:
//!
//! ```yaml
//! targets:
//!   array01:
//!     host: 10.0.0.5
//!     port: 8088
//!     username: monitor
//!     password: secret
//!     modules: [power, fan, disk, controller]
//!   array02.example.net:
//!     username: monitor
//!     password: secret
//!     modules: get_lun_data,get_storage_pool_data
//! ```
//!
//! Everything is validated here, before a single request is sent.

use crate::collectors::CollectorRegistry;
use crate::error::{Error, Result};
use crate::oceanstor::{ClientConfig, DEFAULT_PORT};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_port() -> u16 {
    DEFAULT_PORT
}

// =============================================================================
// File Model
// =============================================================================

/// Parsed configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Targets keyed by name
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// One array as written in the file
#[derive(Clone, Deserialize)]
pub struct TargetConfig {
    /// Management address; the target name when omitted
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, alias = "user")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub modules: ModuleList,
    /// Overrides the command line timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub verify_tls: bool,
}

impl std::fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("modules", &self.modules)
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// Module list, either a YAML sequence or a comma separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModuleList {
    List(Vec<String>),
    Csv(String),
}

impl Default for ModuleList {
    fn default() -> Self {
        ModuleList::List(Vec::new())
    }
}

impl ModuleList {
    /// Module names with blanks removed
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            ModuleList::List(names) => names.iter().map(String::as_str).collect(),
            ModuleList::Csv(joined) => joined.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// =============================================================================
// Resolved Target
// =============================================================================

/// A validated target, ready to scrape
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub client: ClientConfig,
    /// Canonical collector names, in run order
    pub modules: Vec<String>,
}

impl ConfigFile {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&text)?;
        debug!(
            "Loaded {} targets from {}",
            config.targets.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse configuration text
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Look up and validate `name`
    ///
    /// `default_timeout` applies unless the target sets `timeout_secs`.
    pub fn target(
        &self,
        name: &str,
        registry: &CollectorRegistry,
        default_timeout: Duration,
    ) -> Result<Target> {
        let raw = self.targets.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.targets.keys().map(String::as_str).collect();
            Error::Configuration(format!(
                "no target {:?} in configuration (known: {})",
                name,
                known.join(", ")
            ))
        })?;

        if raw.username.trim().is_empty() || raw.password.is_empty() {
            return Err(Error::Configuration(format!(
                "no username / password found for target {}",
                name
            )));
        }

        let modules = registry.validate(raw.modules.names().as_slice()).map_err(|e| match e {
            Error::Configuration(reason) => {
                Error::Configuration(format!("target {}: {}", name, reason))
            }
            other => other,
        })?;

        let host = match raw.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => name.to_string(),
        };
        let timeout = raw
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(default_timeout);
        if timeout.is_zero() {
            return Err(Error::Configuration(format!(
                "target {}: timeout must be positive",
                name
            )));
        }

        Ok(Target {
            name: name.to_string(),
            client: ClientConfig {
                host,
                port: raw.port,
                username: raw.username.clone(),
                password: raw.password.clone(),
                timeout,
                verify_tls: raw.verify_tls,
            },
            modules,
        })
    }
}

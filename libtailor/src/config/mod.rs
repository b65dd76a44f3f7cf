//! Application configuration.
//!
//! This module manages configuration with sensible defaults, loading from a
//! YAML file and merging with `TAILOR__`-prefixed environment variables
//! (e.g. `TAILOR__NETWORK__TIMEOUT=10`).

use crate::error::{Result, TailorError};
use config::{Config as ConfigRs, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};


/// Index used when a repository name carries no registry host.
pub const DEFAULT_INDEX: &str = "https://index.docker.io/v1/";

/// Where the result record is written unless told otherwise.
pub const DEFAULT_OUTPUT_PATH: &str = "/tmp/result/result.json";

const ENV_PREFIX: &str = "TAILOR";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub output: Output,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// This function is primarily used for testing.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path, then applies environment
    /// overrides.
    ///
    /// A named file must exist. Without a path only defaults and environment
    /// variables are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults()?;

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("registry.insecure_registries")
                .try_parsing(true),
        );

        Self::from_builder(builder, path)
    }

    /// Loads the file at `path` when it exists, falling back to defaults and
    /// environment overrides otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(Some(path))
        } else {
            Self::load(None)
        }
    }

    /// Returns true when `host` is configured to be spoken to over plain HTTP.
    pub fn is_insecure(&self, host: &str) -> bool {
        is_listed(&self.registry.insecure_registries, host)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = ConfigRs::try_from(&Config::default()).map_err(|e| {
            TailorError::config_with_source("Failed to encode default configuration", None, e)
        })?;
        Ok(ConfigRs::builder().add_source(defaults))
    }

    /// Creates a `Config` from a `config::ConfigBuilder`.
    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        let config: Config = builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                TailorError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.registry.index.trim().is_empty() {
            return Err(TailorError::config("registry.index cannot be empty", None));
        }
        if self.network.timeout == 0 {
            return Err(TailorError::config(
                "network.timeout must be at least 1 second",
                None,
            ));
        }
        Ok(())
    }
}

/// Registry location settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Index serving repositories that name no registry host.
    #[serde(default = "default_index")]
    pub index: String,

    /// Hosts (`host[:port]`) reached over plain HTTP.
    #[serde(default)]
    pub insecure_registries: Vec<String>,

    /// Retry the session handshake over HTTP when HTTPS is unreachable.
    #[serde(default = "default_allow_insecure_fallback")]
    pub allow_insecure_fallback: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            index: default_index(),
            insecure_registries: Vec::new(),
            allow_insecure_fallback: default_allow_insecure_fallback(),
        }
    }
}

/// Registry host lists compare case-insensitively.
pub(crate) fn is_listed(hosts: &[String], host: &str) -> bool {
    hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

fn default_allow_insecure_fallback() -> bool {
    true
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Request timeout in seconds.
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            max_idle_per_host: default_max_idle_per_host(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_max_idle_per_host() -> usize {
    10
}

/// Result file settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Output {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

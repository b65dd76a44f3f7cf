//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values
//! 3. Environment variables
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use crate::format::ColorChoice;
use libtailor::{Config, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative config file.
const CONFIG_PATH_ENV: &str = "TAILOR_CONFIG";

/// Environment variable overriding the color choice.
const COLOR_ENV: &str = "TAILOR_COLOR";

/// How much the user asked to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    Normal,
    Verbose,
    VeryVerbose,
    Trace,
}

impl VerbosityLevel {
    /// Maps the number of `-v` flags to a level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::VeryVerbose,
            _ => Self::Trace,
        }
    }

    /// Default log filter for this level, used when `RUST_LOG` is unset.
    pub fn log_filter(self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::VeryVerbose => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Settings given on the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub insecure_registries: Vec<String>,
    pub timeout: Option<u64>,
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    pub color: ColorChoice,
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    ///
    /// A config file named with `--config` or `TAILOR_CONFIG` must exist and
    /// parse; the default file is optional.
    pub fn build(
        cli_color: ColorChoice,
        verbosity: VerbosityLevel,
        overrides: &CliOverrides,
    ) -> Result<Self> {
        // 1-3. Defaults, config file and TAILOR__* variables
        let explicit_path = overrides
            .config_path
            .clone()
            .or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        let mut config = match explicit_path {
            Some(path) => Config::load(Some(path.as_path()))?,
            None => Config::load_or_default(&default_config_path())?,
        };

        // 4. Apply CLI flag overrides (highest priority)
        if let Some(output) = &overrides.output {
            config.output.path = output.clone();
        }
        if let Some(timeout) = overrides.timeout {
            config.network.timeout = timeout;
        }
        for host in &overrides.insecure_registries {
            if !config.is_insecure(host) {
                config.registry.insecure_registries.push(host.clone());
            }
        }

        // Only override if not Auto (which is the default from clap)
        let env_color = env::var(COLOR_ENV).ok().map(|c| ColorChoice::from(c.as_str()));
        let color = match (cli_color, env_color) {
            (ColorChoice::Auto, Some(env_color)) => env_color,
            (cli_color, _) => cli_color,
        };

        Ok(Self {
            config,
            color,
            verbosity,
        })
    }

    /// Where the result record goes.
    pub fn output_path(&self) -> &Path {
        &self.config.output.path
    }
}

/// Returns `~/.config/tailor/config.yaml`, or `config.yaml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    match dirs::config_dir() {
        Some(config_dir) => config_dir.join("tailor").join("config.yaml"),
        None => PathBuf::from("config.yaml"),
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

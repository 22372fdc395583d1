//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rsflow/rsflow.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `RSFLOW_*` prefix, `__` between sections
//!    (e.g. `RSFLOW_HISTORY__MAX_ENTRIES=50`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::IdStrategy;

/// Undo/redo history settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of snapshots kept (None: unbounded)
    pub max_entries: Option<usize>,
    /// Do not commit edits whose result equals the current snapshot
    pub skip_noop_commits: bool,
}

/// How snapshots are printed.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Text outline
    #[default]
    Tree,
    /// Pretty-printed JSON
    Json,
}

/// Unified configuration for rsflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub history: HistorySettings,
    /// Id generation strategy for new nodes
    pub ids: IdStrategy,
    /// Default output format
    pub output: OutputFormat,
}

/// Get the XDG config directory for rsflow.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsflow").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rsflow.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string());
    PathBuf::from(expanded)
}

/// `RSFLOW_*` environment source.
pub fn env_source() -> Environment {
    Environment::with_prefix("RSFLOW")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load settings from the global config, an optional explicit file and `RSFLOW_*` vars.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        Self::load_layers(global.as_deref(), config_file, env_source())
    }

    /// Load settings from explicit layers.
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    pub fn load_layers(
        global: Option<&Path>,
        config_file: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default(
                "history.skip_noop_commits",
                defaults.history.skip_noop_commits,
            )
            .map_err(config_err)?
            .set_default("ids", "random")
            .map_err(config_err)?
            .set_default("output", "tree")
            .map_err(config_err)?;

        if let Some(global) = global {
            if global.exists() {
                debug!("load: global config {}", global.display());
                builder = builder.add_source(
                    File::from(global.to_path_buf())
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!("load: config file {}", path.display());
            builder = builder.add_source(File::from(path.to_path_buf()).format(FileFormat::Toml));
        }

        let config = builder.add_source(env).build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load defaults overlaid with the given environment map only (for tests and tooling).
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self, ApplicationError> {
        Self::load_layers(None, None, env_source().source(Some(vars)))
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.history.max_entries == Some(0) {
            return Err(ApplicationError::Config {
                message: "history.max_entries must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

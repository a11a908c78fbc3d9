//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default database file, relative to the working directory
pub const DEFAULT_DATABASE: &str = "bathtubs.db";

/// Default number of decimals shown for incline values
pub const DEFAULT_INCLINE_PRECISION: usize = crate::core::metrics::INCLINE_DECIMALS;

/// Project-local config file name
const LOCAL_CONFIG_FILE: &str = "tubmeter.yaml";

/// tubmeter configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database location
    pub database: Option<PathBuf>,

    /// Decimals used when displaying incline
    pub incline_precision: Option<usize>,

    /// Default output format for list commands
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/tubmeter/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_file(&global_path);
        }

        // 3. Local config (./tubmeter.yaml)
        config.merge_file(Path::new(LOCAL_CONFIG_FILE));

        // 4. Environment variables
        config.merge_env(|key| std::env::var(key).ok());

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tubmeter")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yml::from_str::<Config>(&contents) {
                Ok(file_config) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    self.merge(file_config);
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config"),
            },
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "cannot read config"),
        }
    }

    fn merge_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(db) = var("TUBMETER_DB").filter(|v| !v.is_empty()) {
            self.database = Some(PathBuf::from(db));
        }
        if let Some(precision) = var("TUBMETER_PRECISION") {
            match precision.trim().parse() {
                Ok(p) => self.incline_precision = Some(p),
                Err(_) => tracing::warn!(value = %precision, "ignoring invalid TUBMETER_PRECISION"),
            }
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.incline_precision.is_some() {
            self.incline_precision = other.incline_precision;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Database path, with a command-line override taking precedence
    pub fn database(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn incline_precision(&self) -> usize {
        self.incline_precision.unwrap_or(DEFAULT_INCLINE_PRECISION)
    }
}

//! Shared helper functions for CLI commands

use clap::ValueEnum;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{BathtubStore, Config};

/// Placeholder shown when capacity is not available
pub const NOT_AVAILABLE: &str = "N/A";

/// An open store plus the configuration it was resolved from
pub struct Session {
    pub store: BathtubStore,
    pub config: Config,
}

impl Session {
    /// Load config and open the store named by `--db` or config
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();
        let path = config.database(global.db.as_deref());
        let store = BathtubStore::open(&path)?;
        Ok(Self { store, config })
    }

    /// Output format, falling back to the configured default for `auto`
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        output_format(global, &self.config)
    }

    pub fn precision(&self) -> usize {
        self.config.incline_precision()
    }

    /// Release the store, reporting close errors
    pub fn close(self) -> Result<()> {
        self.store.close()?;
        Ok(())
    }
}

/// `--format` if given, else `default_format` from config, else `auto`
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    resolve_format(global.format, config.default_format.as_deref())
}

fn resolve_format(requested: OutputFormat, configured: Option<&str>) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    configured
        .and_then(|s| OutputFormat::from_str(s, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Format an incline value with the given number of decimals
pub fn format_incline(degrees: f64, precision: usize) -> String {
    format!("{:.prec$}", degrees, prec = precision)
}

/// Format an optional capacity, "N/A" when absent
pub fn format_liters(liters: Option<f64>) -> String {
    liters.map_or_else(|| NOT_AVAILABLE.to_string(), |l| format!("{:.1}", l))
}

/// Format a length in centimeters
pub fn format_cm(value: f64) -> String {
    format!("{:.1}", value)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

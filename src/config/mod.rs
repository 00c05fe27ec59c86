//! Configuration Module - Exporter Settings
//!
//! Settings come from three layers, later ones winning:
//! 1. built-in defaults (serde `default` functions below)
//! 2. an optional TOML file (`--config.file`)
//! 3. command-line flags, with environment fallbacks for the web flags
//!
//! The merged result is validated once at startup.

pub mod cli;
pub mod loader;

use std::path::PathBuf;

use serde::Deserialize;

pub use cli::Cli;

/// Top-level exporter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// HTTP listener settings.
  #[serde(default)]
  pub web: WebConfig,
  /// Locust report locations.
  #[serde(default)]
  pub csv: CsvConfig,
  /// Logging settings.
  #[serde(default)]
  pub log: LogConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
  /// Address to listen on; `:port` means all interfaces.
  #[serde(default = "default_listen_address")]
  pub listen_address: String,
  /// Path under which metrics are exposed.
  #[serde(default = "default_telemetry_path")]
  pub telemetry_path: String,
}

impl WebConfig {
  /// Listen address in a form `TcpListener::bind` accepts.
  ///
  /// `:9646` becomes `0.0.0.0:9646`.
  pub fn bind_address(&self) -> String {
    if self.listen_address.starts_with(':') {
      format!("0.0.0.0{}", self.listen_address)
    } else {
      self.listen_address.clone()
    }
  }
}

impl Default for WebConfig {
  fn default() -> Self {
    Self {
      listen_address: default_listen_address(),
      telemetry_path: default_telemetry_path(),
    }
  }
}

/// Locust `--csv` output files.
///
/// No defaults: both paths must be set by the file or by flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvConfig {
  /// Path to `<prefix>_stats.csv`.
  #[serde(default)]
  pub stats: PathBuf,
  /// Path to `<prefix>_failures.csv`.
  #[serde(default)]
  pub failures: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Output format.
  #[serde(default)]
  pub format: LogFormat,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      format: LogFormat::default(),
    }
  }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  /// One JSON object per line.
  #[default]
  Json,
  /// Human-readable lines.
  Text,
}

// Default value functions for serde

fn default_listen_address() -> String {
  ":9646".to_string()
}

fn default_telemetry_path() -> String {
  "/metrics".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

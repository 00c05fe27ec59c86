//! Command-line flags.
//!
//! Flag names follow the dotted style Prometheus exporters use. Every flag
//! is optional here; unset flags fall through to the config file and then
//! to the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use super::{AppConfig, LogFormat};

/// Prometheus exporter for Locust load-test CSV reports.
#[derive(Debug, Default, Parser)]
#[command(name = "locust_exporter", version, about)]
pub struct Cli {
  /// Address to listen on for web interface and telemetry [default: :9646].
  #[arg(long = "web.listen-address", env = "LOCUST_EXPORTER_WEB_LISTEN_ADDRESS")]
  pub listen_address: Option<String>,

  /// Path under which to expose metrics [default: /metrics].
  #[arg(long = "web.telemetry-path", env = "LOCUST_EXPORTER_WEB_TELEMETRY_PATH")]
  pub telemetry_path: Option<String>,

  /// Path to the Locust stats csv file.
  #[arg(long = "csv.stats")]
  pub csv_stats: Option<PathBuf>,

  /// Path to the Locust failures csv file.
  #[arg(long = "csv.failures")]
  pub csv_failures: Option<PathBuf>,

  /// Only log messages with the given severity or above [default: info].
  #[arg(long = "log.level")]
  pub log_level: Option<String>,

  /// Output format of log messages [default: json].
  #[arg(long = "log.format", value_enum)]
  pub log_format: Option<LogFormat>,

  /// Optional TOML file with the same settings.
  #[arg(long = "config.file")]
  pub config_file: Option<PathBuf>,
}

impl Cli {
  /// Overlay every flag that was given onto `config`.
  pub fn apply(self, config: &mut AppConfig) {
    if let Some(v) = self.listen_address {
      config.web.listen_address = v;
    }
    if let Some(v) = self.telemetry_path {
      config.web.telemetry_path = v;
    }
    if let Some(v) = self.csv_stats {
      config.csv.stats = v;
    }
    if let Some(v) = self.csv_failures {
      config.csv.failures = v;
    }
    if let Some(v) = self.log_level {
      config.log.level = v;
    }
    if let Some(v) = self.log_format {
      config.log.format = v;
    }
  }
}

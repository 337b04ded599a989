pub mod cli;
pub mod toml_config;

use crate::adapters::json_store::DEFAULT_FILE_NAME;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, validate_non_empty_string, validate_path, Validate};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

pub const DEFAULT_CSV_PATH: &str = "./data/sample.csv";
pub const DEFAULT_STORE_PATH: &str = "./output";

#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "people-etl")]
#[command(about = "Import people from CSV and report their age distribution")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// CSV file to read
    #[arg(long, global = true, env = "CSV_FILE_PATH")]
    pub csv_path: Option<String>,

    /// Directory holding the record store
    #[arg(long, global = true, env = "PEOPLE_STORE_PATH")]
    pub store_path: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log resource usage per phase")]
    pub monitor: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse the CSV, store every record and print the age report
    Import {
        /// Delete stored records before inserting
        #[arg(long)]
        clear: bool,
    },
    /// Parse the CSV and print the records as JSON without storing them
    Parse,
    /// Print the age distribution of the stored records
    Report {
        #[arg(long)]
        json: bool,
    },
    /// Delete every stored record
    Clear,
}

#[cfg(feature = "cli")]
impl Command {
    pub fn reads_csv(&self) -> bool {
        matches!(self, Command::Import { .. } | Command::Parse)
    }
}

/// Effective settings: command line and environment win over the TOML file,
/// which wins over the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub csv_path: String,
    pub store_path: String,
    pub store_file: String,
    pub clear_before_import: bool,
    pub monitor: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv_path: DEFAULT_CSV_PATH.to_string(),
            store_path: DEFAULT_STORE_PATH.to_string(),
            store_file: DEFAULT_FILE_NAME.to_string(),
            clear_before_import: false,
            monitor: false,
        }
    }
}

impl Settings {
    pub fn from_toml(file: &TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            csv_path: file.source.csv_path.clone().unwrap_or(defaults.csv_path),
            store_path: file.store.path.clone().unwrap_or(defaults.store_path),
            store_file: file.store.file_name.clone().unwrap_or(defaults.store_file),
            clear_before_import: file.import.clear_before_import.unwrap_or(false),
            monitor: file.monitoring_enabled().unwrap_or(false),
        }
    }

    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig, file: Option<&TomlConfig>) -> Self {
        let mut settings = file.map(Self::from_toml).unwrap_or_default();

        if let Some(csv_path) = &cli.csv_path {
            settings.csv_path = csv_path.clone();
        }
        if let Some(store_path) = &cli.store_path {
            settings.store_path = store_path.clone();
        }
        if let Command::Import { clear: true } = cli.command {
            settings.clear_before_import = true;
        }
        settings.monitor |= cli.monitor;
        settings
    }

    /// Only commands that read the CSV need a usable `csv_path`.
    pub fn validate_csv_source(&self) -> Result<()> {
        validate_path("csv_path", &self.csv_path)?;
        validate_file_extensions("csv_path", &[self.csv_path.as_str()], &["csv"])
    }
}

impl ConfigProvider for Settings {
    fn csv_path(&self) -> &str {
        &self.csv_path
    }

    fn clear_before_import(&self) -> bool {
        self.clear_before_import
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("store_path", &self.store_path)?;
        validate_non_empty_string("store_file", &self.store_file)?;
        Ok(())
    }
}

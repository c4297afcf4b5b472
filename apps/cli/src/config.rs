//! # CLI Configuration
//!
//! Where the snapshot lives, where exports go, and how money is printed.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --data ./books.json   --output-dir ./exports                       │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     BILLBOOK_DATA_FILE=./books.json                                    │
//! │     BILLBOOK_DEFAULT_PERIOD=quarterly                                  │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config path, or                                                  │
//! │     ~/.config/billbook/billbook.toml (Linux)                           │
//! │     ~/Library/Application Support/com.billbook.billbook/ (macOS)       │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     billbook.json in the working directory, monthly reports            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # billbook.toml
//! [business]
//! name = "Acme Studio"
//! currency_symbol = "₹"
//!
//! [data]
//! file = "/home/me/billbook/snapshot.json"
//!
//! [report]
//! default_period = "quarterly"  # weekly | monthly | quarterly | yearly
//! output_dir = "/home/me/billbook/exports"
//! ```

use std::path::{Path, PathBuf};

use billbook_core::ReportPeriod;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "billbook.toml";

// =============================================================================
// Business Settings
// =============================================================================

/// Who the books belong to and how amounts are shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    /// Printed in report headers.
    #[serde(default = "default_business_name")]
    pub name: String,

    /// Prefix for printed amounts. Exports never carry it.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_business_name() -> String {
    "My Business".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for BusinessConfig {
    fn default() -> Self {
        BusinessConfig {
            name: default_business_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Data Settings
// =============================================================================

/// Where the snapshot JSON is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_file")]
    pub file: PathBuf,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("billbook.json")
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            file: default_data_file(),
        }
    }
}

// =============================================================================
// Report Settings
// =============================================================================

/// Report defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Period used when `report` runs without `--period`.
    #[serde(default)]
    pub default_period: ReportPeriod,

    /// Directory CSV exports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            default_period: ReportPeriod::default(),
            output_dir: default_output_dir(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillbookConfig {
    #[serde(default)]
    pub business: BusinessConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub report: ReportSettings,
}

impl BillbookConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (billbook.toml)
    /// 3. Environment variables
    ///
    /// Command-line flags are applied by the caller afterwards.
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else if explicit {
                return Err(CliError::InvalidConfig(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, self.to_toml()?)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn to_toml(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        if self.data.file.as_os_str().is_empty() {
            return Err(CliError::InvalidConfig("data.file must not be empty".into()));
        }

        if self.business.currency_symbol.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "business.currency_symbol must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup shaped like the environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(file) = lookup("BILLBOOK_DATA_FILE") {
            debug!(file = %file, "Overriding data file from environment");
            self.data.file = PathBuf::from(file);
        }

        if let Some(dir) = lookup("BILLBOOK_OUTPUT_DIR") {
            debug!(dir = %dir, "Overriding output directory from environment");
            self.report.output_dir = PathBuf::from(dir);
        }

        if let Some(period) = lookup("BILLBOOK_DEFAULT_PERIOD") {
            match period.parse() {
                Ok(parsed) => self.report.default_period = parsed,
                Err(_) => warn!(period = %period, "Unknown report period in environment"),
            }
        }

        if let Some(name) = lookup("BILLBOOK_BUSINESS_NAME") {
            self.business.name = name;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "billbook", "billbook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Formats an amount with the configured currency symbol.
    pub fn money(&self, amount: billbook_core::Money) -> String {
        amount.format_with_symbol(&self.business.currency_symbol)
    }
}

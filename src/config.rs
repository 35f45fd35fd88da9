//! Configuration management.
//!
//! Configuration is layered with figment: defaults, then a TOML file, then
//! environment variables prefixed with `HARMATTAN_` (sections separated by
//! `__`, e.g. `HARMATTAN_REPORT__BIN_SECONDS=30`).

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{HarmattanError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "harmattan";

/// Application configuration.
///
/// Loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HARMATTAN_`)
/// 2. TOML config file at `~/.config/harmattan/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output dataset metadata.
    pub dataset: DatasetConfig,
    /// Conversion settings.
    pub convert: ConvertConfig,
    /// Tower report settings.
    pub report: ReportConfig,
}

/// Global-attribute metadata for produced NetCDF files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// `title` global attribute.
    pub title: String,
    /// `institution` global attribute.
    pub institution: String,
    /// Optional `source` global attribute, e.g. the instrument description.
    pub source: Option<String>,
    /// Optional free-text `comment` global attribute.
    pub comment: Option<String>,
}

/// Conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Averaging bin width in seconds. 0 writes raw samples.
    pub average_seconds: u64,
    /// Path to an AMF variable-table CSV replacing the embedded defaults.
    pub variables_csv: Option<PathBuf>,
}

/// Tower report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Base data directory holding `<unit>w/data/` trees.
    pub data_dir: PathBuf,
    /// Unit numbers to report on.
    pub units: Vec<String>,
    /// Averaging bin width in seconds.
    pub bin_seconds: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            title: "2D Sonic NetCDF file".to_string(),
            institution: "NCAS".to_string(),
            source: None,
            comment: None,
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            average_seconds: 0,
            variables_csv: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/data/shareddata/tower"),
            units: ["000", "001", "002", "003", "004", "005"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            bin_seconds: 60,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config file path.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("HARMATTAN_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.dataset.title.trim().is_empty() {
            return Err(HarmattanError::config_validation(
                "dataset.title must not be empty",
            ));
        }
        if self.dataset.institution.trim().is_empty() {
            return Err(HarmattanError::config_validation(
                "dataset.institution must not be empty",
            ));
        }
        if self.report.bin_seconds == 0 {
            return Err(HarmattanError::config_validation(
                "report.bin_seconds must be greater than 0",
            ));
        }
        if self.report.units.is_empty() {
            return Err(HarmattanError::config_validation(
                "report.units must name at least one unit",
            ));
        }
        Ok(())
    }
}

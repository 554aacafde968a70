//! Configuration for loading and binning data.
//!
//! A YAML document declares the column schema of raw input and default
//! binning parameters:
//!
//! ```yaml
//! version: 1
//! columns:
//!   manufacturer: discrete
//!   cyl: discrete
//!   hwy: numeric
//! binning:
//!   width: 5
//! ```

use crate::error::{Error, Result};
use crate::factor::BinOptions;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storage tag of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Numbers; parsed into an owned numeric column.
    Numeric,
    /// Categories; parsed into an owned text column.
    Discrete,
}

/// Column name to storage tag, in declaration order.
pub type Schema = IndexMap<String, ColumnType>;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Declared columns of the raw input.
    #[serde(default)]
    pub columns: Schema,

    /// Default binning parameters.
    #[serde(default)]
    pub binning: BinOptions,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            columns: Schema::new(),
            binning: BinOptions::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

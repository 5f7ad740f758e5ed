//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then command-line overrides applied by the CLI.

use crate::constants::{DEFAULT_CSV_DELIMITER, DEFAULT_MEASUREMENT_SEPARATOR, DEFAULT_OUTPUT_DIR};
use crate::error::{Bc3Error, Result};
use crate::export::ExportOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Global configuration for BC3 processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bc3Config {
    /// Directory receiving the CSV export and rewritten BC3 files
    pub output_dir: PathBuf,

    /// Run the material conversion pre-pass before building the tree
    pub normalize: bool,

    /// Persist repair results as a patched BC3 file
    pub patch_source: bool,

    /// Patch the input file itself instead of writing a copy
    pub in_place: bool,

    /// Print the rebuilt tree to stdout
    pub print_tree: bool,

    /// Field delimiter of the exported table
    pub csv_delimiter: char,

    /// Separator between measurement records in one cell
    pub measurement_separator: String,
}

impl Default for Bc3Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            normalize: false,
            patch_source: true,
            in_place: false,
            print_tree: false,
            csv_delimiter: DEFAULT_CSV_DELIMITER,
            measurement_separator: DEFAULT_MEASUREMENT_SEPARATOR.to_string(),
        }
    }
}

impl Bc3Config {
    /// `<config dir>/bc3-processor/config.toml`, when a config dir exists
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bc3-processor").join("config.toml"))
    }

    /// Parse a TOML configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|source| Bc3Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from an explicit file, else from the default location if present,
    /// else fall back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Bc3Error::configuration(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        match Self::default_config_path().filter(|p| p.exists()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_patch_source(mut self, patch_source: bool) -> Self {
        self.patch_source = patch_source;
        self
    }

    pub fn with_in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }

    pub fn with_print_tree(mut self, print_tree: bool) -> Self {
        self.print_tree = print_tree;
        self
    }

    pub fn with_csv_delimiter(mut self, delimiter: char) -> Self {
        self.csv_delimiter = delimiter;
        self
    }

    /// Check settings that serde cannot enforce
    pub fn validate(&self) -> Result<()> {
        if !self.csv_delimiter.is_ascii() || matches!(self.csv_delimiter, '"' | '\n' | '\r') {
            return Err(Bc3Error::configuration(format!(
                "CSV delimiter must be a single ASCII character other than quotes and newlines, got {:?}",
                self.csv_delimiter
            )));
        }
        if self.measurement_separator.is_empty() {
            return Err(Bc3Error::configuration(
                "measurement separator cannot be empty",
            ));
        }
        if self.in_place && !self.patch_source {
            return Err(Bc3Error::configuration(
                "in-place patching requires patch_source to be enabled",
            ));
        }
        if self.in_place && self.normalize {
            return Err(Bc3Error::configuration(
                "in-place patching cannot be combined with normalization, \
                 the source would be replaced by the normalized copy",
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Bc3Error::configuration("output directory cannot be empty"));
        }
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            delimiter: self.csv_delimiter as u8,
            measurement_separator: self.measurement_separator.clone(),
        }
    }
}

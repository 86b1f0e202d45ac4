//! Configuration management for mojo-descriptor
//!
//! Settings are loaded from environment variables with defaults that match a
//! conventional Maven module layout. Command-line flags override them.
//!
//! # Environment Variables
//!
//! - `MOJO_DESCRIPTOR_ENCODING`: Source file encoding (UTF-8|ISO-8859-1|US-ASCII) - default: "UTF-8"
//! - `MOJO_DESCRIPTOR_SOURCE_INCLUDES`: Comma-separated source globs - default: "**/*.java"
//! - `MOJO_DESCRIPTOR_SOURCE_EXCLUDES`: Comma-separated globs to skip - default: none
//! - `MOJO_DESCRIPTOR_GENERATED_SOURCES`: Generated sources dir, relative to the module - default: "target/generated-sources/plugin"
//! - `MOJO_DESCRIPTOR_CLASSES_DIR`: Compiled classes dir, relative to the module - default: "target/classes"
//! - `MOJO_DESCRIPTOR_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use mojo_descriptor::ExtractorConfig;
//! use std::env;
//!
//! env::set_var("MOJO_DESCRIPTOR_ENCODING", "ISO-8859-1");
//!
//! let config = ExtractorConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::javadoc::{SourceEncoding, SourceFilter};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_ENCODING: &str = "UTF-8";
const DEFAULT_SOURCE_INCLUDE: &str = "**/*.java";
const DEFAULT_GENERATED_SOURCES: &str = "target/generated-sources/plugin";
const DEFAULT_CLASSES_DIR: &str = "target/classes";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported source encoding: {0}. Valid options: UTF-8, ISO-8859-1, US-ASCII")]
    InvalidEncoding(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Settings for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Encoding used to decode Java sources
    pub encoding: String,

    /// Globs selecting source files below each source root
    pub source_includes: Vec<String>,

    /// Globs removing source files, on top of the SCM defaults
    pub source_excludes: Vec<String>,

    /// Generated sources directory, relative to the module base dir
    pub generated_sources: PathBuf,

    /// Compiled classes directory, relative to the module base dir
    pub classes_dir: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for ExtractorConfig {
    /// Loads from `MOJO_DESCRIPTOR_*` environment variables, falling back to
    /// defaults for anything unset.
    fn default() -> Self {
        let encoding =
            env::var("MOJO_DESCRIPTOR_ENCODING").unwrap_or_else(|_| DEFAULT_ENCODING.to_string());

        let source_includes = env::var("MOJO_DESCRIPTOR_SOURCE_INCLUDES")
            .ok()
            .map(|v| split_list(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_SOURCE_INCLUDE.to_string()]);

        let source_excludes = env::var("MOJO_DESCRIPTOR_SOURCE_EXCLUDES")
            .ok()
            .map(|v| split_list(&v))
            .unwrap_or_default();

        let generated_sources = env::var("MOJO_DESCRIPTOR_GENERATED_SOURCES")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_GENERATED_SOURCES));

        let classes_dir = env::var("MOJO_DESCRIPTOR_CLASSES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CLASSES_DIR));

        let log_level = env::var("MOJO_DESCRIPTOR_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            encoding,
            source_includes,
            source_excludes,
            generated_sources,
            classes_dir,
            log_level,
        }
    }
}

impl ExtractorConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown encoding, an invalid glob, an
    /// absolute module-relative directory or an unknown log level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source_encoding()?;
        self.source_filter()?;

        if self.generated_sources.is_absolute() || self.classes_dir.is_absolute() {
            return Err(ConfigError::ValidationFailed(
                "Generated sources and classes directories must be relative to the module"
                    .to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn source_encoding(&self) -> Result<SourceEncoding, ConfigError> {
        self.encoding
            .parse()
            .map_err(|_| ConfigError::InvalidEncoding(self.encoding.clone()))
    }

    pub fn source_filter(&self) -> Result<SourceFilter, ConfigError> {
        SourceFilter::new(&self.source_includes, &self.source_excludes)
            .map_err(|e| ConfigError::ValidationFailed(e.to_string()))
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("encoding".to_string(), self.encoding.clone());
        map.insert("source_includes".to_string(), self.source_includes.join(","));
        map.insert("source_excludes".to_string(), self.source_excludes.join(","));
        map.insert(
            "generated_sources".to_string(),
            self.generated_sources.display().to_string(),
        );
        map.insert(
            "classes_dir".to_string(),
            self.classes_dir.display().to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for ExtractorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mojo Descriptor Configuration:")?;
        writeln!(f, "  Encoding: {}", self.encoding)?;
        writeln!(f, "  Source Includes: {}", self.source_includes.join(", "))?;
        if !self.source_excludes.is_empty() {
            writeln!(f, "  Source Excludes: {}", self.source_excludes.join(", "))?;
        }
        writeln!(f, "  Generated Sources: {}", self.generated_sources.display())?;
        writeln!(f, "  Classes Dir: {}", self.classes_dir.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

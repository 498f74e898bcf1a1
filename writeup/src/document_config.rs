//! Page configuration from writeup.toml

use crate::html_exporter::PageMetadata;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up next to the source file
pub const CONFIG_FILE_NAME: &str = "writeup.toml";

/// Page configuration from writeup.toml
///
/// Every field is optional; a missing file is the same as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Page title (defaults to the source path)
    pub title: Option<String>,

    /// Content of the description meta tag
    pub description: String,

    /// Content of the author meta tag
    pub author: String,

    /// Stylesheets inlined into the page head, relative to the config file
    pub css: Vec<PathBuf>,

    /// Scripts inlined into the page head, relative to the config file
    pub js: Vec<PathBuf>,

    /// Emit the document body only, without the page wrapper
    pub fragment: bool,
}

impl DocumentConfig {
    /// Load configuration from a writeup.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the writeup.toml configuration file
    ///
    /// # Returns
    /// * `Ok(DocumentConfig)` - Successfully loaded configuration
    /// * `Err(DocumentConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DocumentConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: DocumentConfig =
            toml::from_str(&content).map_err(|e| DocumentConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        // Asset paths are relative to the config file
        let base = path.parent().unwrap_or(Path::new(""));
        config.css = config.css.iter().map(|p| base.join(p)).collect();
        config.js = config.js.iter().map(|p| base.join(p)).collect();

        Ok(config)
    }

    /// Load configuration if the file exists, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, DocumentConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            log::info!("Loading configuration from {}", path.display());
            Self::load(path)
        } else {
            log::debug!("No configuration at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Build page metadata, reading the configured asset files
    ///
    /// # Parameters
    /// * `default_title` - Title used when none is configured
    ///
    /// # Returns
    /// * `Ok(PageMetadata)` - Metadata with asset text concatenated in order
    /// * `Err(DocumentConfigError)` - An asset file could not be read
    pub fn page_metadata(&self, default_title: &str) -> Result<PageMetadata, DocumentConfigError> {
        Ok(PageMetadata {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| default_title.to_string()),
            description: self.description.clone(),
            author: self.author.clone(),
            css: read_assets(&self.css)?,
            js: read_assets(&self.js)?,
        })
    }
}

fn read_assets(paths: &[PathBuf]) -> Result<String, DocumentConfigError> {
    let mut text = String::new();
    for path in paths {
        let asset = fs::read_to_string(path).map_err(|e| DocumentConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        text.push_str(&asset);
    }
    Ok(text)
}

/// Errors that can occur when loading document configuration
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum DocumentConfigError {
    /// IO error when reading the config file or an asset
    #[error("IO error reading {path}: {source}", path = .path.display())]
    IoError {
        /// File being read
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// Error parsing TOML
    #[error("TOML parse error in {path}: {source}", path = .path.display())]
    ParseError {
        /// Config file being parsed
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: toml::de::Error,
    },
}

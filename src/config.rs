//! Generator configuration.
//!
//! Every location the generator touches is derived from [`GeneratorConfig`], which is passed
//! explicitly into the scanner and the assembler. Values can be loaded from a YAML or JSON
//! file and then overridden from the command line.

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Output format of the generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// Info values the document starts from before any unit is merged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoDefaults {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

impl Default for InfoDefaults {
    fn default() -> Self {
        Self {
            title: "API Documentation".to_string(),
            version: "1.0.0".to_string(),
            description: None,
        }
    }
}

/// Complete configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root directory that is scanned and that receives the output file
    pub serving_root: PathBuf,
    /// Output file name, relative to the serving root
    pub output_file: PathBuf,
    /// Directories under the serving root whose children are modules/apps, in scan order
    pub scan_roots: Vec<String>,
    /// Sub-directory of a module holding annotated source units
    pub source_dir: String,
    /// File name prefix a source unit must carry
    pub source_prefix: String,
    /// Extensions (without dot) of source units
    pub source_extensions: Vec<String>,
    /// Sub-directory of a module holding documentation units
    pub docs_dir: String,
    /// Extensions (without dot) of documentation units
    pub docs_extensions: Vec<String>,
    /// Schema version written to the document root
    pub openapi_version: String,
    pub info: InfoDefaults,
    pub format: OutputFormat,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            serving_root: PathBuf::from("."),
            output_file: PathBuf::from("openapi.json"),
            scan_roots: vec!["modules".to_string(), "app".to_string()],
            source_dir: "controller".to_string(),
            source_prefix: "Api".to_string(),
            source_extensions: vec!["php".to_string()],
            docs_dir: "api".to_string(),
            docs_extensions: vec!["md".to_string()],
            openapi_version: "3.0.0".to_string(),
            info: InfoDefaults::default(),
            format: OutputFormat::Json,
        }
    }
}

impl GeneratorConfig {
    /// Creates the default configuration rooted at `serving_root`.
    pub fn new(serving_root: impl Into<PathBuf>) -> Self {
        Self {
            serving_root: serving_root.into(),
            ..Self::default()
        }
    }

    /// Loads a configuration file. YAML is a superset of JSON, so both are accepted.
    /// Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Absolute location of the generated document.
    pub fn output_path(&self) -> PathBuf {
        self.serving_root.join(&self.output_file)
    }

    /// True if `path` carries one of the documentation extensions.
    pub fn is_documentation(&self, path: &Path) -> bool {
        has_extension(path, &self.docs_extensions)
    }

    /// True if `path` carries one of the source extensions.
    pub fn is_source(&self, path: &Path) -> bool {
        has_extension(path, &self.source_extensions)
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

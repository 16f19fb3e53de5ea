//! Serialization module for converting API documents to JSON or YAML.
//!
//! This module renders a [`Document`] in either format and persists the result. JSON is
//! pretty-printed and keeps non-ASCII text verbatim. Persistence is all or nothing: the
//! content goes to a temporary file next to the target, which is then renamed over it.

use crate::config::OutputFormat;
use crate::document::Document;
use crate::error::{Error, Result};
use log::debug;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Serializes a document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &Document) -> Result<String> {
    debug!("Serializing document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes a document to JSON format with pretty printing.
///
/// The output is indented for readability and non-ASCII characters are written as-is rather
/// than escaped.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::config::GeneratorConfig;
/// use openapi_from_annotations::document::Document;
/// use openapi_from_annotations::serializer::serialize_json;
///
/// let doc = Document::seeded(&GeneratorConfig::default());
/// let json = serialize_json(&doc).unwrap();
/// println!("{}", json);
/// ```
pub fn serialize_json(doc: &Document) -> Result<String> {
    debug!("Serializing document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Serializes a document in the requested format.
pub fn render(doc: &Document, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serialize_json(doc),
        OutputFormat::Yaml => serialize_yaml(doc),
    }
}

/// Atomically replaces the file at `path` with `content`.
///
/// The parent directory is not created.
///
/// # Errors
///
/// Returns [`Error::OutputDirMissing`] if the parent directory does not exist, and
/// [`Error::Io`] if the file cannot be written. On error the target is left untouched.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(Error::OutputDirMissing(parent.to_path_buf()));
    }

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

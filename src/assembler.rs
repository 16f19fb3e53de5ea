//! Document assembly: the generation pipeline end to end.
//!
//! The assembler asks its [`UnitDiscovery`] for the ordered unit list, routes each unit to
//! the extractor for its kind, normalizes the fragment and merges it into a document seeded
//! from the configuration. Units are processed strictly in discovery order because later
//! units overwrite earlier ones.
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_annotations::assembler::DocumentAssembler;
//! use openapi_from_annotations::config::GeneratorConfig;
//!
//! let assembler = DocumentAssembler::from_config(GeneratorConfig::new("/srv/www"));
//! let document = assembler.generate().unwrap();
//! println!("{} paths", document.paths.len());
//! ```

use crate::config::GeneratorConfig;
use crate::document::Document;
use crate::error::Result;
use crate::extractor::annotation::AnnotationExtractor;
use crate::extractor::markdown::MarkdownExtractor;
use crate::extractor::{ExtractOutcome, SkipReason, UnitExtractor};
use crate::merger::merge;
use crate::normalizer::normalize;
use crate::scanner::{FileScanner, UnitDiscovery, UnitKind};
use crate::serializer::{render, write_to_file};
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

/// Counters describing one assembly run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssemblyStats {
    /// Units discovered
    pub units: usize,
    /// Units that produced a fragment
    pub extracted: usize,
    /// Units that contributed nothing
    pub skipped: usize,
}

/// A finished document together with how it was produced.
#[derive(Debug)]
pub struct Assembly {
    pub document: Document,
    pub stats: AssemblyStats,
    /// Non-fatal discovery warnings
    pub warnings: Vec<String>,
}

/// Builds the complete document from every discovered unit.
pub struct DocumentAssembler<D: UnitDiscovery> {
    discovery: D,
    config: GeneratorConfig,
}

impl DocumentAssembler<FileScanner> {
    /// Creates an assembler discovering units on disk as described by `config`.
    pub fn from_config(config: GeneratorConfig) -> Self {
        Self::new(FileScanner::new(config.clone()), config)
    }
}

impl<D: UnitDiscovery> DocumentAssembler<D> {
    pub fn new(discovery: D, config: GeneratorConfig) -> Self {
        Self { discovery, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds the document from scratch.
    ///
    /// # Errors
    ///
    /// Only discovery failures are errors; individual units never fail the run.
    pub fn generate(&self) -> Result<Document> {
        Ok(self.assemble()?.document)
    }

    /// Like [`generate`](Self::generate), also returning run statistics.
    pub fn assemble(&self) -> Result<Assembly> {
        let scan = self.discovery.discover()?;
        info!("Assembling document from {} units", scan.units.len());

        let mut document = Document::seeded(&self.config);
        let mut stats = AssemblyStats {
            units: scan.units.len(),
            ..AssemblyStats::default()
        };

        for unit in &scan.units {
            let outcome = match fs::read_to_string(&unit.path) {
                Ok(text) => Self::extract_unit(unit.kind, &text),
                Err(e) => ExtractOutcome::Skipped {
                    reason: SkipReason::Unreadable(e.to_string()),
                },
            };

            match outcome {
                ExtractOutcome::Extracted(fragment) => {
                    debug!(
                        "Merging {} ({} operations)",
                        unit.path.display(),
                        fragment.operations.len()
                    );
                    stats.extracted += 1;
                    document = merge(document, normalize(fragment));
                }
                ExtractOutcome::Skipped { reason } => {
                    match &reason {
                        SkipReason::Unreadable(_) => {
                            warn!("Skipping {}: {}", unit.path.display(), reason)
                        }
                        _ => debug!("Skipping {}: {}", unit.path.display(), reason),
                    }
                    stats.skipped += 1;
                }
            }
        }

        info!(
            "Assembled {} paths with {} operations ({} units skipped)",
            document.paths.len(),
            document.operation_count(),
            stats.skipped
        );

        Ok(Assembly {
            document,
            stats,
            warnings: scan.warnings,
        })
    }

    /// Runs the extractor matching `kind` on the text of one unit.
    pub fn extract_unit(kind: UnitKind, text: &str) -> ExtractOutcome {
        match kind {
            UnitKind::Source => AnnotationExtractor.extract(text),
            UnitKind::Documentation => MarkdownExtractor.extract(text),
        }
    }

    /// Writes `document` to the configured output location in the configured format.
    ///
    /// # Errors
    ///
    /// Fails if the output directory is missing or the file cannot be written; the previous
    /// output, if any, is then left in place.
    pub fn persist(&self, document: &Document) -> Result<PathBuf> {
        let path = self.config.output_path();
        let content = render(document, self.config.format)?;
        write_to_file(&content, &path)?;
        info!("Wrote document to {}", path.display());
        Ok(path)
    }

    /// Assembles the document and persists it.
    pub fn generate_and_write(&self) -> Result<(Assembly, PathBuf)> {
        let assembly = self.assemble()?;
        let path = self.persist(&assembly.document)?;
        Ok((assembly, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extractor::HttpMethod;
    use crate::scanner::{ScanResult, SourceUnit};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    /// Discovery returning a fixed unit list.
    struct FixedUnits(Vec<SourceUnit>);

    impl UnitDiscovery for FixedUnits {
        fn discover(&self) -> Result<ScanResult> {
            Ok(ScanResult {
                units: self.0.clone(),
                warnings: vec!["fixed".to_string()],
            })
        }
    }

    fn write_unit(dir: &Path, name: &str, kind: UnitKind, content: &str) -> SourceUnit {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        SourceUnit { path, kind }
    }

    #[test]
    fn test_units_merge_in_discovery_order() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        let units = vec![
            write_unit(
                dir,
                "ApiUser.php",
                UnitKind::Source,
                "<?php\nclass ApiUser {\n    #[OA\\Get(path: '/users', summary: 'from source')]\n    public function index() {}\n}\n",
            ),
            write_unit(
                dir,
                "users.md",
                UnitKind::Documentation,
                "# Users\n\nget: /users\npost: /users\n",
            ),
        ];

        let assembler = DocumentAssembler::new(FixedUnits(units), GeneratorConfig::new(dir));
        let assembly = assembler.assemble().unwrap();
        let document = &assembly.document;

        assert_eq!(document.info.title, "Users");
        assert_eq!(
            document.operation("/users", HttpMethod::Get).unwrap().summary,
            "Get /users"
        );
        assert!(document.operation("/users", HttpMethod::Post).is_some());
        assert_eq!(
            assembly.stats,
            AssemblyStats {
                units: 2,
                extracted: 2,
                skipped: 0
            }
        );
        assert_eq!(assembly.warnings, vec!["fixed"]);
    }

    #[test]
    fn test_skipped_and_unreadable_units_leave_document_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        let units = vec![
            write_unit(dir, "ApiNone.php", UnitKind::Source, "<?php\nreturn [];\n"),
            SourceUnit {
                path: dir.join("missing.md"),
                kind: UnitKind::Documentation,
            },
        ];

        let config = GeneratorConfig::new(dir);
        let assembler = DocumentAssembler::new(FixedUnits(units), config.clone());
        let assembly = assembler.assemble().unwrap();

        assert_eq!(assembly.document, Document::seeded(&config));
        assert_eq!(assembly.stats.skipped, 2);
        assert_eq!(assembly.stats.extracted, 0);
    }

    #[test]
    fn test_generate_and_write() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("modules/shop/api")).unwrap();
        fs::write(root.join("modules/shop/api/orders.md"), "delete: /orders/{id}\n").unwrap();

        let assembler = DocumentAssembler::from_config(GeneratorConfig::new(root));
        let (assembly, path) = assembler.generate_and_write().unwrap();

        assert_eq!(path, root.join("openapi.json"));
        let written: Document =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, assembly.document);
        assert!(written.operation("/orders/{id}", HttpMethod::Delete).is_some());
    }

    #[test]
    fn test_missing_output_directory_fails_without_output() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = GeneratorConfig::new(temp_dir.path());
        config.output_file = PathBuf::from("www/openapi.json");

        let assembler = DocumentAssembler::from_config(config);
        let err = assembler.generate_and_write().unwrap_err();

        assert!(matches!(err, Error::OutputDirMissing(_)));
        assert!(!temp_dir.path().join("www").exists());
    }

    #[test]
    fn test_missing_serving_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let assembler =
            DocumentAssembler::from_config(GeneratorConfig::new(temp_dir.path().join("gone")));
        assert!(matches!(
            assembler.generate(),
            Err(Error::InvalidServingRoot(_))
        ));
    }
}

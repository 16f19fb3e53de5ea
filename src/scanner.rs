use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of a discovered unit, which decides the extractor it is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Annotated program source (`controller/Api*.php`)
    Source,
    /// Markdown documentation (`api/*.md`)
    Documentation,
}

/// One file selected for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub kind: UnitKind,
}

/// Result of a discovery pass.
///
/// Units are listed in the order they must be merged. Warnings describe entries that
/// could not be accessed; they never abort discovery.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Units in merge order
    pub units: Vec<SourceUnit>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl ScanResult {
    /// Number of units of the given kind.
    pub fn count(&self, kind: UnitKind) -> usize {
        self.units.iter().filter(|u| u.kind == kind).count()
    }
}

/// Supplies the ordered list of units a generation run processes.
pub trait UnitDiscovery {
    fn discover(&self) -> Result<ScanResult>;
}

/// File scanner enumerating installed modules and apps under the serving root.
///
/// For every scan root (`modules`, then `app` by default) each immediate child directory is
/// one module. Modules are visited in lexical order, and inside a module the source units
/// (`controller/Api*.php`) come first, then the documentation units (`api/*.md`), each group
/// sorted by file name.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::config::GeneratorConfig;
/// use openapi_from_annotations::scanner::{FileScanner, UnitDiscovery};
///
/// let scanner = FileScanner::new(GeneratorConfig::new("/srv/www"));
/// let result = scanner.discover().unwrap();
/// println!("Found {} units", result.units.len());
/// ```
pub struct FileScanner {
    config: GeneratorConfig,
}

impl FileScanner {
    /// Creates a new `FileScanner` using the locations of `config`.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Lists the files directly inside `dir`, sorted by name.
    ///
    /// A missing directory yields nothing; unreadable entries are recorded as warnings.
    fn list_dir(dir: &Path, want_dirs: bool, warnings: &mut Vec<String>) -> Vec<PathBuf> {
        if !dir.is_dir() {
            return Vec::new();
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if (want_dirs && file_type.is_dir()) || (!want_dirs && file_type.is_file()) {
                        entries.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }
        entries
    }

    fn is_source_unit(&self, path: &Path) -> bool {
        let prefixed = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(&self.config.source_prefix))
            .unwrap_or(false);
        prefixed && self.config.is_source(path)
    }

    fn scan_module(&self, module: &Path, result: &mut ScanResult) {
        let source_dir = module.join(&self.config.source_dir);
        for path in Self::list_dir(&source_dir, false, &mut result.warnings) {
            if self.is_source_unit(&path) {
                result.units.push(SourceUnit {
                    path,
                    kind: UnitKind::Source,
                });
            }
        }

        let docs_dir = module.join(&self.config.docs_dir);
        for path in Self::list_dir(&docs_dir, false, &mut result.warnings) {
            if self.config.is_documentation(&path) {
                result.units.push(SourceUnit {
                    path,
                    kind: UnitKind::Documentation,
                });
            }
        }
    }
}

impl UnitDiscovery for FileScanner {
    /// Scans the serving root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidServingRoot`] if the serving root is not a directory. Missing
    /// scan roots or module sub-directories are not errors.
    fn discover(&self) -> Result<ScanResult> {
        let root = &self.config.serving_root;
        if !root.is_dir() {
            return Err(Error::InvalidServingRoot(root.clone()));
        }

        let mut result = ScanResult::default();
        for scan_root in &self.config.scan_roots {
            let scan_dir = root.join(scan_root);
            debug!("Scanning {}", scan_dir.display());

            for module in Self::list_dir(&scan_dir, true, &mut result.warnings) {
                self.scan_module(&module, &mut result);
            }
        }

        debug!(
            "Discovered {} source units and {} documentation units",
            result.count(UnitKind::Source),
            result.count(UnitKind::Documentation)
        );
        Ok(result)
    }
}

use crate::assembler::DocumentAssembler;
use crate::config::{GeneratorConfig, OutputFormat};
use crate::serializer::render;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;

/// OpenAPI from annotations - Generate an OpenAPI document from annotated controllers and
/// markdown API notes
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Serving root to scan and write the document into (default: from config, or `.`)
    #[arg(value_name = "SERVING_ROOT")]
    pub serving_root: Option<PathBuf>,

    /// Configuration file (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file, relative to the serving root (default: openapi.json)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<Format>,

    /// Print the document to stdout instead of writing it
    #[arg(long = "stdout")]
    pub stdout: bool,

    /// Print a JSON result object (`code`, `msg`, counters) when done
    #[arg(long = "report")]
    pub report: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Format {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
        }
    }
}

/// Structured result of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    /// 0 on success, 1 on failure
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
}

impl GenerationReport {
    pub fn failure(err: &anyhow::Error) -> Self {
        Self {
            code: 1,
            msg: format!("{:#}", err),
            output: None,
            paths: None,
            operations: None,
            skipped: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(ref root) = args.serving_root {
        if !root.exists() {
            anyhow::bail!("Serving root does not exist: {}", root.display());
        }
        if !root.is_dir() {
            anyhow::bail!("Serving root is not a directory: {}", root.display());
        }
    }

    if let Some(ref config) = args.config {
        if !config.is_file() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
    }

    if args.stdout && args.report {
        anyhow::bail!("--stdout and --report cannot be combined");
    }

    Ok(args)
}

/// Build the generator configuration: config file first, then command-line overrides
pub fn build_config(args: &CliArgs) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    if let Some(root) = &args.serving_root {
        config.serving_root = root.clone();
    }
    if let Some(output) = &args.output_path {
        config.output_file = output.clone();
    }
    if let Some(format) = args.output_format {
        config.format = format.into();
    }

    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<GenerationReport> {
    let config = build_config(&args)?;

    info!("Starting OpenAPI document generation...");
    info!("Serving root: {}", config.serving_root.display());
    info!("Output format: {:?}", config.format);

    let assembler = DocumentAssembler::from_config(config);

    // Step 1-3: Discover, extract and merge every unit
    let assembly = assembler
        .assemble()
        .context("Failed to assemble the API document")?;
    for warning in &assembly.warnings {
        warn!("{}", warning);
    }
    if assembly.document.paths.is_empty() {
        warn!("No operations found under the serving root");
    }

    // Step 4: Output to stdout or the configured file
    let output = if args.stdout {
        let content = render(&assembly.document, assembler.config().format)?;
        println!("{}", content);
        None
    } else {
        let path = assembler
            .persist(&assembly.document)
            .context("Failed to write the API document")?;
        Some(path.display().to_string())
    };

    // Step 5: Display summary
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Units scanned: {}", assembly.stats.units);
    info!("  - Units skipped: {}", assembly.stats.skipped);
    info!("  - Paths: {}", assembly.document.paths.len());
    info!("  - Operations: {}", assembly.document.operation_count());

    Ok(GenerationReport {
        code: 0,
        msg: "OpenAPI document generated".to_string(),
        output,
        paths: Some(assembly.document.paths.len()),
        operations: Some(assembly.document.operation_count()),
        skipped: Some(assembly.stats.skipped),
    })
}

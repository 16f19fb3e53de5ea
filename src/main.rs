//! OpenAPI from annotations - Command-line tool for generating an OpenAPI document.
//!
//! The tool scans the installed modules and apps under a serving root, extracts operation
//! declarations from annotated `controller/Api*.php` classes and `api/*.md` notes, and writes
//! the merged document to `openapi.json` in the serving root.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations [OPTIONS] [SERVING_ROOT]
//! ```
//!
//! # Examples
//!
//! Regenerate the document of a site:
//! ```bash
//! openapi-from-annotations /srv/www
//! ```
//!
//! Print YAML instead of writing a file:
//! ```bash
//! openapi-from-annotations /srv/www -f yaml --stdout
//! ```
//!
//! Report the result as JSON, for callers that trigger generation:
//! ```bash
//! openapi-from-annotations /srv/www --report
//! ```

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use openapi_from_annotations::cli::{self, GenerationReport};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from annotations starting...");

    let report_requested = args.report;
    let outcome = cli::parse_args_from_parsed(args).and_then(cli::run);

    if !report_requested {
        outcome?;
        info!("OpenAPI document generation completed successfully");
        return Ok(ExitCode::SUCCESS);
    }

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            error!("{:#}", err);
            GenerationReport::failure(&err)
        }
    };
    println!("{}", serde_json::to_string(&report)?);

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

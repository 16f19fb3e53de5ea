//! OpenAPI from annotations - API documentation extracted from annotated sources and notes.
//!
//! This library builds an OpenAPI 3.0 document by statically reading two kinds of input
//! found under a serving root: controller classes carrying operation attributes
//! (`#[OA\Get(path: ...)]`) and markdown documentation with headings, info directives,
//! fenced attribute examples and loose `get: /path` lines. Nothing is executed or loaded;
//! all extraction works on the text.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`config`] - Locations, conventions and defaults for one run
//! 2. [`scanner`] - Discovers source and documentation units in a deterministic order
//! 3. [`extractor`] - Turns the text of one unit into a raw fragment, or a skip
//! 4. [`normalizer`] - Converts raw fragments into typed records, applying defaults
//! 5. [`merger`] - Folds typed fragments into the document (last write wins)
//! 6. [`assembler`] - Runs the pipeline over every unit and persists the result
//! 7. [`document`] - The canonical document model
//! 8. [`serializer`] - Renders the document as JSON or YAML and writes it atomically
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_annotations::{
//!     assembler::DocumentAssembler,
//!     config::GeneratorConfig,
//!     serializer::serialize_json,
//! };
//!
//! let assembler = DocumentAssembler::from_config(GeneratorConfig::new("/srv/www"));
//! let document = assembler.generate().unwrap();
//!
//! let json = serialize_json(&document).unwrap();
//! println!("{}", json);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod assembler;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod merger;
pub mod normalizer;
pub mod scanner;
pub mod serializer;

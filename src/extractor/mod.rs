//! Extraction of raw API declarations from source and documentation units.
//!
//! This module provides a unified interface over the two kinds of input the generator reads.
//! Each extractor turns the text of one unit into a [`Fragment`]: an untyped bag of info
//! fields plus the operations it declares, keyed by HTTP method and path. Fragments carry no
//! defaults; those are applied later by the normalizer.
//!
//! # Extractors
//!
//! - **Annotated sources**: See [`annotation::AnnotationExtractor`]
//! - **Markdown documentation**: See [`markdown::MarkdownExtractor`]
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_annotations::extractor::{UnitExtractor, markdown::MarkdownExtractor};
//!
//! let outcome = MarkdownExtractor.extract("# Users\n\nget: /users/list\n");
//! if let Some(fragment) = outcome.fragment() {
//!     println!("Found {} operations", fragment.operations.len());
//! }
//! ```

pub mod annotation;
pub mod attribute;
pub mod lexer;
pub mod markdown;

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Trait for extracting a raw fragment from the text of one unit.
///
/// Implementations never fail: a unit that cannot contribute anything is reported as
/// [`ExtractOutcome::Skipped`] with the reason.
pub trait UnitExtractor {
    fn extract(&self, text: &str) -> ExtractOutcome;
}

/// Result of running an extractor on one unit.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutcome {
    /// The unit produced a fragment (possibly empty)
    Extracted(Fragment),
    /// The unit contributes nothing
    Skipped { reason: SkipReason },
}

impl ExtractOutcome {
    /// Returns the fragment, or `None` for a skipped unit.
    pub fn fragment(self) -> Option<Fragment> {
        match self {
            ExtractOutcome::Extracted(fragment) => Some(fragment),
            ExtractOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ExtractOutcome::Skipped { .. })
    }
}

/// Why a unit was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// No class declaration identifies the unit
    #[error("no type declaration found")]
    NoTypeDeclaration,
    /// The unit declares a type but no usable info or operation metadata
    #[error("no usable declarations found")]
    NoDeclarations,
    /// The unit could not be read
    #[error("unreadable: {0}")]
    Unreadable(String),
}

/// HTTP methods an operation can be declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    /// Parses a method keyword such as `Get`, `POST` or `delete`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    /// Lowercase token used as the key inside a path item.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }

    /// Capitalized form used in generated summaries (`Get /users`).
    pub fn label(&self) -> &'static str {
        match self {
            HttpMethod::Get => "Get",
            HttpMethod::Post => "Post",
            HttpMethod::Put => "Put",
            HttpMethod::Delete => "Delete",
            HttpMethod::Patch => "Patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language of a unit's text, which selects the default response description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    Chinese,
}

impl Locale {
    /// Chinese if the text contains any CJK ideograph, English otherwise.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| ('\u{4E00}'..='\u{9FFF}').contains(&c)) {
            Locale::Chinese
        } else {
            Locale::English
        }
    }

    pub fn default_response_description(&self) -> &'static str {
        match self {
            Locale::English => "Success",
            Locale::Chinese => "成功",
        }
    }
}

/// Named arguments of a declaration, in name order.
pub type RawFields = BTreeMap<String, RawValue>;

/// An untyped value as written in a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Quoted string, escapes resolved
    Str(String),
    /// Numeric literal as written
    Number(String),
    Bool(bool),
    Null,
    /// Unresolvable reference such as `Response::HTTP_OK` or a bare identifier
    Const(String),
    List(Vec<RawValue>),
    /// Nested declaration, e.g. `new OA\Response(...)`
    Record(RawRecord),
}

impl RawValue {
    /// String or numeric content; other values have no textual form.
    pub fn as_scalar_text(&self) -> Option<&str> {
        match self {
            RawValue::Str(s) | RawValue::Number(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// A declaration: a kind name plus named arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    /// Name as written, possibly qualified (`OA\Get`)
    pub name: String,
    pub args: RawFields,
}

impl RawRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: RawFields::new(),
        }
    }

    /// Last segment of the qualified name (`OA\Get` -> `Get`).
    pub fn kind(&self) -> &str {
        self.name.rsplit('\\').next().unwrap_or(&self.name)
    }

    /// The argument as a non-empty, trimmed string.
    pub fn text_arg(&self, key: &str) -> Option<&str> {
        self.args
            .get(key)
            .and_then(RawValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One operation declaration before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOperation {
    pub method: HttpMethod,
    /// Path as declared, not yet normalized
    pub path: String,
    /// Name of the member carrying the declaration, if any
    pub member: Option<String>,
    pub fields: RawFields,
}

/// Everything one unit declares.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    /// Identity of the unit (qualified type name), for diagnostics
    pub unit: Option<String>,
    pub locale: Locale,
    /// Info fields present in the unit (`title`, `version`, `description`)
    pub info: RawFields,
    /// Operations in declaration order; later entries win on the same path and method
    pub operations: Vec<RawOperation>,
}

impl Fragment {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.info.is_empty() && self.operations.is_empty()
    }
}

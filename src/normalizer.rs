//! Conversion of raw fragments into typed document records.
//!
//! Normalization never fails. A field that is missing, or present but of an unusable shape,
//! is treated as absent and replaced by its default:
//!
//! | Field | Default |
//! |---|---|
//! | `summary` | member name, or `<Method> <path>` when there is no member; an explicit `summary` always wins, markdown code blocks included |
//! | `description` | empty |
//! | `parameters` | none |
//! | parameter `in` | inferred from the parameter kind, else `query` |
//! | parameter `required` | `false` |
//! | `responses` | a single `200` entry |
//! | response code | `200` |
//! | response description | `Success`, or `成功` for Chinese markdown notes |

use crate::document::{Operation, Parameter, ParameterLocation, Response};
use crate::extractor::{Fragment, HttpMethod, Locale, RawFields, RawOperation, RawRecord, RawValue};
use log::debug;
use std::collections::BTreeMap;

const DEFAULT_RESPONSE_CODE: &str = "200";

/// Info fields one fragment sets; `None` leaves the document's value untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InfoPatch {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl InfoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.version.is_none() && self.description.is_none()
    }
}

/// A typed operation keyed by its normalized path and method.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOperation {
    pub path: String,
    pub method: HttpMethod,
    pub operation: Operation,
}

/// Typed form of a [`Fragment`], ready to be merged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedFragment {
    pub info: InfoPatch,
    /// Operations in declaration order
    pub operations: Vec<NormalizedOperation>,
}

/// Normalizes every part of `fragment`. Operations whose path is blank are dropped.
pub fn normalize(fragment: Fragment) -> NormalizedFragment {
    let info = InfoPatch {
        title: text_field(&fragment.info, "title"),
        version: text_field(&fragment.info, "version"),
        description: text_field(&fragment.info, "description"),
    };

    let locale = fragment.locale;
    let operations = fragment
        .operations
        .into_iter()
        .filter_map(|raw| normalize_operation(raw, locale))
        .collect();

    NormalizedFragment { info, operations }
}

/// Normalizes one operation, or `None` if its path is blank.
pub fn normalize_operation(raw: RawOperation, locale: Locale) -> Option<NormalizedOperation> {
    let Some(path) = normalize_path(&raw.path) else {
        debug!("Dropping {} operation with blank path", raw.method);
        return None;
    };

    let summary = text_field(&raw.fields, "summary")
        .or_else(|| raw.member.clone())
        .unwrap_or_else(|| format!("{} {}", raw.method.label(), path));

    let operation = Operation {
        summary,
        description: text_field(&raw.fields, "description").unwrap_or_default(),
        parameters: parameters(raw.fields.get("parameters")),
        responses: responses(raw.fields.get("responses"), locale),
    };

    Some(NormalizedOperation {
        path,
        method: raw.method,
        operation,
    })
}

/// Trims `path` and makes sure it starts with `/`. Blank paths have no normal form.
pub fn normalize_path(path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        None
    } else if path.starts_with('/') {
        Some(path.to_string())
    } else {
        Some(format!("/{}", path))
    }
}

/// Trimmed, non-empty string or numeric value of `key`.
fn text_field(fields: &RawFields, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(RawValue::as_scalar_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The records of a value that may be a single record or a list of them.
fn records(value: Option<&RawValue>) -> Vec<&RawRecord> {
    match value {
        Some(RawValue::Record(record)) => vec![record],
        Some(RawValue::List(items)) => items
            .iter()
            .filter_map(|item| match item {
                RawValue::Record(record) => Some(record),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn responses(value: Option<&RawValue>, locale: Locale) -> BTreeMap<String, Response> {
    let mut responses = BTreeMap::new();
    for record in records(value) {
        let code = text_field(&record.args, "response")
            .unwrap_or_else(|| DEFAULT_RESPONSE_CODE.to_string());
        let description = text_field(&record.args, "description")
            .unwrap_or_else(|| locale.default_response_description().to_string());
        responses.insert(code, Response { description });
    }

    if responses.is_empty() {
        responses.insert(
            DEFAULT_RESPONSE_CODE.to_string(),
            Response {
                description: locale.default_response_description().to_string(),
            },
        );
    }
    responses
}

fn parameters(value: Option<&RawValue>) -> Vec<Parameter> {
    records(value)
        .into_iter()
        .map(|record| Parameter {
            name: text_field(&record.args, "name").unwrap_or_default(),
            location: location(record),
            description: text_field(&record.args, "description").unwrap_or_default(),
            required: record.args.get("required").map(is_truthy).unwrap_or(false),
        })
        .collect()
}

/// Explicit `in`, else the kind (`PathParameter` -> path), else query.
fn location(record: &RawRecord) -> ParameterLocation {
    if let Some(location) = record
        .args
        .get("in")
        .and_then(RawValue::as_str)
        .and_then(ParameterLocation::from_keyword)
    {
        return location;
    }

    record
        .kind()
        .strip_suffix("Parameter")
        .and_then(ParameterLocation::from_keyword)
        .unwrap_or_default()
}

fn is_truthy(value: &RawValue) -> bool {
    match value {
        RawValue::Bool(b) => *b,
        RawValue::Number(n) => n == "1",
        RawValue::Str(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

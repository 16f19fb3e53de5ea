//! Canonical API document model.
//!
//! These types mirror the subset of the OpenAPI 3.0 object model the generator produces.
//! Field names and optional-field skipping follow the serialized document shape, so a
//! [`Document`] can be written out directly by the serializer. Maps are ordered, which keeps
//! the output stable between runs.

use crate::config::GeneratorConfig;
use crate::extractor::HttpMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete API document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Schema version string (`3.0.0`)
    pub openapi: String,
    pub info: Info,
    /// Path (always starting with `/`) -> operations on that path
    pub paths: BTreeMap<String, PathItem>,
    /// Passed through unchanged
    pub components: Components,
}

impl Document {
    /// Creates the document every generation run starts from: the configured info defaults,
    /// no paths, and a single bearer-token security scheme.
    pub fn seeded(config: &GeneratorConfig) -> Self {
        let mut security_schemes = BTreeMap::new();
        security_schemes.insert("bearerAuth".to_string(), SecurityScheme::bearer());

        Self {
            openapi: config.openapi_version.clone(),
            info: Info {
                title: config.info.title.clone(),
                version: config.info.version.clone(),
                description: config.info.description.clone(),
            },
            paths: BTreeMap::new(),
            components: Components {
                schemas: BTreeMap::new(),
                security_schemes,
            },
        }
    }

    /// Looks up the operation for `method` on `path`.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.operation(method))
    }

    /// Total number of operations over all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(PathItem::len).sum()
    }
}

/// API info
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// All operations declared for one path, at most one per method
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    /// The slot holding the operation for `method`.
    pub fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
        }
    }

    /// Methods that have an operation, in [`HttpMethod::ALL`] order.
    pub fn methods(&self) -> Vec<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .filter(|m| self.operation(*m).is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.methods().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One HTTP method's documented behavior on one path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Response code -> response; never empty
    pub responses: BTreeMap<String, Response>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// Where a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    #[default]
    Query,
    Path,
    Header,
    Cookie,
}

impl ParameterLocation {
    /// Parses `query`, `path`, `header` or `cookie`, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "query" => Some(ParameterLocation::Query),
            "path" => Some(ParameterLocation::Path),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
}

/// Components section: schemas and security schemes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(
        rename = "bearerFormat",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bearer_format: Option<String>,
}

impl SecurityScheme {
    /// HTTP bearer-token authentication
    pub fn bearer() -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some("bearer".to_string()),
            bearer_format: None,
        }
    }
}

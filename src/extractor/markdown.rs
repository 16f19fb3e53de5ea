//! Markdown documentation extractor.
//!
//! A documentation unit is free text with four independent recognizers layered on top:
//!
//! 1. The first level-one heading (`# Orders API`) sets the info title
//! 2. An info directive (`# @OA\Info(title="...", version="...", description="...")`)
//!    overrides the info fields it names
//! 3. Each fenced code block may carry one operation attribute, parsed with the same
//!    attribute grammar as annotated sources
//! 4. Loose `METHOD: URL` lines outside code blocks each declare an operation on the first
//!    path found in the URL
//!
//! Recognizers 1 and 4 only look at the prose outside code blocks. Code block operations
//! are emitted before loose-line operations, so a loose line wins over a code block
//! declaring the same path and method.

use crate::extractor::attribute::scan_attributes;
use crate::extractor::{
    ExtractOutcome, Fragment, HttpMethod, Locale, RawFields, RawOperation, RawValue,
    UnitExtractor,
};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)^[ \t]*```[^\n]*\n(.*?)^[ \t]*```[ \t]*$").unwrap());

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*$").unwrap());

static INFO_DIRECTIVE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\s*@(?:OA\\)?Info\(([^)]*)\)").unwrap());

static KEY_VALUE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+)\s*[=:]\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

static LOOSE_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*([A-Za-z]+)[ \t]*:[ \t]*(.+?)[ \t]*$").unwrap());

static URL_ORIGIN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^/\s]*").unwrap());

static PATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[A-Za-z0-9_\-/{}]+").unwrap());

const INFO_FIELDS: [&str; 3] = ["title", "version", "description"];

/// Extractor for markdown documentation units. Never skips: a document without any
/// recognizable content yields an empty fragment.
pub struct MarkdownExtractor;

impl MarkdownExtractor {
    /// Title from the first level-one heading that is not an info directive.
    fn heading_title(prose: &str) -> Option<String> {
        HEADING_REGEX
            .captures_iter(prose)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .find(|text| !text.is_empty() && !text.starts_with('@'))
            .map(str::to_string)
    }

    /// Fields of the first info directive, restricted to the info fields.
    fn info_directive(content: &str) -> RawFields {
        let mut fields = RawFields::new();
        let Some(body) = INFO_DIRECTIVE_REGEX.captures(content).and_then(|c| c.get(1)) else {
            return fields;
        };

        for caps in KEY_VALUE_REGEX.captures_iter(body.as_str()) {
            let key = &caps[1];
            if !INFO_FIELDS.contains(&key) {
                continue;
            }
            let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            fields.insert(key.to_string(), RawValue::Str(value.to_string()));
        }
        fields
    }

    /// Operation declared by one code block: its first operation attribute, if that has a
    /// path.
    fn code_block_operation(code: &str) -> Option<RawOperation> {
        let (method, record) = scan_attributes(code)
            .into_iter()
            .find_map(|record| HttpMethod::from_keyword(record.kind()).map(|m| (m, record)))?;

        let Some(path) = record.text_arg("path") else {
            debug!("Code block {} declaration has no path", method);
            return None;
        };

        Some(RawOperation {
            method,
            path: path.to_string(),
            member: None,
            fields: record.args.clone(),
        })
    }

    /// First path-looking substring of a URL, ignoring any scheme and host.
    fn url_path(url: &str) -> Option<&str> {
        let rest = match URL_ORIGIN_REGEX.find(url) {
            Some(origin) => &url[origin.end()..],
            None => url,
        };
        PATH_REGEX.find(rest).map(|m| m.as_str())
    }

    fn loose_line_operations(prose: &str) -> Vec<RawOperation> {
        LOOSE_LINE_REGEX
            .captures_iter(prose)
            .filter_map(|caps| {
                let method = HttpMethod::from_keyword(&caps[1])?;
                let path = Self::url_path(&caps[2])?;
                Some(RawOperation {
                    method,
                    path: path.to_string(),
                    member: None,
                    fields: RawFields::new(),
                })
            })
            .collect()
    }
}

impl UnitExtractor for MarkdownExtractor {
    fn extract(&self, text: &str) -> ExtractOutcome {
        // Line-anchored recognizers expect LF endings
        let text = text.replace("\r\n", "\n");
        let text = text.as_str();

        let mut fragment = Fragment::new(Locale::detect(text));
        let prose = FENCE_REGEX.replace_all(text, "");

        if let Some(title) = Self::heading_title(&prose) {
            fragment.info.insert("title".to_string(), RawValue::Str(title));
        }
        fragment.info.extend(Self::info_directive(text));

        for caps in FENCE_REGEX.captures_iter(text) {
            if let Some(op) = caps.get(1).and_then(|m| Self::code_block_operation(m.as_str())) {
                fragment.operations.push(op);
            }
        }
        fragment.operations.extend(Self::loose_line_operations(&prose));

        debug!(
            "Markdown unit yielded {} info fields and {} operations",
            fragment.info.len(),
            fragment.operations.len()
        );
        ExtractOutcome::Extracted(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> Fragment {
        MarkdownExtractor
            .extract(text)
            .fragment()
            .expect("markdown never skips")
    }

    fn keys(fragment: &Fragment) -> Vec<(HttpMethod, String)> {
        fragment
            .operations
            .iter()
            .map(|op| (op.method, op.path.clone()))
            .collect()
    }

    #[test]
    fn test_heading_and_info_directive() {
        let fragment = extract(
            "# My API\n\n# @OA\\Info(version=\"2.0\", description='Internal')\n\nSome text.\n",
        );
        assert_eq!(fragment.info["title"], RawValue::Str("My API".into()));
        assert_eq!(fragment.info["version"], RawValue::Str("2.0".into()));
        assert_eq!(fragment.info["description"], RawValue::Str("Internal".into()));
    }

    #[test]
    fn test_info_directive_overrides_heading() {
        let fragment = extract("# Heading\n#@Info(title: \"Directive\", owner=\"ops\")\n");
        assert_eq!(fragment.info["title"], RawValue::Str("Directive".into()));
        assert_eq!(fragment.info.get("owner"), None);
    }

    #[test]
    fn test_info_directive_is_not_a_heading() {
        let fragment = extract("# @OA\\Info(version=\"3.1\")\n\n# Real Title\n");
        assert_eq!(fragment.info["title"], RawValue::Str("Real Title".into()));
    }

    #[test]
    fn test_subheadings_and_fenced_comments_are_not_titles() {
        let fragment = extract("## Section\n\n```sh\n# not a title\n```\n");
        assert_eq!(fragment.info.get("title"), None);
    }

    #[test]
    fn test_code_block_operation() {
        let fragment = extract(
            r#"# Orders

```php
#[OA\Post(
    path: '/orders',
    summary: 'Create order',
    responses: [
        new OA\Response(response: 201, description: 'Created'),
    ]
)]
```
"#,
        );

        assert_eq!(keys(&fragment), vec![(HttpMethod::Post, "/orders".to_string())]);
        let op = &fragment.operations[0];
        assert_eq!(op.member, None);
        assert_eq!(op.fields["summary"], RawValue::Str("Create order".into()));
        assert!(matches!(op.fields["responses"], RawValue::List(ref items) if items.len() == 1));
    }

    #[test]
    fn test_only_first_directive_per_block() {
        let fragment = extract(
            "```\n#[OA\\Get(summary: 'no path')]\n#[OA\\Put(path: '/ignored')]\n```\n\n\
             ```php\n#[OA\\Delete(path: '/a')]\n#[OA\\Patch(path: '/b')]\n```\n",
        );
        assert_eq!(keys(&fragment), vec![(HttpMethod::Delete, "/a".to_string())]);
    }

    #[test]
    fn test_loose_lines() {
        let fragment = extract(
            "# Users\n\nget: /users/list\nPOST: https://api.example.com/users/create?debug=1\n\
             Note: see /docs for details\nput: no path here\n",
        );
        assert_eq!(
            keys(&fragment),
            vec![
                (HttpMethod::Get, "/users/list".to_string()),
                (HttpMethod::Post, "/users/create".to_string()),
            ]
        );
        assert!(fragment.operations[0].fields.is_empty());
    }

    #[test]
    fn test_loose_lines_inside_fences_are_ignored() {
        let fragment = extract("```yaml\nget: /inside\n```\n\ndelete: /outside\n");
        assert_eq!(keys(&fragment), vec![(HttpMethod::Delete, "/outside".to_string())]);
    }

    #[test]
    fn test_code_block_operations_come_before_loose_lines() {
        let fragment = extract("get: /same\n\n```php\n#[OA\\Get(path: '/same')]\n```\n");
        assert_eq!(fragment.operations.len(), 2);
        assert_eq!(fragment.operations[0].fields.len(), 1);
        assert!(fragment.operations[1].fields.is_empty());
    }

    #[test]
    fn test_empty_document_is_empty_fragment() {
        let outcome = MarkdownExtractor.extract("Just some notes.\n\nNothing to see.");
        assert!(!outcome.is_skipped());
        assert!(outcome.fragment().unwrap().is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let fragment = extract(
            "# Orders\r\n\r\n```php\r\n#[OA\\Put(path: '/orders/{id}')]\r\n```\r\n\r\n\
             ```yaml\r\nget: /inside\r\n# not a title\r\n```\r\n\r\ndelete: /outside\r\n",
        );
        assert_eq!(fragment.info["title"], RawValue::Str("Orders".into()));
        assert_eq!(
            keys(&fragment),
            vec![
                (HttpMethod::Put, "/orders/{id}".to_string()),
                (HttpMethod::Delete, "/outside".to_string()),
            ]
        );
    }

    #[test]
    fn test_locale() {
        assert_eq!(extract("get: /a").locale, Locale::English);
        assert_eq!(extract("# 用户接口\nget: /a").locale, Locale::Chinese);
    }
}

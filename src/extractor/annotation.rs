use crate::extractor::attribute::parse_group;
use crate::extractor::lexer::{tokenize, Token};
use crate::extractor::{
    ExtractOutcome, Fragment, HttpMethod, Locale, RawOperation, RawRecord, SkipReason,
    UnitExtractor,
};
use log::debug;

/// Info fields a class-level info declaration may set
const INFO_FIELDS: [&str; 3] = ["title", "version", "description"];

/// Extractor for attribute-annotated controller classes.
///
/// The unit is identified by its namespace and class name, read from the token stream; the
/// code itself is never loaded. Attribute groups are then attached to the declaration that
/// follows them:
///
/// - on the class, an `Info` declaration contributes `title`, `version` and `description`
/// - on a method, `Get`/`Post`/`Put`/`Delete`/`Patch` declarations with a `path` argument
///   each contribute one operation, summarised by the method name unless a `summary` is given
///
/// ```text
/// #[OA\Info(title: 'Shop API', version: '2.1')]
/// class ApiOrder {
///     #[OA\Get(path: '/orders', responses: [new OA\Response(response: 200, description: 'OK')])]
///     public function index() {}
/// }
/// ```
pub struct AnnotationExtractor;

impl AnnotationExtractor {
    /// Qualified name of the class declared by `source`, if any.
    pub fn qualified_type_name(source: &str) -> Option<String> {
        Self::type_name(&tokenize(source))
    }

    /// First `namespace` and `class` declarations, wherever they sit on their lines.
    /// `Foo::class` references and anonymous classes are not declarations.
    fn type_name(tokens: &[Token]) -> Option<String> {
        let declared = |keyword: &str| {
            tokens.windows(2).enumerate().find_map(|(i, pair)| match pair {
                [kw, Token::Ident(name)]
                    if kw.is_keyword(keyword)
                        && (i == 0 || tokens[i - 1] != Token::DoubleColon) =>
                {
                    Some(name.as_str())
                }
                _ => None,
            })
        };

        let class = declared("class")?;
        let namespace = declared("namespace").map(|ns| ns.trim_matches('\\'));

        Some(match namespace {
            Some(ns) if !ns.is_empty() => format!("{}\\{}", ns, class),
            _ => class.to_string(),
        })
    }

    fn apply_class_attributes(records: &[RawRecord], fragment: &mut Fragment) {
        for record in records {
            if record.kind().eq_ignore_ascii_case("Info") {
                for field in INFO_FIELDS {
                    if let Some(value) = record.args.get(field) {
                        fragment.info.insert(field.to_string(), value.clone());
                    }
                }
            } else if HttpMethod::from_keyword(record.kind()).is_some() {
                debug!("Ignoring class-level operation declaration {}", record.name);
            }
        }
    }

    fn apply_member_attributes(member: &str, records: &[RawRecord], fragment: &mut Fragment) {
        for record in records {
            let Some(method) = HttpMethod::from_keyword(record.kind()) else {
                continue;
            };

            match record.text_arg("path") {
                Some(path) => {
                    debug!("Found {} {} on {}", method, path, member);
                    fragment.operations.push(RawOperation {
                        method,
                        path: path.to_string(),
                        member: Some(member.to_string()),
                        fields: record.args.clone(),
                    });
                }
                None => debug!("Skipping {} declaration on {} without a path", method, member),
            }
        }
    }
}

impl UnitExtractor for AnnotationExtractor {
    fn extract(&self, text: &str) -> ExtractOutcome {
        let tokens = tokenize(text);
        let Some(unit) = Self::type_name(&tokens) else {
            return ExtractOutcome::Skipped {
                reason: SkipReason::NoTypeDeclaration,
            };
        };

        // Synthesized response descriptions stay English regardless of comment language
        let mut fragment = Fragment::new(Locale::English);
        fragment.unit = Some(unit);

        let mut pending: Vec<RawRecord> = Vec::new();
        let mut pos = 0;

        while pos < tokens.len() {
            let after_scope = pos > 0 && tokens[pos - 1] == Token::DoubleColon;
            match &tokens[pos] {
                Token::AttributeOpen => {
                    let (records, next) = parse_group(&tokens, pos);
                    pending.extend(records);
                    pos = next;
                    continue;
                }
                token if token.is_keyword("class") && !after_scope => {
                    if let Some(Token::Ident(_)) = tokens.get(pos + 1) {
                        Self::apply_class_attributes(&pending, &mut fragment);
                    }
                    pending.clear();
                }
                token if token.is_keyword("function") => {
                    if let Some(Token::Ident(name)) = tokens.get(pos + 1) {
                        Self::apply_member_attributes(name, &pending, &mut fragment);
                    }
                    pending.clear();
                }
                Token::Semicolon | Token::BraceOpen | Token::BraceClose => pending.clear(),
                _ => {}
            }
            pos += 1;
        }

        if fragment.is_empty() {
            ExtractOutcome::Skipped {
                reason: SkipReason::NoDeclarations,
            }
        } else {
            ExtractOutcome::Extracted(fragment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::RawValue;
    use pretty_assertions::assert_eq;

    fn extract(source: &str) -> Fragment {
        match AnnotationExtractor.extract(source) {
            ExtractOutcome::Extracted(fragment) => fragment,
            ExtractOutcome::Skipped { reason } => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_qualified_type_name() {
        let source = "<?php\nnamespace modules\\shop\\controller;\n\nclass ApiOrder extends Base {}";
        assert_eq!(
            AnnotationExtractor::qualified_type_name(source),
            Some("modules\\shop\\controller\\ApiOrder".to_string())
        );
        assert_eq!(
            AnnotationExtractor::qualified_type_name("<?php\nfinal class Bare {}"),
            Some("Bare".to_string())
        );
        assert_eq!(AnnotationExtractor::qualified_type_name("<?php\nfunction f() {}"), None);
        assert_eq!(
            AnnotationExtractor::qualified_type_name("<?php\n$x = Foo::class;\n$y = new class {};"),
            None
        );
    }

    #[test]
    fn test_unit_without_class_is_skipped() {
        let outcome = AnnotationExtractor.extract("<?php\n#[OA\\Get(path: '/a')]\nfunction a() {}");
        assert_eq!(
            outcome,
            ExtractOutcome::Skipped {
                reason: SkipReason::NoTypeDeclaration
            }
        );
    }

    #[test]
    fn test_method_operations() {
        let fragment = extract(
            r#"<?php
namespace app\api\controller;

use OpenApi\Attributes as OA;

class ApiUser
{
    #[OA\Get(path: '/users', summary: 'List users')]
    public function index() {}

    #[OA\Post(path: '/users', description: 'Create a user')]
    #[OA\Patch(path: '/users/{id}')]
    public static function store() {}

    public function helper() {}
}
"#,
        );

        assert_eq!(fragment.unit.as_deref(), Some("app\\api\\controller\\ApiUser"));
        let ops: Vec<(HttpMethod, &str, Option<&str>)> = fragment
            .operations
            .iter()
            .map(|op| (op.method, op.path.as_str(), op.member.as_deref()))
            .collect();
        assert_eq!(
            ops,
            vec![
                (HttpMethod::Get, "/users", Some("index")),
                (HttpMethod::Post, "/users", Some("store")),
                (HttpMethod::Patch, "/users/{id}", Some("store")),
            ]
        );
        assert_eq!(
            fragment.operations[0].fields["summary"],
            RawValue::Str("List users".into())
        );
    }

    #[test]
    fn test_class_info() {
        let fragment = extract(
            r#"<?php
namespace app\api\controller;

#[OA\Info(title: "Shop API", version: "2.1", contact: 'ops@example.com')]
class ApiShop
{
    #[OA\Get(path: '/ping')]
    public function ping() {}
}
"#,
        );

        assert_eq!(fragment.info.len(), 2);
        assert_eq!(fragment.info["title"], RawValue::Str("Shop API".into()));
        assert_eq!(fragment.info["version"], RawValue::Str("2.1".into()));
        assert_eq!(fragment.operations.len(), 1);
    }

    #[test]
    fn test_declarations_without_path_contribute_nothing() {
        let outcome = AnnotationExtractor.extract(
            r#"<?php
class ApiEmpty
{
    #[OA\Get(summary: 'no path')]
    public function a() {}

    #[OA\Delete(path: '')]
    public function b() {}
}
"#,
        );
        assert_eq!(
            outcome,
            ExtractOutcome::Skipped {
                reason: SkipReason::NoDeclarations
            }
        );
    }

    #[test]
    fn test_attributes_on_properties_do_not_leak_to_methods() {
        let fragment = extract(
            r#"<?php
class ApiLeak
{
    #[OA\Get(path: '/property')]
    private $cache;

    #[OA\Put(path: '/method')]
    public function update() {}
}
"#,
        );
        assert_eq!(fragment.operations.len(), 1);
        assert_eq!(fragment.operations[0].path, "/method");
    }

    #[test]
    fn test_class_constant_reference_is_not_a_declaration() {
        let fragment = extract(
            r#"<?php
class ApiRefs
{
    #[OA\Get(path: '/refs')]
    public function refs() { return Foo::class; }
}
"#,
        );
        assert_eq!(fragment.operations.len(), 1);
        assert!(fragment.info.is_empty());
    }

    #[test]
    fn test_commented_out_declarations_are_ignored() {
        let outcome = AnnotationExtractor.extract(
            r#"<?php
class ApiCommented
{
    // #[OA\Get(path: '/old')]
    /* #[OA\Post(path: '/older')] */
    public function old() {}
}
"#,
        );
        assert!(outcome.is_skipped());
    }

    #[test]
    fn test_chinese_comments_keep_english_defaults() {
        let fragment = extract(
            "<?php\n/** 用户接口 */\nclass ApiZh {\n    // 用户列表\n    #[OA\\Get(path: '/zh')]\n    public function list() {}\n}",
        );
        assert_eq!(fragment.locale, Locale::English);
    }

    #[test]
    fn test_class_declared_on_attribute_line() {
        let fragment = extract(
            "<?php\nnamespace app\\shop\\controller;\n\n#[OA\\Info(title: 'Inline')] class ApiOrder {\n    #[OA\\Get(path: '/orders')]\n    public function index() {}\n}\n",
        );
        assert_eq!(fragment.unit.as_deref(), Some("app\\shop\\controller\\ApiOrder"));
        assert_eq!(fragment.info["title"], RawValue::Str("Inline".into()));
        assert_eq!(fragment.operations.len(), 1);
    }

    #[test]
    fn test_single_line_unit() {
        let fragment = extract(
            r#"<?php namespace app\c; class ApiOrder { #[OA\Post(path: "/orders")] public function create() {} }"#,
        );
        assert_eq!(fragment.unit.as_deref(), Some("app\\c\\ApiOrder"));
        assert_eq!(fragment.operations.len(), 1);
        assert_eq!(fragment.operations[0].method, HttpMethod::Post);
        assert_eq!(fragment.operations[0].member.as_deref(), Some("create"));
    }
}

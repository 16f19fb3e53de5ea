//! Token definitions for annotated source text.
//!
//! The lexer only knows enough of the host language to find attribute groups and the
//! declarations they attach to. Whitespace and comments are skipped, string literals are
//! unquoted, and any character it does not recognise is dropped.

use logos::Logos;

/// Tokens of annotated source text
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"([ \t\r\n\f]+|//[^\n]*|#([^\[\n][^\n]*)?|/\*([^*]|\*+[^*/])*\*+/)")]
pub enum Token {
    /// Opens an attribute group
    #[token("#[")]
    AttributeOpen,

    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token("=")]
    Equals,
    #[token("=>")]
    FatArrow,

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unquote(lex.slice()))]
    Str(String),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    /// Identifier or keyword, possibly namespace-qualified (`OA\Get`, `\Foo\Bar`)
    #[regex(r"\\?[A-Za-z_][A-Za-z0-9_]*(\\[A-Za-z_][A-Za-z0-9_]*)*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    Variable,
}

impl Token {
    /// True if this token is the identifier `word`, ignoring ASCII case.
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, Token::Ident(ident) if ident.eq_ignore_ascii_case(word))
    }
}

/// Strips the surrounding quotes and resolves backslash escapes.
fn unquote(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other @ ('\\' | '\'' | '"' | '$')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Tokenizes `source`, dropping anything the lexer does not recognise.
pub fn tokenize(source: &str) -> Vec<Token> {
    Token::lexer(source).filter_map(Result::ok).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn test_attribute_tokens() {
        let tokens = tokenize("#[OA\\Get(path: '/users')]");
        assert_eq!(
            tokens,
            vec![
                Token::AttributeOpen,
                ident("OA\\Get"),
                Token::ParenOpen,
                ident("path"),
                Token::Colon,
                Token::Str("/users".to_string()),
                Token::ParenClose,
                Token::BracketClose,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = tokenize(
            "// it's a comment\n# another one's here\n/* block's\n comment */ class Foo",
        );
        assert_eq!(tokens, vec![ident("class"), ident("Foo")]);
    }

    #[test]
    fn test_hash_comment_does_not_swallow_attribute() {
        let tokens = tokenize("#\n#[Info]");
        assert_eq!(
            tokens,
            vec![Token::AttributeOpen, ident("Info"), Token::BracketClose]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#"'it\'s' "say \"hi\"" "a\nb""#);
        assert_eq!(
            tokens,
            vec![
                Token::Str("it's".to_string()),
                Token::Str("say \"hi\"".to_string()),
                Token::Str("a\nb".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers_operators_and_variables() {
        let tokens = tokenize("response: 200, x => -1.5, Foo::BAR, $id = 3;");
        assert_eq!(
            tokens,
            vec![
                ident("response"),
                Token::Colon,
                Token::Number("200".to_string()),
                Token::Comma,
                ident("x"),
                Token::FatArrow,
                Token::Number("-1.5".to_string()),
                Token::Comma,
                ident("Foo"),
                Token::DoubleColon,
                ident("BAR"),
                Token::Comma,
                Token::Variable,
                Token::Equals,
                Token::Number("3".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_unknown_characters_are_dropped() {
        let tokens = tokenize("a . b -> c");
        assert_eq!(tokens, vec![ident("a"), ident("b"), ident("c")]);
    }

    #[test]
    fn test_keyword_match_ignores_case() {
        assert!(ident("CLASS").is_keyword("class"));
        assert!(!ident("classes").is_keyword("class"));
        assert!(!Token::Comma.is_keyword("class"));
    }
}

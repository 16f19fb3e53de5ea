//! Parsing of attribute groups into [`RawRecord`]s.
//!
//! An attribute group is `#[` followed by comma separated declarations and a closing `]`:
//!
//! ```text
//! #[OA\Get(path: '/users', responses: [new OA\Response(response: 200, description: 'OK')])]
//! ```
//!
//! Named arguments may use `name: value` or `name = value`. Positional arguments are parsed
//! and dropped, as are the keys of `key => value` array entries. A value that cannot be
//! parsed is skipped up to the next comma at its nesting level, so one malformed argument
//! never hides its siblings.

use super::lexer::{tokenize, Token};
use super::{RawFields, RawRecord, RawValue};

/// Parses every attribute group in `source`, returning the declarations in order.
pub fn scan_attributes(source: &str) -> Vec<RawRecord> {
    let tokens = tokenize(source);
    let mut records = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        if tokens[pos] == Token::AttributeOpen {
            let (group, next) = parse_group(&tokens, pos);
            records.extend(group);
            pos = next;
        } else {
            pos += 1;
        }
    }
    records
}

/// Parses the attribute group opening at `start` (which must be [`Token::AttributeOpen`]).
///
/// Returns the declarations and the index just past the closing bracket. An unterminated
/// group consumes the rest of the input.
pub fn parse_group(tokens: &[Token], start: usize) -> (Vec<RawRecord>, usize) {
    let end = matching_close(tokens, start);
    let inner = &tokens[start + 1..end];
    let next = (end + 1).min(tokens.len());

    let mut parser = ArgParser::new(inner);
    (parser.declarations(), next)
}

/// Index of the bracket closing the group at `start`, or `tokens.len()` if there is none.
fn matching_close(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        match token {
            Token::AttributeOpen | Token::BracketOpen => depth += 1,
            Token::BracketClose => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}

struct ArgParser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> ArgParser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Comma separated declarations filling the whole token slice.
    fn declarations(&mut self) -> Vec<RawRecord> {
        let mut records = Vec::new();
        while self.peek().is_some() {
            let before = self.pos;
            match self.value() {
                Some(RawValue::Record(record)) => records.push(record),
                Some(RawValue::Const(name)) if !name.contains("::") => {
                    records.push(RawRecord::new(name))
                }
                _ => self.skip_to_separator(),
            }
            self.eat(&Token::Comma);
            self.ensure_progress(before);
        }
        records
    }

    /// Arguments after an opening parenthesis, up to and including the closing one.
    fn arguments(&mut self) -> RawFields {
        let mut fields = RawFields::new();
        loop {
            match self.peek() {
                None => break,
                Some(Token::ParenClose) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Comma) => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let before = self.pos;
            let named = match (self.peek(), self.peek_at(1)) {
                (Some(Token::Ident(name)), Some(Token::Colon | Token::Equals)) => {
                    self.pos += 2;
                    Some(name.clone())
                }
                _ => None,
            };

            match self.value() {
                Some(value) => {
                    if let Some(name) = named {
                        fields.insert(name, value);
                    }
                }
                None => self.skip_to_separator(),
            }
            self.ensure_progress(before);
        }
        fields
    }

    /// Array elements after an opening bracket, up to and including the closing one.
    fn list(&mut self) -> Vec<RawValue> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(Token::BracketClose) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Comma) => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let before = self.pos;
            match self.value() {
                Some(value) => {
                    if self.eat(&Token::FatArrow) {
                        match self.value() {
                            Some(value) => items.push(value),
                            None => self.skip_to_separator(),
                        }
                    } else {
                        items.push(value);
                    }
                }
                None => self.skip_to_separator(),
            }
            self.ensure_progress(before);
        }
        items
    }

    fn value(&mut self) -> Option<RawValue> {
        match self.peek()? {
            Token::Str(s) => {
                self.pos += 1;
                Some(RawValue::Str(s.clone()))
            }
            Token::Number(n) => {
                self.pos += 1;
                Some(RawValue::Number(n.clone()))
            }
            Token::Variable => {
                self.pos += 1;
                Some(RawValue::Null)
            }
            Token::BracketOpen => {
                self.pos += 1;
                Some(RawValue::List(self.list()))
            }
            Token::Ident(word) => {
                self.pos += 1;
                if word.eq_ignore_ascii_case("new") {
                    return match self.bump() {
                        Some(Token::Ident(name)) => Some(RawValue::Record(self.record(name))),
                        _ => None,
                    };
                }
                if word.eq_ignore_ascii_case("true") {
                    return Some(RawValue::Bool(true));
                }
                if word.eq_ignore_ascii_case("false") {
                    return Some(RawValue::Bool(false));
                }
                if word.eq_ignore_ascii_case("null") {
                    return Some(RawValue::Null);
                }
                match self.peek() {
                    Some(Token::ParenOpen) => Some(RawValue::Record(self.record(word))),
                    Some(Token::DoubleColon) => {
                        self.pos += 1;
                        match self.bump() {
                            Some(Token::Ident(member)) => {
                                Some(RawValue::Const(format!("{}::{}", word, member)))
                            }
                            _ => None,
                        }
                    }
                    _ => Some(RawValue::Const(word.clone())),
                }
            }
            _ => None,
        }
    }

    /// A declaration whose name has been consumed; arguments are optional.
    fn record(&mut self, name: &str) -> RawRecord {
        let mut record = RawRecord::new(name);
        if self.eat(&Token::ParenOpen) {
            record.args = self.arguments();
        }
        record
    }

    /// Steps over a stray token that neither parsing nor skipping consumed.
    fn ensure_progress(&mut self, before: usize) {
        if self.pos == before {
            self.pos += 1;
        }
    }

    /// Skips tokens up to the next comma or closing token at the current nesting level.
    /// Always consumes at least one token unless already at a separator.
    fn skip_to_separator(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::ParenOpen | Token::BracketOpen | Token::AttributeOpen => depth += 1,
                Token::ParenClose | Token::BracketClose => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                Token::Comma if depth == 0 => return,
                _ => {}
            }
            self.pos += 1;
        }
    }
}

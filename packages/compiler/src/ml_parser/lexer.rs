//! HTML Lexer
//!
//! Splits markup into start tags (with attributes), end tags, text and comments.
//! Every token records exact byte offsets; attribute name and value spans are kept
//! separately so bindings can be mapped back precisely.

use super::ast::Attribute;
use super::entities::decode_entities;
use super::tags::{get_html_tag_definition, TagContentType};
use crate::chars;
use crate::parse_util::{OffsetMap, ParseError, SourceSpan};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    StartTag {
        name: String,
        name_span: SourceSpan,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Text {
        value: String,
        value_map: OffsetMap,
    },
    Comment {
        value: String,
    },
    Doctype,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

pub fn tokenize(input: &str) -> LexResult {
    let mut lexer = HtmlLexer {
        input,
        pos: 0,
        tokens: Vec::new(),
        errors: Vec::new(),
    };
    lexer.run();
    LexResult {
        tokens: lexer.tokens,
        errors: lexer.errors,
    }
}

struct HtmlLexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl<'a> HtmlLexer<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> char {
        self.rest().chars().next().unwrap_or(chars::EOF)
    }

    fn peek_at(&self, skip: usize) -> char {
        self.rest().chars().nth(skip).unwrap_or(chars::EOF)
    }

    fn bump(&mut self) {
        if let Some(ch) = self.rest().chars().next() {
            self.pos += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while chars::is_whitespace(self.peek()) {
            self.bump();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: SourceSpan::new(start, self.pos),
        });
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            let start = self.pos;
            if self.rest().starts_with("<!--") {
                self.consume_comment(start);
            } else if self.rest().starts_with("<!") || self.rest().starts_with("<?") {
                self.pos = match self.rest().find('>') {
                    Some(i) => self.pos + i + 1,
                    None => self.input.len(),
                };
                self.push(TokenKind::Doctype, start);
            } else if self.peek() == chars::LT && self.peek_at(1) == chars::SLASH && chars::is_ascii_letter(self.peek_at(2)) {
                self.consume_end_tag(start);
            } else if self.peek() == chars::LT && chars::is_ascii_letter(self.peek_at(1)) {
                self.consume_start_tag(start);
            } else {
                self.consume_text(start);
            }
        }
    }

    fn consume_comment(&mut self, start: usize) {
        let body_start = self.pos + 4;
        let (value_end, end) = match self.input[body_start..].find("-->") {
            Some(i) => (body_start + i, body_start + i + 3),
            None => {
                self.errors.push(ParseError::new(
                    SourceSpan::new(start, self.input.len()),
                    "Unterminated comment",
                ));
                (self.input.len(), self.input.len())
            }
        };
        self.pos = end;
        let value = self.input[body_start..value_end].to_string();
        self.push(TokenKind::Comment { value }, start);
    }

    fn consume_text(&mut self, start: usize) {
        self.bump();
        loop {
            let ch = self.peek();
            if ch == chars::EOF {
                break;
            }
            if ch == chars::LT {
                let next = self.peek_at(1);
                if chars::is_ascii_letter(next) || next == chars::SLASH || next == chars::BANG {
                    break;
                }
            }
            self.bump();
        }
        let (value, value_map) = decode_entities(&self.input[start..self.pos], start);
        self.push(TokenKind::Text { value, value_map }, start);
    }

    fn consume_name(&mut self) -> (String, SourceSpan) {
        let start = self.pos;
        while !chars::is_name_end(self.peek()) {
            self.bump();
        }
        (self.input[start..self.pos].to_string(), SourceSpan::new(start, self.pos))
    }

    fn consume_end_tag(&mut self, start: usize) {
        self.pos += 2;
        let (name, _) = self.consume_name();
        match self.rest().find('>') {
            Some(i) => self.pos += i + 1,
            None => {
                self.errors.push(ParseError::new(
                    SourceSpan::new(start, self.input.len()),
                    format!("Unterminated end tag </{name}"),
                ));
                self.pos = self.input.len();
            }
        }
        self.push(
            TokenKind::EndTag {
                name: name.to_ascii_lowercase(),
            },
            start,
        );
    }

    fn consume_start_tag(&mut self, start: usize) {
        self.pos += 1;
        let (raw_name, name_span) = self.consume_name();
        let name = raw_name.to_ascii_lowercase();
        let mut attrs = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            if self.rest().starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            match self.peek() {
                chars::GT => {
                    self.bump();
                    break;
                }
                chars::EOF => {
                    self.errors.push(ParseError::new(
                        SourceSpan::new(start, self.pos),
                        format!("Unterminated start tag <{name}"),
                    ));
                    break;
                }
                chars::SLASH | chars::SQ | chars::DQ | chars::EQ | chars::LT => {
                    // Stray character between attributes.
                    self.bump();
                }
                _ => attrs.push(self.consume_attribute()),
            }
        }
        self.push(
            TokenKind::StartTag {
                name: name.clone(),
                name_span,
                attrs,
                self_closing,
            },
            start,
        );
        if !self_closing {
            match get_html_tag_definition(&name).content_type {
                TagContentType::ParsableData => {}
                TagContentType::RawText => self.consume_raw_text(&name, false),
                TagContentType::EscapableRawText => self.consume_raw_text(&name, true),
            }
        }
    }

    fn consume_attribute(&mut self) -> Attribute {
        let start = self.pos;
        while !self.at_attribute_name_end() {
            self.bump();
        }
        let name_span = SourceSpan::new(start, self.pos);
        let name = self.input[start..self.pos].to_string();
        let before_eq = self.pos;
        self.skip_whitespace();
        if self.peek() != chars::EQ {
            self.pos = before_eq;
            return Attribute {
                name,
                value: String::new(),
                span: name_span,
                name_span,
                value_span: None,
                value_map: OffsetMap::verbatim(name_span.end),
            };
        }
        self.bump();
        self.skip_whitespace();
        let quote = self.peek();
        let value_span = if quote == chars::SQ || quote == chars::DQ {
            self.bump();
            let value_start = self.pos;
            match self.rest().find(quote) {
                Some(i) => {
                    self.pos += i;
                    let span = SourceSpan::new(value_start, self.pos);
                    self.bump();
                    span
                }
                None => {
                    self.errors.push(ParseError::new(
                        SourceSpan::new(start, self.input.len()),
                        format!("Unterminated attribute value for {name}"),
                    ));
                    self.pos = self.input.len();
                    SourceSpan::new(value_start, self.pos)
                }
            }
        } else {
            let value_start = self.pos;
            while !chars::is_whitespace(self.peek()) && self.peek() != chars::GT && self.peek() != chars::EOF {
                self.bump();
            }
            SourceSpan::new(value_start, self.pos)
        };
        let (value, value_map) = decode_entities(value_span.slice(self.input), value_span.start);
        Attribute {
            name,
            value,
            span: SourceSpan::new(start, self.pos),
            name_span,
            value_span: Some(value_span),
            value_map,
        }
    }

    fn at_attribute_name_end(&self) -> bool {
        let ch = self.peek();
        chars::is_whitespace(ch)
            || ch == chars::EQ
            || ch == chars::GT
            || ch == chars::EOF
            || self.rest().starts_with("/>")
    }

    fn consume_raw_text(&mut self, name: &str, escapable: bool) {
        let start = self.pos;
        let closing = format!("</{name}");
        let lowered = self.rest().to_ascii_lowercase();
        let end = match lowered.find(&closing) {
            Some(i) => self.pos + i,
            None => self.input.len(),
        };
        if end > start {
            self.pos = end;
            let raw = &self.input[start..end];
            let (value, value_map) = if escapable {
                decode_entities(raw, start)
            } else {
                (raw.to_string(), OffsetMap::verbatim(start))
            };
            self.push(TokenKind::Text { value, value_map }, start);
        }
    }
}

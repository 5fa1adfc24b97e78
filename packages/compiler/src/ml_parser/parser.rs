//! HTML Parser
//!
//! Builds the node tree from lexer tokens, applying implied end tags and void
//! element rules. Recovery is always local: stray end tags are dropped and
//! unclosed elements are closed at the end of their parent.

use super::ast::{Comment, Element, Node, Text};
use super::lexer::{tokenize, TokenKind};
use super::tags::get_html_tag_definition;
use crate::parse_util::{ParseError, SourceSpan};

#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        HtmlParser
    }

    pub fn parse(&self, source: &str) -> ParseTreeResult {
        let lexed = tokenize(source);
        let mut builder = TreeBuilder {
            root_nodes: Vec::new(),
            stack: Vec::new(),
            errors: lexed.errors,
        };
        for token in lexed.tokens {
            match token.kind {
                TokenKind::StartTag {
                    name,
                    name_span,
                    attrs,
                    self_closing,
                } => {
                    builder.close_implied(&name, token.span.start);
                    let element = Element {
                        name,
                        attrs,
                        children: Vec::new(),
                        self_closing,
                        span: token.span,
                        start_span: token.span,
                        end_span: None,
                        name_span,
                    };
                    if self_closing || get_html_tag_definition(&element.name).is_void {
                        builder.add_child(Node::Element(element));
                    } else {
                        builder.stack.push(element);
                    }
                }
                TokenKind::EndTag { name } => builder.close_element(&name, token.span),
                TokenKind::Text { value, value_map } => builder.add_child(Node::Text(Text {
                    value,
                    span: token.span,
                    value_map,
                })),
                TokenKind::Comment { value } => builder.add_child(Node::Comment(Comment {
                    value,
                    span: token.span,
                })),
                TokenKind::Doctype => {}
            }
        }
        builder.finish(source.len())
    }
}

struct TreeBuilder {
    root_nodes: Vec<Node>,
    stack: Vec<Element>,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    fn add_child(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root_nodes.push(node),
        }
    }

    fn close_implied(&mut self, child: &str, at: usize) {
        while let Some(top) = self.stack.last() {
            if !get_html_tag_definition(&top.name).is_closed_by_child(child) {
                break;
            }
            self.pop_open(at, None);
        }
    }

    fn pop_open(&mut self, end: usize, end_span: Option<SourceSpan>) {
        if let Some(mut element) = self.stack.pop() {
            let content_end = end_span.map(|s| s.end).unwrap_or(end);
            element.span = SourceSpan::new(element.start_span.start, content_end.max(element.start_span.end));
            element.end_span = end_span;
            self.add_child(Node::Element(element));
        }
    }

    fn close_element(&mut self, name: &str, span: SourceSpan) {
        if get_html_tag_definition(name).is_void {
            return;
        }
        let position = self.stack.iter().rposition(|e| e.name == name);
        match position {
            Some(index) => {
                while self.stack.len() > index + 1 {
                    if let Some(unclosed) = self.stack.last() {
                        if get_html_tag_definition(&unclosed.name).closed_by_children.is_empty() {
                            self.errors.push(ParseError::new(
                                unclosed.start_span,
                                format!("Unclosed element <{}>", unclosed.name),
                            ));
                        }
                    }
                    self.pop_open(span.start, None);
                }
                self.pop_open(span.start, Some(span));
            }
            None => self.errors.push(ParseError::new(
                span,
                format!("Unexpected closing tag </{name}>"),
            )),
        }
    }

    fn finish(mut self, len: usize) -> ParseTreeResult {
        while let Some(unclosed) = self.stack.last() {
            if get_html_tag_definition(&unclosed.name).closed_by_children.is_empty() {
                self.errors.push(ParseError::new(
                    unclosed.start_span,
                    format!("Unclosed element <{}>", unclosed.name),
                ));
            }
            self.pop_open(len, None);
        }
        ParseTreeResult {
            root_nodes: self.root_nodes,
            errors: self.errors,
        }
    }
}

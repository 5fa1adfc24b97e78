//! ML Parser AST
//!
//! HTML node definitions. Text and attribute values hold decoded character
//! references; their `value_map` translates offsets inside them back to the
//! authored source.

use serde::Serialize;

use crate::parse_util::{OffsetMap, SourceSpan};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

impl Node {
    pub fn span(&self) -> SourceSpan {
        match self {
            Node::Element(e) => e.span,
            Node::Text(t) => t.span,
            Node::Comment(c) => c.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub span: SourceSpan,
    pub name_span: SourceSpan,
    /// Span of the value between the quotes; `None` for valueless attributes.
    pub value_span: Option<SourceSpan>,
    #[serde(skip)]
    pub value_map: OffsetMap,
}

impl Attribute {
    /// Offset where the value text starts, falling back to the end of the name.
    pub fn value_offset(&self) -> usize {
        self.value_span.map(|s| s.start).unwrap_or(self.name_span.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub self_closing: bool,
    pub span: SourceSpan,
    pub start_span: SourceSpan,
    pub end_span: Option<SourceSpan>,
    pub name_span: SourceSpan,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Span of the tag name inside the closing tag (`</name>`), if any.
    pub fn end_name_span(&self) -> Option<SourceSpan> {
        self.end_span.map(|s| SourceSpan::new(s.start + 2, s.start + 2 + self.name.len()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub value: String,
    pub span: SourceSpan,
    #[serde(skip)]
    pub value_map: OffsetMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub value: String,
    pub span: SourceSpan,
}

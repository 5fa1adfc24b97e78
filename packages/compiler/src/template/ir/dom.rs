//! IR DOM
//!
//! The static DOM of a template after lowering. Binding attributes and
//! meta-elements are removed; what remains is what the runtime clones.

use serde::{Deserialize, Serialize};

use super::handle::NodeId;
use crate::ml_parser::tags::is_void_element;
use crate::parse_util::SourceSpan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DomNode {
    Element(ElementNode),
    Text(TextNode),
    Comment(CommentNode),
    Template(TemplateNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomAttr {
    pub name: String,
    pub value: Option<String>,
    pub span: SourceSpan,
    pub name_span: SourceSpan,
    pub value_span: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub id: NodeId,
    pub tag: String,
    pub attrs: Vec<DomAttr>,
    pub children: Vec<DomNode>,
    pub span: SourceSpan,
    pub name_span: SourceSpan,
    pub end_name_span: Option<SourceSpan>,
    pub self_closing: bool,
}

impl ElementNode {
    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag)
    }

    pub fn attr(&self, name: &str) -> Option<&DomAttr> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub id: NodeId,
    pub text: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: NodeId,
    pub text: String,
    pub span: SourceSpan,
}

/// A document fragment: the module root, a controller's view, or an authored `<template>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    pub id: NodeId,
    pub attrs: Vec<DomAttr>,
    pub children: Vec<DomNode>,
    pub span: Option<SourceSpan>,
}

impl DomNode {
    pub fn id(&self) -> NodeId {
        match self {
            DomNode::Element(e) => e.id,
            DomNode::Text(t) => t.id,
            DomNode::Comment(c) => c.id,
            DomNode::Template(t) => t.id,
        }
    }

    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            DomNode::Element(e) => Some(e.span),
            DomNode::Text(t) => Some(t.span),
            DomNode::Comment(c) => Some(c.span),
            DomNode::Template(t) => t.span,
        }
    }

    pub fn children(&self) -> &[DomNode] {
        match self {
            DomNode::Element(e) => &e.children,
            DomNode::Template(t) => &t.children,
            DomNode::Text(_) | DomNode::Comment(_) => &[],
        }
    }
}

impl TemplateNode {
    pub fn new(id: NodeId) -> Self {
        TemplateNode {
            id,
            attrs: Vec::new(),
            children: Vec::new(),
            span: None,
        }
    }

    /// Pre-order visit of every node below this fragment (the fragment itself excluded).
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a DomNode)) {
        fn go<'a>(nodes: &'a [DomNode], f: &mut dyn FnMut(&'a DomNode)) {
            for node in nodes {
                f(node);
                go(node.children(), f);
            }
        }
        go(&self.children, f);
    }

    pub fn find(&self, id: NodeId) -> Option<&DomNode> {
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() && node.id() == id {
                found = Some(node);
            }
        });
        found
    }

    /// Deepest node whose span covers `offset`.
    pub fn node_at(&self, offset: usize) -> Option<&DomNode> {
        let mut best: Option<&DomNode> = None;
        self.walk(&mut |node| {
            if let Some(span) = node.span() {
                if span.touches(offset) && best.and_then(|b| b.span()).map_or(true, |b| b.covers(&span)) {
                    best = Some(node);
                }
            }
        });
        best
    }
}

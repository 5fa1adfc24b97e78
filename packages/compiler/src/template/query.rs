//! Query-at-position over a compiled template.
//!
//! Answers "what is under the cursor" for editor features: the innermost
//! expression, DOM node, scope frame and member segment at an HTML offset, plus
//! offset translation between the template and its overlay.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::parse_util::SourceSpan;
use crate::template::ir::{DomNode, ExprId, ExprTable, FrameId, NodeId};
use crate::template::linking::LinkedModule;
use crate::template::overlay::{OverlayMapping, OverlaySegment};
use crate::template::scope::ScopeModule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExprHit {
    pub expr_id: ExprId,
    pub span: SourceSpan,
    pub frame: FrameId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHit {
    pub node_id: NodeId,
    pub span: SourceSpan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<ExprHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeHit>,
    pub frame: FrameId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<OverlaySegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_offset: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuery {
    exprs: Vec<(ExprId, SourceSpan)>,
    nodes: Vec<NodeHit>,
    expr_frames: IndexMap<ExprId, FrameId>,
    node_frames: IndexMap<NodeId, FrameId>,
    mapping: OverlayMapping,
}

impl TemplateQuery {
    pub fn build(linked: &LinkedModule, scope: &ScopeModule, exprs: &ExprTable, mapping: &OverlayMapping) -> Self {
        let mut nodes = Vec::new();
        for template in linked.templates() {
            template.dom.walk(&mut |node| {
                let Some(span) = node.span() else {
                    return;
                };
                nodes.push(NodeHit {
                    node_id: node.id(),
                    span,
                    tag: match node {
                        DomNode::Element(e) => Some(e.tag.clone()),
                        _ => None,
                    },
                });
            });
        }
        TemplateQuery {
            exprs: exprs.spans(),
            nodes,
            expr_frames: scope.expr_to_frame.clone(),
            node_frames: scope.node_to_frame.clone(),
            mapping: mapping.clone(),
        }
    }

    pub fn expr_at(&self, offset: usize) -> Option<ExprHit> {
        self.exprs
            .iter()
            .filter(|(_, span)| span.touches(offset))
            .min_by_key(|(_, span)| span.len())
            .map(|&(expr_id, span)| ExprHit {
                expr_id,
                span,
                frame: self.expr_frames.get(&expr_id).copied().unwrap_or(FrameId::ROOT),
            })
    }

    /// Innermost node; placeholder hosts (empty spans) never win over real elements.
    pub fn node_at(&self, offset: usize) -> Option<NodeHit> {
        self.nodes
            .iter()
            .filter(|n| !n.span.is_empty() && n.span.touches(offset))
            .min_by_key(|n| n.span.len())
            .cloned()
    }

    pub fn frame_at(&self, offset: usize) -> FrameId {
        if let Some(hit) = self.expr_at(offset) {
            return hit.frame;
        }
        self.node_at(offset)
            .and_then(|n| self.node_frames.get(&n.node_id).copied())
            .unwrap_or(FrameId::ROOT)
    }

    pub fn member_at(&self, offset: usize) -> Option<OverlaySegment> {
        self.mapping.segment_at_html(offset).cloned()
    }

    pub fn html_to_overlay(&self, offset: usize) -> Option<usize> {
        self.mapping.html_to_overlay(offset)
    }

    pub fn overlay_to_html(&self, offset: usize) -> Option<usize> {
        self.mapping.overlay_to_html(offset)
    }

    pub fn at(&self, offset: usize) -> QueryResult {
        QueryResult {
            offset,
            expr: self.expr_at(offset),
            node: self.node_at(offset),
            frame: self.frame_at(offset),
            member: self.member_at(offset),
            overlay_offset: self.html_to_overlay(offset),
        }
    }
}

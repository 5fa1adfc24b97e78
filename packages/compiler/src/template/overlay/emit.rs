//! Overlay text emission with span mappings back to the template.

use serde::{Deserialize, Serialize};

use crate::parse_util::SourceSpan;
use crate::template::ir::{ExprId, ExprTable, FrameId};

use super::mapped_emitter::{emit_expr, EmitContext};
use super::plan::OverlayPlanModule;
use super::OverlayOptions;

/// Lambda parameter carrying the frame scope.
const SCOPE_PARAM: &str = "o";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySegment {
    pub path: String,
    pub html_span: SourceSpan,
    pub overlay_span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayMappingEntry {
    pub expr_id: ExprId,
    pub frame: FrameId,
    pub html_span: SourceSpan,
    pub overlay_span: SourceSpan,
    /// `(html, overlay)` pairs for every sub-expression, innermost first.
    pub nodes: Vec<(SourceSpan, SourceSpan)>,
    pub segments: Vec<OverlaySegment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayMapping {
    pub entries: Vec<OverlayMappingEntry>,
}

impl OverlayMapping {
    pub fn entry_for_expr(&self, id: ExprId) -> Option<&OverlayMappingEntry> {
        self.entries.iter().find(|e| e.expr_id == id)
    }

    /// Innermost entry whose HTML span holds `offset`.
    pub fn entry_at_html(&self, offset: usize) -> Option<&OverlayMappingEntry> {
        self.entries
            .iter()
            .filter(|e| e.html_span.touches(offset))
            .min_by_key(|e| e.html_span.len())
    }

    pub fn entry_at_overlay(&self, offset: usize) -> Option<&OverlayMappingEntry> {
        self.entries
            .iter()
            .find(|e| e.overlay_span.touches(offset))
    }

    pub fn segment_at_html(&self, offset: usize) -> Option<&OverlaySegment> {
        self.entry_at_html(offset)?
            .segments
            .iter()
            .filter(|s| s.html_span.touches(offset))
            .min_by_key(|s| s.html_span.len())
    }

    pub fn html_to_overlay(&self, offset: usize) -> Option<usize> {
        let entry = self.entry_at_html(offset)?;
        if let Some(seg) = entry
            .segments
            .iter()
            .filter(|s| s.html_span.touches(offset))
            .min_by_key(|s| s.html_span.len())
        {
            return Some(seg.overlay_span.start + (offset - seg.html_span.start).min(seg.overlay_span.len()));
        }
        entry
            .nodes
            .iter()
            .filter(|(html, _)| html.touches(offset))
            .min_by_key(|(html, _)| html.len())
            .map(|(_, overlay)| overlay.start)
            .or(Some(entry.overlay_span.start))
    }

    pub fn overlay_to_html(&self, offset: usize) -> Option<usize> {
        let entry = self.entry_at_overlay(offset)?;
        if let Some(seg) = entry
            .segments
            .iter()
            .filter(|s| s.overlay_span.touches(offset))
            .min_by_key(|s| s.overlay_span.len())
        {
            return Some(seg.html_span.start + (offset - seg.overlay_span.start).min(seg.html_span.len()));
        }
        entry
            .nodes
            .iter()
            .filter(|(_, overlay)| overlay.touches(offset))
            .min_by_key(|(_, overlay)| overlay.len())
            .map(|(html, _)| html.start)
            .or(Some(entry.html_span.start))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayEmitResult {
    pub filename: String,
    pub text: String,
    pub mapping: OverlayMapping,
}

fn prelude(prefix: &str, is_js: bool) -> String {
    if is_js {
        format!(
            "/** @template T @typedef {{T extends ReadonlyArray<infer E> ? E : T extends ReadonlyMap<infer K, infer V> ? [K, V] : T extends ReadonlySet<infer E> ? E : T extends number ? number : T extends Iterable<infer E> ? E : unknown}} CollectionElement */\n\
/** @template T @template {{number}} I @typedef {{T extends readonly unknown[] ? T[I] : unknown}} TupleElement */\n\
/** @type {{<T>(fn: (o: T) => unknown) => void}} */\n\
const {prefix}access = () => {{}};\n"
        )
    } else {
        format!(
            "type CollectionElement<T> = T extends ReadonlyArray<infer E> ? E : T extends ReadonlyMap<infer K, infer V> ? [K, V] : T extends ReadonlySet<infer E> ? E : T extends number ? number : T extends Iterable<infer E> ? E : unknown;\n\
type TupleElement<T, I extends number> = T extends readonly unknown[] ? T[I] : unknown;\n\
declare function {prefix}access<T>(fn: (o: T) => unknown): void;\n"
        )
    }
}

pub fn overlay_filename(base: &str, is_js: bool) -> String {
    format!("{base}.__au.ttc.overlay.{}", if is_js { "js" } else { "ts" })
}

pub fn emit_overlay(plan: &OverlayPlanModule, exprs: &ExprTable, options: &OverlayOptions) -> OverlayEmitResult {
    let prefix = &plan.prefix;
    let mut text = prelude(prefix, options.is_js);
    let mut mapping = OverlayMapping::default();

    for frame in &plan.frames {
        if options.is_js {
            text.push_str(&format!("/** @typedef {{{}}} {} */\n", frame.type_expr, frame.type_name));
        } else {
            text.push_str(&format!("type {} = {};\n", frame.type_name, frame.type_expr));
        }
    }

    for frame in &plan.frames {
        for lambda in &frame.lambdas {
            let Some(entry) = exprs.get(lambda.expr_id) else {
                continue;
            };
            let mut ctx = EmitContext::new(SCOPE_PARAM, frame.has_overlay);
            let emitted = emit_expr(&entry.ast, &mut ctx);
            let head = if options.is_js {
                format!("{prefix}access(/** @param {{{}}} {SCOPE_PARAM} */ ({SCOPE_PARAM}) => ", frame.type_name)
            } else {
                format!("{prefix}access<{}>({SCOPE_PARAM} => ", frame.type_name)
            };
            text.push_str(&head);
            let base = text.len();
            text.push_str(&emitted.code);
            text.push_str(");\n");

            let at = |start: usize, end: usize| SourceSpan::new(base + start, base + end);
            mapping.entries.push(OverlayMappingEntry {
                expr_id: lambda.expr_id,
                frame: frame.frame,
                html_span: lambda.span,
                overlay_span: at(0, emitted.code.len()),
                nodes: emitted
                    .mappings
                    .iter()
                    .map(|m| (m.source, at(m.start, m.end)))
                    .collect(),
                segments: emitted
                    .segments
                    .iter()
                    .map(|s| OverlaySegment {
                        path: s.path.clone(),
                        html_span: s.source,
                        overlay_span: at(s.start, s.end),
                    })
                    .collect(),
            });
        }
    }

    tracing::debug!(bytes = text.len(), entries = mapping.entries.len(), "emitted overlay");
    OverlayEmitResult {
        filename: overlay_filename(&options.base_name, options.is_js),
        text,
        mapping,
    }
}

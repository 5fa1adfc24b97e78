//! SSR Emission
//!
//! Renders the linked module as literal HTML with hydration markers, a JSON
//! manifest keyed by hydration id, and a node map recording where each hydration
//! id landed in both outputs.
//!
//! Markers:
//! - `data-au-hid="HID"` on elements with bindings
//! - `<!--au:tb HID@I expr=EXPR-->` for the I-th interpolation of a text node
//! - `<!--au:ctrl HID RES start-->` ... `<!--au:ctrl HID end-->` around controller views

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expression_parser::{serialize, Expr};
use crate::parse_util::SourceSpan;
use crate::template::ir::{DomNode, ExprId, ExprTable, NodeId};
use crate::template::linking::{LinkedInstruction, LinkedModule, LinkedRow, LinkedTemplate};
use crate::template::markup;

pub const SSR_MANIFEST_VERSION: &str = "aurelia-ssr-manifest@0";

#[derive(Debug, Clone)]
pub struct SsrOptions {
    /// Carry authored comments into the HTML.
    pub preserve_comments: bool,
    /// Include expression source in markers and the manifest.
    pub include_expressions: bool,
}

impl Default for SsrOptions {
    fn default() -> Self {
        SsrOptions {
            preserve_comments: true,
            include_expressions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrBinding {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr_id: Option<ExprId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrController {
    pub res: String,
    /// Name of the controller's view in `templates`.
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrLet {
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrManifestNode {
    pub hid: u32,
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub static_attrs: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<SsrBinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controllers: Vec<SsrController>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lets: Vec<SsrLet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrManifestTemplate {
    pub name: String,
    pub nodes: Vec<SsrManifestNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrManifest {
    pub version: String,
    pub templates: Vec<SsrManifestTemplate>,
}

impl SsrManifest {
    pub fn node(&self, hid: u32) -> Option<&SsrManifestNode> {
        self.templates.iter().flat_map(|t| &t.nodes).find(|n| n.hid == hid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrNodeMapping {
    pub hid: u32,
    pub node_id: NodeId,
    pub template: String,
    /// Authored span of the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_span: Option<SourceSpan>,
    /// The whole element, text or the controller's start marker in the HTML output.
    pub html_span: SourceSpan,
    /// The node's object in the manifest JSON.
    pub manifest_span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrResult {
    pub html: String,
    pub manifest: SsrManifest,
    pub manifest_json: String,
    pub mappings: Vec<SsrNodeMapping>,
}

struct PendingMapping {
    hid: u32,
    node_id: NodeId,
    template: String,
    source_span: Option<SourceSpan>,
    html_span: SourceSpan,
}

struct Renderer<'a> {
    exprs: &'a ExprTable,
    options: &'a SsrOptions,
    next_hid: u32,
    html: String,
    templates: Vec<SsrManifestTemplate>,
    pending: Vec<PendingMapping>,
}

pub fn render_ssr(linked: &LinkedModule, exprs: &ExprTable, options: &SsrOptions) -> Result<SsrResult> {
    let mut renderer = Renderer {
        exprs,
        options,
        next_hid: 1,
        html: String::new(),
        templates: Vec::new(),
        pending: Vec::new(),
    };
    let mut html = String::new();
    renderer.render_template(&linked.root, &mut html);
    renderer.html = html;

    let manifest = SsrManifest {
        version: SSR_MANIFEST_VERSION.to_string(),
        templates: renderer.templates,
    };
    let (manifest_json, manifest_spans) = write_manifest(&manifest)?;
    let mappings = renderer
        .pending
        .into_iter()
        .filter_map(|p| {
            let manifest_span = *manifest_spans.get(&p.hid)?;
            Some(SsrNodeMapping {
                hid: p.hid,
                node_id: p.node_id,
                template: p.template,
                source_span: p.source_span,
                html_span: p.html_span,
                manifest_span,
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        hids = mappings.len(),
        templates = manifest.templates.len(),
        bytes = renderer.html.len(),
        "rendered ssr"
    );
    Ok(SsrResult {
        html: renderer.html,
        manifest,
        manifest_json,
        mappings,
    })
}

/// Serialize the manifest by hand so each node's byte range is known.
fn write_manifest(manifest: &SsrManifest) -> Result<(String, IndexMap<u32, SourceSpan>)> {
    let mut out = String::new();
    let mut spans = IndexMap::new();
    out.push_str("{\"version\":");
    out.push_str(&serde_json::to_string(&manifest.version)?);
    out.push_str(",\"templates\":[");
    for (t, template) in manifest.templates.iter().enumerate() {
        if t > 0 {
            out.push(',');
        }
        out.push_str("{\"name\":");
        out.push_str(&serde_json::to_string(&template.name)?);
        out.push_str(",\"nodes\":[");
        for (n, node) in template.nodes.iter().enumerate() {
            if n > 0 {
                out.push(',');
            }
            let start = out.len();
            out.push_str(&serde_json::to_string(node)?);
            spans.insert(node.hid, SourceSpan::new(start, out.len()));
        }
        out.push_str("]}");
    }
    out.push_str("]}");
    Ok((out, spans))
}

impl<'a> Renderer<'a> {
    fn expr_text(&self, id: ExprId) -> Option<String> {
        if !self.options.include_expressions {
            return None;
        }
        self.exprs.ast(id).map(serialize)
    }

    fn render_template(&mut self, template: &LinkedTemplate, out: &mut String) {
        let index = self.templates.len();
        self.templates.push(SsrManifestTemplate {
            name: template.name.clone(),
            nodes: Vec::new(),
        });
        self.render_nodes(template, index, &template.dom.children, out);
    }

    /// Returns the index of the pending mapping so callers can widen its span.
    fn push_node(&mut self, template: usize, node: SsrManifestNode, source_span: Option<SourceSpan>, html_span: SourceSpan) -> usize {
        let name = self.templates[template].name.clone();
        self.pending.push(PendingMapping {
            hid: node.hid,
            node_id: node.node_id,
            template: name,
            source_span,
            html_span,
        });
        self.templates[template].nodes.push(node);
        self.pending.len() - 1
    }

    fn bindings(&self, row: &LinkedRow) -> Vec<SsrBinding> {
        let mut out = Vec::new();
        for instruction in &row.instructions {
            self.collect_bindings(instruction, &mut out);
        }
        out
    }

    fn collect_bindings(&self, instruction: &LinkedInstruction, out: &mut Vec<SsrBinding>) {
        let mut push = |kind: &str, to: Option<&str>, from: Option<ExprId>| {
            out.push(SsrBinding {
                kind: kind.to_string(),
                to: to.map(str::to_string),
                expr_id: from,
                expr: from.and_then(|id| self.expr_text(id)),
            });
        };
        match instruction {
            LinkedInstruction::PropertyBinding(i) => push("propertyBinding", Some(&i.ir.to), Some(i.ir.from)),
            LinkedInstruction::Interpolation(i) => push("interpolation", Some(&i.ir.to), Some(i.ir.from)),
            LinkedInstruction::AttributeBinding(i) => push("attributeBinding", Some(&i.to), Some(i.from)),
            LinkedInstruction::StylePropertyBinding(i) => push("stylePropertyBinding", Some(&i.to), Some(i.from)),
            LinkedInstruction::ListenerBinding(i) => push("listenerBinding", Some(&i.to), Some(i.from)),
            LinkedInstruction::RefBinding(i) => push("refBinding", Some(&i.to), Some(i.from)),
            LinkedInstruction::TextBinding(i) => push("textBinding", None, Some(i.from)),
            LinkedInstruction::SetProperty(i) => push("setProperty", Some(&i.ir.to), None),
            LinkedInstruction::SetAttribute(i) => push("setAttribute", Some(&i.to), None),
            LinkedInstruction::SetClassAttribute(_) => push("setClassAttribute", Some("class"), None),
            LinkedInstruction::SetStyleAttribute(_) => push("setStyleAttribute", Some("style"), None),
            LinkedInstruction::IteratorBinding(i) => push("iteratorBinding", Some(&i.to), Some(i.from)),
            LinkedInstruction::HydrateElement(e) => {
                push("hydrateElement", Some(&e.name), None);
                for prop in &e.props {
                    self.collect_bindings(prop, out);
                }
            }
            LinkedInstruction::HydrateAttribute(a) => {
                push("hydrateAttribute", Some(&a.name), None);
                for prop in &a.props {
                    self.collect_bindings(prop, out);
                }
            }
            LinkedInstruction::HydrateTemplateController(c) => {
                for prop in &c.props {
                    self.collect_bindings(prop, out);
                }
            }
            LinkedInstruction::HydrateLetElement(_) => {}
        }
    }

    fn render_nodes(&mut self, template: &LinkedTemplate, index: usize, nodes: &[DomNode], out: &mut String) {
        for node in nodes {
            let row = template.row(node.id());
            if let Some(controller) = row.and_then(|r| r.controller()) {
                let hid = self.take_hid();
                let start = out.len();
                markup::comment(out, &format!("au:ctrl {hid} {} start", controller.res.name));
                let marker_span = SourceSpan::new(start, out.len());
                let manifest = SsrManifestNode {
                    hid,
                    node_id: node.id(),
                    tag: None,
                    text: None,
                    static_attrs: IndexMap::new(),
                    bindings: row.map(|r| self.bindings(r)).unwrap_or_default(),
                    controllers: vec![SsrController {
                        res: controller.res.name.clone(),
                        template: controller.def.name.clone(),
                        alias: controller.alias.as_ref().map(|a| a.name.clone()),
                    }],
                    lets: Vec::new(),
                };
                self.push_node(index, manifest, Some(controller.loc.span), marker_span);
                // The view renders once, with its own rows.
                self.render_template(&controller.def, out);
                markup::comment(out, &format!("au:ctrl {hid} end"));
                continue;
            }

            match node {
                DomNode::Element(element) => {
                    let start = out.len();
                    let mut extra = Vec::new();
                    let hid = row.map(|_| self.take_hid());
                    if let Some(hid) = hid {
                        extra.push(("data-au-hid", hid.to_string()));
                    }
                    let is_let = element.tag == "let" && row.is_some();
                    let mut mapping = None;
                    markup::open_tag(out, &element.tag, &element.attrs, &extra);
                    let open_span = SourceSpan::new(start, out.len());
                    if let (Some(hid), Some(row)) = (hid, row) {
                        let lets = row
                            .instructions
                            .iter()
                            .filter_map(|i| match i {
                                LinkedInstruction::HydrateLetElement(l) => Some(l),
                                _ => None,
                            })
                            .flat_map(|l| {
                                l.bindings.iter().map(|b| SsrLet {
                                    to: b.to.clone(),
                                    expr: self.expr_text(b.from),
                                })
                            })
                            .collect();
                        let manifest = SsrManifestNode {
                            hid,
                            node_id: element.id,
                            tag: Some(element.tag.clone()),
                            text: None,
                            static_attrs: element
                                .attrs
                                .iter()
                                .map(|a| (a.name.clone(), a.value.clone().unwrap_or_default()))
                                .collect(),
                            bindings: if is_let { Vec::new() } else { self.bindings(row) },
                            controllers: Vec::new(),
                            lets,
                        };
                        mapping = Some(self.push_node(index, manifest, Some(element.span), open_span));
                    }
                    if !markup::raw_text_children(out, &element.tag, &element.children) {
                        self.render_nodes(template, index, &element.children, out);
                    }
                    markup::close_tag(out, &element.tag);
                    if let Some(mapping) = mapping {
                        self.pending[mapping].html_span.end = out.len();
                    }
                }
                DomNode::Template(fragment) => {
                    markup::open_tag(out, "template", &fragment.attrs, &[]);
                    self.render_nodes(template, index, &fragment.children, out);
                    markup::close_tag(out, "template");
                }
                DomNode::Text(text) => match row {
                    Some(row) => {
                        let hid = self.take_hid();
                        let start = out.len();
                        self.render_text_binding(hid, row, &text.text, out);
                        let manifest = SsrManifestNode {
                            hid,
                            node_id: text.id,
                            tag: None,
                            text: Some(text.text.clone()),
                            static_attrs: IndexMap::new(),
                            bindings: self.bindings(row),
                            controllers: Vec::new(),
                            lets: Vec::new(),
                        };
                        self.push_node(index, manifest, Some(text.span), SourceSpan::new(start, out.len()));
                    }
                    None => markup::text(out, &text.text),
                },
                DomNode::Comment(comment) => {
                    if self.options.preserve_comments {
                        markup::comment(out, &comment.text);
                    }
                }
            }
        }
    }

    /// Literal parts of the interpolation interleaved with one marker per expression.
    fn render_text_binding(&self, hid: u32, row: &LinkedRow, raw: &str, out: &mut String) {
        let interpolation = row.instructions.iter().find_map(|i| match i {
            LinkedInstruction::TextBinding(t) => match self.exprs.ast(t.from) {
                Some(Expr::Interpolation(interp)) => Some(interp),
                _ => None,
            },
            _ => None,
        });
        let Some(interp) = interpolation else {
            markup::text(out, raw);
            return;
        };
        for (i, part) in interp.parts.iter().enumerate() {
            markup::text(out, part);
            if let Some(expr) = interp.expressions.get(i) {
                let text = if self.options.include_expressions {
                    format!("au:tb {hid}@{i} expr={}", serialize(expr))
                } else {
                    format!("au:tb {hid}@{i}")
                };
                markup::comment(out, &text);
            }
        }
    }

    fn take_hid(&mut self) -> u32 {
        let hid = self.next_hid;
        self.next_hid += 1;
        hid
    }
}

//! AOT Planning
//!
//! Assigns hydration target indices and converts linked rows into runtime
//! instructions. Each template (root or controller view) numbers its targets
//! from zero in depth-first DOM order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::expression_parser::binding_target_names;
use crate::schema::BindingMode;
use crate::template::ir::{DomNode, ExprId, ExprTable, NodeId, TailValue, TemplateNode};
use crate::template::linking::{LinkedInstruction, LinkedModule, LinkedTemplate};
use crate::template::markup;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AotTailProp {
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ExprId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AotLetBinding {
    pub to: String,
    pub from: ExprId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AotCase {
    pub def: AotTemplatePlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AotInstruction {
    #[serde(rename_all = "camelCase")]
    PropertyBinding { from: ExprId, to: String, mode: BindingMode },
    #[serde(rename_all = "camelCase")]
    Interpolation { from: ExprId, to: String },
    #[serde(rename_all = "camelCase")]
    AttributeBinding { from: ExprId, attr: String, to: String },
    #[serde(rename_all = "camelCase")]
    StylePropertyBinding { from: ExprId, to: String },
    #[serde(rename_all = "camelCase")]
    ListenerBinding {
        from: ExprId,
        to: String,
        capture: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modifier: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RefBinding { from: ExprId, to: String },
    #[serde(rename_all = "camelCase")]
    TextBinding { from: ExprId },
    #[serde(rename_all = "camelCase")]
    SetProperty { to: String, value: String },
    #[serde(rename_all = "camelCase")]
    SetAttribute { to: String, value: String },
    #[serde(rename_all = "camelCase")]
    SetClassAttribute { value: String },
    #[serde(rename_all = "camelCase")]
    SetStyleAttribute { value: String },
    #[serde(rename_all = "camelCase")]
    IteratorBinding {
        from: ExprId,
        to: String,
        locals: Vec<String>,
        props: Vec<AotTailProp>,
    },
    #[serde(rename_all = "camelCase")]
    HydrateElement {
        res: String,
        props: Vec<AotInstruction>,
        containerless: bool,
    },
    #[serde(rename_all = "camelCase")]
    HydrateAttribute { res: String, props: Vec<AotInstruction> },
    #[serde(rename_all = "camelCase")]
    HydrateTemplateController {
        res: String,
        def: Box<AotTemplatePlan>,
        props: Vec<AotInstruction>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cases: Option<Vec<AotCase>>,
    },
    #[serde(rename_all = "camelCase")]
    HydrateLetElement {
        bindings: Vec<AotLetBinding>,
        to_binding_context: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AotTarget {
    pub index: usize,
    pub node: NodeId,
    pub instructions: Vec<AotInstruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AotTemplatePlan {
    pub name: String,
    /// Hydration skeleton: the static markup with a marker before each target.
    pub template: String,
    pub targets: Vec<AotTarget>,
}

impl AotTemplatePlan {
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn target_of(&self, node: NodeId) -> Option<usize> {
        self.targets.iter().find(|t| t.node == node).map(|t| t.index)
    }
}

/// Something the planner knowingly leaves incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AotGap {
    pub controller: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AotPlanModule {
    pub root: AotTemplatePlan,
    pub gaps: Vec<AotGap>,
}

/// Hydration marker placed before every target.
pub const TARGET_MARKER: &str = "au*";

pub fn plan_aot(linked: &LinkedModule, exprs: &ExprTable) -> AotPlanModule {
    let mut planner = Planner { exprs, gaps: Vec::new() };
    let root = planner.plan_template(&linked.root);
    tracing::debug!(targets = root.target_count(), gaps = planner.gaps.len(), "planned aot");
    AotPlanModule {
        root,
        gaps: planner.gaps,
    }
}

struct Planner<'a> {
    exprs: &'a ExprTable,
    gaps: Vec<AotGap>,
}

impl<'a> Planner<'a> {
    fn plan_template(&mut self, template: &LinkedTemplate) -> AotTemplatePlan {
        let mut order: IndexMap<NodeId, usize> = IndexMap::new();
        allocate_targets(template, &template.dom.children, &mut order);

        let targets = order
            .iter()
            .filter_map(|(&node, &index)| {
                let row = template.row(node)?;
                Some(AotTarget {
                    index,
                    node,
                    instructions: row.instructions.iter().map(|i| self.instruction(i)).collect(),
                })
            })
            .collect();

        let mut skeleton = String::new();
        render_skeleton(template, &template.dom, &order, &mut skeleton);

        AotTemplatePlan {
            name: template.name.clone(),
            template: skeleton,
            targets,
        }
    }

    fn instructions(&mut self, list: &[LinkedInstruction]) -> Vec<AotInstruction> {
        list.iter().map(|i| self.instruction(i)).collect()
    }

    fn instruction(&mut self, instruction: &LinkedInstruction) -> AotInstruction {
        match instruction {
            LinkedInstruction::PropertyBinding(i) => AotInstruction::PropertyBinding {
                from: i.ir.from,
                to: i.ir.to.clone(),
                mode: i.effective_mode,
            },
            LinkedInstruction::Interpolation(i) => AotInstruction::Interpolation {
                from: i.ir.from,
                to: i.ir.to.clone(),
            },
            LinkedInstruction::AttributeBinding(i) => AotInstruction::AttributeBinding {
                from: i.from,
                attr: i.attr.clone(),
                to: i.to.clone(),
            },
            LinkedInstruction::StylePropertyBinding(i) => AotInstruction::StylePropertyBinding {
                from: i.from,
                to: i.to.clone(),
            },
            LinkedInstruction::ListenerBinding(i) => AotInstruction::ListenerBinding {
                from: i.from,
                to: i.to.clone(),
                capture: i.capture,
                modifier: i.modifier.clone(),
            },
            LinkedInstruction::RefBinding(i) => AotInstruction::RefBinding {
                from: i.from,
                to: i.to.clone(),
            },
            LinkedInstruction::TextBinding(i) => AotInstruction::TextBinding { from: i.from },
            LinkedInstruction::SetProperty(i) => AotInstruction::SetProperty {
                to: i.ir.to.clone(),
                value: i.ir.value.clone(),
            },
            LinkedInstruction::SetAttribute(i) => AotInstruction::SetAttribute {
                to: i.to.clone(),
                value: i.value.clone(),
            },
            LinkedInstruction::SetClassAttribute(i) => AotInstruction::SetClassAttribute { value: i.value.clone() },
            LinkedInstruction::SetStyleAttribute(i) => AotInstruction::SetStyleAttribute { value: i.value.clone() },
            LinkedInstruction::IteratorBinding(i) => {
                let locals = match self.exprs.ast(i.from) {
                    Some(crate::expression_parser::Expr::ForOfStatement(header)) => {
                        binding_target_names(&header.declaration)
                            .into_iter()
                            .map(|n| n.name)
                            .collect()
                    }
                    _ => Vec::new(),
                };
                AotInstruction::IteratorBinding {
                    from: i.from,
                    to: i.to.clone(),
                    locals,
                    props: i
                        .tail
                        .iter()
                        .map(|t| match &t.value {
                            TailValue::Expr(id) => AotTailProp {
                                to: t.to.clone(),
                                from: Some(*id),
                                value: None,
                            },
                            TailValue::Literal(value) => AotTailProp {
                                to: t.to.clone(),
                                from: None,
                                value: Some(value.clone()),
                            },
                        })
                        .collect(),
                }
            }
            LinkedInstruction::HydrateElement(i) => AotInstruction::HydrateElement {
                res: i.name.clone(),
                props: self.instructions(&i.props),
                containerless: i.containerless,
            },
            LinkedInstruction::HydrateAttribute(i) => AotInstruction::HydrateAttribute {
                res: i.name.clone(),
                props: self.instructions(&i.props),
            },
            LinkedInstruction::HydrateTemplateController(c) => {
                let def = self.plan_template(&c.def);
                let cases = if c.res.name == "switch" {
                    self.gaps.push(AotGap {
                        controller: c.res.name.clone(),
                        reason: "case views are not planned".to_string(),
                    });
                    Some(Vec::new())
                } else {
                    None
                };
                AotInstruction::HydrateTemplateController {
                    res: c.res.name.clone(),
                    def: Box::new(def),
                    props: self.instructions(&c.props),
                    alias: c.alias.as_ref().map(|a| a.name.clone()),
                    cases,
                }
            }
            LinkedInstruction::HydrateLetElement(i) => AotInstruction::HydrateLetElement {
                bindings: i
                    .bindings
                    .iter()
                    .map(|b| AotLetBinding {
                        to: b.to.clone(),
                        from: b.from,
                    })
                    .collect(),
                to_binding_context: i.to_binding_context,
            },
        }
    }
}

fn is_controller_host(template: &LinkedTemplate, node: NodeId) -> bool {
    template.row(node).and_then(|r| r.controller()).is_some()
}

/// Depth-first: every node with a row gets the next index. Controller hosts keep
/// their children for the nested view.
fn allocate_targets(template: &LinkedTemplate, nodes: &[DomNode], order: &mut IndexMap<NodeId, usize>) {
    for node in nodes {
        let id = node.id();
        if template.row(id).is_some() {
            let next = order.len();
            order.insert(id, next);
        }
        if is_controller_host(template, id) {
            continue;
        }
        allocate_targets(template, node.children(), order);
    }
}

fn marker(out: &mut String) {
    markup::comment(out, TARGET_MARKER);
}

fn render_skeleton(template: &LinkedTemplate, fragment: &TemplateNode, order: &IndexMap<NodeId, usize>, out: &mut String) {
    render_nodes(template, &fragment.children, order, out);
}

fn render_nodes(template: &LinkedTemplate, nodes: &[DomNode], order: &IndexMap<NodeId, usize>, out: &mut String) {
    for node in nodes {
        let targeted = order.contains_key(&node.id());
        if is_controller_host(template, node.id()) {
            marker(out);
            markup::comment(out, "au-start");
            markup::comment(out, "au-end");
            continue;
        }
        match node {
            DomNode::Element(element) => {
                if targeted {
                    marker(out);
                }
                markup::open_tag(out, &element.tag, &element.attrs, &[]);
                if !markup::raw_text_children(out, &element.tag, &element.children) {
                    render_nodes(template, &element.children, order, out);
                }
                markup::close_tag(out, &element.tag);
            }
            DomNode::Template(fragment) => {
                if targeted {
                    marker(out);
                }
                markup::open_tag(out, "template", &fragment.attrs, &[]);
                render_nodes(template, &fragment.children, order, out);
                markup::close_tag(out, "template");
            }
            DomNode::Text(text) => {
                if targeted {
                    marker(out);
                    out.push(' ');
                } else {
                    markup::text(out, &text.text);
                }
            }
            DomNode::Comment(comment) => markup::comment(out, &comment.text),
        }
    }
}

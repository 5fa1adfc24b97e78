//! Linked Module
//!
//! Same shape as the IR, with resolved definitions attached to every
//! resource-bearing instruction and a binding target on every property write.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::CompilerDiagnostic;
use crate::expression_parser::Identifier;
use crate::parse_util::SourceSpan;
use crate::schema::{AttrRes, Bindable, BindingMode, ControllerConfig, ElementRes};
use crate::template::ir::*;

/// What a property-like instruction writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BindingTarget {
    /// A DOM property on a plain element (or an unmatched custom-element prop).
    Native { property: String },
    ElementBindable { owner: String, bindable: Bindable },
    AttributeBindable { owner: String, bindable: Bindable },
    ControllerProp { owner: String, bindable: Bindable },
    /// The owner could not be resolved.
    Unknown,
}

impl BindingTarget {
    pub fn bindable(&self) -> Option<&Bindable> {
        match self {
            BindingTarget::ElementBindable { bindable, .. }
            | BindingTarget::AttributeBindable { bindable, .. }
            | BindingTarget::ControllerProp { bindable, .. } => Some(bindable),
            BindingTarget::Native { .. } | BindingTarget::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedPropertyBinding {
    #[serde(flatten)]
    pub ir: PropertyBindingIR,
    pub target: BindingTarget,
    /// `mode` with `default` resolved against the target.
    pub effective_mode: BindingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInterpolation {
    #[serde(flatten)]
    pub ir: InterpolationIR,
    pub target: BindingTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedSetProperty {
    #[serde(flatten)]
    pub ir: SetPropertyIR,
    pub target: BindingTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedHydrateElement {
    pub name: String,
    /// `None` when the element did not resolve.
    pub res: Option<ElementRes>,
    pub props: Vec<LinkedInstruction>,
    pub containerless: bool,
    pub span: SourceSpan,
    pub name_span: SourceSpan,
    pub end_name_span: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedHydrateAttribute {
    pub name: String,
    pub res: Option<AttrRes>,
    pub props: Vec<LinkedInstruction>,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedHydrateTemplateController {
    pub name: String,
    /// Resolved configuration, or a stub when `resolved` is false.
    pub res: ControllerConfig,
    pub resolved: bool,
    pub props: Vec<LinkedInstruction>,
    pub def: Box<LinkedTemplate>,
    pub alias: Option<Identifier>,
    pub command: Option<String>,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LinkedInstruction {
    PropertyBinding(LinkedPropertyBinding),
    AttributeBinding(AttributeBindingIR),
    StylePropertyBinding(StylePropertyBindingIR),
    ListenerBinding(ListenerBindingIR),
    RefBinding(RefBindingIR),
    TextBinding(TextBindingIR),
    Interpolation(LinkedInterpolation),
    SetProperty(LinkedSetProperty),
    SetAttribute(SetAttributeIR),
    SetClassAttribute(SetStaticAttrIR),
    SetStyleAttribute(SetStaticAttrIR),
    IteratorBinding(IteratorBindingIR),
    HydrateElement(LinkedHydrateElement),
    HydrateAttribute(LinkedHydrateAttribute),
    HydrateTemplateController(LinkedHydrateTemplateController),
    HydrateLetElement(HydrateLetElementIR),
}

impl LinkedInstruction {
    pub fn type_name(&self) -> &'static str {
        match self {
            LinkedInstruction::PropertyBinding(_) => "propertyBinding",
            LinkedInstruction::AttributeBinding(_) => "attributeBinding",
            LinkedInstruction::StylePropertyBinding(_) => "stylePropertyBinding",
            LinkedInstruction::ListenerBinding(_) => "listenerBinding",
            LinkedInstruction::RefBinding(_) => "refBinding",
            LinkedInstruction::TextBinding(_) => "textBinding",
            LinkedInstruction::Interpolation(_) => "interpolation",
            LinkedInstruction::SetProperty(_) => "setProperty",
            LinkedInstruction::SetAttribute(_) => "setAttribute",
            LinkedInstruction::SetClassAttribute(_) => "setClassAttribute",
            LinkedInstruction::SetStyleAttribute(_) => "setStyleAttribute",
            LinkedInstruction::IteratorBinding(_) => "iteratorBinding",
            LinkedInstruction::HydrateElement(_) => "hydrateElement",
            LinkedInstruction::HydrateAttribute(_) => "hydrateAttribute",
            LinkedInstruction::HydrateTemplateController(_) => "hydrateTemplateController",
            LinkedInstruction::HydrateLetElement(_) => "hydrateLetElement",
        }
    }

    /// Expressions referenced by this instruction and its props, not nested defs.
    pub fn exprs(&self) -> Vec<ExprId> {
        match self {
            LinkedInstruction::PropertyBinding(i) => vec![i.ir.from],
            LinkedInstruction::AttributeBinding(i) => vec![i.from],
            LinkedInstruction::StylePropertyBinding(i) => vec![i.from],
            LinkedInstruction::ListenerBinding(i) => vec![i.from],
            LinkedInstruction::RefBinding(i) => vec![i.from],
            LinkedInstruction::TextBinding(i) => vec![i.from],
            LinkedInstruction::Interpolation(i) => vec![i.ir.from],
            LinkedInstruction::IteratorBinding(i) => {
                let mut ids = vec![i.from];
                ids.extend(i.tail.iter().filter_map(|t| match t.value {
                    TailValue::Expr(id) => Some(id),
                    TailValue::Literal(_) => None,
                }));
                ids
            }
            LinkedInstruction::HydrateLetElement(i) => i.bindings.iter().map(|b| b.from).collect(),
            LinkedInstruction::HydrateElement(i) => i.props.iter().flat_map(|p| p.exprs()).collect(),
            LinkedInstruction::HydrateAttribute(i) => i.props.iter().flat_map(|p| p.exprs()).collect(),
            LinkedInstruction::HydrateTemplateController(i) => i.props.iter().flat_map(|p| p.exprs()).collect(),
            LinkedInstruction::SetProperty(_)
            | LinkedInstruction::SetAttribute(_)
            | LinkedInstruction::SetClassAttribute(_)
            | LinkedInstruction::SetStyleAttribute(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedRow {
    pub target: NodeId,
    pub instructions: Vec<LinkedInstruction>,
}

impl LinkedRow {
    pub fn controller(&self) -> Option<&LinkedHydrateTemplateController> {
        self.instructions.iter().find_map(|i| match i {
            LinkedInstruction::HydrateTemplateController(c) => Some(c),
            _ => None,
        })
    }

    pub fn element(&self) -> Option<&LinkedHydrateElement> {
        self.instructions.iter().find_map(|i| match i {
            LinkedInstruction::HydrateElement(e) => Some(e),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedTemplate {
    pub name: String,
    pub dom: TemplateNode,
    pub rows: Vec<LinkedRow>,
}

impl LinkedTemplate {
    pub fn row(&self, target: NodeId) -> Option<&LinkedRow> {
        self.rows.iter().find(|r| r.target == target)
    }

    /// Nested controller definitions in row order.
    pub fn nested(&self) -> impl Iterator<Item = &LinkedHydrateTemplateController> {
        self.rows.iter().flat_map(|r| {
            r.instructions.iter().filter_map(|i| match i {
                LinkedInstruction::HydrateTemplateController(c) => Some(c),
                _ => None,
            })
        })
    }
}

/// Path from the root template to a nested one: `(row, instruction)` per hop.
pub type TemplatePath = Vec<(usize, usize)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedModule {
    pub name: String,
    pub root: LinkedTemplate,
    pub diagnostics: Vec<CompilerDiagnostic>,
    /// Template owning each DOM node. Built after linking.
    #[serde(skip)]
    pub node_templates: IndexMap<NodeId, TemplatePath>,
}

impl LinkedModule {
    pub(crate) fn index_nodes(&mut self) {
        let mut index = IndexMap::new();
        index_template(&self.root, &mut Vec::new(), &mut index);
        self.node_templates = index;
    }

    pub fn template_at(&self, path: &[(usize, usize)]) -> Option<&LinkedTemplate> {
        let mut template = &self.root;
        for &(row, instruction) in path {
            match template.rows.get(row)?.instructions.get(instruction)? {
                LinkedInstruction::HydrateTemplateController(c) => template = &c.def,
                _ => return None,
            }
        }
        Some(template)
    }

    pub fn template_of(&self, node: NodeId) -> Option<&LinkedTemplate> {
        self.template_at(self.node_templates.get(&node)?)
    }

    pub fn row_for(&self, node: NodeId) -> Option<&LinkedRow> {
        self.template_of(node)?.row(node)
    }

    /// Every template in pre-order, root first.
    pub fn templates(&self) -> Vec<&LinkedTemplate> {
        fn collect<'t>(template: &'t LinkedTemplate, out: &mut Vec<&'t LinkedTemplate>) {
            out.push(template);
            for nested in template.nested() {
                collect(&nested.def, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }
}

fn index_template(template: &LinkedTemplate, path: &mut TemplatePath, index: &mut IndexMap<NodeId, TemplatePath>) {
    index.insert(template.dom.id, path.clone());
    template.dom.walk(&mut |node| {
        index.insert(node.id(), path.clone());
    });
    for (r, row) in template.rows.iter().enumerate() {
        for (i, instruction) in row.instructions.iter().enumerate() {
            if let LinkedInstruction::HydrateTemplateController(c) = instruction {
                path.push((r, i));
                index_template(&c.def, path, index);
                path.pop();
            }
        }
    }
}

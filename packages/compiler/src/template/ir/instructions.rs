//! IR Instructions
//!
//! Unlinked instructions produced by lowering. Resource names are symbolic;
//! linking attaches definitions. Controller instructions own their nested view.

use serde::{Deserialize, Serialize};

use super::dom::TemplateNode;
use super::handle::{ExprId, NodeId};
use crate::expression_parser::Identifier;
use crate::parse_util::SourceSpan;
use crate::schema::BindingMode;

/// Where an attribute-derived instruction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttrLoc {
    /// The whole attribute, name through closing quote.
    pub span: SourceSpan,
    /// The target part of the name (`value` in `value.bind`).
    pub target_span: SourceSpan,
    pub name_span: SourceSpan,
    pub value_span: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBindingIR {
    /// Authored attribute target (`value`, `first-name`).
    pub attr: String,
    /// Property name (`value`, `firstName`).
    pub to: String,
    pub from: ExprId,
    pub mode: BindingMode,
    pub command: String,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeBindingIR {
    /// DOM attribute written (`class`, `aria-label`).
    pub attr: String,
    pub to: String,
    pub from: ExprId,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePropertyBindingIR {
    pub to: String,
    pub from: ExprId,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerBindingIR {
    pub to: String,
    pub from: ExprId,
    pub capture: bool,
    pub modifier: Option<String>,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefBindingIR {
    pub to: String,
    pub from: ExprId,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBindingIR {
    pub from: ExprId,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolationIR {
    pub attr: String,
    pub to: String,
    pub from: ExprId,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPropertyIR {
    pub attr: String,
    pub to: String,
    pub value: String,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAttributeIR {
    pub to: String,
    pub value: String,
    pub loc: AttrLoc,
}

/// Static `class`/`style` on a custom element host, applied at hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStaticAttrIR {
    pub value: String,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TailValue {
    Expr(ExprId),
    Literal(String),
}

/// `; key: id` segment of an iterator header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IteratorTailPropIR {
    pub to: String,
    pub command: Option<String>,
    pub value: TailValue,
    pub span: SourceSpan,
    pub name_span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IteratorBindingIR {
    pub to: String,
    /// The `ForOfStatement` header.
    pub from: ExprId,
    pub tail: Vec<IteratorTailPropIR>,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateElementIR {
    pub res: String,
    pub props: Vec<Instruction>,
    pub containerless: bool,
    pub span: SourceSpan,
    pub name_span: SourceSpan,
    pub end_name_span: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateAttributeIR {
    pub res: String,
    pub props: Vec<Instruction>,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateTemplateControllerIR {
    pub res: String,
    pub props: Vec<Instruction>,
    pub def: Box<IrTemplate>,
    /// Local declared through the attribute value (`then="data"`).
    pub alias: Option<Identifier>,
    /// Binding command as authored on the controller attribute.
    pub command: Option<String>,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetBindingIR {
    pub to: String,
    pub from: ExprId,
    pub loc: AttrLoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateLetElementIR {
    pub bindings: Vec<LetBindingIR>,
    pub to_binding_context: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Instruction {
    PropertyBinding(PropertyBindingIR),
    AttributeBinding(AttributeBindingIR),
    StylePropertyBinding(StylePropertyBindingIR),
    ListenerBinding(ListenerBindingIR),
    RefBinding(RefBindingIR),
    TextBinding(TextBindingIR),
    Interpolation(InterpolationIR),
    SetProperty(SetPropertyIR),
    SetAttribute(SetAttributeIR),
    SetClassAttribute(SetStaticAttrIR),
    SetStyleAttribute(SetStaticAttrIR),
    IteratorBinding(IteratorBindingIR),
    HydrateElement(HydrateElementIR),
    HydrateAttribute(HydrateAttributeIR),
    HydrateTemplateController(HydrateTemplateControllerIR),
    HydrateLetElement(HydrateLetElementIR),
}

impl Instruction {
    /// Expressions referenced directly by this instruction (nested props and defs excluded).
    pub fn own_exprs(&self) -> Vec<ExprId> {
        match self {
            Instruction::PropertyBinding(i) => vec![i.from],
            Instruction::AttributeBinding(i) => vec![i.from],
            Instruction::StylePropertyBinding(i) => vec![i.from],
            Instruction::ListenerBinding(i) => vec![i.from],
            Instruction::RefBinding(i) => vec![i.from],
            Instruction::TextBinding(i) => vec![i.from],
            Instruction::Interpolation(i) => vec![i.from],
            Instruction::IteratorBinding(i) => {
                let mut ids = vec![i.from];
                ids.extend(i.tail.iter().filter_map(|t| match t.value {
                    TailValue::Expr(id) => Some(id),
                    TailValue::Literal(_) => None,
                }));
                ids
            }
            Instruction::HydrateLetElement(i) => i.bindings.iter().map(|b| b.from).collect(),
            Instruction::SetProperty(_)
            | Instruction::SetAttribute(_)
            | Instruction::SetClassAttribute(_)
            | Instruction::SetStyleAttribute(_)
            | Instruction::HydrateElement(_)
            | Instruction::HydrateAttribute(_)
            | Instruction::HydrateTemplateController(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub target: NodeId,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrTemplate {
    pub name: String,
    pub dom: TemplateNode,
    pub rows: Vec<Row>,
}

impl IrTemplate {
    pub fn row(&self, target: NodeId) -> Option<&Row> {
        self.rows.iter().find(|r| r.target == target)
    }
}

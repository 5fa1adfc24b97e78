//! Which resources and binding commands a template uses.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::expression_parser::Visitor;
use crate::schema::ResourceKind;
use crate::template::ir::{DomNode, ExprTable};
use crate::template::linking::{LinkedInstruction, LinkedModule, LinkedTemplate, ResourceRefs};
use crate::template::lowering::META_ELEMENTS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUsage {
    /// Custom elements, resolved or not.
    pub elements: IndexSet<String>,
    pub attributes: IndexSet<String>,
    pub controllers: IndexSet<String>,
    pub converters: IndexSet<String>,
    pub behaviors: IndexSet<String>,
    pub commands: IndexSet<String>,
    /// Every tag in the template, native ones included.
    pub tags: IndexSet<String>,
}

impl TemplateUsage {
    pub fn uses(&self, kind: ResourceKind, name: &str) -> bool {
        match kind {
            ResourceKind::CustomElement => self.elements.contains(name),
            ResourceKind::CustomAttribute => self.attributes.contains(name),
            ResourceKind::TemplateController => self.controllers.contains(name),
            ResourceKind::ValueConverter => self.converters.contains(name),
            ResourceKind::BindingBehavior => self.behaviors.contains(name),
        }
    }
}

pub fn collect_usage(linked: &LinkedModule, exprs: &ExprTable) -> TemplateUsage {
    let mut usage = TemplateUsage::default();
    collect_template(&linked.root, &mut usage);

    let mut refs = ResourceRefs::default();
    for entry in exprs.iter() {
        refs.visit_expr(&entry.ast);
    }
    for (kind, name) in refs.found {
        match kind {
            ResourceKind::ValueConverter => usage.converters.insert(name.name),
            _ => usage.behaviors.insert(name.name),
        };
    }
    tracing::trace!(
        elements = usage.elements.len(),
        controllers = usage.controllers.len(),
        commands = usage.commands.len(),
        "collected usage"
    );
    usage
}

fn collect_template(template: &LinkedTemplate, usage: &mut TemplateUsage) {
    template.dom.walk(&mut |node| {
        if let DomNode::Element(element) = node {
            if !META_ELEMENTS.contains(&element.tag.as_str()) {
                usage.tags.insert(element.tag.clone());
            }
        }
    });
    for row in &template.rows {
        for instruction in &row.instructions {
            collect_instruction(instruction, usage);
        }
    }
}

fn collect_instruction(instruction: &LinkedInstruction, usage: &mut TemplateUsage) {
    fn command(usage: &mut TemplateUsage, name: &str) {
        usage.commands.insert(name.to_string());
    }
    match instruction {
        LinkedInstruction::PropertyBinding(i) => command(usage, &i.ir.command),
        LinkedInstruction::ListenerBinding(i) => command(usage, if i.capture { "capture" } else { "trigger" }),
        LinkedInstruction::RefBinding(_) => command(usage, "ref"),
        LinkedInstruction::AttributeBinding(i) => {
            command(usage, if i.attr == "class" && i.to != "class" { "class" } else { "attr" })
        }
        LinkedInstruction::StylePropertyBinding(_) => command(usage, "style"),
        LinkedInstruction::IteratorBinding(_) => command(usage, "for"),
        LinkedInstruction::HydrateElement(e) => {
            usage.elements.insert(e.name.clone());
            e.props.iter().for_each(|p| collect_instruction(p, usage));
        }
        LinkedInstruction::HydrateAttribute(a) => {
            usage.attributes.insert(a.name.clone());
            a.props.iter().for_each(|p| collect_instruction(p, usage));
        }
        LinkedInstruction::HydrateTemplateController(c) => {
            usage.controllers.insert(c.name.clone());
            if let Some(cmd) = &c.command {
                if cmd != "for" {
                    command(usage, cmd);
                }
            }
            c.props.iter().for_each(|p| collect_instruction(p, usage));
            collect_template(&c.def, usage);
        }
        LinkedInstruction::TextBinding(_)
        | LinkedInstruction::Interpolation(_)
        | LinkedInstruction::SetProperty(_)
        | LinkedInstruction::SetAttribute(_)
        | LinkedInstruction::SetClassAttribute(_)
        | LinkedInstruction::SetStyleAttribute(_)
        | LinkedInstruction::HydrateLetElement(_) => {}
    }
}

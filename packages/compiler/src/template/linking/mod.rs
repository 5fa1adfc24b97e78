//! Resolution / Linking
//!
//! Resolves element, attribute, controller, converter and behavior names against a
//! `SemanticsLookup`. Misses produce "unknown X" diagnostics and stubs; misses on
//! resources with a catalog gap are downgraded to partial-confidence warnings.

pub mod controller_decisions;
pub mod linked;

use crate::diagnostics::{
    reason, BindableOwnerKind, BindableRef, CompilerDiagnostic, DiagnosticCode, DiagnosticData, Stage,
};
use crate::expression_parser::{walk_expr, Expr, Identifier, Visitor};
use crate::schema::{
    Bindable, BindingMode, BranchRelationship, ControllerConfig, ResourceKind, SemanticsLookup,
};
use crate::template::ir::*;

pub use controller_decisions::{classify_controller, ControllerClass};
pub use linked::*;

#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Check value converter and binding behavior names used in expressions.
    pub check_expression_resources: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        LinkOptions {
            check_expression_resources: true,
        }
    }
}

pub fn link_module(ir: &IrModule, lookup: &SemanticsLookup, options: &LinkOptions) -> LinkedModule {
    let mut linker = Linker {
        lookup,
        diagnostics: Vec::new(),
        enclosing: Vec::new(),
    };
    let root = linker.link_template(&ir.root);
    if options.check_expression_resources {
        linker.check_expression_resources(&ir.expr_table);
    }

    let mut module = LinkedModule {
        name: ir.name.clone(),
        root,
        diagnostics: linker.diagnostics,
        node_templates: Default::default(),
    };
    module.index_nodes();
    tracing::debug!(
        template = %module.name,
        nodes = module.node_templates.len(),
        diagnostics = module.diagnostics.len(),
        "linked template"
    );
    module
}

/// Default mode for a native property: two-way for form values, to-view otherwise.
pub fn native_default_mode(tag: Option<&str>, property: &str) -> BindingMode {
    let two_way = match (tag, property) {
        (Some("input" | "textarea" | "select"), "value") => true,
        (Some("input"), "checked" | "files" | "valueAsNumber" | "valueAsDate") => true,
        (_, "scrollTop" | "scrollLeft") => true,
        _ => false,
    };
    if two_way {
        BindingMode::TwoWay
    } else {
        BindingMode::ToView
    }
}

fn effective_mode(mode: BindingMode, target: &BindingTarget, tag: Option<&str>) -> BindingMode {
    if mode != BindingMode::Default {
        return mode;
    }
    match target {
        BindingTarget::Native { property } => native_default_mode(tag, property),
        other => match other.bindable().map(|b| b.mode) {
            Some(mode) if mode != BindingMode::Default => mode,
            _ => BindingMode::ToView,
        },
    }
}

/// `(authored attribute, property, loc)` of a property-like instruction.
fn prop_names(instruction: &Instruction) -> Option<(&str, &str, AttrLoc)> {
    match instruction {
        Instruction::PropertyBinding(p) => Some((&p.attr, &p.to, p.loc)),
        Instruction::Interpolation(p) => Some((&p.attr, &p.to, p.loc)),
        Instruction::SetProperty(p) => Some((&p.attr, &p.to, p.loc)),
        _ => None,
    }
}

struct Linker<'a> {
    lookup: &'a SemanticsLookup,
    diagnostics: Vec<CompilerDiagnostic>,
    /// Controllers whose definitions enclose the template being linked.
    enclosing: Vec<ControllerConfig>,
}

impl<'a> Linker<'a> {
    fn link_template(&mut self, template: &IrTemplate) -> LinkedTemplate {
        let mut rows = Vec::with_capacity(template.rows.len());
        for row in &template.rows {
            let tag = match template.dom.find(row.target) {
                Some(DomNode::Element(el)) => Some(el.tag.clone()),
                _ => None,
            };
            let mut instructions = Vec::with_capacity(row.instructions.len());
            for instruction in &row.instructions {
                let linked = match instruction {
                    Instruction::HydrateElement(h) => Some(self.link_element(h)),
                    Instruction::HydrateAttribute(h) => Some(self.link_attribute(h)),
                    Instruction::HydrateTemplateController(h) => {
                        Some(self.link_controller(template, row.target, h))
                    }
                    other => self.link_plain(other, BindingTarget::Unknown, tag.as_deref()),
                };
                instructions.extend(linked);
            }
            rows.push(LinkedRow {
                target: row.target,
                instructions,
            });
        }
        LinkedTemplate {
            name: template.name.clone(),
            dom: template.dom.clone(),
            rows,
        }
    }

    /// Instructions that carry no resource. Property-like ones write `target`,
    /// or the native property when `target` is unknown and the owner is a plain node.
    fn link_plain(&mut self, instruction: &Instruction, target: BindingTarget, tag: Option<&str>) -> Option<LinkedInstruction> {
        let native = |to: &str, target: BindingTarget| match target {
            BindingTarget::Unknown => BindingTarget::Native { property: to.to_string() },
            other => other,
        };
        Some(match instruction {
            Instruction::PropertyBinding(b) => {
                let target = native(&b.to, target);
                LinkedInstruction::PropertyBinding(LinkedPropertyBinding {
                    effective_mode: effective_mode(b.mode, &target, tag),
                    ir: b.clone(),
                    target,
                })
            }
            Instruction::Interpolation(i) => LinkedInstruction::Interpolation(LinkedInterpolation {
                target: native(&i.to, target),
                ir: i.clone(),
            }),
            Instruction::SetProperty(s) => LinkedInstruction::SetProperty(LinkedSetProperty {
                target: native(&s.to, target),
                ir: s.clone(),
            }),
            Instruction::AttributeBinding(b) => LinkedInstruction::AttributeBinding(b.clone()),
            Instruction::StylePropertyBinding(b) => LinkedInstruction::StylePropertyBinding(b.clone()),
            Instruction::ListenerBinding(b) => LinkedInstruction::ListenerBinding(b.clone()),
            Instruction::RefBinding(b) => LinkedInstruction::RefBinding(b.clone()),
            Instruction::TextBinding(b) => LinkedInstruction::TextBinding(b.clone()),
            Instruction::SetAttribute(b) => LinkedInstruction::SetAttribute(b.clone()),
            Instruction::SetClassAttribute(b) => LinkedInstruction::SetClassAttribute(b.clone()),
            Instruction::SetStyleAttribute(b) => LinkedInstruction::SetStyleAttribute(b.clone()),
            Instruction::IteratorBinding(b) => LinkedInstruction::IteratorBinding(b.clone()),
            Instruction::HydrateLetElement(b) => LinkedInstruction::HydrateLetElement(b.clone()),
            Instruction::HydrateElement(_)
            | Instruction::HydrateAttribute(_)
            | Instruction::HydrateTemplateController(_) => return None,
        })
    }

    fn report(&mut self, diagnostic: CompilerDiagnostic, gap: bool) {
        self.diagnostics.push(if gap { diagnostic.partial() } else { diagnostic });
    }

    fn link_element(&mut self, h: &HydrateElementIR) -> LinkedInstruction {
        let res = self.lookup.element(&h.res).cloned();
        let gap = self.lookup.has_gap(ResourceKind::CustomElement, &h.res);
        if res.is_none() {
            let diagnostic = CompilerDiagnostic::error(
                DiagnosticCode::UnknownElement,
                Stage::Link,
                format!("Unknown custom element '<{}>'", h.res),
                Some(h.name_span),
            )
            .with_data(DiagnosticData::resource(ResourceKind::CustomElement, h.res.clone()));
            self.report(diagnostic, gap);
        }

        let tag = Some(h.res.as_str());
        let mut unmatched = Vec::new();
        let mut props = Vec::with_capacity(h.props.len());
        for prop in &h.props {
            let target = match (&res, prop_names(prop)) {
                (Some(def), Some((attr, to, loc))) => match def.bindable(attr) {
                    Some(bindable) => BindingTarget::ElementBindable {
                        owner: def.name.clone(),
                        bindable: bindable.clone(),
                    },
                    None => {
                        unmatched.push((attr.to_string(), loc));
                        BindingTarget::Native { property: to.to_string() }
                    }
                },
                // Unresolved owner: keep the write but do not claim a native property.
                _ => BindingTarget::Unknown,
            };
            let linked = match prop {
                Instruction::PropertyBinding(b) => LinkedInstruction::PropertyBinding(LinkedPropertyBinding {
                    effective_mode: effective_mode(b.mode, &target, tag),
                    ir: b.clone(),
                    target,
                }),
                Instruction::Interpolation(i) => LinkedInstruction::Interpolation(LinkedInterpolation {
                    ir: i.clone(),
                    target,
                }),
                Instruction::SetProperty(s) => LinkedInstruction::SetProperty(LinkedSetProperty {
                    ir: s.clone(),
                    target,
                }),
                other => match self.link_plain(other, target, tag) {
                    Some(linked) => linked,
                    None => continue,
                },
            };
            props.push(linked);
        }

        // One partial diagnostic per element instance; the shape is unknown anyway.
        if gap && !unmatched.is_empty() {
            let names: Vec<&str> = unmatched.iter().map(|(n, _)| n.as_str()).collect();
            let diagnostic = CompilerDiagnostic::error(
                DiagnosticCode::UnknownBindable,
                Stage::Link,
                format!("Unknown bindable(s) {} on '<{}>'", names.join(", "), h.res),
                Some(unmatched[0].1.target_span),
            )
            .with_data(DiagnosticData {
                bindable: Some(BindableRef {
                    owner_kind: BindableOwnerKind::Element,
                    owner_name: h.res.clone(),
                    name: unmatched[0].0.clone(),
                }),
                ..Default::default()
            });
            self.report(diagnostic, true);
        }

        LinkedInstruction::HydrateElement(LinkedHydrateElement {
            name: h.res.clone(),
            containerless: res.as_ref().map_or(h.containerless, |r| r.containerless),
            res,
            props,
            span: h.span,
            name_span: h.name_span,
            end_name_span: h.end_name_span,
        })
    }

    fn link_attribute(&mut self, h: &HydrateAttributeIR) -> LinkedInstruction {
        let res = self.lookup.attribute(&h.res).cloned();
        let gap = self.lookup.has_gap(ResourceKind::CustomAttribute, &h.res);
        if res.is_none() {
            let diagnostic = CompilerDiagnostic::error(
                DiagnosticCode::UnknownAttribute,
                Stage::Link,
                format!("Unknown custom attribute '{}'", h.res),
                Some(h.loc.target_span),
            )
            .with_data(DiagnosticData::resource(ResourceKind::CustomAttribute, h.res.clone()));
            self.report(diagnostic, gap);
        }

        let mut props = Vec::with_capacity(h.props.len());
        for prop in &h.props {
            let target = match (&res, prop_names(prop)) {
                (Some(def), Some((attr, _, loc))) => match def.bindable(attr) {
                    Some(bindable) => BindingTarget::AttributeBindable {
                        owner: def.name.clone(),
                        bindable: bindable.clone(),
                    },
                    None => {
                        let diagnostic = CompilerDiagnostic::error(
                            DiagnosticCode::UnknownBindable,
                            Stage::Link,
                            format!("'{}' has no bindable '{}'", def.name, attr),
                            Some(loc.target_span),
                        )
                        .with_data(DiagnosticData {
                            bindable: Some(BindableRef {
                                owner_kind: BindableOwnerKind::Attribute,
                                owner_name: def.name.clone(),
                                name: attr.to_string(),
                            }),
                            ..Default::default()
                        });
                        self.report(diagnostic, gap);
                        BindingTarget::Unknown
                    }
                },
                _ => BindingTarget::Unknown,
            };
            props.extend(self.link_owned_prop(prop, target));
        }

        LinkedInstruction::HydrateAttribute(LinkedHydrateAttribute {
            name: h.res.clone(),
            res,
            props,
            loc: h.loc,
        })
    }

    /// Props of attributes and controllers keep `Unknown` targets as-is.
    fn link_owned_prop(&mut self, prop: &Instruction, target: BindingTarget) -> Option<LinkedInstruction> {
        Some(match prop {
            Instruction::PropertyBinding(b) => LinkedInstruction::PropertyBinding(LinkedPropertyBinding {
                effective_mode: effective_mode(b.mode, &target, None),
                ir: b.clone(),
                target,
            }),
            Instruction::Interpolation(i) => LinkedInstruction::Interpolation(LinkedInterpolation {
                ir: i.clone(),
                target,
            }),
            Instruction::SetProperty(s) => LinkedInstruction::SetProperty(LinkedSetProperty {
                ir: s.clone(),
                target,
            }),
            other => return self.link_plain(other, target, None),
        })
    }

    fn link_controller(&mut self, template: &IrTemplate, host: NodeId, h: &HydrateTemplateControllerIR) -> LinkedInstruction {
        let class = classify_controller(self.lookup, &h.res, h.command.as_deref(), &self.enclosing);
        let gap = self.lookup.has_gap(ResourceKind::TemplateController, &h.res);
        match &class {
            ControllerClass::Unresolved(_) => {
                let diagnostic = CompilerDiagnostic::error(
                    DiagnosticCode::UnknownController,
                    Stage::Link,
                    format!("Unknown template controller '{}'", h.res),
                    Some(h.loc.target_span),
                )
                .with_data(DiagnosticData::resource(ResourceKind::TemplateController, h.res.clone()));
                self.report(diagnostic, gap);
            }
            ControllerClass::Resolved(config) => self.check_branch_placement(template, host, config, h),
            ControllerClass::Branch { .. } => {}
        }
        let (config, resolved) = class.into_config();

        let mut props = Vec::new();
        match controller_decisions::iterator_command_mismatch(&config, h.command.as_deref()) {
            Some(why) if resolved => {
                let message = if why == reason::ITERATOR_COMMAND_REQUIRED {
                    format!("'{}' must be used with '.for'", h.res)
                } else {
                    format!("'{}' does not accept '.for'", h.res)
                };
                self.diagnostics.push(
                    CompilerDiagnostic::error(
                        DiagnosticCode::IteratorCommandMismatch,
                        Stage::Link,
                        message,
                        Some(h.loc.name_span),
                    )
                    .with_data(DiagnosticData {
                        name: Some(h.res.clone()),
                        ..DiagnosticData::reason(why)
                    }),
                );
            }
            _ => {
                for prop in &h.props {
                    let linked = match prop {
                        Instruction::IteratorBinding(b) => Some(self.link_iterator(&config, b)),
                        other => {
                            let target = match prop_names(other) {
                                Some((_, to, _)) => BindingTarget::ControllerProp {
                                    owner: config.name.clone(),
                                    bindable: config
                                        .bindables
                                        .get(to)
                                        .cloned()
                                        .unwrap_or_else(|| Bindable::new(to)),
                                },
                                None => BindingTarget::Unknown,
                            };
                            self.link_owned_prop(other, target)
                        }
                    };
                    props.extend(linked);
                }
            }
        }

        self.enclosing.push(config.clone());
        let def = self.link_template(&h.def);
        self.enclosing.pop();

        LinkedInstruction::HydrateTemplateController(LinkedHydrateTemplateController {
            name: h.res.clone(),
            res: config,
            resolved,
            props,
            def: Box::new(def),
            alias: h.alias.clone(),
            command: h.command.clone(),
            loc: h.loc,
        })
    }

    fn link_iterator(&mut self, config: &ControllerConfig, binding: &IteratorBindingIR) -> LinkedInstruction {
        let mut kept = binding.clone();
        kept.tail.retain(|tail| match controller_decisions::tail_prop_violation(config, tail) {
            None => true,
            Some(why) => {
                let message = if why == reason::TAIL_PROP_MODE {
                    format!(
                        "'{}' accepts only '.bind' or a plain value, not '.{}'",
                        tail.to,
                        tail.command.as_deref().unwrap_or_default()
                    )
                } else {
                    format!("'{}' does not accept '{}'", config.name, tail.to)
                };
                self.diagnostics.push(
                    CompilerDiagnostic::error(DiagnosticCode::InvalidTailProp, Stage::Link, message, Some(tail.span))
                        .with_data(DiagnosticData {
                            name: Some(tail.to.clone()),
                            ..DiagnosticData::reason(why)
                        }),
                );
                false
            }
        });
        LinkedInstruction::IteratorBinding(kept)
    }

    /// Branches must follow (sibling) or sit inside (child) one of their parents.
    fn check_branch_placement(
        &mut self,
        template: &IrTemplate,
        host: NodeId,
        config: &ControllerConfig,
        h: &HydrateTemplateControllerIR,
    ) {
        let parents = config.branch_parents();
        if parents.is_empty() {
            return;
        }
        let placed = match controller_decisions::branch_relationship(self.lookup, config) {
            Some(BranchRelationship::Sibling) => previous_element_sibling(&template.dom.children, host)
                .and_then(|sibling| template.row(sibling))
                .map_or(false, |row| {
                    row.instructions.iter().any(|i| match i {
                        Instruction::HydrateTemplateController(c) => {
                            parents.iter().any(|p| p.eq_ignore_ascii_case(&c.res))
                        }
                        _ => false,
                    })
                }),
            Some(BranchRelationship::Child) | None => {
                self.enclosing.iter().any(|c| parents.iter().any(|p| *p == c.name))
            }
        };
        if !placed {
            self.diagnostics.push(
                CompilerDiagnostic::error(
                    DiagnosticCode::OrphanBranch,
                    Stage::Link,
                    format!("'{}' must be used with {}", h.res, parents.join(" or ")),
                    Some(h.loc.target_span),
                )
                .with_data(DiagnosticData {
                    name: Some(h.res.clone()),
                    ..DiagnosticData::reason(reason::BRANCH_PARENT)
                }),
            );
        }
    }

    fn check_expression_resources(&mut self, table: &ExprTable) {
        let mut refs = ResourceRefs::default();
        for entry in table.iter() {
            refs.visit_expr(&entry.ast);
        }
        for (kind, name) in refs.found {
            let known = match kind {
                ResourceKind::ValueConverter => self.lookup.value_converter(&name.name).is_some(),
                _ => self.lookup.binding_behavior(&name.name).is_some(),
            };
            if known {
                continue;
            }
            let (code, label) = match kind {
                ResourceKind::ValueConverter => (DiagnosticCode::UnknownConverter, "value converter"),
                _ => (DiagnosticCode::UnknownBehavior, "binding behavior"),
            };
            let gap = self.lookup.has_gap(kind, &name.name);
            let diagnostic = CompilerDiagnostic::error(
                code,
                Stage::Link,
                format!("Unknown {label} '{}'", name.name),
                Some(name.span),
            )
            .with_data(DiagnosticData::resource(kind, name.name.clone()));
            self.report(diagnostic, gap);
        }
    }
}

fn previous_element_sibling(children: &[DomNode], id: NodeId) -> Option<NodeId> {
    let mut previous = None;
    for child in children {
        if child.id() == id {
            return previous;
        }
        match child {
            DomNode::Element(_) | DomNode::Template(_) => previous = Some(child.id()),
            DomNode::Text(t) if !t.text.trim().is_empty() => previous = None,
            _ => {}
        }
        if let Some(found) = previous_element_sibling(child.children(), id) {
            return Some(found);
        }
    }
    None
}

/// Converter and behavior names referenced by an expression tree.
#[derive(Default)]
pub(crate) struct ResourceRefs {
    pub(crate) found: Vec<(ResourceKind, Identifier)>,
}

impl Visitor for ResourceRefs {
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::ValueConverter(vc) => self.found.push((ResourceKind::ValueConverter, vc.name.clone())),
            Expr::BindingBehavior(bb) => self.found.push((ResourceKind::BindingBehavior, bb.name.clone())),
            _ => {}
        }
        walk_expr(self, expr);
    }
}

//! Element lowering: attribute classification, controller nesting and bindings.

use super::attribute_syntax::{
    attr_to_property, looks_like_multi_binding, parse_attribute_name, split_multi_bindings, AttrSyntax,
    PROPERTY_COMMANDS,
};
use super::Lowerer;
use crate::diagnostics::{CompilerDiagnostic, DiagnosticCode, DiagnosticData, Stage};
use crate::expression_parser::{Expr, ExpressionType, Identifier};
use crate::ml_parser::{Attribute, Element, Node};
use crate::parse_util::{OffsetMap, SourceSpan};
use crate::schema::{BindingMode, ControllerTrigger, ResourceKind};
use crate::template::ir::*;
use crate::util::dash_case_to_camel_case;

/// Dashed names defined by SVG/MathML that are not custom elements.
const NATIVE_DASHED_TAGS: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

pub(crate) const META_ELEMENTS: &[&str] = &["bindable", "containerless", "alias", "use-shadow-dom", "import", "require"];

pub fn is_custom_element_tag(tag: &str) -> bool {
    tag.contains('-') && !NATIVE_DASHED_TAGS.contains(&tag)
}

struct ControllerPart {
    res: String,
    props: Vec<Instruction>,
    alias: Option<Identifier>,
    command: Option<String>,
    loc: AttrLoc,
}

impl ControllerPart {
    fn into_instruction(self, mut def: IrTemplate) -> Instruction {
        def.name = self.res.clone();
        Instruction::HydrateTemplateController(HydrateTemplateControllerIR {
            res: self.res,
            props: self.props,
            def: Box::new(def),
            alias: self.alias,
            command: self.command,
            loc: self.loc,
        })
    }
}

fn attr_loc(attr: &Attribute, syntax: &AttrSyntax) -> AttrLoc {
    AttrLoc {
        span: attr.span,
        target_span: syntax.target_span(attr.name_span),
        name_span: attr.name_span,
        value_span: attr.value_span,
    }
}

fn dom_attr(attr: &Attribute) -> DomAttr {
    DomAttr {
        name: attr.name.clone(),
        value: attr.value_span.map(|_| attr.value.clone()),
        span: attr.span,
        name_span: attr.name_span,
        value_span: attr.value_span,
    }
}

fn placeholder_host(el: &Element, id: NodeId) -> ElementNode {
    ElementNode {
        id,
        tag: el.name.clone(),
        attrs: Vec::new(),
        children: Vec::new(),
        span: el.span,
        name_span: el.name_span,
        end_name_span: el.end_name_span(),
        self_closing: el.self_closing,
    }
}

impl<'a> Lowerer<'a> {
    pub(crate) fn lower_node(&mut self, node: &Node, rows: &mut Vec<Row>) -> Option<DomNode> {
        match node {
            Node::Text(text) => {
                let id = self.ids.alloc();
                if let Some(from) = self.add_interpolation(&text.value, &text.value_map) {
                    rows.push(Row {
                        target: id,
                        instructions: vec![Instruction::TextBinding(TextBindingIR { from, span: text.span })],
                    });
                }
                Some(DomNode::Text(TextNode {
                    id,
                    text: text.value.clone(),
                    span: text.span,
                }))
            }
            Node::Comment(comment) => Some(DomNode::Comment(CommentNode {
                id: self.ids.alloc(),
                text: comment.value.clone(),
                span: comment.span,
            })),
            Node::Element(el) if META_ELEMENTS.contains(&el.name.as_str()) => {
                self.fold_meta_element(el);
                None
            }
            Node::Element(el) if el.name == "let" => Some(self.lower_let(el, rows)),
            Node::Element(el) => Some(self.lower_element(el, rows)),
        }
    }

    pub(crate) fn is_controller_attr(&self, syntax: &AttrSyntax) -> bool {
        if syntax.command.as_deref() == Some("for") {
            return true;
        }
        syntax.is_value_usage()
            && (self.lookup.controller(&syntax.target).is_some()
                || self.lookup.has_gap(ResourceKind::TemplateController, &syntax.target))
    }

    fn is_custom_attr(&self, syntax: &AttrSyntax) -> bool {
        syntax.is_value_usage()
            && (self.lookup.attribute(&syntax.target).is_some()
                || self.lookup.has_gap(ResourceKind::CustomAttribute, &syntax.target))
    }

    fn is_custom_element(&self, tag: &str) -> bool {
        self.lookup.element(tag).is_some()
            || self.lookup.has_gap(ResourceKind::CustomElement, tag)
            || is_custom_element_tag(tag)
    }

    fn lower_element(&mut self, el: &Element, rows: &mut Vec<Row>) -> DomNode {
        let host_id = self.ids.alloc();
        let mut controllers = Vec::new();
        let mut rest = Vec::new();
        for attr in &el.attrs {
            let syntax = parse_attribute_name(&attr.name);
            if self.is_controller_attr(&syntax) {
                controllers.push((attr, syntax));
            } else {
                rest.push((attr, syntax));
            }
        }
        if controllers.is_empty() {
            return self.lower_plain_element(el, host_id, &rest, rows);
        }

        // Controller values are registered outermost first, before the content.
        let mut parts: Vec<ControllerPart> = controllers
            .iter()
            .map(|(attr, syntax)| self.lower_controller_attr(attr, syntax))
            .collect();

        let mut inner_rows = Vec::new();
        let view_id = self.ids.alloc();
        let children = if el.name == "template" && rest.is_empty() {
            self.lower_children(&el.children, &mut inner_rows)
        } else {
            let id = self.ids.alloc();
            vec![self.lower_plain_element(el, id, &rest, &mut inner_rows)]
        };
        let mut def = IrTemplate {
            name: String::new(),
            dom: TemplateNode {
                id: view_id,
                attrs: Vec::new(),
                children,
                span: Some(el.span),
            },
            rows: inner_rows,
        };

        let outermost = parts.remove(0);
        for part in parts.into_iter().rev() {
            let instruction = part.into_instruction(def);
            let host = self.ids.alloc();
            let view = self.ids.alloc();
            def = IrTemplate {
                name: String::new(),
                dom: TemplateNode {
                    id: view,
                    attrs: Vec::new(),
                    children: vec![DomNode::Element(placeholder_host(el, host))],
                    span: Some(el.span),
                },
                rows: vec![Row {
                    target: host,
                    instructions: vec![instruction],
                }],
            };
        }
        rows.push(Row {
            target: host_id,
            instructions: vec![outermost.into_instruction(def)],
        });
        DomNode::Element(placeholder_host(el, host_id))
    }

    fn lower_controller_attr(&mut self, attr: &Attribute, syntax: &AttrSyntax) -> ControllerPart {
        let loc = attr_loc(attr, syntax);
        let config = self.lookup.controller(&syntax.target).cloned();
        let prop = config
            .as_ref()
            .and_then(|c| c.value_prop())
            .unwrap_or("value")
            .to_string();
        let mut part = ControllerPart {
            res: syntax.target.clone(),
            props: Vec::new(),
            alias: None,
            command: syntax.command.clone(),
            loc,
        };
        let value = attr.value.as_str();
        let map = &attr.value_map;

        if let Some(config) = &config {
            if config.alias_source().is_some() {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    let at = value.find(trimmed).unwrap_or(0);
                    part.alias = Some(Identifier::new(trimmed, map.span(at, at + trimmed.len())));
                }
                return part;
            }
            if config.trigger == ControllerTrigger::Marker {
                return part;
            }
        }

        match syntax.command.as_deref() {
            Some("for") => {
                let from = self.add_expr(value, ExpressionType::IsIterator, map);
                let tail = self.lower_iterator_tail(from, value, map);
                part.props.push(Instruction::IteratorBinding(IteratorBindingIR {
                    to: prop,
                    from,
                    tail,
                    loc,
                }));
            }
            Some(command) => {
                let from = self.add_expr(value, ExpressionType::IsProperty, map);
                part.props.push(Instruction::PropertyBinding(PropertyBindingIR {
                    attr: prop.clone(),
                    to: prop,
                    from,
                    mode: BindingMode::from_command(command).unwrap_or_default(),
                    command: command.to_string(),
                    loc,
                }));
            }
            None => {
                if let Some(from) = self.add_interpolation(value, map) {
                    part.props.push(Instruction::Interpolation(InterpolationIR {
                        attr: prop.clone(),
                        to: prop,
                        from,
                        loc,
                    }));
                } else if !value.is_empty() {
                    part.props.push(Instruction::SetProperty(SetPropertyIR {
                        attr: prop.clone(),
                        to: prop,
                        value: value.to_string(),
                        loc,
                    }));
                }
            }
        }
        part
    }

    fn lower_iterator_tail(&mut self, header: ExprId, value: &str, map: &OffsetMap) -> Vec<IteratorTailPropIR> {
        let semi = match self.exprs.ast(header) {
            Some(Expr::ForOfStatement(for_of)) if for_of.semi_idx >= 0 => for_of.semi_idx as usize,
            _ => return Vec::new(),
        };
        let Some(tail_text) = value.get(semi + 1..) else {
            return Vec::new();
        };
        let tail_map = map.view(semi + 1);
        let mut tail = Vec::new();
        for part in split_multi_bindings(tail_text) {
            let name_span = tail_map.span(part.target_range.0, part.target_range.1);
            let value_at = tail_map.view(part.value_range.0);
            let tail_value = match part.command {
                Some(_) => TailValue::Expr(self.add_expr(&part.value, ExpressionType::IsProperty, &value_at)),
                None => TailValue::Literal(part.value.clone()),
            };
            tail.push(IteratorTailPropIR {
                to: part.target.clone(),
                command: part.command.clone(),
                value: tail_value,
                span: SourceSpan::new(name_span.start, tail_map.source(part.value_range.1)),
                name_span,
            });
        }
        tail
    }

    fn lower_plain_element(
        &mut self,
        el: &Element,
        id: NodeId,
        attrs: &[(&Attribute, AttrSyntax)],
        rows: &mut Vec<Row>,
    ) -> DomNode {
        let tag = el.name.as_str();
        let custom = self.is_custom_element(tag);
        let element_def = self.lookup.element(tag).cloned();
        let containerless = element_def.as_ref().map_or(false, |d| d.containerless);

        let mut element_props = Vec::new();
        let mut attribute_instructions = Vec::new();
        let mut bindings = Vec::new();
        let mut dom_attrs = Vec::new();

        for (attr, syntax) in attrs {
            if self.is_custom_attr(syntax) {
                attribute_instructions.push(self.lower_custom_attribute(attr, syntax));
                continue;
            }
            if !syntax.is_known_command() {
                self.diagnostics.push(
                    CompilerDiagnostic::error(
                        DiagnosticCode::UnknownCommand,
                        Stage::Lower,
                        format!(
                            "Unknown binding command '{}' in '{}'",
                            syntax.command.as_deref().unwrap_or_default(),
                            attr.name
                        ),
                        Some(attr.name_span),
                    )
                    .with_data(DiagnosticData {
                        name: syntax.command.clone(),
                        ..Default::default()
                    }),
                );
                continue;
            }
            match self.lower_binding(tag, attr, syntax) {
                Some(instruction) => {
                    let is_prop = matches!(
                        instruction,
                        Instruction::PropertyBinding(_) | Instruction::Interpolation(_)
                    );
                    if custom && is_prop {
                        element_props.push(instruction);
                    } else {
                        bindings.push(instruction);
                    }
                }
                None => {
                    let loc = attr_loc(attr, syntax);
                    let bindable = element_def.as_ref().and_then(|d| d.bindable(&attr.name));
                    if let Some(bindable) = bindable {
                        element_props.push(Instruction::SetProperty(SetPropertyIR {
                            attr: attr.name.clone(),
                            to: bindable.name.clone(),
                            value: attr.value.clone(),
                            loc,
                        }));
                        continue;
                    }
                    if !custom {
                        dom_attrs.push(dom_attr(attr));
                        continue;
                    }
                    let value = attr.value.clone();
                    match attr.name.as_str() {
                        "class" => bindings.push(Instruction::SetClassAttribute(SetStaticAttrIR { value, loc })),
                        "style" => bindings.push(Instruction::SetStyleAttribute(SetStaticAttrIR { value, loc })),
                        // A containerless element has no host to carry the attribute.
                        _ if containerless => bindings.push(Instruction::SetAttribute(SetAttributeIR {
                            to: attr.name.clone(),
                            value,
                            loc,
                        })),
                        _ => dom_attrs.push(dom_attr(attr)),
                    }
                }
            }
        }

        let mut instructions = Vec::new();
        if custom {
            instructions.push(Instruction::HydrateElement(HydrateElementIR {
                res: tag.to_string(),
                props: element_props,
                containerless,
                span: el.span,
                name_span: el.name_span,
                end_name_span: el.end_name_span(),
            }));
        }
        instructions.extend(attribute_instructions);
        instructions.extend(bindings);
        if !instructions.is_empty() {
            rows.push(Row { target: id, instructions });
        }

        let children = self.lower_children(&el.children, rows);
        if tag == "template" {
            return DomNode::Template(TemplateNode {
                id,
                attrs: dom_attrs,
                children,
                span: Some(el.span),
            });
        }
        DomNode::Element(ElementNode {
            id,
            tag: tag.to_string(),
            attrs: dom_attrs,
            children,
            span: el.span,
            name_span: el.name_span,
            end_name_span: el.end_name_span(),
            self_closing: el.self_closing,
        })
    }

    /// Lower a non-controller, non-custom-attribute attribute. `None` means static.
    fn lower_binding(&mut self, tag: &str, attr: &Attribute, syntax: &AttrSyntax) -> Option<Instruction> {
        let loc = attr_loc(attr, syntax);
        let value = attr.value.as_str();
        let map = &attr.value_map;
        let target = syntax.target.clone();
        let Some(command) = syntax.command.clone() else {
            return self.lower_interpolated_attr(tag, attr, syntax);
        };
        let instruction = match command.as_str() {
            c if PROPERTY_COMMANDS.contains(&c) => {
                let from = if value.trim().is_empty() {
                    // `value.bind` with no value binds the same-named property.
                    self.add_expr(
                        &dash_case_to_camel_case(&target),
                        ExpressionType::IsProperty,
                        &OffsetMap::verbatim(loc.target_span.start),
                    )
                } else {
                    self.add_expr(value, ExpressionType::IsProperty, map)
                };
                Instruction::PropertyBinding(PropertyBindingIR {
                    to: attr_to_property(tag, &target),
                    attr: target,
                    from,
                    mode: BindingMode::from_command(c).unwrap_or_default(),
                    command: command.clone(),
                    loc,
                })
            }
            "trigger" | "capture" => Instruction::ListenerBinding(ListenerBindingIR {
                from: self.add_expr(value, ExpressionType::IsFunction, map),
                to: target,
                capture: command == "capture",
                modifier: syntax.modifier.clone(),
                loc,
            }),
            "ref" => Instruction::RefBinding(RefBindingIR {
                from: self.add_expr(value, ExpressionType::IsProperty, map),
                to: target,
                loc,
            }),
            "attr" => Instruction::AttributeBinding(AttributeBindingIR {
                from: self.add_expr(value, ExpressionType::IsProperty, map),
                attr: target.clone(),
                to: target,
                loc,
            }),
            "class" => Instruction::AttributeBinding(AttributeBindingIR {
                from: self.add_expr(value, ExpressionType::IsProperty, map),
                attr: "class".to_string(),
                to: target,
                loc,
            }),
            "style" => Instruction::StylePropertyBinding(StylePropertyBindingIR {
                from: self.add_expr(value, ExpressionType::IsProperty, map),
                to: target,
                loc,
            }),
            _ => return None,
        };
        Some(instruction)
    }

    fn lower_interpolated_attr(&mut self, tag: &str, attr: &Attribute, syntax: &AttrSyntax) -> Option<Instruction> {
        let from = self.add_interpolation(&attr.value, &attr.value_map)?;
        Some(Instruction::Interpolation(InterpolationIR {
            attr: syntax.target.clone(),
            to: attr_to_property(tag, &syntax.target),
            from,
            loc: attr_loc(attr, syntax),
        }))
    }

    fn lower_custom_attribute(&mut self, attr: &Attribute, syntax: &AttrSyntax) -> Instruction {
        let def = self.lookup.attribute(&syntax.target).cloned();
        let loc = attr_loc(attr, syntax);
        let value = attr.value.as_str();
        let map = &attr.value_map;
        let mut props = Vec::new();

        let multi = syntax.command.is_none()
            && def.as_ref().map_or(true, |d| !d.no_multi_bindings)
            && looks_like_multi_binding(value);
        if multi {
            for part in split_multi_bindings(value) {
                let target_span = map.span(part.target_range.0, part.target_range.1);
                let value_span = map.span(part.value_range.0, part.value_range.1);
                let part_loc = AttrLoc {
                    span: SourceSpan::new(target_span.start, value_span.end),
                    target_span,
                    name_span: target_span,
                    value_span: Some(value_span),
                };
                let to = def
                    .as_ref()
                    .and_then(|d| d.bindable(&part.target))
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| dash_case_to_camel_case(&part.target));
                let at = map.view(part.value_range.0);
                if let Some(prop) =
                    self.lower_value_prop(part.target.clone(), to, part.command.as_deref(), &part.value, &at, part_loc)
                {
                    props.push(prop);
                }
            }
        } else {
            let (attr_name, to) = def
                .as_ref()
                .and_then(|d| d.primary_bindable())
                .map(|b| (b.attribute.clone(), b.name.clone()))
                .unwrap_or_else(|| ("value".to_string(), "value".to_string()));
            if let Some(prop) = self.lower_value_prop(attr_name, to, syntax.command.as_deref(), value, map, loc) {
                props.push(prop);
            }
        }

        Instruction::HydrateAttribute(HydrateAttributeIR {
            res: syntax.target.clone(),
            props,
            loc,
        })
    }

    /// A value bound to a resource property: binding command, interpolation or literal.
    fn lower_value_prop(
        &mut self,
        attr: String,
        to: String,
        command: Option<&str>,
        value: &str,
        at: &OffsetMap,
        loc: AttrLoc,
    ) -> Option<Instruction> {
        match command {
            Some(command) if PROPERTY_COMMANDS.contains(&command) => {
                let from = self.add_expr(value, ExpressionType::IsProperty, at);
                Some(Instruction::PropertyBinding(PropertyBindingIR {
                    attr,
                    to,
                    from,
                    mode: BindingMode::from_command(command).unwrap_or_default(),
                    command: command.to_string(),
                    loc,
                }))
            }
            Some(command) => {
                self.diagnostics.push(CompilerDiagnostic::error(
                    DiagnosticCode::UnknownCommand,
                    Stage::Lower,
                    format!("Binding command '{command}' cannot target property '{attr}'"),
                    Some(loc.name_span),
                ));
                None
            }
            None => match self.add_interpolation(value, at) {
                Some(from) => Some(Instruction::Interpolation(InterpolationIR { attr, to, from, loc })),
                None if value.is_empty() => None,
                None => Some(Instruction::SetProperty(SetPropertyIR {
                    attr,
                    to,
                    value: value.to_string(),
                    loc,
                })),
            },
        }
    }
}

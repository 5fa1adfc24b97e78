use super::attribute_syntax::{parse_attribute_name, PROPERTY_COMMANDS};
use super::Lowerer;
use crate::diagnostics::{reason, CompilerDiagnostic, DiagnosticCode, DiagnosticData, Stage};
use crate::expression_parser::{Expr, ExpressionType, LiteralValue, PrimitiveLiteral};
use crate::ml_parser::Element;
use crate::template::ir::*;
use crate::util::dash_case_to_camel_case;

const TO_BINDING_CONTEXT: &str = "to-binding-context";

impl<'a> Lowerer<'a> {
    /// `<let a.bind="x" b="${y}" c="lit" to-binding-context>` declares locals.
    pub(crate) fn lower_let(&mut self, el: &Element, rows: &mut Vec<Row>) -> DomNode {
        let id = self.ids.alloc();
        let mut bindings = Vec::new();
        let mut to_binding_context = false;

        for attr in &el.attrs {
            if attr.name == TO_BINDING_CONTEXT {
                to_binding_context = true;
                continue;
            }
            let syntax = parse_attribute_name(&attr.name);
            let loc = AttrLoc {
                span: attr.span,
                target_span: syntax.target_span(attr.name_span),
                name_span: attr.name_span,
                value_span: attr.value_span,
            };
            let map = &attr.value_map;
            let from = match syntax.command.as_deref() {
                Some(command) if PROPERTY_COMMANDS.contains(&command) => {
                    self.add_expr(&attr.value, ExpressionType::IsProperty, map)
                }
                Some(command) => {
                    self.diagnostics.push(
                        CompilerDiagnostic::error(
                            DiagnosticCode::InvalidLetCommand,
                            Stage::Lower,
                            format!(
                                "'{command}' is not valid on <let>; use one of {}",
                                PROPERTY_COMMANDS.join(", ")
                            ),
                            Some(attr.name_span),
                        )
                        .with_data(DiagnosticData {
                            name: Some(command.to_string()),
                            valid_commands: Some(PROPERTY_COMMANDS.iter().map(|c| c.to_string()).collect()),
                            ..DiagnosticData::reason(reason::LET_COMMAND)
                        }),
                    );
                    continue;
                }
                None => match self.add_interpolation(&attr.value, map) {
                    Some(from) => from,
                    None => {
                        let span = map.span(0, attr.value.len());
                        let literal = Expr::PrimitiveLiteral(PrimitiveLiteral {
                            value: LiteralValue::String(attr.value.clone()),
                            span,
                        });
                        self.exprs.add(literal, ExpressionType::IsProperty, span)
                    }
                },
            };
            bindings.push(LetBindingIR {
                to: dash_case_to_camel_case(&syntax.target),
                from,
                loc,
            });
        }

        rows.push(Row {
            target: id,
            instructions: vec![Instruction::HydrateLetElement(HydrateLetElementIR {
                bindings,
                to_binding_context,
                span: el.span,
            })],
        });
        DomNode::Element(ElementNode {
            id,
            tag: "let".to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
            span: el.span,
            name_span: el.name_span,
            end_name_span: el.end_name_span(),
            self_closing: el.self_closing,
        })
    }
}

//! AOT emission: the planned definition as JSON and as an ES module.

use indexmap::IndexSet;
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::template::ir::{ExprId, ExprTable};

use super::plan::{AotInstruction, AotPlanModule, AotTemplatePlan};
use super::AotOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct AotEmitResult {
    pub definition: Value,
    pub code: String,
}

fn collect_exprs(instruction: &AotInstruction, out: &mut IndexSet<ExprId>) {
    match instruction {
        AotInstruction::PropertyBinding { from, .. }
        | AotInstruction::Interpolation { from, .. }
        | AotInstruction::AttributeBinding { from, .. }
        | AotInstruction::StylePropertyBinding { from, .. }
        | AotInstruction::ListenerBinding { from, .. }
        | AotInstruction::RefBinding { from, .. }
        | AotInstruction::TextBinding { from } => {
            out.insert(*from);
        }
        AotInstruction::IteratorBinding { from, props, .. } => {
            out.insert(*from);
            out.extend(props.iter().filter_map(|p| p.from));
        }
        AotInstruction::HydrateElement { props, .. } | AotInstruction::HydrateAttribute { props, .. } => {
            props.iter().for_each(|p| collect_exprs(p, out));
        }
        AotInstruction::HydrateTemplateController { props, def, .. } => {
            props.iter().for_each(|p| collect_exprs(p, out));
            collect_template_exprs(def, out);
        }
        AotInstruction::HydrateLetElement { bindings, .. } => {
            out.extend(bindings.iter().map(|b| b.from));
        }
        AotInstruction::SetProperty { .. }
        | AotInstruction::SetAttribute { .. }
        | AotInstruction::SetClassAttribute { .. }
        | AotInstruction::SetStyleAttribute { .. } => {}
    }
}

fn collect_template_exprs(template: &AotTemplatePlan, out: &mut IndexSet<ExprId>) {
    for target in &template.targets {
        target.instructions.iter().for_each(|i| collect_exprs(i, out));
    }
}

fn instruction_json(instruction: &AotInstruction) -> Result<Value> {
    let mut value = serde_json::to_value(instruction)?;
    match instruction {
        AotInstruction::HydrateTemplateController { def, props, cases, .. } => {
            if let Value::Object(map) = &mut value {
                map.insert("def".to_string(), definition_json(def)?);
                map.insert("props".to_string(), instructions_json(props)?);
                if let Some(cases) = cases {
                    let cases = cases
                        .iter()
                        .map(|c| definition_json(&c.def))
                        .collect::<Result<Vec<_>>>()?;
                    map.insert("cases".to_string(), Value::Array(cases));
                }
            }
        }
        AotInstruction::HydrateElement { props, .. } | AotInstruction::HydrateAttribute { props, .. } => {
            if let Value::Object(map) = &mut value {
                map.insert("props".to_string(), instructions_json(props)?);
            }
        }
        _ => {}
    }
    Ok(value)
}

fn instructions_json(list: &[AotInstruction]) -> Result<Value> {
    Ok(Value::Array(list.iter().map(instruction_json).collect::<Result<Vec<_>>>()?))
}

/// `{name, template, instructions}` with one instruction list per target index.
fn definition_json(template: &AotTemplatePlan) -> Result<Value> {
    let mut rows = Vec::with_capacity(template.targets.len());
    for target in &template.targets {
        rows.push(instructions_json(&target.instructions)?);
    }
    Ok(json!({
        "name": template.name,
        "template": template.template,
        "instructions": rows,
        "needsCompile": false,
    }))
}

pub fn emit_aot(plan: &AotPlanModule, exprs: &ExprTable, options: &AotOptions) -> Result<AotEmitResult> {
    let mut definition = definition_json(&plan.root)?;

    if options.include_expressions {
        let mut ids = IndexSet::new();
        collect_template_exprs(&plan.root, &mut ids);
        let mut table = Map::new();
        for id in ids {
            if let Some(ast) = exprs.ast(id) {
                table.insert(id.0.to_string(), serde_json::to_value(ast)?);
            }
        }
        if let Value::Object(map) = &mut definition {
            map.insert("expressions".to_string(), Value::Object(table));
        }
    }

    let body = if options.pretty {
        serde_json::to_string_pretty(&definition)?
    } else {
        serde_json::to_string(&definition)?
    };
    let code = format!("export const {} = {};\n", options.export_name, body);
    Ok(AotEmitResult { definition, code })
}

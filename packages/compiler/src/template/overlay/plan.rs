//! Overlay planning: a type alias per scope frame and the lambdas evaluated in it.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::expression_parser::Expr;
use crate::parse_util::SourceSpan;
use crate::template::ir::{ExprId, ExprTable, FrameId};
use crate::template::linking::{LinkedInstruction, LinkedModule, LinkedTemplate};
use crate::template::scope::{ScopeFrame, ScopeModule};
use crate::template::typecheck::FrameAnalysis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLambdaPlan {
    pub expr_id: ExprId,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameOverlayPlan {
    pub frame: FrameId,
    pub type_name: String,
    pub type_expr: String,
    /// `$this` reads the frame's value overlay.
    pub has_overlay: bool,
    pub lambdas: Vec<OverlayLambdaPlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPlanModule {
    pub vm_type: String,
    pub prefix: String,
    pub frames: Vec<FrameOverlayPlan>,
}

impl OverlayPlanModule {
    pub fn frame(&self, id: FrameId) -> Option<&FrameOverlayPlan> {
        self.frames.iter().find(|f| f.frame == id)
    }

    pub fn lambda_count(&self) -> usize {
        self.frames.iter().map(|f| f.lambdas.len()).sum()
    }
}

/// Authored expressions that survived linking, in template order.
pub fn authored_exprs(linked: &LinkedModule) -> IndexSet<ExprId> {
    fn collect(template: &LinkedTemplate, out: &mut IndexSet<ExprId>) {
        for row in &template.rows {
            for instruction in &row.instructions {
                out.extend(instruction.exprs());
                if let LinkedInstruction::HydrateTemplateController(controller) = instruction {
                    collect(&controller.def, out);
                }
            }
        }
    }
    let mut out = IndexSet::new();
    collect(&linked.root, &mut out);
    out
}

fn quote_keys(names: &[&str]) -> String {
    names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(" | ")
}

fn omit(ty: &str, names: &[&str]) -> String {
    if names.is_empty() {
        ty.to_string()
    } else {
        format!("Omit<{ty}, {}>", quote_keys(names))
    }
}

fn frame_type_expr(
    frame: &ScopeFrame,
    analysis: &FrameAnalysis,
    vm_type: &str,
    parent_name: Option<&str>,
) -> (String, bool) {
    let mut locals: Vec<&str> = Vec::new();
    for symbol in &frame.symbols {
        if !locals.contains(&symbol.name.as_str()) {
            locals.push(&symbol.name);
        }
    }
    let overlay = analysis
        .hints
        .get(&frame.id)
        .and_then(|h| h.overlay.clone());

    let mut parts = Vec::new();
    // A value overlay replaces the inherited binding context.
    if overlay.is_none() {
        parts.push(omit(parent_name.unwrap_or(vm_type), &locals));
    }
    if let Some(overlay) = &overlay {
        parts.push(omit(overlay, &locals));
    }
    if !locals.is_empty() {
        let fields: Vec<String> = locals
            .iter()
            .map(|name| format!("{name}: {}", analysis.local_type(frame.id, name)))
            .collect();
        parts.push(format!("{{ {} }}", fields.join("; ")));
    }
    if let Some(parent) = parent_name {
        parts.push(format!("{{ $parent: {parent} }}"));
    }
    parts.push(format!("{{ $vm: {vm_type} }}"));
    if let Some(overlay) = &overlay {
        parts.push(format!("{{ $this: {overlay} }}"));
    }
    (parts.join(" & "), overlay.is_some())
}

pub fn plan_overlay(
    linked: &LinkedModule,
    scope: &ScopeModule,
    exprs: &ExprTable,
    analysis: &FrameAnalysis,
    prefix: &str,
) -> OverlayPlanModule {
    let vm_type = analysis.root_vm_type.clone();
    let type_name = |id: FrameId| format!("{prefix}F{}", id.as_usize());

    let mut frames: Vec<FrameOverlayPlan> = scope
        .frames
        .iter()
        .map(|frame| {
            let parent = frame.parent.map(type_name);
            let (type_expr, has_overlay) = frame_type_expr(frame, analysis, &vm_type, parent.as_deref());
            FrameOverlayPlan {
                frame: frame.id,
                type_name: type_name(frame.id),
                type_expr,
                has_overlay,
                lambdas: Vec::new(),
            }
        })
        .collect();

    for id in authored_exprs(linked) {
        let Some(entry) = exprs.get(id) else {
            continue;
        };
        if matches!(entry.ast, Expr::ForOfStatement(_)) {
            continue;
        }
        let frame = scope.frame_of(id);
        if let Some(plan) = frames.iter_mut().find(|f| f.frame == frame) {
            plan.lambdas.push(OverlayLambdaPlan { expr_id: id, span: entry.span });
        }
    }

    let plan = OverlayPlanModule {
        vm_type,
        prefix: prefix.to_string(),
        frames,
    };
    tracing::debug!(
        frames = plan.frames.len(),
        lambdas = plan.lambda_count(),
        "planned overlay"
    );
    plan
}

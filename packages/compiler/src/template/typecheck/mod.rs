//! Type Analysis
//!
//! Computes a TypeScript type expression for every scope symbol. Frames are
//! visited parent before child; each environment starts as a copy of its
//! parent's and is overlaid with the hints of the frame's typing strategy.

mod expr_types;
pub mod strategy;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::template::ir::{ExprTable, FrameId};
use crate::template::scope::{ScopeModule, SymbolKind};

pub use strategy::{strategy_for, TypingContext, TypingStrategy};

/// Sentinel for anything that cannot be described.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameHints {
    /// `(name, type)` for locals introduced by the frame.
    pub locals: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promise: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEnv {
    /// Every name visible as a local in the frame, inherited ones included.
    pub locals: IndexMap<String, String>,
    /// Type of the nearest value overlay, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAnalysis {
    pub root_vm_type: String,
    pub envs: IndexMap<FrameId, FrameEnv>,
    pub hints: IndexMap<FrameId, FrameHints>,
}

impl FrameAnalysis {
    pub fn env(&self, frame: FrameId) -> Option<&FrameEnv> {
        self.envs.get(&frame)
    }

    /// Type of `name` as a local of `frame`, or `unknown`.
    pub fn local_type(&self, frame: FrameId, name: &str) -> &str {
        self.envs
            .get(&frame)
            .and_then(|env| env.locals.get(name))
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    /// Type of an expression evaluated in its own frame.
    pub fn expr_type(&self, scope: &ScopeModule, exprs: &ExprTable, id: crate::template::ir::ExprId) -> String {
        let Some(ast) = exprs.ast(id) else {
            return UNKNOWN.to_string();
        };
        let typer = expr_types::ExprTyper {
            scope,
            envs: &self.envs,
            vm: &self.root_vm_type,
        };
        typer.type_of(ast, scope.frame_of(id))
    }
}

pub fn analyze_frames(scope: &ScopeModule, exprs: &ExprTable, root_vm_type: &str) -> FrameAnalysis {
    let mut envs: IndexMap<FrameId, FrameEnv> = IndexMap::new();
    let mut all_hints = IndexMap::new();

    for frame in &scope.frames {
        let mut env = frame
            .parent
            .and_then(|p| envs.get(&p).cloned())
            .unwrap_or_default();

        let hints = match &frame.origin {
            Some(origin) => {
                let typer = expr_types::ExprTyper {
                    scope,
                    envs: &envs,
                    vm: root_vm_type,
                };
                let ctx = TypingContext {
                    frame,
                    origin,
                    exprs,
                    typer: &typer,
                };
                strategy_for(origin.pattern()).hints(&ctx)
            }
            None => FrameHints::default(),
        };

        if let Some(overlay) = &hints.overlay {
            env.overlay = Some(overlay.clone());
        }
        for (name, ty) in &hints.locals {
            env.locals.insert(name.clone(), ty.clone());
        }
        for symbol in &frame.symbols {
            match symbol.kind {
                SymbolKind::Contextual => {
                    let ty = symbol.type_expr.clone().unwrap_or_else(|| UNKNOWN.to_string());
                    env.locals.insert(symbol.name.clone(), ty);
                }
                SymbolKind::IteratorLocal | SymbolKind::Alias => {
                    env.locals
                        .entry(symbol.name.clone())
                        .or_insert_with(|| UNKNOWN.to_string());
                }
                SymbolKind::Let => {}
            }
        }
        envs.insert(frame.id, env);

        // `<let>` values may read earlier locals of the same frame.
        let lets: Vec<(String, String)> = frame
            .symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Let)
            .map(|symbol| {
                let ty = symbol
                    .expr
                    .and_then(|id| exprs.ast(id))
                    .map(|ast| {
                        let typer = expr_types::ExprTyper {
                            scope,
                            envs: &envs,
                            vm: root_vm_type,
                        };
                        typer.type_of(ast, frame.id)
                    })
                    .unwrap_or_else(|| UNKNOWN.to_string());
                (symbol.name.clone(), ty)
            })
            .collect();
        if let Some(env) = envs.get_mut(&frame.id) {
            env.locals.extend(lets);
        }
        all_hints.insert(frame.id, hints);
    }

    tracing::debug!(frames = envs.len(), vm = root_vm_type, "analyzed frame types");
    FrameAnalysis {
        root_vm_type: root_vm_type.to_string(),
        envs,
        hints: all_hints,
    }
}

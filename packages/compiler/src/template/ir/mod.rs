//! Template IR
//!
//! Identity-stamped tree produced by lowering and consumed, never mutated, by
//! every later stage.

pub mod dom;
pub mod expr_table;
pub mod handle;
pub mod instructions;
pub mod meta;

use serde::{Deserialize, Serialize};

pub use dom::*;
pub use expr_table::{ExprTable, ExprTableEntry};
pub use handle::{ExprId, FrameId, NodeId, NodeIdAllocator};
pub use instructions::*;
pub use meta::*;

use crate::diagnostics::CompilerDiagnostic;

pub const IR_VERSION: &str = "aurelia-ir@1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrModule {
    pub version: String,
    pub name: String,
    pub root: IrTemplate,
    pub expr_table: ExprTable,
    pub meta: TemplateMeta,
    pub diagnostics: Vec<CompilerDiagnostic>,
}

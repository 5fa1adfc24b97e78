//! AOT Plan and Emit
//!
//! Turns a linked module into the instruction graph a runtime hydrates directly,
//! without compiling the template in the browser.

pub mod emit;
pub mod plan;

pub use emit::{emit_aot, AotEmitResult};
pub use plan::{
    plan_aot, AotCase, AotGap, AotInstruction, AotLetBinding, AotPlanModule, AotTailProp, AotTarget,
    AotTemplatePlan, TARGET_MARKER,
};

#[derive(Debug, Clone)]
pub struct AotOptions {
    pub pretty: bool,
    /// Embed the ASTs of every referenced expression under `expressions`.
    pub include_expressions: bool,
    pub export_name: String,
}

impl Default for AotOptions {
    fn default() -> Self {
        AotOptions {
            pretty: false,
            include_expressions: true,
            export_name: "definition".to_string(),
        }
    }
}

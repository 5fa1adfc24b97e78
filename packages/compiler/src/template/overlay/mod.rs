//! Overlay Synthesis
//!
//! Generates a type-checkable file with one lambda per authored expression, typed by
//! the scope frame it is evaluated in, plus span mappings in both directions.

pub mod emit;
pub mod mapped_emitter;
pub mod plan;

pub use emit::{emit_overlay, overlay_filename, OverlayEmitResult, OverlayMapping, OverlayMappingEntry, OverlaySegment};
pub use mapped_emitter::{emit_expr, EmitContext, EmitMapping, EmitSegment, Emitted};
pub use plan::{plan_overlay, FrameOverlayPlan, OverlayLambdaPlan, OverlayPlanModule};

use crate::vm::DEFAULT_SYNTHETIC_PREFIX;

#[derive(Debug, Clone)]
pub struct OverlayOptions {
    pub is_js: bool,
    pub synthetic_prefix: String,
    /// File name stem for the overlay, usually the template path without extension.
    pub base_name: String,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        OverlayOptions {
            is_js: false,
            synthetic_prefix: DEFAULT_SYNTHETIC_PREFIX.to_string(),
            base_name: "template".to_string(),
        }
    }
}

#![deny(clippy::all)]

/**
 * Aurelia Template Compiler
 *
 * Lowers Aurelia HTML templates to IR, links them against a resource catalog,
 * binds scopes, and emits type-checking overlays, AOT definitions and SSR output.
 */

// Shared building blocks
pub mod chars;
pub mod diagnostics;
pub mod error;
pub mod parse_util;
pub mod util;
pub mod vm;

// Parsers
pub mod expression_parser;
pub mod ml_parser;

// Resources and the pipeline
pub mod compile;
pub mod schema;
pub mod template;

// Re-exports
pub use compile::{
    compile_aot, compile_ssr, compile_template, AotCompilation, CompileOptions, ModuleResolver, TemplateCompilation,
};
pub use diagnostics::{CompilerDiagnostic, DegradationSummary, DiagnosticCode, Severity, Stage};
pub use error::{CompilerError, Result};
pub use schema::{ProjectSemantics, SemanticsLookup};
pub use vm::{StaticVm, VmReflection, DEFAULT_SYNTHETIC_PREFIX};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

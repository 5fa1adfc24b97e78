#![deny(clippy::all)]

/**
 * Aurelia Template Compiler - project layer
 *
 * Resource discovery over script files, the referential index, project
 * configuration and batch compilation on top of `au_compiler`.
 */
pub use au_compiler as compiler;

pub mod compile_project;
pub mod config;
pub mod discovery;
pub mod referential_index;

pub use compile_project::{compile_project, BatchOptions, TemplateOutput};
pub use config::{DiscoveryOptions, ProjectConfig};
pub use discovery::{IncrementalDiscovery, Program, ResolvedProject};
pub use referential_index::InMemoryReferentialIndex;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

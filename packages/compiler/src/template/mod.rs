//! Template pipeline stages, in the order `compile_template` runs them.

pub mod aot;
pub mod ir;
pub mod linking;
pub mod lowering;
mod markup;
pub mod overlay;
pub mod query;
pub mod scope;
pub mod ssr;
pub mod typecheck;
pub mod usage;

//! Compiler Errors
//!
//! Fatal errors only. Anything that can be reported against the authored template is a
//! `CompilerDiagnostic` instead; this enum covers caller-contract violations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    /// Neither a project snapshot nor a semantics snapshot was supplied.
    #[error("compile_template requires either `project` or `semantics`")]
    MissingSemantics,

    #[error("invalid option `{option}`: {reason}")]
    InvalidOption { option: String, reason: String },

    /// A resource scope id that is not part of the supplied resource graph.
    #[error("unknown resource scope `{0}`")]
    UnknownScope(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompilerError>;

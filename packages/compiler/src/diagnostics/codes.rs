//! Diagnostic Codes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    #[serde(rename = "aurelia/html-parse-error")]
    HtmlParseError,
    #[serde(rename = "aurelia/expr-parse-error")]
    ExpressionParseError,
    #[serde(rename = "aurelia/unknown-command")]
    UnknownCommand,
    #[serde(rename = "aurelia/invalid-let-command")]
    InvalidLetCommand,
    #[serde(rename = "aurelia/invalid-meta-element")]
    InvalidMetaElement,
    #[serde(rename = "aurelia/unresolved-import")]
    UnresolvedImport,
    #[serde(rename = "aurelia/unknown-element")]
    UnknownElement,
    #[serde(rename = "aurelia/unknown-attribute")]
    UnknownAttribute,
    #[serde(rename = "aurelia/unknown-controller")]
    UnknownController,
    #[serde(rename = "aurelia/unknown-bindable")]
    UnknownBindable,
    #[serde(rename = "aurelia/unknown-converter")]
    UnknownConverter,
    #[serde(rename = "aurelia/unknown-behavior")]
    UnknownBehavior,
    #[serde(rename = "aurelia/invalid-iterator-command")]
    IteratorCommandMismatch,
    #[serde(rename = "aurelia/invalid-tail-prop")]
    InvalidTailProp,
    #[serde(rename = "aurelia/orphan-branch")]
    OrphanBranch,
    #[serde(rename = "aurelia/discovery-gap")]
    DiscoveryGap,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::HtmlParseError => "aurelia/html-parse-error",
            DiagnosticCode::ExpressionParseError => "aurelia/expr-parse-error",
            DiagnosticCode::UnknownCommand => "aurelia/unknown-command",
            DiagnosticCode::InvalidLetCommand => "aurelia/invalid-let-command",
            DiagnosticCode::InvalidMetaElement => "aurelia/invalid-meta-element",
            DiagnosticCode::UnresolvedImport => "aurelia/unresolved-import",
            DiagnosticCode::UnknownElement => "aurelia/unknown-element",
            DiagnosticCode::UnknownAttribute => "aurelia/unknown-attribute",
            DiagnosticCode::UnknownController => "aurelia/unknown-controller",
            DiagnosticCode::UnknownBindable => "aurelia/unknown-bindable",
            DiagnosticCode::UnknownConverter => "aurelia/unknown-converter",
            DiagnosticCode::UnknownBehavior => "aurelia/unknown-behavior",
            DiagnosticCode::IteratorCommandMismatch => "aurelia/invalid-iterator-command",
            DiagnosticCode::InvalidTailProp => "aurelia/invalid-tail-prop",
            DiagnosticCode::OrphanBranch => "aurelia/orphan-branch",
            DiagnosticCode::DiscoveryGap => "aurelia/discovery-gap",
        }
    }

    /// Codes raised when a symbolic resource reference does not resolve.
    pub fn is_unknown_resource(&self) -> bool {
        matches!(
            self,
            DiagnosticCode::UnknownElement
                | DiagnosticCode::UnknownAttribute
                | DiagnosticCode::UnknownController
                | DiagnosticCode::UnknownBindable
                | DiagnosticCode::UnknownConverter
                | DiagnosticCode::UnknownBehavior
        )
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason codes carried in `data.reason` for structural violations.
pub mod reason {
    pub const TAIL_PROP_MODE: &str = "tail-prop-mode";
    pub const TAIL_PROP_UNKNOWN: &str = "tail-prop-unknown";
    pub const ITERATOR_COMMAND_REQUIRED: &str = "iterator-command-required";
    pub const ITERATOR_COMMAND_UNEXPECTED: &str = "iterator-command-unexpected";
    pub const LET_COMMAND: &str = "let-command";
    pub const BRANCH_PARENT: &str = "branch-parent";
}

//! Diagnostics
//!
//! Every non-fatal problem found while compiling a template is reported as a
//! `CompilerDiagnostic`. Resolution misses against resources with a catalog gap
//! carry `data.confidence = partial`; see `degradation`.

pub mod codes;
pub mod degradation;

use serde::{Deserialize, Serialize};

pub use codes::{reason, DiagnosticCode};
pub use degradation::{summarize_degradation, AffectedResource, DegradationSummary};

use crate::parse_util::{ParseError, ParseErrorLevel, SourceSpan};
use crate::schema::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lower,
    Link,
    Bind,
    Typecheck,
    Overlay,
    Aot,
    Ssr,
    Discovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Partial,
}

/// Owner of a bindable named in a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindableOwnerKind {
    Element,
    Attribute,
    Controller,
}

impl BindableOwnerKind {
    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            BindableOwnerKind::Element => ResourceKind::CustomElement,
            BindableOwnerKind::Attribute => ResourceKind::CustomAttribute,
            BindableOwnerKind::Controller => ResourceKind::TemplateController,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindableRef {
    pub owner_kind: BindableOwnerKind,
    pub owner_name: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_kind: Option<ResourceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindable: Option<BindableRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_commands: Option<Vec<String>>,
}

impl DiagnosticData {
    pub fn resource(kind: ResourceKind, name: impl Into<String>) -> Self {
        DiagnosticData {
            resource_kind: Some(kind),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn reason(reason: &str) -> Self {
        DiagnosticData {
            reason: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// The `(kind, name)` this diagnostic is about, if any.
    pub fn affected_resource(&self) -> Option<(ResourceKind, &str)> {
        if let Some(bindable) = &self.bindable {
            return Some((bindable.owner_kind.resource_kind(), bindable.owner_name.as_str()));
        }
        match (self.resource_kind, self.name.as_deref()) {
            (Some(kind), Some(name)) => Some((kind, name)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerDiagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DiagnosticData>,
}

impl CompilerDiagnostic {
    pub fn error(code: DiagnosticCode, stage: Stage, message: impl Into<String>, span: Option<SourceSpan>) -> Self {
        CompilerDiagnostic {
            code,
            message: message.into(),
            severity: Severity::Error,
            span,
            stage,
            data: None,
        }
    }

    pub fn warning(code: DiagnosticCode, stage: Stage, message: impl Into<String>, span: Option<SourceSpan>) -> Self {
        CompilerDiagnostic {
            severity: Severity::Warning,
            ..Self::error(code, stage, message, span)
        }
    }

    pub fn with_data(mut self, data: DiagnosticData) -> Self {
        self.data = Some(data);
        self
    }

    /// Downgrade to a gap-qualified warning.
    pub fn partial(mut self) -> Self {
        self.severity = Severity::Warning;
        self.data.get_or_insert_with(DiagnosticData::default).confidence = Some(Confidence::Partial);
        self
    }

    pub fn is_partial(&self) -> bool {
        self.data.as_ref().and_then(|d| d.confidence) == Some(Confidence::Partial)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn from_parse_error(code: DiagnosticCode, stage: Stage, error: &ParseError) -> Self {
        let severity = match error.level {
            ParseErrorLevel::Warning => Severity::Warning,
            ParseErrorLevel::Error => Severity::Error,
        };
        CompilerDiagnostic {
            severity,
            ..Self::error(code, stage, error.msg.clone(), Some(error.span))
        }
    }
}

/// All diagnostics of one compilation, in the order stages produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub all: Vec<CompilerDiagnostic>,
}

impl Diagnostics {
    pub fn extend(&mut self, diags: impl IntoIterator<Item = CompilerDiagnostic>) {
        self.all.extend(diags);
    }

    pub fn by_stage(&self, stage: Stage) -> impl Iterator<Item = &CompilerDiagnostic> {
        self.all.iter().filter(move |d| d.stage == stage)
    }

    pub fn partial(&self) -> impl Iterator<Item = &CompilerDiagnostic> {
        self.all.iter().filter(|d| d.is_partial())
    }

    pub fn has_errors(&self) -> bool {
        self.all.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

//! Degradation Summary
//!
//! Projection of the gap-qualified diagnostics of a compilation. The count is
//! exactly the number of diagnostics with partial confidence; affected resources
//! are deduplicated by `kind:name` and sorted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::CompilerDiagnostic;
use crate::schema::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AffectedResource {
    pub kind: ResourceKind,
    pub name: String,
}

impl AffectedResource {
    pub fn key(&self) -> String {
        self.kind.key(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradationSummary {
    pub has_gaps: bool,
    pub gap_qualified_count: usize,
    pub affected_resources: Vec<AffectedResource>,
}

pub fn summarize_degradation<'a>(diagnostics: impl IntoIterator<Item = &'a CompilerDiagnostic>) -> DegradationSummary {
    let mut count = 0;
    let mut affected = BTreeSet::new();
    for diag in diagnostics.into_iter().filter(|d| d.is_partial()) {
        count += 1;
        if let Some((kind, name)) = diag.data.as_ref().and_then(|d| d.affected_resource()) {
            affected.insert(AffectedResource {
                kind,
                name: name.to_string(),
            });
        }
    }
    DegradationSummary {
        has_gaps: count > 0,
        gap_qualified_count: count,
        affected_resources: affected.into_iter().collect(),
    }
}

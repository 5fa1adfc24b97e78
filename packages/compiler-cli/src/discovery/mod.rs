//! Resource Discovery
//!
//! Fact-based discovery of project resources from script files:
//! - `facts`: oxc extraction of classes, decorators, imports/exports and registrations
//! - `fingerprint`: structural hashes of facts, spans excluded
//! - `resolve`: facts to `ProjectSemantics` with a scoped `ResourceGraph`
//! - `incremental`: per-file caching keyed by content hash and fingerprint

pub mod conventions;
pub mod facts;
pub mod fingerprint;
pub mod incremental;
pub mod program;
pub mod resolve;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use facts::{extract_facts, FactValue, FileFacts};
pub use fingerprint::{fingerprint_of, Fingerprint};
pub use incremental::{DiscoveryChanges, IncrementalDiscovery, IncrementalDiscoveryResult, RefreshStats};
pub use program::Program;
pub use resolve::{local_scope_id, resolve_project, DiscoveredResource, ResolvedProject, ROOT_SCOPE};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractError {
    #[error("unsupported source file `{file}`")]
    UnsupportedFile { file: String },

    #[error("failed to parse `{file}`: {message}")]
    Parse { file: String, message: String },
}

impl ExtractError {
    pub fn file(&self) -> &str {
        match self {
            ExtractError::UnsupportedFile { file } | ExtractError::Parse { file, .. } => file,
        }
    }
}

//! Incremental discovery.
//!
//! Each script file is cached with its content hash, its extracted facts and
//! the structural fingerprint of those facts. A refresh re-extracts only files
//! whose bytes changed and re-resolves the project only when some file's
//! facts changed, appeared or disappeared.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use super::facts::{extract_facts, is_declaration_file, is_script_file, FileFacts};
use super::fingerprint::{fingerprint_of, Fingerprinter};
use super::program::Program;
use super::resolve::{resolve_project, ResolvedProject};
use super::ExtractError;
use crate::config::DiscoveryOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryChanges {
    pub added: Vec<String>,
    /// Bytes changed but the facts fingerprint did not.
    pub content_changed: Vec<String>,
    pub facts_changed: Vec<String>,
    pub removed: Vec<String>,
}

impl DiscoveryChanges {
    /// Whether resolution has to run again.
    pub fn is_structural(&self) -> bool {
        !self.added.is_empty() || !self.facts_changed.is_empty() || !self.removed.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_structural() && self.content_changed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalDiscoveryResult {
    pub project: ResolvedProject,
    /// Changes that triggered this resolution.
    pub changes: DiscoveryChanges,
    /// Incremented on every re-resolution.
    pub generation: u64,
}

/// What the last `refresh` did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStats {
    pub extracted: usize,
    pub reused: usize,
    pub reresolved: bool,
    pub changes: DiscoveryChanges,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    content_hash: u64,
    facts: Result<FileFacts, ExtractError>,
    fingerprint: u64,
}

#[derive(Debug, Default)]
pub struct IncrementalDiscovery {
    cache: IndexMap<String, CacheEntry>,
    last: Option<IncrementalDiscoveryResult>,
    last_options: Option<DiscoveryOptions>,
    stats: RefreshStats,
}

impl IncrementalDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(&mut self, program: &Program, options: &DiscoveryOptions) -> IncrementalDiscoveryResult {
        let mut stats = RefreshStats::default();
        let mut seen: IndexSet<&str> = IndexSet::new();

        for (path, content) in program.files() {
            if !is_script_file(path) || (options.exclude_declaration_files && is_declaration_file(path)) {
                continue;
            }
            seen.insert(path);
            let content_hash = xxh3_64(content.as_bytes());
            if let Some(entry) = self.cache.get(path) {
                if entry.content_hash == content_hash {
                    stats.reused += 1;
                    continue;
                }
            }

            let facts = extract_facts(path, content);
            stats.extracted += 1;
            let fingerprint = facts_fingerprint(&facts);
            let entry = CacheEntry {
                content_hash,
                facts,
                fingerprint,
            };
            match self.cache.insert(path.to_string(), entry) {
                Some(previous) if previous.fingerprint == fingerprint => {
                    stats.changes.content_changed.push(path.to_string())
                }
                Some(_) => stats.changes.facts_changed.push(path.to_string()),
                None => stats.changes.added.push(path.to_string()),
            }
        }

        let removed: Vec<String> = self
            .cache
            .keys()
            .filter(|path| !seen.contains(path.as_str()))
            .cloned()
            .collect();
        for path in removed {
            self.cache.shift_remove(&path);
            stats.changes.removed.push(path);
        }

        let options_changed = self.last_options.as_ref() != Some(options);
        let result = match &self.last {
            Some(last) if !stats.changes.is_structural() && !options_changed => last.clone(),
            _ => {
                stats.reresolved = true;
                let generation = self.last.as_ref().map_or(0, |l| l.generation + 1);
                let result = IncrementalDiscoveryResult {
                    project: self.resolve(options),
                    changes: stats.changes.clone(),
                    generation,
                };
                self.last = Some(result.clone());
                self.last_options = Some(options.clone());
                result
            }
        };

        tracing::debug!(
            extracted = stats.extracted,
            reused = stats.reused,
            added = stats.changes.added.len(),
            content_changed = stats.changes.content_changed.len(),
            facts_changed = stats.changes.facts_changed.len(),
            removed = stats.changes.removed.len(),
            reresolved = stats.reresolved,
            "discovery refresh"
        );
        self.stats = stats;
        result
    }

    fn resolve(&self, options: &DiscoveryOptions) -> ResolvedProject {
        let mut facts = IndexMap::new();
        let mut failures = IndexMap::new();
        for (path, entry) in &self.cache {
            match &entry.facts {
                Ok(file_facts) => {
                    facts.insert(path.clone(), file_facts.clone());
                }
                Err(error) => {
                    failures.insert(path.clone(), error.clone());
                }
            }
        }
        resolve_project(&facts, &failures, options)
    }

    /// Cached facts of one file, if it was extracted successfully.
    pub fn facts(&self, path: &str) -> Option<&FileFacts> {
        self.cache.get(path).and_then(|e| e.facts.as_ref().ok())
    }

    pub fn last_result(&self) -> Option<&IncrementalDiscoveryResult> {
        self.last.as_ref()
    }

    pub fn stats(&self) -> &RefreshStats {
        &self.stats
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.last = None;
        self.last_options = None;
        self.stats = RefreshStats::default();
    }
}

fn facts_fingerprint(facts: &Result<FileFacts, ExtractError>) -> u64 {
    match facts {
        Ok(facts) => fingerprint_of(facts),
        Err(error) => {
            let mut fp = Fingerprinter::new();
            fp.tag(0xff);
            fp.str(&error.to_string());
            fp.finish()
        }
    }
}

//! Project configuration.
//!
//! A small JSON file (`au.config.json` by convention) naming the semantics
//! snapshot, the resource scope templates compile against, the overlay
//! synthetic prefix and discovery options.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use au_compiler::{ProjectSemantics, DEFAULT_SYNTHETIC_PREFIX};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "au.config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOptions {
    #[serde(default = "default_true")]
    pub exclude_declaration_files: bool,
    /// Derive resource names from class suffixes (`FooBarCustomElement` -> `foo-bar`).
    #[serde(default = "default_true")]
    pub conventions: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        DiscoveryOptions {
            exclude_declaration_files: true,
            conventions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Path of a serialized `ProjectSemantics`; relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_scope: Option<String>,
    #[serde(default = "default_prefix")]
    pub synthetic_prefix: String,
    #[serde(default)]
    pub discovery: DiscoveryOptions,
    /// Directory the config was loaded from.
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_prefix() -> String {
    DEFAULT_SYNTHETIC_PREFIX.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            semantics: None,
            resource_scope: None,
            synthetic_prefix: default_prefix(),
            discovery: DiscoveryOptions::default(),
            root: None,
        }
    }
}

impl ProjectConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config =
            Self::from_json_str(&content).with_context(|| format!("invalid config {}", path.display()))?;
        config.root = path.parent().map(Path::to_path_buf);
        tracing::debug!(path = %path.display(), scope = ?config.resource_scope, "loaded project config");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: ProjectConfig = serde_json::from_str(json).context("failed to parse project config")?;
        if config.synthetic_prefix.is_empty() {
            anyhow::bail!("`syntheticPrefix` must not be empty");
        }
        Ok(config)
    }

    /// `path` resolved against the config directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The configured snapshot, or the built-in catalog when none is named.
    pub fn load_semantics(&self) -> anyhow::Result<ProjectSemantics> {
        let Some(path) = &self.semantics else {
            return Ok(ProjectSemantics::builtins());
        };
        let path = self.resolve_path(path);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read semantics snapshot {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("invalid semantics snapshot {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = ProjectConfig::from_json_str("{}").unwrap();
        assert_eq!(config.synthetic_prefix, DEFAULT_SYNTHETIC_PREFIX);
        assert!(config.discovery.exclude_declaration_files);
        assert!(config.discovery.conventions);
        assert!(config.semantics.is_none());
    }

    #[test]
    fn test_camel_case_keys() {
        let config = ProjectConfig::from_json_str(
            r#"{"resourceScope":"local:a","discovery":{"conventions":false}}"#,
        )
        .unwrap();
        assert_eq!(config.resource_scope.as_deref(), Some("local:a"));
        assert!(!config.discovery.conventions);
        assert!(config.discovery.exclude_declaration_files);
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(ProjectConfig::from_json_str(r#"{"syntheticPrefix":""}"#).is_err());
    }
}

//! The set of source files discovery and batch compilation run over.

use std::fs;
use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;

use super::facts::is_script_file;

const SKIPPED_DIRS: [&str; 3] = ["node_modules", "dist", "target"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    files: IndexMap<String, String>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files<P: Into<String>, C: Into<String>>(files: impl IntoIterator<Item = (P, C)>) -> Self {
        Program {
            files: files.into_iter().map(|(p, c)| (p.into(), c.into())).collect(),
        }
    }

    /// Scripts and templates under `root`, skipping hidden and build directories.
    pub fn load_dir(root: &Path) -> anyhow::Result<Self> {
        let mut program = Program::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let entries = fs::read_dir(&dir).with_context(|| format!("failed to read directory {}", dir.display()))?;
            let mut paths: Vec<_> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
            paths.sort();
            for path in paths {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                if path.is_dir() {
                    if !name.starts_with('.') && !SKIPPED_DIRS.contains(&name) {
                        stack.push(path);
                    }
                    continue;
                }
                let key = path.to_string_lossy().into_owned();
                if is_script_file(&key) || is_template_file(&key) {
                    let content =
                        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
                    program.files.insert(key, content);
                }
            }
        }
        tracing::debug!(root = %root.display(), files = program.files.len(), "loaded program");
        Ok(program)
    }

    pub fn set_file(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn remove_file(&mut self, path: &str) -> Option<String> {
        self.files.shift_remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn templates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files().filter(|(p, _)| is_template_file(p))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub fn is_template_file(path: &str) -> bool {
    path.ends_with(".html")
}

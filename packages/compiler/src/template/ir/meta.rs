//! Template Metadata
//!
//! Definition-level facts folded out of meta-elements (`<bindable>`,
//! `<containerless>`, `<alias>`, `<use-shadow-dom>`, `<import>`).

use serde::{Deserialize, Serialize};

use crate::parse_util::SourceSpan;
use crate::schema::BindingMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowMode {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaBindable {
    pub name: String,
    pub attribute: Option<String>,
    pub mode: Option<BindingMode>,
    pub span: SourceSpan,
    pub name_span: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaAlias {
    pub name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateImport {
    pub from: String,
    pub from_span: Option<SourceSpan>,
    /// Resolved module path, filled in by the compile facade.
    pub resolved: Option<String>,
    /// `<import from="./x" as="y">` renames the default resource.
    pub alias: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMeta {
    pub bindables: Vec<MetaBindable>,
    pub aliases: Vec<MetaAlias>,
    pub containerless: bool,
    pub shadow_dom: Option<ShadowMode>,
    pub imports: Vec<TemplateImport>,
}

impl TemplateMeta {
    pub fn is_empty(&self) -> bool {
        self.bindables.is_empty()
            && self.aliases.is_empty()
            && !self.containerless
            && self.shadow_dom.is_none()
            && self.imports.is_empty()
    }
}

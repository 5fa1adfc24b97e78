//! Naming conventions for undecorated resources.

use std::path::Path;

use au_compiler::schema::ResourceKind;
use au_compiler::util::camel_case_to_dash_case;

const SUFFIXES: [(&str, ResourceKind); 4] = [
    ("CustomElement", ResourceKind::CustomElement),
    ("CustomAttribute", ResourceKind::CustomAttribute),
    ("ValueConverter", ResourceKind::ValueConverter),
    ("BindingBehavior", ResourceKind::BindingBehavior),
];

/// `FooBarCustomElement` -> (`custom-element`, `foo-bar`); `DateFormatValueConverter` -> `dateFormat`.
pub fn resource_from_class_name(class_name: &str) -> Option<(ResourceKind, String)> {
    SUFFIXES.iter().find_map(|(suffix, kind)| {
        let base = class_name.strip_suffix(suffix).filter(|b| !b.is_empty())?;
        Some((*kind, resource_name(*kind, base)))
    })
}

/// Resource name for a class stem, cased the way markup refers to the kind.
pub fn resource_name(kind: ResourceKind, stem: &str) -> String {
    match kind {
        ResourceKind::ValueConverter | ResourceKind::BindingBehavior => lower_first(stem),
        _ => camel_case_to_dash_case(stem),
    }
}

/// Default name for a decorated class with no explicit name: the class name
/// without its kind suffix, cased for the kind.
pub fn default_name(kind: ResourceKind, class_name: &str) -> String {
    let suffix = match kind {
        ResourceKind::CustomElement => "CustomElement",
        ResourceKind::CustomAttribute => "CustomAttribute",
        ResourceKind::TemplateController => "TemplateController",
        ResourceKind::ValueConverter => "ValueConverter",
        ResourceKind::BindingBehavior => "BindingBehavior",
    };
    let stem = class_name.strip_suffix(suffix).filter(|s| !s.is_empty()).unwrap_or(class_name);
    resource_name(kind, stem)
}

/// Element a script or template file is paired with: `src/foo-bar.ts` -> `foo-bar`.
pub fn element_name_for_file(path: &str) -> Option<String> {
    let stem = Path::new(path).file_stem()?.to_str()?;
    let stem = stem.strip_suffix(".d").unwrap_or(stem);
    (!stem.is_empty()).then(|| camel_case_to_dash_case(stem))
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

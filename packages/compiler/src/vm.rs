//! View-model reflection: how the template's component class is named in
//! generated TypeScript.

/// Prefix of every synthetic identifier in generated overlays.
pub const DEFAULT_SYNTHETIC_PREFIX: &str = "__AU_TTC_";

pub trait VmReflection: Sync {
    /// Type expression of the root view-model, e.g. `App` or `import('./app').App`.
    fn root_vm_type_expr(&self) -> String;

    /// Fully qualified variant, preferred by the overlay when present.
    fn qualified_root_vm_type_expr(&self) -> Option<String> {
        None
    }

    fn synthetic_prefix(&self) -> String {
        DEFAULT_SYNTHETIC_PREFIX.to_string()
    }

    fn display_name(&self) -> Option<String> {
        None
    }
}

/// Reflection with fixed answers, for callers that already know the class.
#[derive(Debug, Clone, Default)]
pub struct StaticVm {
    pub type_expr: String,
    pub qualified: Option<String>,
    pub prefix: Option<String>,
    pub display_name: Option<String>,
}

impl StaticVm {
    pub fn new(type_expr: impl Into<String>) -> Self {
        StaticVm {
            type_expr: type_expr.into(),
            ..Default::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl VmReflection for StaticVm {
    fn root_vm_type_expr(&self) -> String {
        self.type_expr.clone()
    }

    fn qualified_root_vm_type_expr(&self) -> Option<String> {
        self.qualified.clone()
    }

    fn synthetic_prefix(&self) -> String {
        self.prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_SYNTHETIC_PREFIX.to_string())
    }

    fn display_name(&self) -> Option<String> {
        self.display_name.clone()
    }
}

/// Type expression used for the view-model in generated code.
pub fn effective_vm_type(vm: &dyn VmReflection) -> String {
    vm.qualified_root_vm_type_expr()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| vm.root_vm_type_expr())
}

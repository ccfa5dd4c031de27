use rustc_hash::FxHashSet;

/// How the consumer of the lowered module resolves dynamic values.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CompileMode {
    /// Everything dynamic is evaluated at runtime.
    #[default]
    Runtime,
    /// Dynamic values are emitted as code by a backend.
    Codegen,
    /// Static output with runtime bindings for values that cannot be
    /// resolved at build time.
    Hybrid,
}

#[derive(Clone, Debug, Default)]
pub struct LowerOptions {
    pub mode: CompileMode,
    /// Names the caller substitutes before rendering. A value that reads only
    /// these (or `name.field` / `name[i]` on them) is resolved.
    pub params: FxHashSet<String>,
}

impl LowerOptions {
    pub fn hybrid() -> Self {
        LowerOptions {
            mode: CompileMode::Hybrid,
            ..LowerOptions::default()
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>) -> Self {
        self.params.insert(name.into());
        self
    }
}

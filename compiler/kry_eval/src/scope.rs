//! Variable bindings visible to an evaluation.
//!
//! A scope is a flat map with an optional parent. Function calls push a child
//! scope holding the parameters; lookups fall through to the parent.

use rustc_hash::FxHashMap;

use crate::value::IrValue;

#[derive(Debug, Default)]
pub struct Scope<'p> {
    vars: FxHashMap<String, IrValue>,
    parent: Option<&'p Scope<'p>>,
}

impl Scope<'static> {
    pub fn new() -> Self {
        Scope::default()
    }
}

impl<'p> Scope<'p> {
    /// A scope whose misses fall through to `parent`.
    pub fn child(parent: &'p Scope<'p>) -> Self {
        Scope {
            vars: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<IrValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Bind `name`, shadowing any parent binding.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<IrValue>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<IrValue> {
        self.vars.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&IrValue> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.vars.get(name) {
                return Some(value);
            }
            scope = scope.parent?;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of bindings in this scope, excluding parents.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests;

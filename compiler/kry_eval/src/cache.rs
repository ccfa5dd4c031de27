//! Compiled-expression cache with an optional result layer.
//!
//! The bytecode layer maps an expression tree to its compiled form, keyed
//! purely by structure, with least-recently-used eviction. The result layer
//! memoizes evaluations of pure expressions keyed by the values of the
//! variables they read; [`ExpressionCache::invalidate_var`] drops the
//! results that depend on a changed variable and leaves bytecode alone.

use std::sync::Arc;

use kry_ir::IrExpr;
use rustc_hash::FxHashMap;

use crate::bytecode::{CompiledExpr, ExprFlags};
use crate::compile::{compile, CompilerOptions};
use crate::registry::BuiltinRegistry;
use crate::scope::Scope;
use crate::value::IrValue;
use crate::vm::Vm;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Compiled expressions kept before the least recently used is evicted.
    /// Zero disables caching.
    pub capacity: usize,
    /// Memoized results kept; zero disables the result layer.
    pub result_capacity: usize,
    pub compiler: CompilerOptions,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: 256,
            result_capacity: 1024,
            compiler: CompilerOptions::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub result_hits: u64,
    /// Compiled entries dropped to stay within capacity.
    pub evictions: u64,
}

struct Entry {
    id: u64,
    compiled: Arc<CompiledExpr>,
    vars: Arc<[String]>,
    last_used: u64,
}

#[derive(PartialEq, Eq, Hash)]
struct ResultKey {
    entry: u64,
    inputs: Vec<IrValue>,
}

struct CachedResult {
    value: IrValue,
    vars: Arc<[String]>,
    last_used: u64,
}

pub struct ExpressionCache {
    config: CacheConfig,
    entries: FxHashMap<IrExpr, Entry>,
    results: FxHashMap<ResultKey, CachedResult>,
    clock: u64,
    next_id: u64,
    stats: CacheStats,
}

impl ExpressionCache {
    pub fn new(config: CacheConfig) -> Self {
        ExpressionCache {
            config,
            entries: FxHashMap::default(),
            results: FxHashMap::default(),
            clock: 0,
            next_id: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// The cached bytecode for `expr`, counting a hit or a miss.
    pub fn lookup(&mut self, expr: &IrExpr) -> Option<Arc<CompiledExpr>> {
        let now = self.tick();
        if let Some(entry) = self.entries.get_mut(expr) {
            entry.last_used = now;
            self.stats.hits += 1;
            tracing::debug!(id = entry.id, "bytecode cache hit");
            Some(Arc::clone(&entry.compiled))
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Store `compiled` as the bytecode of `expr` and return the shared form.
    pub fn insert(&mut self, expr: IrExpr, compiled: CompiledExpr) -> Arc<CompiledExpr> {
        let compiled = Arc::new(compiled);
        if self.config.capacity == 0 {
            return compiled;
        }
        if let Some(old) = self.entries.remove(&expr) {
            self.drop_results_of(old.id);
        } else if self.entries.len() >= self.config.capacity {
            self.evict_lru();
        }
        let id = self.next_id;
        self.next_id += 1;
        let vars: Arc<[String]> = expr.variables().into();
        let last_used = self.tick();
        self.entries.insert(
            expr,
            Entry {
                id,
                compiled: Arc::clone(&compiled),
                vars,
                last_used,
            },
        );
        compiled
    }

    /// Cached bytecode for `expr`, compiling and inserting it on a miss.
    pub fn get_or_compile(&mut self, expr: &IrExpr) -> Arc<CompiledExpr> {
        if let Some(compiled) = self.lookup(expr) {
            return compiled;
        }
        let compiled = compile(expr, &self.config.compiler);
        self.insert(expr.clone(), compiled)
    }

    /// Evaluate `expr`, reusing bytecode and, for pure expressions, a
    /// previous result computed from the same variable values.
    pub fn eval(&mut self, expr: &IrExpr, vm: &Vm<'_>, scope: &Scope<'_>) -> IrValue {
        let compiled = self.get_or_compile(expr);
        if self.config.result_capacity == 0 || !is_memoizable(&compiled, vm.registry()) {
            return vm.eval(&compiled, scope);
        }
        let Some(entry) = self.entries.get(expr) else {
            return vm.eval(&compiled, scope);
        };
        let vars = Arc::clone(&entry.vars);
        let key = ResultKey {
            entry: entry.id,
            inputs: vars
                .iter()
                .map(|name| scope.get(name).cloned().unwrap_or_default())
                .collect(),
        };
        let now = self.tick();
        if let Some(hit) = self.results.get_mut(&key) {
            hit.last_used = now;
            self.stats.result_hits += 1;
            return hit.value.clone();
        }
        let value = vm.eval(&compiled, scope);
        if self.results.len() >= self.config.result_capacity {
            self.evict_lru_result();
        }
        self.results.insert(
            key,
            CachedResult {
                value: value.clone(),
                vars,
                last_used: now,
            },
        );
        value
    }

    /// Drop memoized results that read `name`. Returns how many were dropped.
    pub fn invalidate_var(&mut self, name: &str) -> usize {
        let before = self.results.len();
        self.results
            .retain(|_, result| !result.vars.iter().any(|var| var == name));
        let dropped = before - self.results.len();
        tracing::debug!(name, dropped, "invalidated results");
        dropped
    }

    /// Drop every memoized result. Bytecode stays cached.
    pub fn invalidate_all(&mut self) {
        self.results.clear();
    }

    /// Drop everything and reset the statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.results.clear();
        self.stats = CacheStats::default();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of cached compiled expressions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn result_len(&self) -> usize {
        self.results.len()
    }

    fn evict_lru(&mut self) {
        let Some(victim) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(expr, _)| expr.clone())
        else {
            return;
        };
        if let Some(entry) = self.entries.remove(&victim) {
            tracing::warn!(
                id = entry.id,
                capacity = self.config.capacity,
                "bytecode cache full, evicting least recently used entry"
            );
            self.drop_results_of(entry.id);
            self.stats.evictions += 1;
        }
    }

    fn evict_lru_result(&mut self) {
        let oldest = self
            .results
            .iter()
            .min_by_key(|(_, result)| result.last_used)
            .map(|(key, _)| (key.entry, key.inputs.clone()));
        if let Some((entry, inputs)) = oldest {
            self.results.remove(&ResultKey { entry, inputs });
        }
    }

    fn drop_results_of(&mut self, id: u64) {
        self.results.retain(|key, _| key.entry != id);
    }
}

impl Default for ExpressionCache {
    fn default() -> Self {
        ExpressionCache::new(CacheConfig::default())
    }
}

/// Only pure expressions may be memoized: no impure builtin, and every
/// named call resolves to a pure registry entry.
fn is_memoizable(compiled: &CompiledExpr, registry: &BuiltinRegistry) -> bool {
    let flags = compiled.flags();
    if flags.contains(ExprFlags::IMPURE) {
        return false;
    }
    !flags.contains(ExprFlags::NAMED_CALLS)
        || compiled.named_calls().all(|name| registry.is_pure(name))
}

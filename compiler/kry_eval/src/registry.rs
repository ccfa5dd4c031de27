//! Builtin function registry.
//!
//! A fixed power-of-two table of chained buckets keyed by an FNV-1a hash of
//! the function name. The seeded library dispatches through [`BuiltinFn`];
//! plugins are boxed closures registered at runtime.
//!
//! The registry is an ordinary value: construct it with
//! [`BuiltinRegistry::with_stdlib`], hand a reference to the [`Vm`](crate::Vm),
//! and drop it when done.

use std::fmt;

use kry_ir::{BuiltinFn, BuiltinSig, RANGE_CONSTRUCTOR};

use crate::stdlib;
use crate::value::IrValue;

/// Number of hash buckets. Must be a power of two.
pub const BUCKET_COUNT: usize = 32;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// 64-bit FNV-1a.
pub fn fnv1a(name: &str) -> u64 {
    name.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// A plugin builtin.
pub type NativeFn = Box<dyn Fn(&[IrValue]) -> IrValue>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("builtin name is empty")]
    EmptyName,
    #[error("`{0}` is reserved")]
    Reserved(String),
    #[error("builtin `{0}` is already registered")]
    Duplicate(String),
    #[error("builtin `{name}` has min_args {min} above max_args {max}")]
    InvalidArity { name: String, min: u8, max: u8 },
}

enum Native {
    Seeded(BuiltinFn),
    Plugin(NativeFn),
}

struct BuiltinDef {
    name: String,
    hash: u64,
    sig: BuiltinSig,
    native: Native,
}

pub struct BuiltinRegistry {
    buckets: Vec<Vec<BuiltinDef>>,
    len: usize,
}

impl BuiltinRegistry {
    /// An empty registry. Calls to the seeded library resolve to `Null`
    /// until those builtins are registered.
    pub fn new() -> Self {
        BuiltinRegistry {
            buckets: (0..BUCKET_COUNT).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    /// A registry holding every [`BuiltinFn`].
    pub fn with_stdlib() -> Self {
        let mut registry = BuiltinRegistry::new();
        for &builtin in BuiltinFn::ALL {
            registry.insert(builtin.name(), builtin.sig(), Native::Seeded(builtin));
        }
        tracing::debug!(builtins = registry.len, "builtin registry initialized");
        registry
    }

    /// Add a plugin builtin.
    ///
    /// Plugins are reached from expressions through named calls. Names of the
    /// seeded library and the range constructor cannot be replaced.
    pub fn register(
        &mut self,
        name: &str,
        sig: BuiltinSig,
        f: impl Fn(&[IrValue]) -> IrValue + 'static,
    ) -> Result<(), RegisterError> {
        if name.is_empty() {
            return Err(RegisterError::EmptyName);
        }
        if name == RANGE_CONSTRUCTOR {
            return Err(RegisterError::Reserved(name.to_owned()));
        }
        if sig.max_args != 0 && sig.min_args > sig.max_args {
            return Err(RegisterError::InvalidArity {
                name: name.to_owned(),
                min: sig.min_args,
                max: sig.max_args,
            });
        }
        if self.contains(name) {
            return Err(RegisterError::Duplicate(name.to_owned()));
        }
        self.insert(name, sig, Native::Plugin(Box::new(f)));
        tracing::debug!(name, "registered plugin builtin");
        Ok(())
    }

    fn insert(&mut self, name: &str, sig: BuiltinSig, native: Native) {
        let hash = fnv1a(name);
        self.buckets[bucket_of(hash)].push(BuiltinDef {
            name: name.to_owned(),
            hash,
            sig,
            native,
        });
        self.len += 1;
    }

    fn find(&self, name: &str) -> Option<&BuiltinDef> {
        let hash = fnv1a(name);
        self.buckets[bucket_of(hash)]
            .iter()
            .find(|def| def.hash == hash && def.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn signature(&self, name: &str) -> Option<BuiltinSig> {
        self.find(name).map(|def| def.sig)
    }

    /// `false` for unknown names.
    pub fn is_pure(&self, name: &str) -> bool {
        self.find(name).is_some_and(|def| def.sig.pure)
    }

    /// Registered names in bucket order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|def| def.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Call `name` with `args`.
    ///
    /// Unknown names and argument counts outside the signature log a warning
    /// and return `Null`.
    pub fn call(&self, name: &str, args: &[IrValue]) -> IrValue {
        let Some(def) = self.find(name) else {
            tracing::warn!(name, "call to unknown builtin");
            return IrValue::Null;
        };
        if !def.sig.accepts(args.len()) {
            tracing::warn!(
                name,
                got = args.len(),
                min = def.sig.min_args,
                max = def.sig.max_args,
                "builtin called with the wrong number of arguments"
            );
            return IrValue::Null;
        }
        match &def.native {
            Native::Seeded(builtin) => stdlib::call(*builtin, args),
            Native::Plugin(f) => f(args),
        }
    }
}

fn bucket_of(hash: u64) -> usize {
    // Only the low bits select the bucket.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "masked to the bucket count"
    )]
    let low = hash as usize;
    low & (BUCKET_COUNT - 1)
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        BuiltinRegistry::new()
    }
}

impl Drop for BuiltinRegistry {
    fn drop(&mut self) {
        tracing::debug!(builtins = self.len, "builtin registry released");
    }
}

impl fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("len", &self.len)
            .field("buckets", &BUCKET_COUNT)
            .finish()
    }
}

#[cfg(test)]
mod tests;

//! Environment publishing.
//!
//! Facts discovered at boot are pushed into the bootloader's global key/value
//! environment, where the boot menu scripts pick them up. Publishing is
//! write-only from our side: a second publish under the same name overwrites
//! the first.
//!
//! ```ignore
//! use vtoy_core::env::{publish_pair, EnvTable};
//!
//! let mut env = EnvTable::<8>::new();
//! publish_pair(&mut env, "vtoy_chain_mem", 0x1000, 256);
//! assert_eq!(env.get("vtoy_chain_mem_addr"), Some("0x1000"));
//! assert_eq!(env.get("vtoy_chain_mem_size"), Some("256"));
//! ```

use core::fmt::Write;

use crate::fmt::{FmtBuf, NAME_CAPACITY, VALUE_CAPACITY};

/// Suffix of the address half of a pair.
pub const ADDR_SUFFIX: &str = "_addr";

/// Suffix of the size half of a pair.
pub const SIZE_SUFFIX: &str = "_size";

pub type FactName = FmtBuf<NAME_CAPACITY>;
pub type FactValue = FmtBuf<VALUE_CAPACITY>;

// ═══════════════════════════════════════════════════════════════════════════
// STORE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════

/// The bootloader's key/value environment.
pub trait EnvStore {
    /// Create or overwrite `name`.
    fn set(&mut self, name: &str, value: &str);

    /// Make `name` visible to nested configuration contexts.
    fn export(&mut self, _name: &str) {}

    /// Environment-framework setup, run once per module activation.
    fn prepare(&mut self) {}
}

impl<S: EnvStore + ?Sized> EnvStore for &mut S {
    fn set(&mut self, name: &str, value: &str) {
        (**self).set(name, value)
    }

    fn export(&mut self, name: &str) {
        (**self).export(name)
    }

    fn prepare(&mut self) {
        (**self).prepare()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLISHERS
// ═══════════════════════════════════════════════════════════════════════════

/// Upsert a single fact.
pub fn publish_fact<S: EnvStore + ?Sized>(store: &mut S, name: &str, value: &str) {
    crate::vtoy_dbg!("env {} = {}", name, value);
    store.set(name, value);
}

/// Upsert a fact and export it.
pub fn export_fact<S: EnvStore + ?Sized>(store: &mut S, name: &str, value: &str) {
    publish_fact(store, name, value);
    store.export(name);
}

/// Publish a memory extent as `{prefix}_addr = 0x{hex}` and
/// `{prefix}_size = {decimal}`.
pub fn publish_pair<S: EnvStore + ?Sized>(store: &mut S, prefix: &str, addr: u64, len: u64) {
    let mut name = FactName::new();
    let mut value = FactValue::new();

    let _ = write!(name, "{}{}", prefix, ADDR_SUFFIX);
    let _ = write!(value, "0x{:x}", addr);
    publish_fact(store, name.as_str(), value.as_str());

    name.clear();
    value.clear();
    let _ = write!(name, "{}{}", prefix, SIZE_SUFFIX);
    let _ = write!(value, "{}", len);
    publish_fact(store, name.as_str(), value.as_str());
}

// ═══════════════════════════════════════════════════════════════════════════
// IN-MEMORY TABLE
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
struct Fact {
    name: FactName,
    value: FactValue,
    exported: bool,
}

/// Fixed-capacity in-memory environment.
///
/// Stands in for the bootloader environment where none exists (host-side
/// tooling, tests). Once all `N` slots hold distinct names, further new names
/// are dropped with a warning; existing names can still be overwritten.
pub struct EnvTable<const N: usize> {
    facts: [Option<Fact>; N],
    count: usize,
}

impl<const N: usize> EnvTable<N> {
    const EMPTY: Option<Fact> = None;

    pub const fn new() -> Self {
        Self {
            facts: [Self::EMPTY; N],
            count: 0,
        }
    }

    fn find(&self, name: &str) -> Option<&Fact> {
        self.facts[..self.count]
            .iter()
            .flatten()
            .find(|fact| fact.name.as_str() == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Fact> {
        self.facts[..self.count]
            .iter_mut()
            .flatten()
            .find(|fact| fact.name.as_str() == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).map(|fact| fact.value.as_str())
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.find(name).map_or(false, |fact| fact.exported)
    }

    /// Number of distinct names held.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate `(name, value)` in first-publish order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.facts[..self.count]
            .iter()
            .flatten()
            .map(|fact| (fact.name.as_str(), fact.value.as_str()))
    }
}

impl<const N: usize> Default for EnvTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EnvStore for EnvTable<N> {
    fn set(&mut self, name: &str, value: &str) {
        if let Some(fact) = self.find_mut(name) {
            fact.value = FactValue::from_str_truncated(value);
            return;
        }

        if self.count == N {
            log::warn!("env table full, dropping {}", name);
            return;
        }

        self.facts[self.count] = Some(Fact {
            name: FactName::from_str_truncated(name),
            value: FactValue::from_str_truncated(value),
            exported: false,
        });
        self.count += 1;
    }

    fn export(&mut self, name: &str) {
        if let Some(fact) = self.find_mut(name) {
            fact.exported = true;
        }
    }
}

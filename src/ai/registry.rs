//! Typed handles and the id-keyed storage behind them
//!
//! Every collection the AI framework owns hands out plain integer ids wrapped
//! in a distinct type per collection, so a crowd id can never be used to look
//! up a behavior tree. Ids come from a per-registry counter and are never
//! handed out twice, even after the value is removed or the registry cleared.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// A copyable id usable as a registry key
pub trait RegistryId: Copy + Eq + Hash + fmt::Debug {
    /// Wrap a raw counter value
    fn from_raw(raw: u32) -> Self;

    /// The raw counter value
    fn raw(self) -> u32;
}

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(u32);

            impl $name {
                /// The raw id value
                #[must_use]
                pub const fn raw(self) -> u32 {
                    self.0
                }
            }

            impl RegistryId for $name {
                fn from_raw(raw: u32) -> Self {
                    Self(raw)
                }

                fn raw(self) -> u32 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({})", stringify!($name), self.0)
                }
            }
        )*
    };
}

define_id!(
    /// Handle to a behavior tree owned by the framework
    TreeId,
    /// Handle to a nav mesh owned by the framework
    NavMeshId,
    /// Handle to a crowd simulation owned by the framework
    CrowdId,
    /// Handle to an agent within one crowd simulation
    AgentId,
);

/// Values keyed by monotonically assigned ids
#[derive(Debug, Clone)]
pub struct Registry<Id, T> {
    next_id: u32,
    entries: FxHashMap<Id, T>,
}

impl<Id: RegistryId, T> Default for Registry<Id, T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: FxHashMap::default(),
        }
    }
}

impl<Id: RegistryId, T> Registry<Id, T> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a fresh id
    pub fn insert(&mut self, value: T) -> Id {
        let id = Id::from_raw(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, value);
        id
    }

    #[must_use]
    pub fn get(&self, id: Id) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    /// Remove a value. Its id stays retired.
    pub fn remove(&mut self, id: Id) -> Option<T> {
        self.entries.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id the next `insert` will return
    #[must_use]
    pub fn peek_next_id(&self) -> Id {
        Id::from_raw(self.next_id)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    /// Drop every value. The id counter keeps counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut registry: Registry<TreeId, &str> = Registry::new();
        let a = registry.insert("a");
        let b = registry.insert("b");

        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert_eq!(registry.get(a), Some(&"a"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_removed_id_not_reused() {
        let mut registry: Registry<CrowdId, u32> = Registry::new();
        let first = registry.insert(1);
        assert_eq!(registry.remove(first), Some(1));
        assert!(registry.get(first).is_none());
        assert!(registry.remove(first).is_none());

        let second = registry.insert(2);
        assert_ne!(first, second);
    }

    #[test]
    fn test_clear_keeps_counter() {
        let mut registry: Registry<NavMeshId, ()> = Registry::new();
        registry.insert(());
        registry.insert(());
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.peek_next_id().raw(), 2);
        assert_eq!(registry.insert(()).raw(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(AgentId::from_raw(7).to_string(), "AgentId(7)");
    }
}

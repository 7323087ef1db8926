//! Singleton instance cache keyed by concrete type name.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::key::TypeKey;
use crate::value::Instance;

/// Cache holding at most one instance per singleton-marked concrete type.
///
/// Slots are reserved empty at bind time and filled by the first successful
/// construction. An empty slot is a cache miss.
///
/// # Examples
///
/// ```
/// use autowire_di::{Instance, SingletonCache, TypeKey};
///
/// let cache = SingletonCache::new();
/// let key = TypeKey::new("Single");
/// cache.reserve(&key);
/// assert!(cache.is_reserved(&key));
/// assert!(cache.get(&key).is_none());
///
/// let first = cache.fill(&key, Instance::new("Single", 1u8));
/// let second = cache.fill(&key, Instance::new("Single", 2u8));
/// assert!(Instance::ptr_eq(&first, &second));
/// ```
#[derive(Debug, Default)]
pub struct SingletonCache {
    slots: RwLock<HashMap<TypeKey, Option<Instance>>>,
}

impl SingletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty slot; an existing slot (filled or not) is left alone
    pub fn reserve(&self, name: &TypeKey) {
        self.slots.write().entry(name.clone()).or_insert(None);
    }

    pub fn is_reserved(&self, name: &TypeKey) -> bool {
        self.slots.read().contains_key(name)
    }

    /// The cached instance, `None` for unknown or still-empty slots
    pub fn get(&self, name: &TypeKey) -> Option<Instance> {
        self.slots.read().get(name).and_then(|slot| slot.clone())
    }

    /// Stores `instance`, overwriting whatever the slot held
    pub fn set(&self, name: &TypeKey, instance: Instance) {
        self.slots.write().insert(name.clone(), Some(instance));
    }

    /// Stores `instance` unless the slot is already filled; returns the
    /// instance that ends up cached
    pub fn fill(&self, name: &TypeKey, instance: Instance) -> Instance {
        let mut slots = self.slots.write();
        let slot = slots.entry(name.clone()).or_insert(None);
        match slot {
            Some(existing) => existing.clone(),
            None => {
                *slot = Some(instance.clone());
                instance
            }
        }
    }

    /// Number of filled slots
    pub fn len(&self) -> usize {
        self.slots.read().values().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.write().clear();
    }
}

//! Ordered per-object property storage.
//!
//! Keys keep their insertion position across value updates and attribute
//! changes. Reported key order puts canonical integer keys first in ascending
//! numeric order, followed by string keys in insertion order.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::value::{Property, PropertyKey};

type PropertyMap = IndexMap<PropertyKey, Property, FxBuildHasher>;

#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    entries: PropertyMap,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: PropertyMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&Property> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut Property> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, key: PropertyKey, prop: Property) -> Option<Property> {
        self.entries.insert(key, prop)
    }

    /// Remove a key, preserving the relative order of the rest
    pub fn remove(&mut self, key: &PropertyKey) -> Option<Property> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All keys in reporting order
    pub fn keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<u32> = self.entries.keys().filter_map(PropertyKey::index).collect();
        indices.sort_unstable();

        let mut keys = Vec::with_capacity(self.entries.len());
        keys.extend(indices.into_iter().map(PropertyKey::Index));
        keys.extend(
            self.entries
                .keys()
                .filter(|key| key.index().is_none())
                .cloned(),
        );
        keys
    }

    /// Index keys at or above `start`, highest first
    pub fn indices_from(&self, start: u32) -> Vec<u32> {
        let mut indices: Vec<u32> = self
            .entries
            .keys()
            .filter_map(PropertyKey::index)
            .filter(|&i| i >= start)
            .collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices
    }

    pub fn values(&self) -> impl Iterator<Item = &Property> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.entries.values_mut()
    }
}

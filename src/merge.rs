//! Identity-keyed containers that merge on insert (§4.2).
//!
//! `MergeSet<T>` and `MergeMap<K, V>` both preserve first-insertion order for
//! deterministic enumeration where a caller doesn't re-sort; canonical
//! serialization always re-sorts by the orders defined in §4.1, so insertion
//! order is never itself load-bearing for wire output.

use std::collections::HashMap;

/// A value with a stable identity string used to detect duplicates (§4.2).
pub trait Identity {
    fn identity_key(&self) -> String;
}

/// A set where inserting a value whose identity already exists combines the
/// two via a caller-supplied function instead of rejecting the insert.
#[derive(Debug, Clone)]
pub struct MergeSet<T> {
    order: Vec<String>,
    items: HashMap<String, T>,
}

impl<T> Default for MergeSet<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            items: HashMap::new(),
        }
    }
}

impl<T: Identity> MergeSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value`; if an item with the same identity exists, replaces it
    /// with `combine(existing, value)`.
    pub fn insert_with(&mut self, value: T, combine: impl FnOnce(T, T) -> T) {
        let key = value.identity_key();
        match self.items.remove(&key) {
            Some(existing) => {
                self.items.insert(key, combine(existing, value));
            }
            None => {
                self.items.insert(key.clone(), value);
                self.order.push(key);
            }
        }
    }

    /// Inserts `value`, keeping the existing entry on collision (the leaf-set
    /// combiner of §4.2: "leaves with the same identity are considered equal
    /// and non-distinguishing").
    pub fn insert(&mut self, value: T) {
        self.insert_with(value, |existing, _new| existing);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().map(move |k| &self.items[k])
    }

    pub fn into_values(self) -> Vec<T> {
        let MergeSet { order, mut items } = self;
        order
            .into_iter()
            .map(|k| items.remove(&k).expect("order/items invariant"))
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Removes the item sharing `value`'s identity, if present.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let key = value.identity_key();
        if let Some(pos) = self.order.iter().position(|k| k == &key) {
            self.order.remove(pos);
        }
        self.items.remove(&key)
    }
}

impl<T: Identity> FromIterator<T> for MergeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

/// A map keyed by an `Identity` key whose values merge on collision via a
/// caller-supplied function (used for edges: merging two sub-trees recursively,
/// see `tree::incorporate`).
#[derive(Debug, Clone)]
pub struct MergeMap<K, V> {
    order: Vec<String>,
    entries: HashMap<String, (K, V)>,
}

impl<K, V> Default for MergeMap<K, V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<K: Identity, V> MergeMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_with(&mut self, key: K, value: V, combine: impl FnOnce(V, V) -> V) {
        let id = key.identity_key();
        match self.entries.remove(&id) {
            Some((existing_key, existing_value)) => {
                self.entries
                    .insert(id, (existing_key, combine(existing_value, value)));
            }
            None => {
                self.order.push(id.clone());
                self.entries.insert(id, (key, value));
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(&key.identity_key()).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(&key.identity_key()).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().map(move |id| {
            let (k, v) = &self.entries[id];
            (k, v)
        })
    }

    pub fn into_iter_owned(self) -> impl Iterator<Item = (K, V)> {
        let MergeMap { order, mut entries } = self;
        order
            .into_iter()
            .map(move |id| entries.remove(&id).expect("order/entries invariant"))
            .collect::<Vec<_>>()
            .into_iter()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = key.identity_key();
        if let Some(pos) = self.order.iter().position(|k| k == &id) {
            self.order.remove(pos);
        }
        self.entries.remove(&id).map(|(_, v)| v)
    }
}

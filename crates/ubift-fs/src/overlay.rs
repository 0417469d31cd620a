//! A generic "highest sequence number wins" map, shared between journal
//! replay (overlaying the committed on-disk index with unindexed writes)
//! and the recovery engine's correlation pass, since both need the
//! identical merge rule.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Overlay<K: Ord + Clone, V> {
    entries: BTreeMap<K, (u64, V)>,
}

impl<K: Ord + Clone, V> Default for Overlay<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V> Overlay<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key` unless an entry already exists with a
    /// strictly greater sequence number.
    pub fn upsert(&mut self, key: K, sqnum: u64, value: V) {
        match self.entries.get(&key) {
            Some((existing_sqnum, _)) if *existing_sqnum >= sqnum => {}
            _ => {
                self.entries.insert(key, (sqnum, value));
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, (_, v))| (k, v))
    }

    pub fn range<R>(&self, range: R) -> impl Iterator<Item = (&K, &V)>
    where
        R: std::ops::RangeBounds<K>,
    {
        self.entries.range(range).map(|(k, (_, v))| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges `other` into `self`, applying the same "higher sqnum wins"
    /// rule entry by entry. Associative: merging a set of per-worker
    /// overlays in any order yields the same result, which is what lets a
    /// parallel scan merge sequentially afterward.
    pub fn merge(&mut self, other: Overlay<K, V>) {
        for (key, (sqnum, value)) in other.entries {
            self.upsert(key, sqnum, value);
        }
    }
}

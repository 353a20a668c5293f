//! Fixed-bucket hash index with per-bucket collision chains.
//!
//! Keys map to a bucket through [`IndexKey::bucket_of`]. Each bucket holds its
//! chain in insertion order; lookups and traversal walk it newest-first, so a
//! shadowed duplicate key always resolves to the most recent insert.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

pub const DEFAULT_BUCKET_COUNT: usize = 100;

pub trait IndexKey: Copy + Eq + fmt::Display {
    /// Bucket for this key. Must be in `0..bucket_count`.
    fn bucket_of(&self, bucket_count: usize) -> usize;
}

/// `key mod bucket_count` using the Euclidean remainder, so negative keys land
/// in `0..bucket_count` as well (`-1` maps to the last bucket).
pub fn integer_bucket(key: i64, bucket_count: usize) -> usize {
    let modulus = i64::try_from(bucket_count.max(1)).unwrap_or(i64::MAX);
    usize::try_from(key.rem_euclid(modulus)).unwrap_or(0)
}

/// What `insert` does with a key that is already present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The first insert stays authoritative; later inserts fail with `DuplicateKey`.
    #[default]
    Reject,
    /// Later inserts shadow earlier ones; the older entry stays in the chain but
    /// is unreachable through `lookup`.
    Shadow,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "shadow" => Ok(Self::Shadow),
            other => Err(format!("unsupported duplicate key policy `{other}` (expected reject|shadow)")),
        }
    }
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

#[derive(Clone, Debug)]
pub struct ChainedIndex<K, V> {
    entity: &'static str,
    policy: DuplicatePolicy,
    buckets: Vec<Vec<Entry<K, V>>>,
    len: usize,
}

impl<K: IndexKey, V> ChainedIndex<K, V> {
    /// `entity` names the record kind in errors ("user", "product").
    pub fn new(entity: &'static str, bucket_count: usize, policy: DuplicatePolicy) -> Self {
        let bucket_count = bucket_count.max(1);
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Vec::new);
        Self { entity, policy, buckets, len: 0 }
    }

    pub fn with_defaults(entity: &'static str) -> Self {
        Self::new(entity, DEFAULT_BUCKET_COUNT, DuplicatePolicy::default())
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of stored entries, shadowed duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_of(&self, key: &K) -> usize {
        key.bucket_of(self.buckets.len())
    }

    /// Prepends `value` to the key's chain.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), StoreError> {
        if self.policy == DuplicatePolicy::Reject && self.contains(&key) {
            return Err(StoreError::duplicate(self.entity, key));
        }

        let bucket = self.bucket_of(&key);
        let chain = self.chain_mut(bucket);
        chain.push(Entry { key, value });
        self.len += 1;
        Ok(())
    }

    pub fn lookup(&self, key: &K) -> Option<&V> {
        self.chain(self.bucket_of(key))
            .iter()
            .rev()
            .find(|entry| entry.key == *key)
            .map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lookup(key).is_some()
    }

    /// Applies `mutate` to the entry `lookup` would return. Never inserts.
    pub fn update<R>(&mut self, key: &K, mutate: impl FnOnce(&mut V) -> R) -> Result<R, StoreError> {
        let entity = self.entity;
        let bucket = self.bucket_of(key);
        self.chain_mut(bucket)
            .iter_mut()
            .rev()
            .find(|entry| entry.key == *key)
            .map(|entry| mutate(&mut entry.value))
            .ok_or_else(|| StoreError::not_found(entity, key))
    }

    /// All entries, buckets in increasing order and each chain newest-first.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().rev())
            .map(|entry| (&entry.key, &entry.value))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn for_each(&self, mut visit: impl FnMut(&K, &V)) {
        for (key, value) in self.iter() {
            visit(key, value);
        }
    }

    /// Keys of one bucket's chain, newest-first. Empty for out-of-range buckets.
    pub fn chain_keys(&self, bucket: usize) -> Vec<K> {
        self.chain(bucket).iter().rev().map(|entry| entry.key).collect()
    }

    fn chain(&self, bucket: usize) -> &[Entry<K, V>] {
        self.buckets.get(bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    fn chain_mut(&mut self, bucket: usize) -> &mut Vec<Entry<K, V>> {
        let last = self.buckets.len() - 1;
        let bucket = bucket.min(last);
        &mut self.buckets[bucket]
    }
}

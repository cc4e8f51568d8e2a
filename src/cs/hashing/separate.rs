//! # Separate Chaining Hash Table
//!
//! This module implements a string-keyed **hash table** using **separate chaining**, built from
//! scratch on top of a plain bucket array. It supports:
//! - **String** keys with **generic** values (`V`), keys are immutable once stored.
//! - **Insert-or-update** (`put`), **get**, **contains_key**, **remove** and basic iteration with
//!   expected **O(1)** average performance.
//! - **Automatic growth**: whenever `size / capacity` exceeds the maximum load factor (0.75 by
//!   default) the bucket array is doubled and every entry is rehashed before `put` returns.
//! - **Configurable** hasher using `BuildHasher`; the default is the deterministic
//!   [`PolyHashBuilder`], so bucket placement is stable across runs.
//!
//! The capacity is always a power of two, which lets the bucket index be computed with a mask.
//! Removal never shrinks the table.
//!
//! ```rust
//! use shortlink::ChainedHashTable;
//!
//! let mut table = ChainedHashTable::new();
//! assert!(table.put("abc123", "https://example.com/a".to_string()));
//! assert_eq!(table.get("abc123").map(String::as_str), Some("https://example.com/a"));
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hasher};

use crate::cs::hashing::polynomial_rolling::PolyHashBuilder;
use crate::error::{Error, Result};

/// Default initial capacity if none specified.
const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Default maximum load factor before resizing.
const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// Largest number of buckets a table may have. `resize` stops doubling here.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Smallest accepted maximum load factor.
pub const MIN_LOAD_FACTOR: f64 = 0.1;

/// A single entry in a chain.
#[derive(Debug, Clone)]
struct Entry<V> {
    key: String,
    value: V,
}

/// A "bucket" is a vector of entries kept in insertion order.
type Bucket<V> = Vec<Entry<V>>;

/// A separate-chaining hash table keyed by strings, with a customizable hasher.
#[derive(Debug, Clone)]
pub struct ChainedHashTable<V, S = PolyHashBuilder> {
    /// Bucket array; its length is the capacity and always a power of two.
    buckets: Vec<Bucket<V>>,
    /// The number of stored key-value pairs.
    len: usize,
    /// The maximum load factor (ratio = len / capacity).
    max_load_factor: f64,
    /// Hasher builder.
    build_hasher: S,
}

/// A builder for the `ChainedHashTable`.
/// Typically you'll call `.with_capacity(...)`, `.with_hasher(...)`, etc., then `.build()`.
#[derive(Debug, Clone)]
pub struct ChainedHashTableBuilder<S> {
    capacity: usize,
    max_load_factor: f64,
    hasher: S,
}

impl Default for ChainedHashTableBuilder<PolyHashBuilder> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            hasher: PolyHashBuilder::new(),
        }
    }
}

impl ChainedHashTableBuilder<PolyHashBuilder> {
    /// Creates a new builder with default capacity and the polynomial hasher.
    pub fn new() -> Self {
        Default::default()
    }
}

impl<S: BuildHasher> ChainedHashTableBuilder<S> {
    /// Sets the initial number of buckets. Rounded up to the next power of two on `build`.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the maximum load factor. If `len / capacity` exceeds it, the table grows.
    pub fn with_max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = lf;
        self
    }

    /// Sets a custom hasher builder.
    pub fn with_hasher<T: BuildHasher>(self, hasher: T) -> ChainedHashTableBuilder<T> {
        ChainedHashTableBuilder {
            capacity: self.capacity,
            max_load_factor: self.max_load_factor,
            hasher,
        }
    }

    /// Build the final `ChainedHashTable`.
    ///
    /// # Errors
    /// `InvalidArgument` if the capacity is zero or rounds up past [`MAX_CAPACITY`], or if the
    /// load factor is not a finite number of at least [`MIN_LOAD_FACTOR`].
    pub fn build<V>(self) -> Result<ChainedHashTable<V, S>> {
        if self.capacity == 0 {
            return Err(Error::invalid_argument("capacity must be > 0"));
        }
        let bucket_count = self
            .capacity
            .checked_next_power_of_two()
            .filter(|&count| count <= MAX_CAPACITY)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "capacity {} exceeds the maximum of {}",
                    self.capacity, MAX_CAPACITY
                ))
            })?;
        if !(self.max_load_factor.is_finite() && self.max_load_factor >= MIN_LOAD_FACTOR) {
            return Err(Error::invalid_argument(format!(
                "load factor must be finite and >= {}, got {}",
                MIN_LOAD_FACTOR, self.max_load_factor
            )));
        }
        Ok(ChainedHashTable::from_parts(
            bucket_count,
            self.max_load_factor,
            self.hasher,
        ))
    }
}

impl<V> ChainedHashTable<V> {
    /// Creates an empty table with 16 buckets and the polynomial hasher.
    pub fn new() -> Self {
        Self::from_parts(
            DEFAULT_INITIAL_CAPACITY,
            DEFAULT_MAX_LOAD_FACTOR,
            PolyHashBuilder::new(),
        )
    }

    /// Creates an empty table with at least `capacity` buckets.
    ///
    /// # Errors
    /// `InvalidArgument` if `capacity` is zero or above [`MAX_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        ChainedHashTableBuilder::new().with_capacity(capacity).build()
    }
}

impl<V> Default for ChainedHashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> ChainedHashTable<V, S> {
    fn from_parts(bucket_count: usize, max_load_factor: f64, build_hasher: S) -> Self {
        ChainedHashTable {
            buckets: empty_buckets(bucket_count),
            len: 0,
            max_load_factor,
            build_hasher,
        }
    }

    /// Returns the number of key-value pairs in the table.
    pub fn size(&self) -> usize {
        self.len
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current `size / capacity` ratio.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// The ratio above which `put` grows the table.
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Removes every entry. The capacity is left as is.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Returns an iterator over the key-value pairs, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.buckets.iter().flat_map(|bucket| {
            bucket
                .iter()
                .map(|entry| (entry.key.as_str(), &entry.value))
        })
    }
}

impl<V, S: BuildHasher> ChainedHashTable<V, S> {
    /// Bucket index of `key` under the current capacity.
    pub fn hash(&self, key: &str) -> usize {
        let mut hasher = self.build_hasher.build_hasher();
        hasher.write(key.as_bytes());
        bucket_index(hasher.finish(), self.buckets.len())
    }

    /// Stores `value` under `key`.
    ///
    /// Returns `true` when the key was freshly inserted and `false` when an existing value was
    /// replaced. Grows the table before returning if the load factor went over the maximum.
    pub fn put<K: Into<String>>(&mut self, key: K, value: V) -> bool {
        let key = key.into();
        let idx = self.hash(&key);
        let bucket = &mut self.buckets[idx];

        if let Some(entry) = bucket.iter_mut().find(|entry| entry.key == key) {
            entry.value = value;
            return false;
        }

        bucket.push(Entry { key, value });
        self.len += 1;

        while self.load_factor() > self.max_load_factor && self.capacity() < MAX_CAPACITY {
            self.resize();
        }
        true
    }

    /// Returns a reference to the value stored under `key`, if present.
    pub fn get(&self, key: &str) -> Option<&V> {
        let idx = self.hash(key);
        self.buckets[idx]
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// True if an entry with exactly this key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes and returns the value for the specified key, if present.
    /// The remaining entries of the chain keep their order.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.hash(key);
        let bucket = &mut self.buckets[idx];
        let pos = bucket.iter().position(|entry| entry.key == key)?;
        let entry = bucket.remove(pos);
        self.len -= 1;
        Some(entry.value)
    }

    /// Doubles the number of buckets and rehashes every entry into the new array.
    /// A table already at [`MAX_CAPACITY`] is left unchanged.
    pub fn resize(&mut self) {
        let old_capacity = self.buckets.len();
        if old_capacity >= MAX_CAPACITY {
            log::warn!(
                "Chained hash table already at {} buckets, not resizing",
                MAX_CAPACITY
            );
            return;
        }
        let new_capacity = old_capacity * 2;
        let old_buckets = std::mem::replace(&mut self.buckets, empty_buckets(new_capacity));

        for bucket in old_buckets {
            for entry in bucket {
                let idx = self.hash(&entry.key);
                self.buckets[idx].push(entry);
            }
        }

        log::debug!(
            "Resized chained hash table from {} to {} buckets ({} entries)",
            old_capacity,
            new_capacity,
            self.len
        );
    }
}

impl<V, S> fmt::Display for ChainedHashTable<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied = self.buckets.iter().filter(|b| !b.is_empty()).count();
        let longest = self.buckets.iter().map(Vec::len).max().unwrap_or(0);
        write!(
            f,
            "ChainedHashTable{{size={}, capacity={}, load={:.4}, occupied_buckets={}, longest_chain={}}}",
            self.len,
            self.buckets.len(),
            self.load_factor(),
            occupied,
            longest
        )
    }
}

fn empty_buckets<V>(bucket_count: usize) -> Vec<Bucket<V>> {
    let mut buckets = Vec::with_capacity(bucket_count);
    buckets.resize_with(bucket_count, Vec::new);
    buckets
}

/// Folds the high bits into the low ones, then masks. `bucket_count` must be a power of two.
#[inline]
fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    let spread = hash ^ (hash >> 32) ^ (hash >> 16);
    (spread as usize) & (bucket_count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Sends every key to bucket 0.
    #[derive(Debug, Clone, Copy, Default)]
    struct SingleBucket;

    struct ZeroHasher;

    impl Hasher for ZeroHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for SingleBucket {
        type Hasher = ZeroHasher;

        fn build_hasher(&self) -> ZeroHasher {
            ZeroHasher
        }
    }

    fn single_bucket_table() -> ChainedHashTable<String, SingleBucket> {
        ChainedHashTableBuilder::new()
            .with_capacity(4)
            .with_hasher(SingleBucket)
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_table() {
        let table: ChainedHashTable<String> = ChainedHashTable::new();
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.size(), 0);
        assert!(table.is_empty());
        assert_relative_eq!(table.load_factor(), 0.0);
        assert_relative_eq!(table.max_load_factor(), 0.75);
    }

    #[test]
    fn basic_put_get() {
        let mut table = ChainedHashTable::new();
        let url = "https://www.example.com/a/very/long/page".to_string();

        assert!(table.put("abc123", url.clone()));
        assert_eq!(table.get("abc123"), Some(&url));
        assert_eq!(table.size(), 1);
        assert!(!table.is_empty());
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn test_update_existing_key() {
        let mut table = ChainedHashTable::new();
        assert!(table.put("abc123", "https://example.com/original"));
        assert!(!table.put("abc123", "https://example.com/updated"));

        assert_eq!(table.get("abc123"), Some(&"https://example.com/updated"));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_multiple_insertions() {
        let mut table = ChainedHashTable::new();
        for i in 0..5 {
            assert!(table.put(format!("key{}", i), format!("https://www.site{}.com", i)));
        }
        for i in 0..5 {
            assert_eq!(
                table.get(&format!("key{}", i)),
                Some(&format!("https://www.site{}.com", i))
            );
        }
        assert_eq!(table.size(), 5);
    }

    #[test]
    fn test_load_factor_calculation() {
        let mut table = ChainedHashTable::new();
        for i in 0..8 {
            table.put(format!("key{}", i), i);
        }
        assert_relative_eq!(table.load_factor(), 0.5);
    }

    #[test]
    fn test_automatic_resize() {
        let mut table = ChainedHashTable::new();
        for i in 0..12 {
            table.put(format!("key{}", i), format!("https://www.example{}.com", i));
        }
        // 12 / 16 == 0.75 is still within bounds
        assert_eq!(table.capacity(), 16);

        table.put("key12", "https://www.example12.com".to_string());
        assert_eq!(table.capacity(), 32);

        for i in 0..13 {
            assert_eq!(
                table.get(&format!("key{}", i)),
                Some(&format!("https://www.example{}.com", i))
            );
        }
    }

    #[test]
    fn test_manual_resize() {
        let mut table = ChainedHashTable::new();
        for i in 0..5 {
            table.put(format!("key{}", i), format!("url{}", i));
        }
        let before = table.capacity();
        table.resize();
        assert_eq!(table.capacity(), before * 2);
        assert_eq!(table.size(), 5);
        for i in 0..5 {
            assert_eq!(table.get(&format!("key{}", i)), Some(&format!("url{}", i)));
        }
    }

    #[test]
    fn test_load_factor_bound_after_every_put() {
        let mut table = ChainedHashTable::new();
        for i in 0..1000 {
            table.put(format!("key{}", i), i);
            assert!(table.load_factor() <= 0.75);
            assert!(table.capacity().is_power_of_two());
        }
        assert_eq!(table.size(), 1000);
        for i in 0..1000 {
            assert_eq!(table.get(&format!("key{}", i)), Some(&i));
        }
    }

    #[test]
    fn test_collision_handling() {
        let mut table = ChainedHashTable::with_capacity(4).unwrap();
        let keys = ["a", "e", "i", "o", "u"];
        for (i, key) in keys.iter().enumerate() {
            table.put(*key, format!("url{}", i + 1));
        }
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(table.get(key), Some(&format!("url{}", i + 1)));
        }
        assert_eq!(table.size(), keys.len());
    }

    #[test]
    fn test_single_chain_remove_keeps_order() {
        let mut table = single_bucket_table();
        table.put("first", "1".to_string());
        table.put("second", "2".to_string());
        table.put("third", "3".to_string());

        assert_eq!(table.remove("second"), Some("2".to_string()));
        assert_eq!(table.size(), 2);

        let keys: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["first", "third"]);
        assert_eq!(table.get("third"), Some(&"3".to_string()));
        assert!(!table.contains_key("second"));
    }

    #[test]
    fn test_single_chain_update_in_place() {
        let mut table = single_bucket_table();
        table.put("x", "old".to_string());
        table.put("y", "other".to_string());
        assert!(!table.put("x", "new".to_string()));
        assert_eq!(table.size(), 2);
        assert_eq!(table.get("x"), Some(&"new".to_string()));
    }

    #[test]
    fn test_custom_capacity() {
        let table: ChainedHashTable<String> = ChainedHashTable::with_capacity(32).unwrap();
        assert_eq!(table.capacity(), 32);
        assert_eq!(table.size(), 0);
        assert!(table.is_empty());

        let rounded: ChainedHashTable<String> = ChainedHashTable::with_capacity(20).unwrap();
        assert_eq!(rounded.capacity(), 32);

        assert!(matches!(
            ChainedHashTable::<String>::with_capacity(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_capacity_ceiling() {
        for capacity in [MAX_CAPACITY + 1, 1 << 40, 1 << 62, usize::MAX] {
            assert!(matches!(
                ChainedHashTable::<String>::with_capacity(capacity),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_capacity_one_grows() {
        let mut table = ChainedHashTable::with_capacity(1).unwrap();
        assert_eq!(table.capacity(), 1);
        table.put("only", 1);
        assert_eq!(table.capacity(), 2);
        assert_eq!(table.get("only"), Some(&1));
    }

    #[test]
    fn test_invalid_load_factor() {
        for lf in [0.0, -1.0, 1e-30, 0.05, f64::NAN, f64::INFINITY] {
            let result = ChainedHashTableBuilder::new()
                .with_max_load_factor(lf)
                .build::<String>();
            assert!(matches!(result, Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_smallest_load_factor_is_bounded() {
        let mut table = ChainedHashTableBuilder::new()
            .with_capacity(1)
            .with_max_load_factor(MIN_LOAD_FACTOR)
            .build()
            .unwrap();
        for i in 0..10 {
            table.put(format!("k{}", i), i);
            assert!(table.load_factor() <= MIN_LOAD_FACTOR);
        }
        assert_eq!(table.capacity(), 128);
    }

    #[test]
    fn test_custom_base_hasher() {
        let mut table = ChainedHashTableBuilder::new()
            .with_hasher(PolyHashBuilder::new().with_base(257).with_modulus(1_000_000_007))
            .build()
            .unwrap();
        for i in 0..100 {
            table.put(format!("key{}", i), i);
        }
        for i in 0..100 {
            assert_eq!(table.get(&format!("key{}", i)), Some(&i));
        }
    }

    #[test]
    fn test_custom_load_factor() {
        let mut table = ChainedHashTableBuilder::new()
            .with_capacity(8)
            .with_max_load_factor(0.5)
            .build()
            .unwrap();
        for i in 0..4 {
            table.put(format!("k{}", i), i);
        }
        assert_eq!(table.capacity(), 8);
        table.put("k4", 4);
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn test_edge_case_keys() {
        let mut table = ChainedHashTable::new();
        table.put("", "https://www.example.com".to_string());
        assert_eq!(table.get(""), Some(&"https://www.example.com".to_string()));

        let long_url = format!("https://www.example.com/{}", "a".repeat(1000));
        table.put("long", long_url.clone());
        assert_eq!(table.get("long"), Some(&long_url));

        let special = "áéíóú@#$%";
        table.put(special, "https://www.special.com/página?param=value".to_string());
        assert_eq!(
            table.get(special),
            Some(&"https://www.special.com/página?param=value".to_string())
        );
    }

    #[test]
    fn test_hash_is_stable_and_in_range() {
        let a: ChainedHashTable<()> = ChainedHashTable::new();
        let b: ChainedHashTable<()> = ChainedHashTable::new();
        for key in ["", "a", "key42", "áéíóú"] {
            assert!(a.hash(key) < a.capacity());
            assert_eq!(a.hash(key), a.hash(key));
            assert_eq!(a.hash(key), b.hash(key));
        }
    }

    #[test]
    fn test_remove() {
        let mut table = ChainedHashTable::new();
        assert_eq!(table.remove("missing"), None);
        assert_eq!(table.size(), 0);

        table.put("remove_test", "https://www.example.com/remove".to_string());
        assert_eq!(table.size(), 1);
        assert_eq!(
            table.remove("remove_test"),
            Some("https://www.example.com/remove".to_string())
        );
        assert_eq!(table.size(), 0);
        assert_eq!(table.get("remove_test"), None);
        assert!(!table.contains_key("remove_test"));
    }

    #[test]
    fn test_remove_never_shrinks() {
        let mut table = ChainedHashTable::new();
        for i in 0..20 {
            table.put(format!("key{}", i), i);
        }
        let grown = table.capacity();
        for i in 0..20 {
            assert_eq!(table.remove(&format!("key{}", i)), Some(i));
        }
        assert!(table.is_empty());
        assert_eq!(table.capacity(), grown);
    }

    #[test]
    fn test_contains_key() {
        let mut table = ChainedHashTable::new();
        assert!(!table.contains_key("test_key"));
        table.put("test_key", "https://www.example.com".to_string());
        assert!(table.contains_key("test_key"));
        assert!(!table.contains_key("other_key"));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut table = ChainedHashTable::new();
        for i in 0..40 {
            table.put(format!("key{}", i), i);
        }
        let capacity = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.get("key0"), None);
    }

    #[test]
    fn test_iter() {
        let mut table = ChainedHashTable::new();
        table.put("one", 1);
        table.put("two", 2);
        table.put("three", 3);

        let mut items: Vec<_> = table.iter().map(|(k, v)| (k, *v)).collect();
        items.sort_by_key(|x| x.0);
        assert_eq!(items, vec![("one", 1), ("three", 3), ("two", 2)]);
    }

    #[test]
    fn test_display() {
        let mut table = ChainedHashTable::new();
        let rendered = table.to_string();
        assert!(rendered.starts_with("ChainedHashTable"));
        assert!(rendered.contains("size=0"));
        assert!(rendered.contains("capacity=16"));

        table.put("a", 1);
        let rendered = table.to_string();
        assert!(rendered.contains("size=1"));
        assert!(rendered.contains("load=0.0625"));
        assert!(rendered.contains("occupied_buckets=1"));
    }
}

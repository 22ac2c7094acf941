// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.


use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;
use tracing::trace;

use crate::counting::CountingBloomFilterBuilder;
use crate::counting::index::IndexEngine;

/// Default table size (m).
pub const DEFAULT_TABLE_SIZE: u64 = 8_000_009;

/// One occupied slot of the filter.
///
/// Holds the first element hashed here since the slot was last empty, plus the number of
/// occupancy events counted against it. A bucket with a zero count never exists.
#[derive(Debug)]
pub struct Bucket<T> {
    representative: Arc<T>,
    count: u64,
}

impl<T> Bucket<T> {
    /// The element that first made this bucket non-empty.
    pub fn representative(&self) -> &T {
        &self.representative
    }

    /// Number of occupancy events currently counted; always at least 1.
    pub fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeletePolicy {
    /// Only decrement buckets whose representative equals the target.
    Safe,
    /// Decrement every bucket the target hashes to.
    Risky,
}

/// A counting Bloom filter that remembers one representative element per bucket.
///
/// Membership queries answer "possibly present" or "definitely absent". Each bucket keeps the
/// first element that occupied it, which lets a query stop early on an exact match and lets
/// [`possibly_delete`](Self::possibly_delete) remove an element without touching buckets that
/// other elements own.
///
/// The filter is not synchronized. Callers sharing it across threads must guard it with a lock.
///
/// # Examples
///
/// ```
/// use deletable_bloom::counting::CountingBloomFilter;
///
/// let mut filter = CountingBloomFilter::builder().size(1_000_003).build().unwrap();
/// filter.add(42_i64);
/// assert!(filter.possibly_has(&42));
///
/// filter.possibly_delete(&42);
/// assert!(filter.definitely_not_has(&42));
/// ```
pub struct CountingBloomFilter<T> {
    engine: IndexEngine<T>,
    buckets: HashMap<u64, Bucket<T>>,
    max_observed_bucket_count: u64,
}

impl<T: Hash + 'static> CountingBloomFilter<T> {
    /// Returns a builder preloaded with the default table size and hash functions.
    pub fn builder() -> CountingBloomFilterBuilder<T> {
        CountingBloomFilterBuilder::default()
    }
}

impl<T> CountingBloomFilter<T> {
    pub(crate) fn from_engine(engine: IndexEngine<T>) -> Self {
        CountingBloomFilter {
            engine,
            buckets: HashMap::new(),
            max_observed_bucket_count: 0,
        }
    }

    /// Returns the table size (m).
    pub fn table_size(&self) -> u64 {
        self.engine.table_size()
    }

    /// Returns the number of hash functions (k).
    pub fn num_hashes(&self) -> usize {
        self.engine.num_hashes()
    }

    /// Returns the largest count any bucket has ever reached.
    ///
    /// Informational only; never lowered by deletes or [`reset`](Self::reset).
    pub fn max_observed_bucket_count(&self) -> u64 {
        self.max_observed_bucket_count
    }

    /// Returns the number of non-empty buckets.
    pub fn num_occupied_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Returns whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns the fraction of the table that is occupied.
    pub fn load_factor(&self) -> f64 {
        self.buckets.len() as f64 / self.table_size() as f64
    }

    /// Returns the bucket at `index`, if it is occupied.
    pub fn bucket(&self, index: u64) -> Option<&Bucket<T>> {
        self.buckets.get(&index)
    }

    /// Returns the k indices `element` hashes to, in hash-function order.
    pub fn indices(&self, element: &T) -> Vec<u64> {
        self.engine.compute_indices(element)
    }

    /// Empties every bucket while keeping the configuration.
    pub fn reset(&mut self) {
        self.buckets.clear();
    }
}

impl<T: Eq> CountingBloomFilter<T> {
    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts an element.
    ///
    /// Each distinct index is counted once per call, even if several hash functions land on it.
    /// Empty buckets take `element` as their representative.
    ///
    /// # Examples
    ///
    /// ```
    /// # use deletable_bloom::counting::CountingBloomFilter;
    /// let mut filter = CountingBloomFilter::builder().size(1_000_003).build().unwrap();
    /// filter.add("apple");
    /// filter.add("apple");
    /// assert!(filter.possibly_has(&"apple"));
    /// assert_eq!(filter.max_observed_bucket_count(), 2);
    /// ```
    pub fn add(&mut self, element: T) {
        let indices = self.engine.compute_indices(&element);
        let element = Arc::new(element);
        let mut counted = HashSet::with_capacity(indices.len());

        for index in indices {
            if !counted.insert(index) {
                continue;
            }

            let bucket = self.buckets.entry(index).or_insert_with(|| {
                trace!(index, "created bucket");
                Bucket {
                    representative: Arc::clone(&element),
                    count: 0,
                }
            });
            bucket.count += 1;
            self.max_observed_bucket_count = self.max_observed_bucket_count.max(bucket.count);
        }
    }

    /// Removes an element, touching only buckets it represents.
    ///
    /// Does nothing if the element is definitely absent. Buckets whose representative is a
    /// different element are left alone, so this never produces a false negative for another
    /// element.
    pub fn possibly_delete(&mut self, element: &T) {
        self.delete(element, DeletePolicy::Safe);
    }

    /// Removes an element by decrementing every bucket it hashes to.
    ///
    /// Does nothing if the element is definitely absent. Otherwise each occupied bucket at the
    /// element's indices loses one count, whoever its representative is. A bucket that belongs
    /// to a colliding element can be emptied this way, after which that element may be reported
    /// as absent.
    ///
    /// An index that several hash functions share is decremented once per call, as in
    /// [`add`](Self::add).
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use deletable_bloom::counting::CountingBloomFilterBuilder;
    /// # use deletable_bloom::hash::HashFunction;
    /// // Every element lands in the same bucket.
    /// let constant: HashFunction<i64> = Arc::new(|_: &i64| 7);
    /// let mut filter = CountingBloomFilterBuilder::with_hash_functions(vec![constant])
    ///     .size(100)
    ///     .build()
    ///     .unwrap();
    ///
    /// filter.add(1);
    /// filter.risky_delete(&2); // collides with 1, so it looks present
    /// assert!(filter.definitely_not_has(&1));
    /// ```
    pub fn risky_delete(&mut self, element: &T) {
        self.delete(element, DeletePolicy::Risky);
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an element is possibly in the set.
    ///
    /// Returns `false` only if some index the element hashes to is empty.
    pub fn possibly_has(&self, element: &T) -> bool {
        let indices = self.engine.compute_indices(element);
        self.probe(&indices, element)
    }

    /// Tests whether an element is definitely not in the set.
    pub fn definitely_not_has(&self, element: &T) -> bool {
        !self.possibly_has(element)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Walks the indices in order: an empty bucket proves absence, a bucket represented by
    /// `element` proves presence, and a collision defers to the next index. Reaching the end
    /// means every bucket was occupied.
    fn probe(&self, indices: &[u64], element: &T) -> bool {
        for index in indices {
            match self.buckets.get(index) {
                None => return false,
                Some(bucket) if *bucket.representative == *element => return true,
                Some(_) => {}
            }
        }
        true
    }

    fn delete(&mut self, element: &T, policy: DeletePolicy) {
        let indices = self.engine.compute_indices(element);
        if !self.probe(&indices, element) {
            trace!(?policy, "element is definitely absent; nothing to delete");
            return;
        }

        let mut visited = HashSet::with_capacity(indices.len());
        for index in indices {
            if !visited.insert(index) {
                continue;
            }

            let Entry::Occupied(mut entry) = self.buckets.entry(index) else {
                continue;
            };

            let owned = *entry.get().representative == *element;
            match policy {
                DeletePolicy::Safe if !owned => continue,
                DeletePolicy::Risky if !owned => debug!(
                    index,
                    count = entry.get().count,
                    "decrementing bucket owned by another representative"
                ),
                _ => {}
            }

            let bucket = entry.get_mut();
            bucket.count -= 1;
            if bucket.count < 1 {
                entry.remove();
                debug!(index, ?policy, "cleared bucket");
            }
        }
    }
}

impl<T> fmt::Debug for CountingBloomFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingBloomFilter")
            .field("table_size", &self.table_size())
            .field("num_hashes", &self.num_hashes())
            .field("num_occupied_buckets", &self.buckets.len())
            .field("max_observed_bucket_count", &self.max_observed_bucket_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counting::CountingBloomFilterBuilder;
    use crate::hash::HashFunction;

    /// Hash functions that return `x + offset`, so indices are easy to predict.
    fn offset_filter(size: u64, offsets: &[i64]) -> CountingBloomFilter<i64> {
        let hash_functions = offsets
            .iter()
            .map(|&offset| Arc::new(move |x: &i64| x.wrapping_add(offset)) as HashFunction<i64>)
            .collect();
        CountingBloomFilterBuilder::with_hash_functions(hash_functions)
            .size(size)
            .build()
            .unwrap()
    }

    #[test]
    fn test_add_creates_buckets_with_representative() {
        let mut filter = offset_filter(100, &[0, 1, 2]);
        filter.add(10);

        for index in [10, 11, 12] {
            let bucket = filter.bucket(index).unwrap();
            assert_eq!(*bucket.representative(), 10);
            assert_eq!(bucket.count(), 1);
        }
        assert_eq!(filter.num_occupied_buckets(), 3);
        assert_eq!(filter.max_observed_bucket_count(), 1);
    }

    #[test]
    fn test_add_counts_duplicate_index_once() {
        // offsets 0 and 100 coincide modulo 100
        let mut filter = offset_filter(100, &[0, 100, 1]);
        filter.add(5);

        assert_eq!(filter.indices(&5), vec![5, 5, 6]);
        assert_eq!(filter.bucket(5).unwrap().count(), 1);
        assert_eq!(filter.bucket(6).unwrap().count(), 1);
        assert_eq!(filter.num_occupied_buckets(), 2);
    }

    #[test]
    fn test_representative_stays_first_element() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10);
        filter.add(11); // indices 11, 12; 11 already belongs to 10

        let shared = filter.bucket(11).unwrap();
        assert_eq!(*shared.representative(), 10);
        assert_eq!(shared.count(), 2);
        assert_eq!(*filter.bucket(12).unwrap().representative(), 11);
        assert_eq!(filter.max_observed_bucket_count(), 2);
    }

    #[test]
    fn test_zero_remainder_index_is_table_size() {
        let mut filter = offset_filter(100, &[0]);
        filter.add(200);

        assert_eq!(filter.indices(&200), vec![100]);
        assert!(filter.bucket(0).is_none());
        assert!(filter.bucket(100).is_some());
        assert!(filter.possibly_has(&200));
        assert!(filter.possibly_has(&0));
    }

    #[test]
    fn test_probe_stops_at_empty_bucket() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10); // 10, 11

        // 9 -> 9 (empty) is decided before 10 is looked at
        assert!(filter.definitely_not_has(&9));
        // 11 -> 11 (owned by 10), 12 (empty)
        assert!(filter.definitely_not_has(&11));
    }

    #[test]
    fn test_probe_collisions_on_all_indices_are_positive() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10); // 10, 11
        filter.add(12); // 12, 13

        // 11 -> 11 (10), 12 (12): never inserted, but every bucket is occupied
        assert!(filter.possibly_has(&11));
    }

    #[test]
    fn test_possibly_delete_clears_owned_buckets() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10);
        filter.possibly_delete(&10);

        assert!(filter.is_empty());
        assert!(filter.definitely_not_has(&10));
        assert_eq!(filter.max_observed_bucket_count(), 1);
    }

    #[test]
    fn test_possibly_delete_decrements_before_clearing() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10);
        filter.add(10);
        filter.possibly_delete(&10);

        assert_eq!(filter.bucket(10).unwrap().count(), 1);
        assert!(filter.possibly_has(&10));

        filter.possibly_delete(&10);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_possibly_delete_leaves_foreign_buckets() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10); // 10, 11
        filter.add(11); // 11 (owned by 10), 12

        filter.possibly_delete(&11);
        assert!(filter.bucket(12).is_none());
        assert_eq!(filter.bucket(11).unwrap().count(), 2);
        assert!(filter.possibly_has(&10));
    }

    #[test]
    fn test_possibly_delete_absent_is_noop() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10);
        filter.possibly_delete(&50);

        assert_eq!(filter.num_occupied_buckets(), 2);
        assert_eq!(filter.bucket(10).unwrap().count(), 1);
    }

    #[test]
    fn test_risky_delete_decrements_foreign_buckets() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10); // 10, 11
        filter.add(12); // 12, 13

        // 11 looks present (11 -> 10's bucket, 12 -> 12's bucket)
        filter.risky_delete(&11);
        assert!(filter.bucket(11).is_none());
        assert!(filter.bucket(12).is_none());
        assert_eq!(filter.num_occupied_buckets(), 2);
        // 12 never deleted, yet its first bucket is gone
        assert!(filter.definitely_not_has(&12));
    }

    #[test]
    fn test_probe_returns_on_owned_bucket_before_empty_one() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10); // 10, 11
        filter.add(12); // 12, 13
        filter.risky_delete(&11); // empties 11 and 12

        assert!(filter.bucket(11).is_none());
        // 10 owns bucket 10, so the empty bucket 11 is never reached
        assert!(filter.possibly_has(&10));
        assert!(filter.definitely_not_has(&12));
    }

    #[test]
    fn test_risky_delete_skips_empty_and_duplicate_indices() {
        let mut filter = offset_filter(100, &[0, 100]);
        filter.add(5);
        filter.add(5);
        assert_eq!(filter.bucket(5).unwrap().count(), 2);

        filter.risky_delete(&5);
        assert_eq!(filter.bucket(5).unwrap().count(), 1);
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let mut filter = offset_filter(100, &[0, 1, 2]);
        filter.add(1);
        filter.add(1);
        filter.reset();

        assert!(filter.is_empty());
        assert_eq!(filter.table_size(), 100);
        assert_eq!(filter.num_hashes(), 3);
        assert_eq!(filter.max_observed_bucket_count(), 2);
        assert_eq!(filter.load_factor(), 0.0);
    }

    #[test]
    fn test_load_factor() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10);
        assert_eq!(filter.load_factor(), 0.02);
    }

    #[test]
    fn test_debug_summarizes_state() {
        let mut filter = offset_filter(100, &[0, 1]);
        filter.add(10);
        assert_eq!(
            format!("{filter:?}"),
            "CountingBloomFilter { table_size: 100, num_hashes: 2, \
             num_occupied_buckets: 2, max_observed_bucket_count: 1 }"
        );
    }
}

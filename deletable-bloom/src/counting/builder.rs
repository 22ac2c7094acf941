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


use std::fmt;
use std::hash::Hash;

use crate::counting::CountingBloomFilter;
use crate::counting::DEFAULT_TABLE_SIZE;
use crate::counting::index::IndexEngine;
use crate::error::Error;
use crate::hash::DEFAULT_TUNINGS;
use crate::hash::ElementHasher;
use crate::hash::HashFunction;
use crate::hash::MurmurHasher;
use crate::hash::tuned_hash_functions;

/// Builder for creating [`CountingBloomFilter`] instances.
///
/// Starts from [`DEFAULT_TABLE_SIZE`] and, for hashable elements, six MurmurHash3-based hash
/// functions tuned by [`DEFAULT_TUNINGS`]. Invalid settings are rejected by
/// [`build()`](Self::build).
pub struct CountingBloomFilterBuilder<T> {
    size: u64,
    hash_functions: Vec<HashFunction<T>>,
}

impl<T: Hash + 'static> Default for CountingBloomFilterBuilder<T> {
    fn default() -> Self {
        Self::with_hash_functions(tuned_hash_functions(MurmurHasher, &DEFAULT_TUNINGS))
    }
}

impl<T> CountingBloomFilterBuilder<T> {
    /// Creates a builder around an explicit, ordered list of hash functions.
    ///
    /// Works for element types that do not implement [`Hash`].
    pub fn with_hash_functions(hash_functions: Vec<HashFunction<T>>) -> Self {
        CountingBloomFilterBuilder {
            size: DEFAULT_TABLE_SIZE,
            hash_functions,
        }
    }

    /// Sets the table size (m).
    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Replaces the hash functions; k becomes `hash_functions.len()`.
    pub fn hash_functions(mut self, hash_functions: Vec<HashFunction<T>>) -> Self {
        self.hash_functions = hash_functions;
        self
    }

    /// Derives the six default-tuned hash functions from a custom hashing capability.
    ///
    /// # Examples
    ///
    /// ```
    /// # use deletable_bloom::counting::CountingBloomFilterBuilder;
    /// # use deletable_bloom::hash::ElementHasher;
    /// # use deletable_bloom::hash::Tuning;
    /// struct Scaled;
    ///
    /// impl ElementHasher<i64> for Scaled {
    ///     fn hash(&self, element: &i64, tuning: Tuning) -> i64 {
    ///         element.wrapping_mul(tuning.prime as i64)
    ///     }
    /// }
    ///
    /// let filter = CountingBloomFilterBuilder::<i64>::with_hash_functions(vec![])
    ///     .hasher(Scaled)
    ///     .size(1_000)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.num_hashes(), 6);
    /// ```
    pub fn hasher<H>(mut self, hasher: H) -> Self
    where
        T: 'static,
        H: ElementHasher<T> + Send + Sync + 'static,
    {
        self.hash_functions = tuned_hash_functions(hasher, &DEFAULT_TUNINGS);
        self
    }

    /// Builds the filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if the size is zero or
    /// larger than `i64::MAX`, or if no hash functions were given.
    pub fn build(self) -> Result<CountingBloomFilter<T>, Error> {
        if self.size == 0 {
            return Err(Error::invalid_config("table size must be positive")
                .with_context("size", self.size));
        }
        if self.size > i64::MAX as u64 {
            return Err(Error::invalid_config("table size must not exceed i64::MAX")
                .with_context("size", self.size));
        }
        if self.hash_functions.is_empty() {
            return Err(Error::invalid_config("at least one hash function is required"));
        }

        let engine = IndexEngine::new(self.size, self.hash_functions);
        Ok(CountingBloomFilter::from_engine(engine))
    }
}

impl<T> fmt::Debug for CountingBloomFilterBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingBloomFilterBuilder")
            .field("size", &self.size)
            .field("num_hashes", &self.hash_functions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let filter = CountingBloomFilterBuilder::<u64>::default().build().unwrap();
        assert_eq!(filter.table_size(), DEFAULT_TABLE_SIZE);
        assert_eq!(filter.num_hashes(), DEFAULT_TUNINGS.len());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let err = CountingBloomFilter::<u64>::builder()
            .size(0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert_eq!(err.message(), "table size must be positive");
    }

    #[test]
    fn test_oversized_table_is_rejected() {
        let err = CountingBloomFilter::<u64>::builder()
            .size(u64::MAX)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.to_string().contains("size: 18446744073709551615"));
    }

    #[test]
    fn test_empty_hash_functions_are_rejected() {
        let err = CountingBloomFilter::<u64>::builder()
            .hash_functions(vec![])
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_largest_size_is_accepted() {
        let filter = CountingBloomFilter::<u64>::builder()
            .size(i64::MAX as u64)
            .build()
            .unwrap();
        assert_eq!(filter.table_size(), i64::MAX as u64);
    }

    #[test]
    fn test_debug_counts_functions() {
        let builder = CountingBloomFilter::<u64>::builder().size(64);
        assert_eq!(
            format!("{builder:?}"),
            "CountingBloomFilterBuilder { size: 64, num_hashes: 6 }"
        );
    }
}

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

use crate::hash::HashFunction;

/// Folds a raw signed hash into the filter's index space.
///
/// Uses the truncating remainder (sign follows the dividend): a strictly positive remainder is
/// kept, anything else is shifted up by `table_size`. A zero remainder therefore maps to
/// `table_size` itself rather than `0`, so the reachable range is `1..=table_size`. Reads and
/// writes both go through this function, so the shifted window is consistent.
///
/// `table_size` must lie in `1..=i64::MAX`; the builder rejects anything else.
pub(crate) fn fold_index(raw: i64, table_size: u64) -> u64 {
    debug_assert!(table_size > 0 && table_size <= i64::MAX as u64);
    let modulus = table_size as i64;
    let rem = raw % modulus;
    if rem > 0 {
        rem as u64
    } else {
        (modulus + rem) as u64
    }
}

/// Turns an element into its k bucket indices.
///
/// Knows nothing about buckets; the filter drives the bucket store with the indices it returns.
pub(crate) struct IndexEngine<T: ?Sized> {
    table_size: u64,
    hash_functions: Vec<HashFunction<T>>,
}

impl<T: ?Sized> IndexEngine<T> {
    /// Callers validate `table_size` and `hash_functions` beforehand.
    pub(crate) fn new(table_size: u64, hash_functions: Vec<HashFunction<T>>) -> Self {
        IndexEngine {
            table_size,
            hash_functions,
        }
    }

    /// Returns exactly one index per hash function, in hash-function order.
    ///
    /// Duplicates are kept: two functions may land on the same index for one element.
    pub(crate) fn compute_indices(&self, element: &T) -> Vec<u64> {
        self.hash_functions
            .iter()
            .map(|hash| fold_index(hash(element), self.table_size))
            .collect()
    }

    pub(crate) fn table_size(&self) -> u64 {
        self.table_size
    }

    pub(crate) fn num_hashes(&self) -> usize {
        self.hash_functions.len()
    }
}

impl<T: ?Sized> fmt::Debug for IndexEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexEngine")
            .field("table_size", &self.table_size)
            .field("num_hashes", &self.hash_functions.len())
            .finish()
    }
}

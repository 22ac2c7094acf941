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


//! Pluggable hashing for the filter's index engine.
//!
//! The filter never hashes elements itself. It holds an ordered list of [`HashFunction`]s, each
//! mapping one element to one signed 64-bit value. The default list is derived from a single
//! [`ElementHasher`] capability, applied once per [`Tuning`] pair in [`DEFAULT_TUNINGS`].
//!
//! ```rust
//! use deletable_bloom::hash::DEFAULT_TUNINGS;
//! use deletable_bloom::hash::MurmurHasher;
//! use deletable_bloom::hash::tuned_hash_functions;
//!
//! let functions = tuned_hash_functions::<u64, _>(MurmurHasher, &DEFAULT_TUNINGS);
//! assert_eq!(functions.len(), 6);
//! assert_eq!(functions[0](&7), functions[0](&7));
//! ```

mod murmurhash;

use std::hash::Hash;
use std::sync::Arc;

pub use self::murmurhash::MurmurHash3X64128;

/// A single hash function used by the index engine.
///
/// It must be deterministic and pure: the same element always yields the same value.
pub type HashFunction<T> = Arc<dyn Fn(&T) -> i64 + Send + Sync>;

/// Tuning parameters handed to an [`ElementHasher`] to derive one independent hash function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tuning {
    /// Seeds the underlying hash.
    pub prime: u64,
    /// Weights the second half of the digest.
    pub factor: u64,
}

impl Tuning {
    pub const fn new(prime: u64, factor: u64) -> Self {
        Tuning { prime, factor }
    }
}

/// The six tuning pairs behind the default hash functions.
pub const DEFAULT_TUNINGS: [Tuning; 6] = [
    Tuning::new(7_919, 2),
    Tuning::new(104_729, 3),
    Tuning::new(1_299_709, 5),
    Tuning::new(15_485_863, 7),
    Tuning::new(179_424_673, 11),
    Tuning::new(2_147_483_647, 13),
];

/// A hashing capability: given an element and a tuning pair, return a deterministic hash.
pub trait ElementHasher<T: ?Sized> {
    fn hash(&self, element: &T, tuning: Tuning) -> i64;
}

/// The default [`ElementHasher`], built on MurmurHash3 x64/128.
///
/// The element is fed through [`Hash`] into a hasher seeded with `tuning.prime`; the two 64-bit
/// halves are combined as `h1 + factor * h2` (Kirsch-Mitzenmacher style) and reinterpreted as a
/// signed value, so results may be negative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MurmurHasher;

impl<T: Hash + ?Sized> ElementHasher<T> for MurmurHasher {
    fn hash(&self, element: &T, tuning: Tuning) -> i64 {
        let mut hasher = MurmurHash3X64128::with_seed(tuning.prime);
        element.hash(&mut hasher);
        let (h1, h2) = hasher.finish128();
        h1.wrapping_add(tuning.factor.wrapping_mul(h2)) as i64
    }
}

/// Builds one hash function per tuning pair, all sharing the given hasher.
pub fn tuned_hash_functions<T, H>(hasher: H, tunings: &[Tuning]) -> Vec<HashFunction<T>>
where
    T: ?Sized + 'static,
    H: ElementHasher<T> + Send + Sync + 'static,
{
    let hasher = Arc::new(hasher);
    tunings
        .iter()
        .map(|&tuning| {
            let hasher = Arc::clone(&hasher);
            Arc::new(move |element: &T| hasher.hash(element, tuning)) as HashFunction<T>
        })
        .collect()
}

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


//! Counting Bloom filter with representative-guarded deletion.
//!
//! Every bucket stores an occupancy count plus the first element that occupied it (its
//! *representative*). The representative lets the filter tell a real hit from a collision:
//!
//! - A query returns `false` as soon as one of the element's buckets is empty, and `true` as soon
//!   as one of them is represented by the element itself. A bucket owned by another element is
//!   a collision and the query moves on; if every bucket is occupied the answer is `true`.
//! - [`possibly_delete`](CountingBloomFilter::possibly_delete) only decrements buckets the element
//!   represents, so it can never make another inserted element look absent.
//! - [`risky_delete`](CountingBloomFilter::risky_delete) decrements every bucket the element hashes
//!   to. It is only safe when the caller knows no collisions happened.
//!
//! # Usage
//!
//! ```rust
//! use deletable_bloom::counting::CountingBloomFilter;
//!
//! let mut filter = CountingBloomFilter::builder().size(1_000_003).build().unwrap();
//!
//! for value in [1_i64, 2, 3, -1, i64::MAX, i64::MIN] {
//!     filter.add(value);
//! }
//! assert!(filter.possibly_has(&3));
//! assert!(filter.possibly_has(&i64::MIN));
//!
//! filter.possibly_delete(&3);
//! assert!(filter.definitely_not_has(&3));
//! assert!(filter.possibly_has(&2));
//! ```
//!
//! # Index Folding
//!
//! Each hash function yields a signed 64-bit value, folded into the table with the truncating
//! remainder. A zero remainder maps to `table_size`, so the indices returned by
//! [`indices`](CountingBloomFilter::indices) range over `1..=table_size`.

mod builder;
mod index;
mod sketch;

pub use self::builder::CountingBloomFilterBuilder;
pub use self::sketch::Bucket;
pub use self::sketch::CountingBloomFilter;
pub use self::sketch::DEFAULT_TABLE_SIZE;

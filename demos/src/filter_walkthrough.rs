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


use clap::Parser;
use deletable_bloom::counting::CountingBloomFilter;
use tracing_subscriber::EnvFilter;

const VALUES: [i64; 16] = [
    1,
    2,
    3,
    4,
    5,
    9999,
    i64::MAX,
    i64::MIN,
    -1,
    -2,
    -3,
    -4,
    -5,
    764392,
    234809342,
    4897,
];

const REMOVED: [i64; 4] = [4, 5, 234809342, -1];

/// Adds, queries and deletes a fixed list of integers.
#[derive(Parser, Debug)]
struct Args {
    /// Table size of the filter.
    #[arg(long, default_value_t = 1_000_003)]
    size: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut filter = match CountingBloomFilter::builder().size(args.size).build() {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("failed to build filter: {err}");
            std::process::exit(1);
        }
    };

    println!("=== Counting Bloom Filter Walkthrough ===\n");
    println!("{filter:?}\n");

    println!("1. Add {} values:", VALUES.len());
    for value in VALUES {
        filter.add(value);
    }
    report(&filter);

    println!("2. Safely delete {REMOVED:?}:");
    for value in REMOVED {
        filter.possibly_delete(&value);
    }
    report(&filter);

    println!("Max observed bucket count: {}", filter.max_observed_bucket_count());
    println!("Occupied buckets: {}", filter.num_occupied_buckets());
}

fn report(filter: &CountingBloomFilter<i64>) {
    for value in VALUES {
        println!("   possibly_has({value}) = {}", filter.possibly_has(&value));
    }
    println!();
}

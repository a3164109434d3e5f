//! Sorted-set throughput benchmark.
//! Measures ops/sec for insert, re-score, rank, range, and remove.
//!
//! Usage: cargo bench --bench sorted_set_ops

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rankset_core::{ScoreRange, SkipListConfig, SortedSetData};
use std::time::Instant;

const N: usize = 200_000;

fn report(label: &str, ops: usize, started: Instant) {
    let secs = started.elapsed().as_secs_f64();
    println!(
        "{:<16} {:>10} ops in {:>8.3}s  ({:>12.0} ops/s)",
        label,
        ops,
        secs,
        ops as f64 / secs
    );
}

fn main() {
    let config = SkipListConfig {
        seed: Some(0x5eed),
        ..SkipListConfig::default()
    };
    let mut set = SortedSetData::new("bench".to_string(), &config);
    let mut rng = StdRng::seed_from_u64(0xdead_beef);
    let members: Vec<String> = (0..N).map(|i| format!("member:{i}")).collect();

    let t = Instant::now();
    for m in &members {
        let score: f64 = rng.gen_range(0.0..1_000_000.0);
        set.add(m, score).expect("finite score");
    }
    report("insert", N, t);

    let t = Instant::now();
    for _ in 0..N {
        let m = &members[rng.gen_range(0..N)];
        let score: f64 = rng.gen_range(0.0..1_000_000.0);
        set.add(m, score).expect("finite score");
    }
    report("rescore", N, t);

    let t = Instant::now();
    let mut found = 0usize;
    for _ in 0..N {
        let m = &members[rng.gen_range(0..N)];
        found += set.rank(m).is_some() as usize;
    }
    report("rank", N, t);
    assert_eq!(found, N);

    let t = Instant::now();
    let queries = 10_000;
    let mut returned = 0usize;
    for _ in 0..queries {
        let start = rng.gen_range(0..N as i64 - 100);
        returned += set.range_by_rank(start, start + 99).len();
    }
    report("range(100)", queries, t);
    assert_eq!(returned, queries * 100);

    let t = Instant::now();
    for _ in 0..queries {
        let lo: f64 = rng.gen_range(0.0..999_000.0);
        set.count_by_score(&ScoreRange::inclusive(lo, lo + 1_000.0))
            .expect("valid range");
    }
    report("count_by_score", queries, t);

    let t = Instant::now();
    for m in &members {
        set.remove(m);
    }
    report("remove", N, t);
    assert!(set.is_empty());
}

//! # Mersenne — Lucas–Lehmer Search over 2^p − 1
//!
//! For each p in `[start, end)`, non-prime exponents are rejected through the
//! oracle (2^ab − 1 is divisible by 2^a − 1), and prime exponents get the
//! deterministic Lucas–Lehmer test:
//!
//! ```text
//! s₀ = 4,  sₖ = (sₖ₋₁² − 2) mod (2^p − 1),  2^p − 1 prime ⇔ s_{p−2} = 0
//! ```
//!
//! p = 2 is accepted directly (M₂ = 3; the recurrence needs p odd).
//!
//! Reduction modulo M = 2^p − 1 avoids division: since 2^p ≡ 1 (mod M),
//! x mod M = (x & M) + (x >> p), folded until it fits in p bits.
//!
//! A completed search publishes its hits to the [`MersenneCache`], which the
//! Brocard evaluator reads for default bounds. This is the only writer.
//!
//! ## References
//!
//! - OEIS: [A000043](https://oeis.org/A000043) — Mersenne exponents.
//! - D.H. Lehmer, "An Extended Theory of Lucas' Functions", Annals of
//!   Mathematics, 31(3), 1930.

use anyhow::Result;
use rug::Integer;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

use crate::correlation::{MersenneCache, MersenneHit};
use crate::progress::Progress;
use crate::{checked_u32, is_prime, round_secs, SearchOptions};

#[derive(Clone, Debug, Serialize)]
pub struct MersenneResult {
    pub mersenne_primes: Vec<MersenneHit>,
    pub runtime_seconds: f64,
}

/// 2^p − 1.
pub fn mersenne_number(p: u32) -> Integer {
    (Integer::from(1u32) << p) - 1u32
}

/// x mod (2^p − 1) for non-negative x, without division.
fn reduce_mersenne(x: &mut Integer, p: u32, m: &Integer) {
    while x.significant_bits() > p {
        let high = Integer::from(&*x >> p);
        x.keep_bits_mut(p);
        *x += high;
    }
    if *x == *m {
        *x = Integer::new();
    }
}

/// Lucas–Lehmer test: true iff 2^p − 1 is prime. Requires p prime for the
/// result to be meaningful (composite p always yields a composite M_p).
pub fn lucas_lehmer(p: u32) -> bool {
    if p == 2 {
        return true;
    }
    if p < 2 {
        return false;
    }
    let m = mersenne_number(p);
    let mut s = Integer::from(4u32);
    for _ in 0..p - 2 {
        s.square_mut();
        s -= 2u32;
        if s < 0 {
            s += &m;
        }
        reduce_mersenne(&mut s, p, &m);
    }
    s == 0
}

/// Find all Mersenne primes 2^p − 1 with p in `[start, end)` and publish them
/// to `cache`.
pub fn search(
    start: u64,
    end: u64,
    cache: &MersenneCache,
    opts: &SearchOptions,
) -> Result<MersenneResult> {
    let started = Instant::now();
    let progress = Progress::new("mersenne");
    let _reporter = progress.start_reporter(opts.progress_interval);

    let mut hits = Vec::new();
    for p in start..end {
        progress.tick();
        if !is_prime(&Integer::from(p), opts.mr_rounds) {
            continue;
        }
        let exp = checked_u32(p)?;
        progress.set_current(format!("M({})", p));
        if lucas_lehmer(exp) {
            progress.hit();
            hits.push(MersenneHit {
                p,
                mersenne_number: mersenne_number(exp).to_string(),
            });
        }
    }

    cache.publish(hits.clone());
    let runtime_seconds = round_secs(started);
    info!(start, end, found = hits.len(), runtime_seconds, "mersenne search complete");
    Ok(MersenneResult {
        mersenne_primes: hits,
        runtime_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::CacheState;
    use crate::DEFAULT_MR_ROUNDS;

    fn quiet() -> SearchOptions {
        SearchOptions {
            mr_rounds: DEFAULT_MR_ROUNDS,
            progress_interval: std::time::Duration::ZERO,
        }
    }

    #[test]
    fn lucas_lehmer_known_exponents() {
        for &p in &[2u32, 3, 5, 7, 13, 17, 19, 31, 61, 89, 107, 127] {
            assert!(lucas_lehmer(p), "M{} is a Mersenne prime", p);
        }
    }

    #[test]
    fn lucas_lehmer_rejects_composite_mersenne_numbers() {
        // 2^11-1 = 2047 = 23*89, 2^23-1 = 47*178481, 2^29-1 = 233*1103*2089
        for &p in &[11u32, 23, 29, 37, 41, 43, 47, 53, 59, 67] {
            assert!(!lucas_lehmer(p), "M{} is composite", p);
        }
    }

    #[test]
    fn lucas_lehmer_agrees_with_oracle_for_small_primes() {
        for p in crate::sieve::generate_primes(200) {
            let p = p as u32;
            assert_eq!(
                lucas_lehmer(p),
                is_prime(&mersenne_number(p), DEFAULT_MR_ROUNDS),
                "disagreement at p={}",
                p
            );
        }
    }

    #[test]
    fn reduce_mersenne_matches_remainder() {
        let p = 13u32;
        let m = mersenne_number(p);
        for v in [0u64, 1, 8190, 8191, 8192, 1 << 26, 67_108_863, 123_456_789] {
            let mut x = Integer::from(v);
            reduce_mersenne(&mut x, p, &m);
            assert_eq!(x, Integer::from(v) % &m, "v={}", v);
        }
    }

    #[test]
    fn search_small_range_and_publish() {
        let cache = MersenneCache::new();
        let result = search(2, 20, &cache, &quiet()).unwrap();
        let ps: Vec<u64> = result.mersenne_primes.iter().map(|h| h.p).collect();
        assert_eq!(ps, vec![2, 3, 5, 7, 13, 17, 19]);
        assert_eq!(result.mersenne_primes[4].mersenne_number, "8191");
        assert_eq!(
            cache.snapshot(),
            CacheState::Populated(result.mersenne_primes.clone())
        );
    }

    #[test]
    fn search_end_is_exclusive() {
        let cache = MersenneCache::new();
        let result = search(13, 17, &cache, &quiet()).unwrap();
        let ps: Vec<u64> = result.mersenne_primes.iter().map(|h| h.p).collect();
        assert_eq!(ps, vec![13]);
    }

    #[test]
    fn empty_range_still_overwrites_cache() {
        let cache = MersenneCache::new();
        search(2, 8, &cache, &quiet()).unwrap();
        assert!(cache.first_two().is_some());
        let result = search(8, 8, &cache, &quiet()).unwrap();
        assert!(result.mersenne_primes.is_empty());
        assert_eq!(cache.snapshot(), CacheState::Populated(vec![]));
    }

    #[test]
    fn reported_values_are_prime_mersenne_numbers() {
        let cache = MersenneCache::new();
        let result = search(2, 64, &cache, &quiet()).unwrap();
        for h in &result.mersenne_primes {
            let m: Integer = h.mersenne_number.parse().unwrap();
            assert_eq!(m, mersenne_number(h.p as u32));
            assert!(is_prime(&m, DEFAULT_MR_ROUNDS));
        }
    }
}

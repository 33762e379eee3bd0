//! # Wieferich — Primes with 2^(p−1) ≡ 1 (mod p²)
//!
//! Only 1093 and 3511 are known; searches have covered p < 2^64 without finding
//! a third. The test is a single modular exponentiation per prime: native
//! `u64` arithmetic with `u128` products while p² fits in a `u64`, GMP
//! `pow_mod` beyond that.
//!
//! Prime p in `[start, end]` come from the wheel sieve when `end` is small
//! enough to sieve, otherwise each odd p goes through the oracle.
//!
//! ## References
//!
//! - OEIS: [A001220](https://oeis.org/A001220) — Wieferich primes.
//! - A. Wieferich, "Zum letzten Fermat'schen Theorem", J. Reine Angew. Math.
//!   136, 1909.

use rug::Integer;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

use crate::progress::Progress;
use crate::sieve::{self, SIEVE_MAX};
use crate::{is_prime, round_secs, SearchOptions};

#[derive(Clone, Debug, Serialize)]
pub struct WieferichResult {
    pub wieferich_primes: Vec<u64>,
    pub runtime_seconds: f64,
}

/// True iff 2^(p−1) ≡ 1 (mod p²). Assumes p is an odd prime.
pub fn is_wieferich(p: u64) -> bool {
    if p < 3 {
        return false;
    }
    if p < (1u64 << 32) {
        let m = p * p;
        return sieve::pow_mod(2, p - 1, m) == 1;
    }
    let p_big = Integer::from(p);
    let m = Integer::from(p_big.square_ref());
    match Integer::from(2u32).pow_mod(&Integer::from(p - 1), &m) {
        Ok(r) => r == 1,
        Err(_) => false,
    }
}

pub fn search(start: u64, end: u64, opts: &SearchOptions) -> WieferichResult {
    let started = Instant::now();
    let progress = Progress::new("wieferich");
    let _reporter = progress.start_reporter(opts.progress_interval);

    let mut hits = Vec::new();
    let mut check = |p: u64| {
        progress.tick();
        if is_wieferich(p) {
            progress.hit();
            info!(p, "wieferich prime found");
            hits.push(p);
        }
    };

    if end <= SIEVE_MAX {
        for p in sieve::primes_between(start, end) {
            check(p);
        }
    } else if start <= end {
        progress.set_current(format!("p >= {}", start));
        for p in start..=end {
            if p % 2 == 1 && is_prime(&Integer::from(p), opts.mr_rounds) {
                check(p);
            }
        }
    }

    let runtime_seconds = round_secs(started);
    info!(start, end, found = hits.len(), runtime_seconds, "wieferich search complete");
    WieferichResult {
        wieferich_primes: hits,
        runtime_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_MR_ROUNDS;
    use std::time::Duration;

    fn quiet() -> SearchOptions {
        SearchOptions {
            mr_rounds: DEFAULT_MR_ROUNDS,
            progress_interval: Duration::ZERO,
        }
    }

    #[test]
    fn known_wieferich_primes() {
        assert!(is_wieferich(1093));
        assert!(is_wieferich(3511));
        for p in [3u64, 5, 7, 1091, 1097, 3499, 3517] {
            assert!(!is_wieferich(p), "p={}", p);
        }
    }

    #[test]
    fn two_is_excluded() {
        // 2^1 mod 4 = 2
        assert!(!is_wieferich(2));
    }

    #[test]
    fn default_range_finds_both() {
        let result = search(2, 4000, &quiet());
        assert_eq!(result.wieferich_primes, vec![1093, 3511]);
    }

    #[test]
    fn inclusive_bounds() {
        assert_eq!(search(1093, 1093, &quiet()).wieferich_primes, vec![1093]);
        assert_eq!(search(3511, 3511, &quiet()).wieferich_primes, vec![3511]);
        assert!(search(1094, 3510, &quiet()).wieferich_primes.is_empty());
        assert!(search(10, 5, &quiet()).wieferich_primes.is_empty());
    }

    #[test]
    fn large_prime_uses_big_modulus() {
        // 2^32 + 15 is prime
        let p = (1u64 << 32) + 15;
        assert!(is_prime(&Integer::from(p), DEFAULT_MR_ROUNDS));
        assert!(!is_wieferich(p));
    }

    #[test]
    fn oracle_path_matches_sieve_path() {
        let base = SIEVE_MAX + 1;
        let result = search(base, base + 200, &quiet());
        assert!(result.wieferich_primes.is_empty());
    }
}

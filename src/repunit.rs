//! # Repunit — Decimal Repunit Prime Search
//!
//! Searches for repunit primes R(n) = (10^n − 1)/9 = 11…1 (n ones). Only prime
//! n can yield a repunit prime, since R(ab) is divisible by R(a). Exponents come
//! from the wheel sieve, or from an oracle walk when the range ends past
//! `SIEVE_MAX`; each R(n) is then tested with the oracle. Exponents must fit a
//! `u32`, and a range ending beyond that is rejected up front.
//!
//! ## Pre-sieve
//!
//! Before any big-integer work, each small prime q eliminates at most one
//! exponent:
//!
//! - q ∤ 9: q | R(n) iff ord_q(10) | n. With n prime, that means n = ord_q(10).
//! - q = 3: R(n) ≡ n (mod 3), so 3 | R(n) iff n = 3.
//!
//! A sieve hit is only trusted when R(n) exceeds the sieve limit, so it is a
//! proper factor. The pre-sieve removes only proven composites; the reported
//! list is identical to testing every exponent.
//!
//! ## References
//!
//! - OEIS: [A004023](https://oeis.org/A004023) — Repunit prime indices in base 10:
//!   2, 19, 23, 317, 1031, 49081, ...

use rug::ops::Pow;
use rug::Integer;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::progress::Progress;
use crate::sieve::{self, SIEVE_MAX};
use crate::{is_prime, round_secs, SearchOptions};

const BASE: u64 = 10;

/// Primes used by the pre-sieve.
const PRESIEVE_LIMIT: u64 = 100_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RepunitHit {
    pub n: u64,
    pub repunit: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RepunitResult {
    pub repunit_primes: Vec<RepunitHit>,
    pub runtime_seconds: f64,
}

/// R(n) = 11…1 with n ones.
pub fn repunit(n: u32) -> Integer {
    (Integer::from(BASE).pow(n) - 1u32) / 9u32
}

/// Exponents n ≥ `sieve_min_n` whose repunit has a prime factor in `sieve_primes`.
fn sieve_repunit(sieve_primes: &[u64], sieve_min_n: u64) -> HashSet<u64> {
    let mut composite = HashSet::new();
    for &q in sieve_primes {
        if q == 2 || q == 5 {
            continue;
        }
        let killed = if (BASE - 1).is_multiple_of(q) {
            q
        } else {
            sieve::multiplicative_order(BASE, q)
        };
        if killed >= sieve_min_n {
            composite.insert(killed);
        }
    }
    composite
}

/// Find all n prime in `[start, end]` with R(n) prime.
///
/// Fails before any work when `end` does not fit a `u32` exponent.
pub fn search(start: u64, end: u64, opts: &SearchOptions) -> anyhow::Result<RepunitResult> {
    let started = Instant::now();
    if start <= end {
        crate::checked_u32(end)?;
    }
    let progress = Progress::new("repunit");
    let _reporter = progress.start_reporter(opts.progress_interval);

    // R(n) > PRESIEVE_LIMIT once n has more digits than the limit
    let sieve_min_n = (PRESIEVE_LIMIT as f64).log10().ceil() as u64 + 1;
    let composite = sieve_repunit(&sieve::generate_primes(PRESIEVE_LIMIT), sieve_min_n);
    debug!(eliminated = composite.len(), "repunit pre-sieve done");

    let mut hits = Vec::new();
    let mut check = |n: u64| -> anyhow::Result<()> {
        progress.tick();
        if composite.contains(&n) {
            return Ok(());
        }
        progress.set_current(format!("R({})", n));
        let value = repunit(crate::checked_u32(n)?);
        if is_prime(&value, opts.mr_rounds) {
            progress.hit();
            hits.push(RepunitHit {
                n,
                repunit: value.to_string(),
            });
        }
        Ok(())
    };

    if end <= SIEVE_MAX {
        for n in sieve::primes_between(start, end) {
            check(n)?;
        }
    } else if start <= end {
        for n in start..=end {
            if is_prime(&Integer::from(n), opts.mr_rounds) {
                check(n)?;
            }
        }
    }

    let runtime_seconds = round_secs(started);
    info!(start, end, found = hits.len(), runtime_seconds, "repunit search complete");
    Ok(RepunitResult {
        repunit_primes: hits,
        runtime_seconds,
    })
}

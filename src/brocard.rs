//! # Brocard — Primes Between Squares of Two Bounds
//!
//! Collects up to four primes in `[M1², M2²)`, starting from the first prime at
//! or after M1². Bounds are resolved in this order:
//!
//! 1. Both `startP` and `endP` supplied: parse them. If either fails to parse,
//!    go straight to the fixed defaults (the cache is *not* consulted).
//! 2. The Mersenne cache holds at least two hits: use the first two.
//! 3. Fixed defaults M1 = 2^2203 − 1, M2 = 2^2281 − 1 (consecutive Mersenne
//!    primes).
//!
//! Step 2 makes the result depend on request history; see
//! [`crate::correlation`] for the race with a concurrent Mersenne search.

use rug::Integer;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::correlation::MersenneCache;
use crate::mersenne::mersenne_number;
use crate::{next_prime_after, parse_integer, prime_at_or_after, round_secs};

pub const DEFAULT_LOW_EXPONENT: u32 = 2203;
pub const DEFAULT_HIGH_EXPONENT: u32 = 2281;
pub const MAX_PRIMES: usize = 4;

/// Where the bounds of an evaluation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsSource {
    Explicit,
    MersenneCache,
    Default,
}

#[derive(Clone, Debug, Serialize)]
pub struct BrocardResult {
    pub primes: Vec<String>,
    pub runtime_seconds: f64,
    #[serde(skip)]
    pub source: BoundsSource,
}

fn default_bounds() -> (Integer, Integer, BoundsSource) {
    (
        mersenne_number(DEFAULT_LOW_EXPONENT),
        mersenne_number(DEFAULT_HIGH_EXPONENT),
        BoundsSource::Default,
    )
}

/// Pick M1, M2 by the precedence documented at module level.
pub fn resolve_bounds(
    start_p: Option<&str>,
    end_p: Option<&str>,
    cache: &MersenneCache,
) -> (Integer, Integer, BoundsSource) {
    let start_p = start_p.filter(|s| !s.is_empty());
    let end_p = end_p.filter(|s| !s.is_empty());
    if let (Some(a), Some(b)) = (start_p, end_p) {
        return match (parse_integer(a), parse_integer(b)) {
            (Ok(m1), Ok(m2)) => (m1, m2, BoundsSource::Explicit),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "unparseable brocard bounds, using defaults");
                default_bounds()
            }
        };
    }
    if let Some((a, b)) = cache.first_two() {
        if let (Ok(m1), Ok(m2)) = (parse_integer(&a), parse_integer(&b)) {
            return (m1, m2, BoundsSource::MersenneCache);
        }
    }
    default_bounds()
}

/// Up to [`MAX_PRIMES`] primes p with M1² <= p < M2², ascending.
pub fn primes_between_squares(m1: &Integer, m2: &Integer, mr_rounds: u32) -> Vec<Integer> {
    let low = Integer::from(m1.square_ref());
    let high = Integer::from(m2.square_ref());
    let mut primes = Vec::with_capacity(MAX_PRIMES);
    let mut candidate = prime_at_or_after(&low, mr_rounds);
    while candidate < high && primes.len() < MAX_PRIMES {
        let next = next_prime_after(&candidate);
        primes.push(candidate);
        candidate = next;
    }
    primes
}

pub fn evaluate(
    start_p: Option<&str>,
    end_p: Option<&str>,
    cache: &MersenneCache,
    mr_rounds: u32,
) -> BrocardResult {
    let started = Instant::now();
    let (m1, m2, source) = resolve_bounds(start_p, end_p, cache);
    let primes: Vec<String> = primes_between_squares(&m1, &m2, mr_rounds)
        .iter()
        .map(Integer::to_string)
        .collect();
    let runtime_seconds = round_secs(started);
    info!(?source, found = primes.len(), runtime_seconds, "brocard evaluation complete");
    BrocardResult {
        primes,
        runtime_seconds,
        source,
    }
}

pub mod brocard;
pub mod config;
pub mod conjectures;
pub mod correlation;
pub mod dashboard;
pub mod kaprekar;
pub mod mersenne;
pub mod palindromic;
pub mod perfect;
pub mod progress;
pub mod prom_metrics;
pub mod repunit;
pub mod sieve;
pub mod wieferich;

use anyhow::{bail, Context, Result};
use rug::integer::IsPrime;
use rug::Integer;
use std::time::{Duration, Instant};

/// Miller-Rabin rounds used when no configuration overrides it.
pub const DEFAULT_MR_ROUNDS: u32 = 25;

/// Knobs shared by every non-streamed search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchOptions {
    pub mr_rounds: u32,
    /// Period of the background progress log; zero disables it.
    pub progress_interval: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            mr_rounds: DEFAULT_MR_ROUNDS,
            progress_interval: Duration::from_secs(30),
        }
    }
}

/// Small primes for trial division pre-filter.
const SMALL_PRIMES: [u32; 64] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311,
];

/// Quick check if n is divisible by any small prime.
/// Returns true if n is definitely composite (has a small factor).
/// Returns false if n might be prime (passed trial division).
pub fn has_small_factor(n: &Integer) -> bool {
    for &p in &SMALL_PRIMES {
        if n.is_divisible_u(p) {
            // n equal to the small prime itself is prime, not composite
            return n > &Integer::from(p);
        }
    }
    false
}

/// Two-round Miller-Rabin pre-screening: run 2 fast rounds first, full rounds only for survivors.
/// Composites are rejected ~7x faster since most fail within 2 rounds.
pub fn mr_screened_test(candidate: &Integer, mr_rounds: u32) -> IsPrime {
    if mr_rounds > 2 && candidate.is_probably_prime(2) == IsPrime::No {
        return IsPrime::No;
    }
    candidate.is_probably_prime(mr_rounds)
}

/// The primality oracle every search goes through.
///
/// Trial division by the small-prime table first, then GMP's BPSW + Miller-Rabin.
/// Returns true for both `IsPrime::Yes` and `IsPrime::Probably`. Values below 2
/// are never prime.
pub fn is_prime(n: &Integer, mr_rounds: u32) -> bool {
    if *n < 2 {
        return false;
    }
    if has_small_factor(n) {
        return false;
    }
    mr_screened_test(n, mr_rounds) != IsPrime::No
}

/// First prime p with p >= n.
pub fn prime_at_or_after(n: &Integer, mr_rounds: u32) -> Integer {
    if is_prime(n, mr_rounds) {
        return n.clone();
    }
    next_prime_after(n)
}

/// First prime p with p > n. Anything below 2 yields 2.
pub fn next_prime_after(n: &Integer) -> Integer {
    Integer::from(n.next_prime_ref())
}

/// Parse a strictly decimal integer (optional leading sign, digits only).
///
/// GMP's own parser tolerates underscores and radix prefixes; inputs crossing
/// the HTTP boundary are held to plain decimal.
pub fn parse_integer(raw: &str) -> Result<Integer> {
    let s = raw.trim();
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        bail!("not a decimal integer: {:?}", raw);
    }
    s.parse::<Integer>()
        .with_context(|| format!("not a decimal integer: {:?}", raw))
}

/// Narrow an exponent to u32 for `rug::ops::Pow`.
pub fn checked_u32(n: u64) -> Result<u32> {
    u32::try_from(n).with_context(|| format!("exponent {} exceeds u32::MAX", n))
}

/// Seconds since `start`, rounded to two decimals for reporting.
pub fn round_secs(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

/// Estimate decimal digit count from bit length, avoiding expensive to_string conversion.
pub fn estimate_digits(n: &Integer) -> u64 {
    let bits = n.significant_bits();
    if bits == 0 {
        return 1;
    }
    (bits as f64 * std::f64::consts::LOG10_2) as u64 + 1
}

/// Exact decimal digit count (expensive for very large numbers).
pub fn exact_digits(n: &Integer) -> u64 {
    n.to_string_radix(10).trim_start_matches('-').len() as u64
}

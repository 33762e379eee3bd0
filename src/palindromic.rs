//! # Palindromic — Smallest Palindromic Prime With At Least N Digits
//!
//! Returns the first prime palindrome, in ascending order, whose digit count is
//! the smallest odd number ≥ `min_digits`; if that length has none, the next
//! odd length, and so on.
//!
//! ## Odd Lengths Only
//!
//! An even-length decimal palindrome has alternating digit sum zero and is a
//! multiple of 11, so 11 is the only even-length palindromic prime. The search
//! therefore rounds the starting length up to odd and steps by 2. This is a
//! deliberate restriction: a request for `min_digits = 2` answers with a
//! 3-digit prime (101), never 11.
//!
//! ## Algorithm
//!
//! 1. **Half-digit generation**: an L-digit palindrome (L odd) is fixed by its
//!    first h = ⌈L/2⌉ digits. Halves run over `[10^(h−1), 10^h)` in ascending
//!    order and are mirrored without repeating the middle digit, so palindromes
//!    come out in ascending numeric order.
//! 2. **Digit filter** (`is_filter_composite`): the palindrome is reduced mod
//!    each small prime by Horner's method on the digit array, with no big-integer
//!    allocation. Only primes below the smallest L-digit value are used, so a
//!    palindrome equal to a filter prime is never discarded.
//! 3. Survivors go to the oracle.
//!
//! ## Liveness
//!
//! With no `max_candidates` the search has no upper bound on runtime: it keeps
//! climbing lengths until it finds a prime. Palindromic primes exist at every
//! odd length observed so far, but nothing proves they always do, and large
//! lengths mean enormous per-length candidate counts. Callers that cannot wait
//! indefinitely should configure a step limit. Lengths above [`MAX_DIGITS`]
//! are refused before any digit buffer is built.
//!
//! ## References
//!
//! - OEIS: [A002385](https://oeis.org/A002385) — Palindromic primes.
//! - Harvey Dubner, "Palindromic Primes", Journal of Recreational Mathematics, 1989.

use rug::Integer;
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::info;

use crate::progress::Progress;
use crate::{is_prime, round_secs, sieve, SearchOptions};

const FILTER_LIMIT: u64 = 1_000;

/// Longest palindrome the search will generate.
pub const MAX_DIGITS: u64 = 1_000_001;

#[derive(Clone, Debug, Serialize)]
pub struct PalindromeResult {
    pub palindromic_prime: String,
    pub digits: u64,
    pub runtime_seconds: f64,
}

/// Why a search gave up without a prime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PalindromeError {
    /// The configured candidate cap ran out.
    StepLimit {
        candidates_tested: u64,
        last_length: u64,
    },
    /// The next length to search exceeds [`MAX_DIGITS`].
    TooLong { length: u64 },
}

impl fmt::Display for PalindromeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PalindromeError::StepLimit {
                candidates_tested,
                last_length,
            } => write!(
                f,
                "no palindromic prime within {} candidates (reached {} digits)",
                candidates_tested, last_length
            ),
            PalindromeError::TooLong { length } => write!(
                f,
                "{}-digit palindromes exceed the {}-digit limit",
                length, MAX_DIGITS
            ),
        }
    }
}

impl std::error::Error for PalindromeError {}

/// Smallest odd length ≥ `min_digits` (and ≥ 1).
pub fn starting_length(min_digits: u64) -> u64 {
    let l = min_digits.max(1);
    if l % 2 == 1 {
        l
    } else {
        l + 1
    }
}

/// Increment a digit array by 1 in base 10. Returns true on overflow.
#[inline]
fn increment_digits(digits: &mut [u32]) -> bool {
    for d in digits.iter_mut().rev() {
        *d += 1;
        if *d < 10 {
            return false;
        }
        *d = 0;
    }
    true
}

/// Mirror half-digits around the last one: [a,b,c] -> [a,b,c,b,a].
fn mirror_odd(half_digits: &[u32]) -> Vec<u32> {
    let mut digits = Vec::with_capacity(half_digits.len() * 2 - 1);
    digits.extend_from_slice(half_digits);
    digits.extend(half_digits.iter().rev().skip(1));
    digits
}

/// Evaluate a digit array mod m using Horner's method.
#[inline]
fn digits_mod(digits: &[u32], m: u64) -> u64 {
    let mut r: u64 = 0;
    for &d in digits {
        r = (r * 10 + d as u64) % m;
    }
    r
}

fn digits_to_integer(digits: &[u32]) -> Integer {
    let mut result = Integer::new();
    for &d in digits {
        result *= 10u32;
        result += d;
    }
    result
}

/// True if some filter prime below 10^(len−1) divides the palindrome.
fn is_filter_composite(digits: &[u32], filter_primes: &[u64]) -> bool {
    let len = digits.len() as u32;
    let min_value = 10u64.checked_pow(len - 1).unwrap_or(u64::MAX);
    for &p in filter_primes {
        if p >= min_value {
            break;
        }
        if digits_mod(digits, p) == 0 {
            return true;
        }
    }
    false
}

/// Ascending iterator over all palindromes of odd length `length`, as digit arrays.
pub struct OddPalindromes {
    half: Vec<u32>,
    exhausted: bool,
}

impl OddPalindromes {
    pub fn new(length: u64) -> Self {
        let half_len = length.div_ceil(2).max(1) as usize;
        let mut half = vec![0u32; half_len];
        half[0] = 1;
        OddPalindromes {
            half,
            exhausted: false,
        }
    }
}

impl Iterator for OddPalindromes {
    type Item = Vec<u32>;

    fn next(&mut self) -> Option<Vec<u32>> {
        if self.exhausted {
            return None;
        }
        let full = mirror_odd(&self.half);
        // Overflow past 99…9 ends this length
        if increment_digits(&mut self.half) {
            self.exhausted = true;
        }
        Some(full)
    }
}

/// Search upward from `min_digits`. `max_candidates` caps the number of
/// palindromes generated; `None` means unbounded.
pub fn search(
    min_digits: u64,
    max_candidates: Option<u64>,
    opts: &SearchOptions,
) -> Result<PalindromeResult, PalindromeError> {
    let started = Instant::now();
    let progress = Progress::new("palindromic");
    let _reporter = progress.start_reporter(opts.progress_interval);
    let filter_primes = sieve::generate_primes(FILTER_LIMIT);

    let mut length = starting_length(min_digits);
    let mut generated: u64 = 0;
    let step_limit = |generated: u64, length: u64| {
        info!(generated, length, "palindrome step limit reached");
        PalindromeError::StepLimit {
            candidates_tested: generated,
            last_length: length,
        }
    };
    loop {
        if length > MAX_DIGITS {
            return Err(PalindromeError::TooLong { length });
        }
        if max_candidates.is_some_and(|cap| generated >= cap) {
            return Err(step_limit(generated, length));
        }
        progress.set_current(format!("{} digits", length));
        for digits in OddPalindromes::new(length) {
            if max_candidates.is_some_and(|cap| generated >= cap) {
                return Err(step_limit(generated, length));
            }
            generated += 1;
            progress.tick();
            if is_filter_composite(&digits, &filter_primes) {
                continue;
            }
            let value = digits_to_integer(&digits);
            if is_prime(&value, opts.mr_rounds) {
                progress.hit();
                let runtime_seconds = round_secs(started);
                info!(length, generated, runtime_seconds, "palindromic prime found");
                return Ok(PalindromeResult {
                    palindromic_prime: value.to_string(),
                    digits: length,
                    runtime_seconds,
                });
            }
        }
        length += 2;
    }
}

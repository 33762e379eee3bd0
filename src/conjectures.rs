//! # Conjectures — Legendre and Oppermann Interval Checks
//!
//! Both evaluators take an arbitrary-size N (as a `rug::Integer`, never a
//! fixed-width type), build the conjectured interval(s), and look for the first
//! prime after each lower bound:
//!
//! - **Legendre**: a prime lies in (N², (N+1)²).
//! - **Oppermann**: primes lie in both (N(N−1), N²) and (N², N(N+1)).
//!
//! Validity is strict on both ends. The search starts strictly after the lower
//! bound, so a prime equal to it (possible only for tiny N, e.g. N(N−1) = 2)
//! is never reported. A prime that falls outside the interval is not reported
//! either: the field is `null` and the flag is false.
//!
//! ## References
//!
//! - A.-M. Legendre, "Essai sur la théorie des nombres", 1798.
//! - L. Oppermann, 1882 (unpublished lecture); see OEIS
//!   [A220492](https://oeis.org/A220492).

use rug::Integer;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

use crate::{next_prime_after, round_secs};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendreResult {
    #[serde(rename = "N")]
    pub n: String,
    pub low: String,
    pub high: String,
    pub found_prime: Option<String>,
    pub is_valid: bool,
    pub runtime_seconds: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OppermannResult {
    #[serde(rename = "N")]
    pub n: String,
    pub range1: [String; 2],
    pub range2: [String; 2],
    pub prime1: Option<String>,
    pub prime2: Option<String>,
    pub is_valid1: bool,
    pub is_valid2: bool,
    pub runtime_seconds: f64,
}

/// First prime after `low`, kept only if it is below `high`.
fn prime_in_open_interval(low: &Integer, high: &Integer) -> Option<Integer> {
    let p = next_prime_after(low);
    (p > *low && p < *high).then_some(p)
}

pub fn legendre(n: &Integer) -> LegendreResult {
    let started = Instant::now();
    let low = Integer::from(n.square_ref());
    let high = Integer::from(n + 1u32).square();
    let found = prime_in_open_interval(&low, &high);
    let runtime_seconds = round_secs(started);
    info!(
        digits = crate::estimate_digits(n),
        valid = found.is_some(),
        runtime_seconds,
        "legendre evaluation complete"
    );
    LegendreResult {
        n: n.to_string(),
        low: low.to_string(),
        high: high.to_string(),
        is_valid: found.is_some(),
        found_prime: found.map(|p| p.to_string()),
        runtime_seconds,
    }
}

pub fn oppermann(n: &Integer) -> OppermannResult {
    let started = Instant::now();
    let square = Integer::from(n.square_ref());
    let low1 = Integer::from(&square - n);
    let high2 = Integer::from(&square + n);
    let prime1 = prime_in_open_interval(&low1, &square);
    let prime2 = prime_in_open_interval(&square, &high2);
    let runtime_seconds = round_secs(started);
    info!(
        digits = crate::estimate_digits(n),
        valid1 = prime1.is_some(),
        valid2 = prime2.is_some(),
        runtime_seconds,
        "oppermann evaluation complete"
    );
    let square = square.to_string();
    OppermannResult {
        n: n.to_string(),
        range1: [low1.to_string(), square.clone()],
        range2: [square, high2.to_string()],
        is_valid1: prime1.is_some(),
        is_valid2: prime2.is_some(),
        prime1: prime1.map(|p| p.to_string()),
        prime2: prime2.map(|p| p.to_string()),
        runtime_seconds,
    }
}

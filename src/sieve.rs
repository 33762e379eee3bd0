//! # Sieve — Prime Enumeration and Word-Sized Modular Arithmetic
//!
//! Small-number infrastructure shared by the searches:
//!
//! 1. **Prime generation** via a wheel-30 sieve of Eratosthenes, used to
//!    enumerate repunit exponents and the trial-division primes of the
//!    palindrome digit filter.
//! 2. **Modular exponentiation** (`pow_mod`) with u128 intermediates, used by
//!    the Wieferich test for p < 2^32 (so p² fits in a u64 modulus).
//! 3. **Multiplicative order**, used by the repunit pre-sieve.
//!
//! ## Algorithm: Wheel-30 Sieve
//!
//! The sieve tracks only integers coprime to 30 = 2·3·5 (8 residues per 30).
//! Each segment of 30 consecutive integers is packed into a single byte.
//! Complexity: O(n log log n) time, O(n/30) space.

/// Largest range end the searches enumerate with the sieve; above it they
/// walk the range through the oracle.
pub const SIEVE_MAX: u64 = 50_000_000;

/// Generate all primes up to `limit` (inclusive) using a wheel-30 sieve.
pub fn generate_primes(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return vec![];
    }
    if limit < 7 {
        return [2, 3, 5].iter().copied().filter(|&p| p <= limit).collect();
    }

    // Residues coprime to 30: the only positions tracked
    const RESIDUES: [u8; 8] = [1, 7, 11, 13, 17, 19, 23, 29];

    const RES_TO_IDX: [u8; 30] = [
        255, 0, 255, 255, 255, 255, 255, 1, 255, 255, 255, 2, 255, 3, 255, 255, 255, 4, 255, 5,
        255, 255, 255, 6, 255, 255, 255, 255, 255, 7,
    ];

    let limit = limit as usize;
    let num_segments = limit / 30 + 1;
    let mut sieve = vec![0xFFu8; num_segments];

    let sqrt_limit = (limit as f64).sqrt() as usize + 1;
    for seg in 0..num_segments {
        for &ri in &RESIDUES {
            let n = seg * 30 + ri as usize;
            if n < 7 || n > sqrt_limit {
                continue;
            }
            let idx = RES_TO_IDX[ri as usize] as usize;
            if sieve[seg] & (1 << idx) == 0 {
                continue;
            }
            let mut m = n * n;
            while m <= limit {
                let mr = m % 30;
                if RES_TO_IDX[mr] != 255 {
                    sieve[m / 30] &= !(1 << RES_TO_IDX[mr]);
                }
                m += n;
            }
        }
    }

    let mut primes = Vec::with_capacity(estimate_prime_count(limit));
    primes.extend_from_slice(&[2, 3, 5]);

    for (seg, &byte) in sieve.iter().enumerate() {
        if byte == 0 {
            continue;
        }
        for (bit_idx, &r) in RESIDUES.iter().enumerate() {
            if byte & (1 << bit_idx) != 0 {
                let n = seg * 30 + r as usize;
                if n > 5 && n <= limit {
                    primes.push(n as u64);
                }
            }
        }
    }
    primes
}

/// All primes p with `start <= p <= end`, ascending.
pub fn primes_between(start: u64, end: u64) -> Vec<u64> {
    if end < start {
        return vec![];
    }
    let mut primes = generate_primes(end);
    primes.retain(|&p| p >= start);
    primes
}

fn estimate_prime_count(n: usize) -> usize {
    if n < 10 {
        return 4;
    }
    let nf = n as f64;
    (1.3 * nf / nf.ln()) as usize
}

/// Modular exponentiation: base^exp mod modulus.
/// Uses u128 intermediates, so any u64 modulus is safe.
pub fn pow_mod(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result: u64 = 1;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result as u128 * base as u128 % modulus as u128) as u64;
        }
        exp >>= 1;
        base = (base as u128 * base as u128 % modulus as u128) as u64;
    }
    result
}

/// Trial-division factorization of a u64 into (prime, exponent) pairs.
pub fn factor_u64(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    let mut d = 2u64;
    while d.saturating_mul(d) <= n {
        if n.is_multiple_of(d) {
            let mut exp = 0u32;
            while n.is_multiple_of(d) {
                n /= d;
                exp += 1;
            }
            factors.push((d, exp));
        }
        d += 1;
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

/// Multiplicative order of `base` modulo `p`: smallest d > 0 with base^d ≡ 1 (mod p).
/// Requires p prime and base not divisible by p.
pub fn multiplicative_order(base: u64, p: u64) -> u64 {
    let mut order = p - 1;
    for (q, _) in factor_u64(order) {
        while order.is_multiple_of(q) && pow_mod(base, order / q, p) == 1 {
            order /= q;
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_primes() {
        let primes = generate_primes(30);
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn test_generate_primes_small_limits() {
        assert_eq!(generate_primes(0), Vec::<u64>::new());
        assert_eq!(generate_primes(1), Vec::<u64>::new());
        assert_eq!(generate_primes(2), vec![2]);
        assert_eq!(generate_primes(4), vec![2, 3]);
        assert_eq!(generate_primes(6), vec![2, 3, 5]);
        assert_eq!(generate_primes(7), vec![2, 3, 5, 7]);
        assert_eq!(generate_primes(10), vec![2, 3, 5, 7]);
        assert_eq!(generate_primes(11), vec![2, 3, 5, 7, 11]);
    }

    /// pi(x) from OEIS A000720.
    #[test]
    fn test_generate_primes_known_count() {
        assert_eq!(generate_primes(100).len(), 25);
        assert_eq!(generate_primes(1000).len(), 168);
        assert_eq!(generate_primes(10000).len(), 1229);
        assert_eq!(generate_primes(100000).len(), 9592);
    }

    #[test]
    fn test_generate_primes_boundary_around_30() {
        assert_eq!(generate_primes(31).len(), 11);
        assert_eq!(generate_primes(59).len(), 17);
        assert_eq!(generate_primes(60).len(), 17);
        assert_eq!(generate_primes(61).len(), 18);
    }

    #[test]
    fn primes_between_is_inclusive() {
        assert_eq!(primes_between(2, 20), vec![2, 3, 5, 7, 11, 13, 17, 19]);
        assert_eq!(primes_between(11, 13), vec![11, 13]);
        assert_eq!(primes_between(14, 16), Vec::<u64>::new());
        assert_eq!(primes_between(20, 2), Vec::<u64>::new());
    }

    #[test]
    fn test_pow_mod() {
        assert_eq!(pow_mod(2, 10, 1000), 24);
        assert_eq!(pow_mod(3, 4, 100), 81);
        assert_eq!(pow_mod(5, 0, 7), 1);
        assert_eq!(pow_mod(7, 3, 1), 0);
    }

    #[test]
    fn pow_mod_large_modulus_no_overflow() {
        // 1093² = 1194649; 2^1092 ≡ 1 (mod 1093²) is the Wieferich condition
        assert_eq!(pow_mod(2, 1092, 1093 * 1093), 1);
        let m = u64::MAX - 58; // largest 64-bit prime
        assert_eq!(pow_mod(m - 1, 2, m), 1);
    }

    #[test]
    fn test_factor_u64() {
        let empty: Vec<(u64, u32)> = vec![];
        assert_eq!(factor_u64(1), empty);
        assert_eq!(factor_u64(12), vec![(2, 2), (3, 1)]);
        assert_eq!(factor_u64(360), vec![(2, 3), (3, 2), (5, 1)]);
        assert_eq!(factor_u64(97), vec![(97, 1)]);
    }

    #[test]
    fn test_multiplicative_order() {
        assert_eq!(multiplicative_order(2, 7), 3);
        assert_eq!(multiplicative_order(3, 7), 6);
        assert_eq!(multiplicative_order(2, 13), 12);
        // 10^5 ≡ 1 (mod 41), so 41 | 11111
        assert_eq!(multiplicative_order(10, 41), 5);
    }
}

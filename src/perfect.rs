//! # Perfect — Even Perfect Numbers from Mersenne Exponents
//!
//! For each exponent p: M_p = 2^p − 1 and N = 2^(p−1) · M_p. No primality check
//! is made; N is perfect exactly when M_p is prime (Euclid–Euler), and the
//! caller is trusted to pass Mersenne exponents.

use rug::Integer;
use serde::Serialize;
use tracing::warn;

use crate::mersenne::mersenne_number;

pub const DEFAULT_EXPONENTS: [u32; 2] = [2, 3];

/// Largest accepted exponent. N has about 2p bits, so this keeps one record
/// under a megabyte of decimal text.
pub const MAX_EXPONENT: u32 = 1_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PerfectRecord {
    pub p: u32,
    pub mersenne_number: String,
    pub perfect_number: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PerfectResult {
    pub perfect_numbers: Vec<PerfectRecord>,
}

fn parse_exponent(raw: &str) -> anyhow::Result<u32> {
    let p: u32 = raw.trim().parse()?;
    anyhow::ensure!(
        (1..=MAX_EXPONENT).contains(&p),
        "exponent {} outside 1..={}",
        p,
        MAX_EXPONENT
    );
    Ok(p)
}

/// Parse a comma-separated exponent list. Absent, empty or malformed input
/// (any single bad entry) yields [`DEFAULT_EXPONENTS`].
pub fn parse_exponents(raw: Option<&str>) -> Vec<u32> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return DEFAULT_EXPONENTS.to_vec();
    };
    match raw.split(',').map(parse_exponent).collect::<anyhow::Result<Vec<_>>>() {
        Ok(list) => list,
        Err(e) => {
            warn!(input = raw, error = %e, "bad p_values, using defaults");
            DEFAULT_EXPONENTS.to_vec()
        }
    }
}

/// 2^(p−1) · (2^p − 1). Requires p ≥ 1.
pub fn perfect_number(p: u32) -> Integer {
    mersenne_number(p) << (p - 1)
}

pub fn derive(exponents: &[u32]) -> PerfectResult {
    let perfect_numbers = exponents
        .iter()
        .map(|&p| PerfectRecord {
            p,
            mersenne_number: mersenne_number(p).to_string(),
            perfect_number: perfect_number(p).to_string(),
        })
        .collect();
    PerfectResult { perfect_numbers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_perfect_numbers() {
        let result = derive(&[2, 3, 5, 7]);
        let got: Vec<(&str, &str)> = result
            .perfect_numbers
            .iter()
            .map(|r| (r.mersenne_number.as_str(), r.perfect_number.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![("3", "6"), ("7", "28"), ("31", "496"), ("127", "8128")]
        );
    }

    #[test]
    fn composite_mersenne_still_derived() {
        // M11 = 2047 = 23 * 89; 2^10 * 2047 = 2096128 is not perfect
        let result = derive(&[11]);
        assert_eq!(result.perfect_numbers[0].mersenne_number, "2047");
        assert_eq!(result.perfect_numbers[0].perfect_number, "2096128");
    }

    #[test]
    fn p_one() {
        assert_eq!(perfect_number(1), 1);
    }

    #[test]
    fn parse_list_with_spaces() {
        assert_eq!(parse_exponents(Some("2, 3 ,5")), vec![2, 3, 5]);
        assert_eq!(parse_exponents(Some("13")), vec![13]);
    }

    #[test]
    fn parse_fallbacks() {
        assert_eq!(parse_exponents(None), vec![2, 3]);
        assert_eq!(parse_exponents(Some("")), vec![2, 3]);
        assert_eq!(parse_exponents(Some("2,x,5")), vec![2, 3]);
        assert_eq!(parse_exponents(Some("2,,5")), vec![2, 3]);
        assert_eq!(parse_exponents(Some("0")), vec![2, 3]);
        assert_eq!(parse_exponents(Some("-3")), vec![2, 3]);
        assert_eq!(parse_exponents(Some("2000000")), vec![2, 3]);
    }

    #[test]
    fn wire_shape() {
        let json = serde_json::to_value(derive(&[2])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"perfect_numbers": [{"p": 2, "mersenne_number": "3", "perfect_number": "6"}]})
        );
    }
}

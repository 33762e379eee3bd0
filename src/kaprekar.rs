//! # Kaprekar — Streaming Search for Ascending/Descending Concatenation Primes
//!
//! candidate(n) is the decimal concatenation `1 2 … n … 2 1`:
//! candidate(1) = 1, candidate(3) = 12321, candidate(10) = 12345678910987654321.
//!
//! ## Streaming Contract
//!
//! [`KaprekarSearch`] is a lazy, finite, fused iterator of [`ProgressEvent`]s.
//! For each n it first yields `Progress { current_n, runtime_seconds }`, then on
//! the *next* pull tests candidate(n). The first prime ends the sequence with
//! `Found`; exhausting the range ends it with `NotFound`. Exactly one terminal
//! event is produced and nothing after it.
//!
//! [`stream`] runs the iterator on the blocking pool and pushes each event onto
//! a bounded `tokio::sync::mpsc` channel as soon as it exists, so the transport
//! forwards progress while the next candidate is under test. The producer stops
//! once the receiver is gone (client disconnected).
//!
//! ## Cheap Rejection
//!
//! The digit sum of candidate(n) is congruent to n(n+1)/2 + (n−1)n/2 = n², so
//! candidate(n) ≡ n² (mod 3) and every n divisible by 3 gives a multiple of 3.
//! For n ≤ 9 candidate(n) = R(n)², a perfect square. The oracle rejects both at
//! trial division, so no special-casing is needed.

use rug::Integer;
use serde::Serialize;
use std::fmt::Write;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{is_prime, round_secs};

/// One event of the Kaprekar progress stream. Serializes to the wire shapes
/// `{current_n, runtime_seconds}`, `{found: true, n, kaprekar_number,
/// runtime_seconds}` and `{found: false, runtime_seconds}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProgressEvent {
    Progress {
        current_n: u64,
        runtime_seconds: f64,
    },
    Found {
        found: Found<true>,
        n: u64,
        kaprekar_number: String,
        runtime_seconds: f64,
    },
    NotFound {
        found: Found<false>,
        runtime_seconds: f64,
    },
}

/// Serializes as the boolean literal `B`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Found<const B: bool>;

impl<const B: bool> Serialize for Found<B> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(B)
    }
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::Progress { .. })
    }
}

/// Decimal text of candidate(n). Empty for n = 0.
pub fn candidate_digits(n: u64) -> String {
    let mut s = String::new();
    for i in (1..=n).chain((1..n).rev()) {
        let _ = write!(s, "{}", i);
    }
    s
}

/// candidate(n) as an integer. n = 0 has no digits and maps to 0.
pub fn candidate(n: u64) -> Integer {
    let digits = candidate_digits(n);
    if digits.is_empty() {
        return Integer::new();
    }
    digits
        .parse()
        .expect("concatenated decimal digits always parse")
}

enum Phase {
    /// Next pull announces `n`.
    Announce(u64),
    /// Next pull tests candidate(n).
    Test(u64),
    Done,
}

/// Lazy event sequence over `start..=end` (bounds swapped if reversed).
pub struct KaprekarSearch {
    end: u64,
    mr_rounds: u32,
    started: Instant,
    phase: Phase,
}

impl KaprekarSearch {
    pub fn new(start: u64, end: u64, mr_rounds: u32) -> Self {
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        KaprekarSearch {
            end,
            mr_rounds,
            started: Instant::now(),
            phase: Phase::Announce(start),
        }
    }
}

impl Iterator for KaprekarSearch {
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.phase {
                Phase::Done => return None,
                Phase::Announce(n) => {
                    self.phase = Phase::Test(n);
                    return Some(ProgressEvent::Progress {
                        current_n: n,
                        runtime_seconds: round_secs(self.started),
                    });
                }
                Phase::Test(n) => {
                    let value = candidate(n);
                    if is_prime(&value, self.mr_rounds) {
                        self.phase = Phase::Done;
                        return Some(ProgressEvent::Found {
                            found: Found,
                            n,
                            kaprekar_number: value.to_string(),
                            runtime_seconds: round_secs(self.started),
                        });
                    }
                    if n >= self.end {
                        self.phase = Phase::Done;
                        return Some(ProgressEvent::NotFound {
                            found: Found,
                            runtime_seconds: round_secs(self.started),
                        });
                    }
                    self.phase = Phase::Announce(n + 1);
                }
            }
        }
    }
}

impl std::iter::FusedIterator for KaprekarSearch {}

/// Start the search on the blocking pool and return the receiving end of a
/// channel holding at most `buffer` undelivered events.
pub fn stream(
    start: u64,
    end: u64,
    mr_rounds: u32,
    buffer: usize,
) -> (mpsc::Receiver<ProgressEvent>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let handle = tokio::task::spawn_blocking(move || {
        for event in KaprekarSearch::new(start, end, mr_rounds) {
            let terminal = event.is_terminal();
            if let ProgressEvent::Found { n, .. } = &event {
                info!(n, "kaprekar prime found");
            }
            if tx.blocking_send(event).is_err() {
                debug!(start, end, "kaprekar stream receiver dropped, stopping");
                return;
            }
            if terminal {
                info!(start, end, "kaprekar stream complete");
            }
        }
    });
    (rx, handle)
}

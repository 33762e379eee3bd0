//! # Correlation — Last Mersenne Result Shared With Brocard
//!
//! The Brocard evaluator defaults its bounds to the first two Mersenne primes
//! found by the most recent Mersenne search. `MersenneCache` is the single slot
//! carrying that result between requests. It is an explicit context object held
//! by the server state and passed to both components; nothing is process-global.
//!
//! ## Race Semantics
//!
//! The slot is overwritten only when a Mersenne search *completes*. A Brocard
//! evaluation running concurrently with an in-flight Mersenne search reads
//! whatever snapshot was last published (possibly `Empty`). This is a benign
//! race: both results are informational snapshots, and the reader always gets
//! a complete list, never a partially written one.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One Mersenne prime 2^p − 1 as reported to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MersenneHit {
    pub p: u64,
    pub mersenne_number: String,
}

/// Observed state of the cache slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// No Mersenne search has completed in this process.
    Empty,
    /// Hits from the most recent search, in discovery (ascending p) order.
    /// May be an empty list if that search found nothing.
    Populated(Vec<MersenneHit>),
}

#[derive(Debug)]
pub struct MersenneCache {
    slot: Mutex<CacheState>,
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MersenneCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MersenneCache {
    pub fn new() -> Self {
        MersenneCache {
            slot: Mutex::new(CacheState::Empty),
        }
    }

    /// Replace the slot with the result of a finished search.
    pub fn publish(&self, hits: Vec<MersenneHit>) {
        *lock_or_recover(&self.slot) = CacheState::Populated(hits);
    }

    /// Snapshot of the current slot contents.
    pub fn snapshot(&self) -> CacheState {
        lock_or_recover(&self.slot).clone()
    }

    /// The first two published Mersenne numbers, if at least two exist.
    pub fn first_two(&self) -> Option<(String, String)> {
        match &*lock_or_recover(&self.slot) {
            CacheState::Populated(hits) if hits.len() >= 2 => Some((
                hits[0].mersenne_number.clone(),
                hits[1].mersenne_number.clone(),
            )),
            _ => None,
        }
    }
}

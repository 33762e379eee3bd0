//! # Progress — Atomic Search Progress Counters
//!
//! Progress tracking for the non-streamed searches (repunit, Mersenne,
//! palindrome, Wieferich). These can run for minutes with no output until
//! they return, so a background reporter thread logs what the search is doing
//! at a fixed interval. Counters are atomics; the current-candidate label sits
//! behind a Mutex (updated once per candidate, read once per interval).
//!
//! The reporter polls the shutdown flag every `POLL` so that a search that
//! finishes quickly does not leave a thread sleeping out a whole interval.
//! `Reporter` stops and joins the thread on drop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

const POLL: Duration = Duration::from_millis(200);

pub struct Progress {
    pub tested: AtomicU64,
    pub found: AtomicU64,
    pub current: Mutex<String>,
    search: &'static str,
    start: Instant,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new(search: &'static str) -> Arc<Self> {
        Arc::new(Progress {
            tested: AtomicU64::new(0),
            found: AtomicU64::new(0),
            current: Mutex::new(String::new()),
            search,
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Record that one candidate is about to be tested.
    pub fn set_current(&self, label: impl Into<String>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = label.into();
    }

    pub fn tick(&self) {
        self.tested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    /// Spawn the background reporter. A zero interval disables reporting.
    pub fn start_reporter(self: &Arc<Self>, interval: Duration) -> Reporter {
        if interval.is_zero() {
            return Reporter {
                progress: Arc::clone(self),
                handle: None,
            };
        }
        let progress = Arc::clone(self);
        let handle = thread::spawn(move || {
            let mut last = Instant::now();
            while !progress.shutdown.load(Ordering::Relaxed) {
                thread::sleep(POLL);
                if last.elapsed() >= interval {
                    progress.print_status();
                    last = Instant::now();
                }
            }
        });
        Reporter {
            progress: Arc::clone(self),
            handle: Some(handle),
        }
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let tested = self.tested.load(Ordering::Relaxed);
        let found = self.found.load(Ordering::Relaxed);
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let rate = if elapsed.as_secs() > 0 {
            tested as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        info!(
            search = self.search,
            current = %current,
            tested,
            rate = format_args!("{:.2}", rate),
            found,
            elapsed = format_args!("{:02}:{:02}:{:02}", h, m, s),
            "search progress"
        );
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

/// Handle to the reporter thread; stops it when dropped.
pub struct Reporter {
    progress: Arc<Progress>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.progress.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

//! # Prometheus Metrics — Exposition for the `/metrics` Endpoint
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `primeprobe_http_request_duration_seconds` | Histogram | `method`, `path`, `status` | Request latency |
//! | `primeprobe_searches` | Counter | `problem` | Searches run |
//! | `primeprobe_primes_found` | Counter | `problem` | Primes reported |
//! | `primeprobe_search_duration_seconds` | Histogram | `problem` | Search runtime |
//! | `primeprobe_streams_active` | Gauge | — | Open Kaprekar progress streams |
//!
//! The registry is rendered on each scrape.
//!
//! ## References
//!
//! - [OpenMetrics specification](https://openmetrics.io/)

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    pub path: String,
    pub status: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProblemLabel {
    pub problem: String,
}

impl ProblemLabel {
    pub fn new(problem: &str) -> Self {
        ProblemLabel {
            problem: problem.to_string(),
        }
    }
}

type HistogramCtor = fn() -> Histogram;

fn request_histogram() -> Histogram {
    // 1ms .. ~33s
    Histogram::new(exponential_buckets(0.001, 2.0, 16))
}

fn search_histogram() -> Histogram {
    // 10ms .. ~90min
    Histogram::new(exponential_buckets(0.01, 2.0, 20))
}

/// Thread-safe metrics registry. All metric handles are atomic and cheap to
/// clone; `Family` creates per-label instances on first use.
pub struct Metrics {
    pub registry: Registry,
    pub http_request_duration: Family<RequestLabels, Histogram, HistogramCtor>,
    pub searches: Family<ProblemLabel, Counter>,
    pub primes_found: Family<ProblemLabel, Counter>,
    pub search_duration: Family<ProblemLabel, Histogram, HistogramCtor>,
    pub streams_active: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_request_duration =
            Family::<RequestLabels, Histogram, HistogramCtor>::new_with_constructor(
                request_histogram,
            );
        registry.register(
            "primeprobe_http_request_duration_seconds",
            "HTTP request latency by route and status",
            http_request_duration.clone(),
        );

        let searches = Family::<ProblemLabel, Counter>::default();
        registry.register(
            "primeprobe_searches",
            "Searches run by problem",
            searches.clone(),
        );

        let primes_found = Family::<ProblemLabel, Counter>::default();
        registry.register(
            "primeprobe_primes_found",
            "Primes reported by problem",
            primes_found.clone(),
        );

        let search_duration =
            Family::<ProblemLabel, Histogram, HistogramCtor>::new_with_constructor(
                search_histogram,
            );
        registry.register(
            "primeprobe_search_duration_seconds",
            "Search runtime by problem",
            search_duration.clone(),
        );

        let streams_active = Gauge::default();
        registry.register(
            "primeprobe_streams_active",
            "Open Kaprekar progress streams",
            streams_active.clone(),
        );

        Self {
            registry,
            http_request_duration,
            searches,
            primes_found,
            search_duration,
            streams_active,
        }
    }

    /// Count one completed search and its runtime.
    pub fn record_search(&self, problem: &str, found: usize, runtime_seconds: f64) {
        let label = ProblemLabel::new(problem);
        self.searches.get_or_create(&label).inc();
        self.primes_found.get_or_create(&label).inc_by(found as u64);
        self.search_duration
            .get_or_create(&label)
            .observe(runtime_seconds);
    }

    /// Render all metrics in the OpenMetrics text format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        encode(&mut buf, &self.registry).expect("encoding metrics should not fail");
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_contains_registered_metrics() {
        let m = Metrics::new();
        m.streams_active.inc();
        m.record_search("mersenne", 7, 0.42);
        let output = m.encode();
        assert!(output.contains("primeprobe_streams_active 1"));
        assert!(output.contains("primeprobe_searches_total{problem=\"mersenne\"} 1"));
        assert!(output.contains("primeprobe_primes_found_total{problem=\"mersenne\"} 7"));
        assert!(output.contains("primeprobe_search_duration_seconds_count{problem=\"mersenne\"} 1"));
        assert!(output.ends_with("# EOF\n"));
    }

    #[test]
    fn per_problem_counters_independent() {
        let m = Metrics::new();
        m.record_search("repunit", 2, 0.1);
        m.record_search("repunit", 2, 0.1);
        m.record_search("wieferich", 2, 0.1);
        let output = m.encode();
        assert!(output.contains("primeprobe_searches_total{problem=\"repunit\"} 2"));
        assert!(output.contains("primeprobe_searches_total{problem=\"wieferich\"} 1"));
    }

    #[test]
    fn request_histogram_labels() {
        let m = Metrics::new();
        m.http_request_duration
            .get_or_create(&RequestLabels {
                method: "GET".into(),
                path: "/api/q2".into(),
                status: "200".into(),
            })
            .observe(0.003);
        let output = m.encode();
        assert!(output.contains("method=\"GET\""));
        assert!(output.contains("path=\"/api/q2\""));
        assert!(output.contains("status=\"200\""));
    }
}

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Latency samples kept for avg/percentiles; oldest are dropped first
pub const LATENCY_WINDOW: usize = 1000;

/// Global metrics collector for the recognition server.
///
/// Thread-safe and cheap to clone; every handler shares one instance.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    // Recognition outcomes
    recognitions_total: AtomicUsize,
    recognitions_success: AtomicUsize,
    recognitions_failed: AtomicUsize,
    validation_rejects: AtomicUsize,
    empty_results: AtomicUsize,

    image_bytes_total: AtomicU64,
    ocr_latency_ms: RwLock<VecDeque<u64>>,

    // Per-endpoint request counters
    endpoint_counters: DashMap<String, AtomicUsize>,

    // Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                recognitions_total: AtomicUsize::new(0),
                recognitions_success: AtomicUsize::new(0),
                recognitions_failed: AtomicUsize::new(0),
                validation_rejects: AtomicUsize::new(0),
                empty_results: AtomicUsize::new(0),
                image_bytes_total: AtomicU64::new(0),
                ocr_latency_ms: RwLock::new(VecDeque::with_capacity(LATENCY_WINDOW)),
                endpoint_counters: DashMap::new(),
                start_time: Instant::now(),
            }),
        }
    }

    /// Record one adapter call. `text_len` is `None` on failure.
    pub fn record_recognition(
        &self,
        duration: Duration,
        payload_len: usize,
        text_len: Option<usize>,
    ) {
        self.inner.recognitions_total.fetch_add(1, Ordering::Relaxed);
        self.inner
            .image_bytes_total
            .fetch_add(payload_len as u64, Ordering::Relaxed);
        match text_len {
            Some(len) => {
                self.inner.recognitions_success.fetch_add(1, Ordering::Relaxed);
                if len == 0 {
                    self.inner.empty_results.fetch_add(1, Ordering::Relaxed);
                }
            }
            None => {
                self.inner.recognitions_failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        let mut latency = self.inner.ocr_latency_ms.write();
        if latency.len() == LATENCY_WINDOW {
            latency.pop_front();
        }
        latency.push_back(duration.as_millis() as u64);
    }

    pub fn record_validation_reject(&self) {
        self.inner.validation_rejects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_endpoint_request(&self, endpoint: &str) {
        self.inner
            .endpoint_counters
            .entry(endpoint.to_string())
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn endpoint_requests(&self, endpoint: &str) -> usize {
        self.inner
            .endpoint_counters
            .get(endpoint)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Number of latency samples currently retained
    pub fn latency_samples(&self) -> usize {
        self.inner.ocr_latency_ms.read().len()
    }

    // Get snapshot for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        let latency: Vec<u64> = self.inner.ocr_latency_ms.read().iter().copied().collect();
        let ocr_latency_avg_ms = avg(&latency);
        let ocr_latency_p50_ms = percentile(&latency, 0.5);
        let ocr_latency_p95_ms = percentile(&latency, 0.95);

        let endpoint_requests = self
            .inner
            .endpoint_counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();

        let total = self.inner.recognitions_total.load(Ordering::Relaxed);
        let success = self.inner.recognitions_success.load(Ordering::Relaxed);
        let success_rate = if total > 0 {
            success as f64 / total as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            recognitions_total: total,
            recognitions_success: success,
            recognitions_failed: self.inner.recognitions_failed.load(Ordering::Relaxed),
            success_rate,
            validation_rejects: self.inner.validation_rejects.load(Ordering::Relaxed),
            empty_results: self.inner.empty_results.load(Ordering::Relaxed),
            image_bytes_total: self.inner.image_bytes_total.load(Ordering::Relaxed),
            ocr_latency_avg_ms,
            ocr_latency_p50_ms,
            ocr_latency_p95_ms,
            endpoint_requests,
            uptime_seconds: self.inner.start_time.elapsed().as_secs(),
        }
    }

    /// Generate Prometheus-format metrics
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut output = format!(
            r#"# HELP recognitions_total Total number of OCR invocations
# TYPE recognitions_total counter
recognitions_total {{}} {}

# HELP recognitions_success Number of successful OCR invocations
# TYPE recognitions_success counter
recognitions_success {{}} {}

# HELP recognitions_failed Number of failed OCR invocations
# TYPE recognitions_failed counter
recognitions_failed {{}} {}

# HELP validation_rejects_total Requests rejected for missing image data
# TYPE validation_rejects_total counter
validation_rejects_total {{}} {}

# HELP empty_results_total Successful recognitions that produced no text
# TYPE empty_results_total counter
empty_results_total {{}} {}

# HELP image_bytes_total Decoded image bytes handed to the OCR engine
# TYPE image_bytes_total counter
image_bytes_total {{}} {}

# HELP ocr_latency_ms OCR latency in milliseconds
# TYPE ocr_latency_ms gauge
ocr_latency_ms {{stat="avg"}} {}
ocr_latency_ms {{stat="p50"}} {}
ocr_latency_ms {{stat="p95"}} {}

# HELP uptime_seconds Application uptime in seconds
# TYPE uptime_seconds counter
uptime_seconds {{}} {}
"#,
            snapshot.recognitions_total,
            snapshot.recognitions_success,
            snapshot.recognitions_failed,
            snapshot.validation_rejects,
            snapshot.empty_results,
            snapshot.image_bytes_total,
            snapshot.ocr_latency_avg_ms,
            snapshot.ocr_latency_p50_ms,
            snapshot.ocr_latency_p95_ms,
            snapshot.uptime_seconds,
        );

        if !snapshot.endpoint_requests.is_empty() {
            output.push_str(
                "\n# HELP http_requests_total Requests handled per endpoint\n\
                 # TYPE http_requests_total counter\n",
            );
            for (endpoint, count) in &snapshot.endpoint_requests {
                let _ = writeln!(
                    output,
                    "http_requests_total {{endpoint=\"{}\"}} {}",
                    endpoint, count
                );
            }
        }

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub recognitions_total: usize,
    pub recognitions_success: usize,
    pub recognitions_failed: usize,
    pub success_rate: f64,
    pub validation_rejects: usize,
    pub empty_results: usize,
    pub image_bytes_total: u64,
    pub ocr_latency_avg_ms: u64,
    pub ocr_latency_p50_ms: u64,
    pub ocr_latency_p95_ms: u64,
    pub endpoint_requests: BTreeMap<String, usize>,
    pub uptime_seconds: u64,
}

fn percentile(values: &[u64], p: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let idx = ((values.len() as f64 - 1.0) * p) as usize;
    sorted[idx]
}

fn avg(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.iter().sum::<u64>() / values.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_recognition(Duration::from_millis(100), 2048, Some(12));
        metrics.record_recognition(Duration::from_millis(300), 1024, Some(0));
        metrics.record_recognition(Duration::from_millis(50), 10, None);
        metrics.record_validation_reject();
        metrics.record_endpoint_request("/api/recognize");
        metrics.record_endpoint_request("/api/recognize");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.recognitions_total, 3);
        assert_eq!(snapshot.recognitions_success, 2);
        assert_eq!(snapshot.recognitions_failed, 1);
        assert_eq!(snapshot.empty_results, 1);
        assert_eq!(snapshot.validation_rejects, 1);
        assert_eq!(snapshot.image_bytes_total, 3082);
        assert_eq!(snapshot.ocr_latency_avg_ms, 150);
        assert_eq!(snapshot.ocr_latency_p50_ms, 100);
        assert_eq!(metrics.endpoint_requests("/api/recognize"), 2);
        assert_eq!(metrics.endpoint_requests("/health"), 0);
        assert_eq!(snapshot.endpoint_requests.get("/api/recognize"), Some(&2));
        assert!(!snapshot.endpoint_requests.contains_key("/health"));
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let metrics = Metrics::new();

        // Old slow samples fall out of the window
        for _ in 0..500 {
            metrics.record_recognition(Duration::from_millis(900), 1, Some(1));
        }
        for _ in 0..LATENCY_WINDOW {
            metrics.record_recognition(Duration::from_millis(10), 1, Some(1));
        }

        assert_eq!(metrics.latency_samples(), LATENCY_WINDOW);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.recognitions_total, 500 + LATENCY_WINDOW);
        assert_eq!(snapshot.ocr_latency_avg_ms, 10);
        assert_eq!(snapshot.ocr_latency_p95_ms, 10);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.record_recognition(Duration::from_millis(100), 500, Some(3));

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("recognitions_total {} 1"));
        assert!(prometheus.contains("image_bytes_total {} 500"));
        assert!(prometheus.contains("ocr_latency_ms {stat=\"avg\"} 100"));
        assert!(!prometheus.contains("http_requests_total"));
    }

    #[test]
    fn test_prometheus_exports_endpoint_counters() {
        let metrics = Metrics::new();
        metrics.record_endpoint_request("/api/recognize");
        metrics.record_endpoint_request("/api/recognize");
        metrics.record_endpoint_request("/health");

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("# TYPE http_requests_total counter"));
        assert!(prometheus.contains("http_requests_total {endpoint=\"/api/recognize\"} 2"));
        assert!(prometheus.contains("http_requests_total {endpoint=\"/health\"} 1"));
    }
}

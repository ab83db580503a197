//! Request metrics
//!
//! Prometheus-style counters for HTTP traffic, plus the domain-level
//! outcomes a site office watches: rejected writes and auth failures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info_span, Instrument};

/// Metrics collector
pub struct Metrics {
    pub http_requests_total: AtomicU64,
    pub http_requests_2xx: AtomicU64,
    pub http_requests_4xx: AtomicU64,
    pub http_requests_5xx: AtomicU64,
    pub http_request_duration_ms_total: AtomicU64,
    pub active_requests: AtomicU64,
    /// 401 answers
    pub auth_failures: AtomicU64,
    /// 403 answers
    pub access_denied: AtomicU64,
    /// 422 answers, including insufficient stock
    pub rule_violations: AtomicU64,
    /// 409 answers from lost races or finished requests
    pub write_conflicts: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            http_requests_2xx: AtomicU64::new(0),
            http_requests_4xx: AtomicU64::new(0),
            http_requests_5xx: AtomicU64::new(0),
            http_request_duration_ms_total: AtomicU64::new(0),
            active_requests: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
            access_denied: AtomicU64::new(0),
            rule_violations: AtomicU64::new(0),
            write_conflicts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an HTTP request
    pub fn record_request(&self, status: StatusCode, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_duration_ms_total
            .fetch_add(duration_ms, Ordering::Relaxed);

        let code = status.as_u16();
        if (200..300).contains(&code) {
            self.http_requests_2xx.fetch_add(1, Ordering::Relaxed);
        } else if (400..500).contains(&code) {
            self.http_requests_4xx.fetch_add(1, Ordering::Relaxed);
        } else if code >= 500 {
            self.http_requests_5xx.fetch_add(1, Ordering::Relaxed);
        }

        let outcome = match status {
            StatusCode::UNAUTHORIZED => Some(&self.auth_failures),
            StatusCode::FORBIDDEN => Some(&self.access_denied),
            StatusCode::UNPROCESSABLE_ENTITY => Some(&self.rule_violations),
            StatusCode::CONFLICT => Some(&self.write_conflicts),
            _ => None,
        };
        if let Some(counter) = outcome {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn request_started(&self) {
        self.active_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_finished(&self) {
        self.active_requests.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        let mut output = String::new();

        let mut metric = |name: &str, kind: &str, help: &str, lines: &[(String, u64)]| {
            output.push_str(&format!("# HELP {} {}\n# TYPE {} {}\n", name, help, name, kind));
            for (labels, value) in lines {
                output.push_str(&format!("{}{} {}\n", name, labels, value));
            }
        };

        metric(
            "http_requests_total",
            "counter",
            "Total number of HTTP requests",
            &[(String::new(), load(&self.http_requests_total))],
        );
        metric(
            "http_requests_by_status",
            "counter",
            "HTTP requests by status code range",
            &[
                ("{status=\"2xx\"}".to_string(), load(&self.http_requests_2xx)),
                ("{status=\"4xx\"}".to_string(), load(&self.http_requests_4xx)),
                ("{status=\"5xx\"}".to_string(), load(&self.http_requests_5xx)),
            ],
        );
        metric(
            "http_request_duration_ms_total",
            "counter",
            "Total HTTP request duration in milliseconds",
            &[(String::new(), load(&self.http_request_duration_ms_total))],
        );
        metric(
            "http_active_requests",
            "gauge",
            "Requests currently being served",
            &[(String::new(), load(&self.active_requests))],
        );
        metric(
            "buildtrack_rejections_total",
            "counter",
            "Requests refused by authentication or a domain rule",
            &[
                ("{reason=\"unauthorized\"}".to_string(), load(&self.auth_failures)),
                ("{reason=\"access_denied\"}".to_string(), load(&self.access_denied)),
                ("{reason=\"rule_violation\"}".to_string(), load(&self.rule_violations)),
                ("{reason=\"conflict\"}".to_string(), load(&self.write_conflicts)),
            ],
        );
        metric(
            "uptime_seconds",
            "gauge",
            "Server uptime in seconds",
            &[(String::new(), self.uptime_seconds())],
        );

        output
    }

    /// Export metrics as JSON
    pub fn export_json(&self) -> serde_json::Value {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        serde_json::json!({
            "http": {
                "requestsTotal": load(&self.http_requests_total),
                "requests2xx": load(&self.http_requests_2xx),
                "requests4xx": load(&self.http_requests_4xx),
                "requests5xx": load(&self.http_requests_5xx),
                "requestDurationMsTotal": load(&self.http_request_duration_ms_total),
                "activeRequests": load(&self.active_requests),
            },
            "rejections": {
                "unauthorized": load(&self.auth_failures),
                "accessDenied": load(&self.access_denied),
                "ruleViolation": load(&self.rule_violations),
                "conflict": load(&self.write_conflicts),
            },
            "uptimeSeconds": self.uptime_seconds(),
        })
    }
}

/// Metrics middleware
pub async fn metrics_middleware(
    State(metrics): State<Arc<Metrics>>,
    request: axum::extract::Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().path().to_string();

    metrics.request_started();

    let response = next
        .run(request)
        .instrument(info_span!("http_request", %method, %uri))
        .await;

    let duration = start.elapsed();
    let status = response.status();

    debug!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    metrics.record_request(status, duration.as_millis() as u64);
    metrics.request_finished();

    response
}

/// GET /metrics
pub async fn prometheus_metrics(State(metrics): State<Arc<Metrics>>) -> String {
    metrics.export_prometheus()
}

/// GET /metrics.json
pub async fn json_metrics(State(metrics): State<Arc<Metrics>>) -> axum::Json<serde_json::Value> {
    axum::Json(metrics.export_json())
}

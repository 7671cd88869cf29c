/*!
 * # Metrics Module
 *
 * In-process counters, gauges and histograms for the API.
 *
 * Metrics are exposed as Prometheus text at `/metrics` and as JSON at
 * `/metrics/json`. Business counters are bumped by the event processor.
 */

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge holding an `f64` as raw bits.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    bits: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Count and sum of observations, sum kept in microunits.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    sum_micros: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, value: f64) {
        let micros = (value.max(0.0) * 1_000_000.0) as u64;
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }
}

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<String, Counter>,
    gauges: DashMap<String, Gauge>,
    histograms: DashMap<String, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_gauge(&self, name: &str) -> Gauge {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(Gauge::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    /// Prometheus text exposition, sorted by metric name.
    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let mut output = String::new();

        let mut counters: Vec<_> = self
            .counters
            .iter()
            .map(|e| (e.key().clone(), e.value().get()))
            .collect();
        counters.sort();
        for (name, value) in counters {
            output.push_str(&format!("# TYPE {} counter\n{} {}\n", name, name, value));
        }

        let mut gauges: Vec<_> = self
            .gauges
            .iter()
            .map(|e| (e.key().clone(), e.value().get()))
            .collect();
        gauges.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in gauges {
            if !value.is_finite() {
                return Err(MetricsError::ExportError(format!(
                    "gauge {} is not finite",
                    name
                )));
            }
            output.push_str(&format!("# TYPE {} gauge\n{} {}\n", name, name, value));
        }

        let mut histograms: Vec<_> = self
            .histograms
            .iter()
            .map(|e| (e.key().clone(), e.value().get_count(), e.value().get_sum()))
            .collect();
        histograms.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, count, sum) in histograms {
            output.push_str(&format!(
                "# TYPE {} summary\n{}_count {}\n{}_sum {}\n",
                name, name, count, name, sum
            ));
        }

        Ok(output)
    }

    pub fn export_metrics_json(&self) -> serde_json::Value {
        let counters: serde_json::Map<_, _> = self
            .counters
            .iter()
            .map(|e| (e.key().clone(), json!(e.value().get())))
            .collect();
        let gauges: serde_json::Map<_, _> = self
            .gauges
            .iter()
            .map(|e| (e.key().clone(), json!(e.value().get())))
            .collect();
        let histograms: serde_json::Map<_, _> = self
            .histograms
            .iter()
            .map(|e| {
                (
                    e.key().clone(),
                    json!({ "count": e.value().get_count(), "sum": e.value().get_sum() }),
                )
            })
            .collect();

        json!({
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }
}

lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

pub fn increment_counter(name: &str) {
    METRICS.get_or_create_counter(name).inc();
}

pub fn set_gauge(name: &str, value: f64) {
    METRICS.get_or_create_gauge(name).set(value);
}

pub fn observe_histogram(name: &str, value: f64) {
    METRICS.get_or_create_histogram(name).observe(value);
}

/// Domain counters driven by [`crate::events::process_events`].
pub struct BusinessMetrics {
    pub orders_created: Counter,
    pub orders_cancelled: Counter,
    pub order_status_changes: Counter,
    pub payments_created: Counter,
    pub payment_status_changes: Counter,
    pub refunds_requested: Counter,
    pub refunds_processed: Counter,
    pub deliveries_assigned: Counter,
    pub deliveries_completed: Counter,
    pub reviews_created: Counter,
    pub notifications_sent: Counter,
}

impl BusinessMetrics {
    pub fn new() -> Self {
        Self {
            orders_created: METRICS.get_or_create_counter("orders_created_total"),
            orders_cancelled: METRICS.get_or_create_counter("orders_cancelled_total"),
            order_status_changes: METRICS.get_or_create_counter("order_status_changes_total"),
            payments_created: METRICS.get_or_create_counter("payments_created_total"),
            payment_status_changes: METRICS
                .get_or_create_counter("payment_status_changes_total"),
            refunds_requested: METRICS.get_or_create_counter("refunds_requested_total"),
            refunds_processed: METRICS.get_or_create_counter("refunds_processed_total"),
            deliveries_assigned: METRICS.get_or_create_counter("deliveries_assigned_total"),
            deliveries_completed: METRICS.get_or_create_counter("deliveries_completed_total"),
            reviews_created: METRICS.get_or_create_counter("reviews_created_total"),
            notifications_sent: METRICS.get_or_create_counter("notifications_sent_total"),
        }
    }
}

impl Default for BusinessMetrics {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HttpMetrics {
    pub requests_total: Counter,
    pub request_duration: Histogram,
    pub status_2xx: Counter,
    pub status_4xx: Counter,
    pub status_5xx: Counter,
}

impl HttpMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: METRICS.get_or_create_counter("http_requests_total"),
            request_duration: METRICS.get_or_create_histogram("http_request_duration_seconds"),
            status_2xx: METRICS.get_or_create_counter("http_status_2xx_total"),
            status_4xx: METRICS.get_or_create_counter("http_status_4xx_total"),
            status_5xx: METRICS.get_or_create_counter("http_status_5xx_total"),
        }
    }

    pub fn record_request(&self, duration: Duration, status_code: u16) {
        self.requests_total.inc();
        self.request_duration.observe(duration.as_secs_f64());

        match status_code {
            200..=299 => self.status_2xx.inc(),
            400..=499 => self.status_4xx.inc(),
            500..=599 => self.status_5xx.inc(),
            _ => {}
        }
    }
}

impl Default for HttpMetrics {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    pub static ref BUSINESS_METRICS: BusinessMetrics = BusinessMetrics::new();
    pub static ref HTTP_METRICS: HttpMetrics = HttpMetrics::new();
}

/// Records request count, latency and status class.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    HTTP_METRICS.record_request(start.elapsed(), response.status().as_u16());
    response
}

pub async fn metrics_handler() -> Result<Response, MetricsError> {
    let body = METRICS.export_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

pub async fn metrics_json_handler() -> Json<serde_json::Value> {
    Json(METRICS.export_metrics_json())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_keeps_fractional_values() {
        let gauge = Gauge::new();
        gauge.set(12.75);
        assert_eq!(gauge.get(), 12.75);
    }

    #[test]
    fn export_lists_counters_in_prometheus_format() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("orders_created_total").inc_by(3);
        registry.get_or_create_histogram("latency_seconds").observe(0.5);

        let text = registry.export_metrics().unwrap();
        assert!(text.contains("# TYPE orders_created_total counter\norders_created_total 3\n"));
        assert!(text.contains("latency_seconds_count 1\n"));
        assert!(text.contains("latency_seconds_sum 0.5\n"));

        let json = registry.export_metrics_json();
        assert_eq!(json["counters"]["orders_created_total"], 3);
    }
}

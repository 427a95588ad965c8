// rust/ttlc-otel/src/tracer.rs
// Process-local span and metric collection
// Records are exported by the caller (stats output); there is no
// network export in the core

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpanStatus {
    Ok,
    Error,
    Unset,
}

#[derive(Debug, Clone, Serialize)]
pub struct Span {
    pub name: String,
    pub start_time_ms: u64,
    pub end_time_ms: Option<u64>,
    pub attributes: Attributes,
    pub status: SpanStatus,
}

#[derive(Debug, Clone, Serialize)]
pub enum MetricValue {
    Counter(u64),
    Gauge(f64),
}

#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
    pub timestamp_ms: u64,
    pub attributes: Attributes,
}

/// Collects spans and metrics for one compilation. The endpoint, when
/// configured, is recorded so an exporter outside the core can pick
/// the batch up.
#[derive(Debug, Default)]
pub struct Tracer {
    spans: Vec<Span>,
    metrics: Vec<Metric>,
    endpoint: Option<String>,
}

impl Tracer {
    pub fn new(endpoint: Option<String>) -> Tracer {
        Tracer {
            spans: Vec::new(),
            metrics: Vec::new(),
            endpoint,
        }
    }

    pub fn start_span(&mut self, name: &str) -> usize {
        self.spans.push(Span {
            name: name.to_string(),
            start_time_ms: now_ms(),
            end_time_ms: None,
            attributes: Attributes::new(),
            status: SpanStatus::Unset,
        });
        self.spans.len() - 1
    }

    pub fn end_span(&mut self, handle: usize, status: SpanStatus) {
        if let Some(span) = self.spans.get_mut(handle) {
            span.end_time_ms = Some(now_ms());
            span.status = status;
        }
    }

    pub fn record_metric(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    pub fn counter(&mut self, name: &str, value: u64) {
        self.metrics.push(Metric {
            name: name.to_string(),
            value: MetricValue::Counter(value),
            timestamp_ms: now_ms(),
            attributes: Attributes::new(),
        });
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_lifecycle() {
        let mut t = Tracer::new(None);
        let h = t.start_span("compile");
        t.end_span(h, SpanStatus::Ok);
        assert_eq!(t.spans().len(), 1);
        assert_eq!(t.spans()[0].status, SpanStatus::Ok);
        assert!(t.spans()[0].end_time_ms.is_some());
    }

    #[test]
    fn test_counter_metric() {
        let mut t = Tracer::new(Some("http://localhost:4317".to_string()));
        t.counter("triples", 42);
        assert_eq!(t.metrics().len(), 1);
        assert_eq!(t.endpoint(), Some("http://localhost:4317"));
    }
}

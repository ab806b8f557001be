//! Analytics sink collaborator.
//!
//! Metrics forward finished measurements to an [`AnalyticsSink`] as timing
//! events. Delivery is fire-and-forget; any batching or asynchronous
//! transport is the sink's own concern.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// A user timing event dispatched to an analytics backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingEvent {
    /// Grouping category for the timing
    pub category: String,
    /// Label identifying the measurement, by default the metric name
    pub label: String,
    /// Measured value rounded to whole milliseconds
    pub value_ms: u64,
}

impl TimingEvent {
    /// Create a timing event, rounding the duration to whole milliseconds.
    pub fn new(category: &str, label: &str, duration_ms: f64) -> Self {
        Self {
            category: category.to_string(),
            label: label.to_string(),
            value_ms: duration_ms.round() as u64,
        }
    }
}

/// Destination for timing events.
pub trait AnalyticsSink: Send + Sync {
    /// Accept one timing event.
    fn timing(&self, event: TimingEvent);
}

/// Sink that captures events in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TimingEvent>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured events, in dispatch order.
    pub fn events(&self) -> Vec<TimingEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of captured events.
    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all captured events.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl AnalyticsSink for MemorySink {
    fn timing(&self, event: TimingEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Sink that emits each event as a structured log line.
///
/// Useful as a stand-in when no real backend is wired up.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl AnalyticsSink for TracingSink {
    fn timing(&self, event: TimingEvent) {
        tracing::info!(
            target: "appmetrics::analytics",
            category = %event.category,
            label = %event.label,
            value_ms = event.value_ms,
            "timing event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_event_rounds_value() {
        let event = TimingEvent::new("perf", "load", 12.6);
        assert_eq!(event.value_ms, 13);

        let event = TimingEvent::new("perf", "load", 12.4);
        assert_eq!(event.value_ms, 12);
    }

    #[test]
    fn test_memory_sink_captures_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.timing(TimingEvent::new("perf", "first", 1.0));
        sink.timing(TimingEvent::new("perf", "second", 2.0));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "first");
        assert_eq!(events[1].label, "second");
    }

    #[test]
    fn test_memory_sink_clear() {
        let sink = MemorySink::new();
        sink.timing(TimingEvent::new("perf", "load", 5.0));
        assert_eq!(sink.len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_timing_event_serialization_roundtrip() {
        let event = TimingEvent::new("perf", "load", 42.0);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"valueMs\":42"));

        let parsed: TimingEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}

//! Duration Metrics
//!
//! This crate records named duration measurements against a host-provided
//! timeline and optionally forwards them to an analytics backend. It
//! supports:
//!
//! - Write-once start/end measurement with warning-only idempotent no-ops
//! - Timeline annotation (mark/measure) when the host supports it, with a
//!   graceful fallback to plain timestamp diffing when it does not
//! - Runtime capability detection, probed per call so the embedding
//!   environment can change underneath the library
//! - User timing dispatch to a pluggable analytics sink, never sending
//!   unmeasured metrics
//!
//! # Example
//!
//! ```rust
//! use appmetrics::{MemorySink, Metric, RecordingTimeline};
//! use std::sync::Arc;
//!
//! let timeline = Arc::new(RecordingTimeline::new());
//! let sink = Arc::new(MemorySink::new());
//!
//! let mut metric = Metric::new("page_load", timeline)
//!     .unwrap()
//!     .with_analytics(sink.clone());
//!
//! metric.start();
//! std::thread::sleep(std::time::Duration::from_millis(2)); // the work being measured
//! metric.end().log().send_to_analytics("perf");
//!
//! assert_eq!(sink.len(), 1);
//! ```
//!
//! # Modules
//!
//! - [`metric`] - The [`Metric`] measurement type
//! - [`timeline`] - Clock/timeline collaborator trait and in-memory recorder
//! - [`analytics`] - Analytics sink trait and reference sinks
//! - [`error`] - Error types

pub mod analytics;
mod error;
pub mod metric;
pub mod timeline;

pub use analytics::{AnalyticsSink, MemorySink, TimingEvent, TracingSink};
pub use error::{MetricError, MetricResult};
pub use metric::{Metric, NO_MEASUREMENT};
pub use timeline::{Capabilities, EntryType, RecordingTimeline, Timeline, TimelineEntry};

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_full_measurement_flow() {
        let timeline = Arc::new(RecordingTimeline::new());
        let sink = Arc::new(MemorySink::new());

        let mut metric = Metric::new("load", timeline.clone())
            .unwrap()
            .with_analytics(sink.clone());

        metric.start();
        sleep(Duration::from_millis(10));
        metric.end();
        metric.send_to_analytics("perf");

        // Exactly one dispatch with the metric's own label.
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, "perf");
        assert_eq!(events[0].label, "load");

        // The timeline carries both marks and the computed span.
        assert_eq!(timeline.entries_by_name("mark_load_start").len(), 1);
        assert_eq!(timeline.entries_by_name("mark_load_end").len(), 1);
        assert_eq!(timeline.entries_by_name("load").len(), 1);
        assert_eq!(
            timeline.entries_by_name("load")[0].entry_type,
            EntryType::Measure
        );
    }

    #[test]
    fn test_degraded_host_without_annotation() {
        let timeline = Arc::new(RecordingTimeline::with_capabilities(true, false));
        let sink = Arc::new(MemorySink::new());

        let mut metric = Metric::new("load", timeline.clone())
            .unwrap()
            .with_analytics(sink.clone());

        metric.start();
        sleep(Duration::from_millis(5));
        metric.end();
        metric.send_to_analytics("perf");

        // Measurement still works from the manual diff.
        assert_eq!(sink.len(), 1);
        // But the timeline was never annotated.
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_repeated_measurements_share_timeline_history() {
        let timeline = Arc::new(RecordingTimeline::new());

        for _ in 0..3 {
            let mut metric = Metric::new("save", timeline.clone()).unwrap();
            metric.start();
            metric.end();
        }

        // The shared history retains every computed span; logAll-style
        // queries see all of them.
        assert_eq!(timeline.entries_by_name("save").len(), 3);

        let mut reader = Metric::new("save", timeline).unwrap();
        reader.log_all();
    }

    #[test]
    fn test_capability_loss_after_construction() {
        let timeline = Arc::new(RecordingTimeline::new());
        let mut metric = Metric::new("load", timeline.clone()).unwrap();

        metric.start();
        timeline.set_mark_supported(false);
        metric.end();

        // Only the start mark landed; no end mark, no measure.
        assert_eq!(timeline.entries_by_name("mark_load_start").len(), 1);
        assert!(timeline.entries_by_name("mark_load_end").is_empty());
        assert!(timeline.entries_by_name("load").is_empty());

        // Duration falls back to the manual diff.
        assert_ne!(metric.duration(), NO_MEASUREMENT);
    }

    #[test]
    fn test_synthetic_duration_without_measuring() {
        let sink = Arc::new(MemorySink::new());
        let mut metric = Metric::new("external", Arc::new(RecordingTimeline::new()))
            .unwrap()
            .with_analytics(sink.clone());

        // Never started or ended; an explicit duration still dispatches.
        metric.send_to_analytics_as("perf", "external", 250.0);

        assert_eq!(sink.events()[0].value_ms, 250);
        assert_eq!(metric.duration(), NO_MEASUREMENT);
    }
}

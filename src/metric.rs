//! Named duration measurements.
//!
//! A [`Metric`] records one measurement between a `start()` and an `end()`
//! call, annotates the host timeline when the host supports it, and can
//! forward the result to an analytics sink as a user timing event.

use std::sync::Arc;

use crate::analytics::{AnalyticsSink, TimingEvent};
use crate::error::{MetricError, MetricResult};
use crate::timeline::{Capabilities, EntryType, Timeline};

/// Sentinel duration meaning "no measurement yet".
pub const NO_MEASUREMENT: f64 = -1.0;

/// A single named duration measurement.
///
/// Start and end times are write-once: a second `start()` or `end()` warns
/// and leaves the first timestamp intact. There is no reset; a fresh
/// measurement requires a fresh instance.
///
/// # Example
///
/// ```rust
/// use appmetrics::{Metric, RecordingTimeline};
/// use std::sync::Arc;
///
/// let timeline = Arc::new(RecordingTimeline::new());
/// let mut metric = Metric::new("page_load", timeline).unwrap();
///
/// metric.start();
/// std::thread::sleep(std::time::Duration::from_millis(2)); // the work being measured
/// metric.end().log();
///
/// assert!(metric.duration() >= 0.0);
/// ```
#[derive(Clone)]
pub struct Metric {
    name: String,
    start_time: Option<f64>,
    end_time: Option<f64>,
    timeline: Arc<dyn Timeline>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl Metric {
    /// Create a metric measured against the given timeline.
    ///
    /// Fails with [`MetricError::InvalidName`] if the name is empty. If the
    /// timeline cannot annotate (no mark/measure support) a warning is
    /// emitted; if it additionally lacks now-timing, fails with
    /// [`MetricError::UnsupportedEnvironment`] since no measurement is
    /// possible at all.
    pub fn new(name: impl Into<String>, timeline: Arc<dyn Timeline>) -> MetricResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(MetricError::InvalidName);
        }

        let caps = Capabilities::probe(timeline.as_ref());
        if !caps.mark {
            tracing::warn!(
                target: "appmetrics::metric",
                metric = %name,
                "timeline won't be annotated"
            );

            if !caps.now {
                return Err(MetricError::UnsupportedEnvironment);
            }
        }

        Ok(Self {
            name,
            start_time: None,
            end_time: None,
            timeline,
            analytics: None,
        })
    }

    /// Attach an analytics sink for [`Metric::send_to_analytics`].
    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    /// Name of this metric.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recorded start time, if `start()` has been called.
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Recorded end time, if `end()` has been called.
    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// True if the timeline currently supports now-timing.
    ///
    /// Probed fresh on every call; the embedding environment may change.
    pub fn supports_perf_now(&self) -> bool {
        self.timeline.supports_now()
    }

    /// True if the timeline currently supports mark/measure annotation.
    pub fn supports_perf_mark(&self) -> bool {
        self.timeline.supports_mark()
    }

    /// Begin the measurement.
    ///
    /// Records the current time as the start time and, when supported,
    /// places a `mark_<name>_start` annotation in the timeline. Calling
    /// again warns and changes nothing.
    pub fn start(&mut self) -> &mut Self {
        if self.start_time.is_some() {
            tracing::warn!(
                target: "appmetrics::metric",
                metric = %self.name,
                "recording already started"
            );
            return self;
        }

        self.start_time = Some(self.timeline.now());

        if self.supports_perf_mark() {
            self.timeline.mark(&self.start_mark());
        }

        self
    }

    /// End the measurement.
    ///
    /// Records the current time as the end time and, when supported, places
    /// a `mark_<name>_end` annotation and asks the timeline to compute the
    /// named span between the two marks. Calling again warns and changes
    /// nothing.
    pub fn end(&mut self) -> &mut Self {
        if self.end_time.is_some() {
            tracing::warn!(
                target: "appmetrics::metric",
                metric = %self.name,
                "recording already stopped"
            );
            return self;
        }

        self.end_time = Some(self.timeline.now());

        if self.supports_perf_mark() {
            let start_mark = self.start_mark();
            let end_mark = self.end_mark();
            self.timeline.mark(&end_mark);
            self.timeline.measure(&self.name, &start_mark, &end_mark);
        }

        self
    }

    /// Duration of the measurement in milliseconds, or [`NO_MEASUREMENT`]
    /// (-1) if none has been made.
    ///
    /// The baseline is the manual `end - start` diff. When annotation is
    /// supported, the first timeline entry under this name that is not a
    /// measure overrides the baseline; a platform-recorded entry is richer
    /// than the manual diff. Note this preference can hide a discrepancy
    /// between the two sources.
    pub fn duration(&self) -> f64 {
        let mut duration = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end - start,
            _ => f64::NAN,
        };

        if self.supports_perf_mark() {
            let entry = self
                .timeline
                .entries_by_name(&self.name)
                .into_iter()
                .find(|e| e.entry_type != EntryType::Measure);
            if let Some(entry) = entry {
                duration = entry.duration;
            }
        }

        if duration.is_nan() || duration == 0.0 {
            NO_MEASUREMENT
        } else {
            duration
        }
    }

    /// Emit the metric's duration as a diagnostic line.
    pub fn log(&mut self) -> &mut Self {
        tracing::info!(
            target: "appmetrics::metric",
            metric = %self.name,
            duration = self.duration(),
            "ms"
        );
        self
    }

    /// Emit one diagnostic line per timeline entry recorded under this
    /// metric's name.
    pub fn log_all(&mut self) -> &mut Self {
        let name = self.name.clone();
        self.log_all_named(&name)
    }

    /// Emit one diagnostic line per timeline entry recorded under `name`.
    ///
    /// Useful when several measurements share a name over a session.
    pub fn log_all_named(&mut self, name: &str) -> &mut Self {
        if self.supports_perf_now() {
            for entry in self.timeline.entries_by_name(name) {
                tracing::info!(
                    target: "appmetrics::metric",
                    metric = %name,
                    duration = entry.duration,
                    "ms"
                );
            }
        }
        self
    }

    /// Send the measured duration to the analytics sink as a user timing
    /// event under the given category.
    ///
    /// Warns and does nothing when no sink is attached. Never dispatches an
    /// unmeasured metric (duration of -1).
    pub fn send_to_analytics(&mut self, category: &str) -> &mut Self {
        let label = self.name.clone();
        let duration = self.duration();
        self.dispatch_timing(category, &label, duration);
        self
    }

    /// Send an explicit label and duration, ignoring this metric's own
    /// measurement.
    ///
    /// Lets a caller report a synthetic or externally measured duration
    /// without performing `start()`/`end()`.
    pub fn send_to_analytics_as(
        &mut self,
        category: &str,
        label: &str,
        duration_ms: f64,
    ) -> &mut Self {
        self.dispatch_timing(category, label, duration_ms);
        self
    }

    fn dispatch_timing(&self, category: &str, label: &str, duration_ms: f64) {
        let sink = match &self.analytics {
            Some(sink) => sink,
            None => {
                tracing::warn!(
                    target: "appmetrics::metric",
                    metric = %self.name,
                    "analytics sink has not been attached"
                );
                return;
            }
        };

        if duration_ms >= 0.0 {
            sink.timing(TimingEvent::new(category, label, duration_ms));
        }
    }

    fn start_mark(&self) -> String {
        format!("mark_{}_start", self.name)
    }

    fn end_mark(&self) -> String {
        format!("mark_{}_end", self.name)
    }
}

impl std::fmt::Debug for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metric")
            .field("name", &self.name)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("has_analytics", &self.analytics.is_some())
            .finish()
    }
}

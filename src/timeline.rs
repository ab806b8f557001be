//! Clock and timeline collaborator.
//!
//! A [`Timeline`] provides monotonic "now" timestamps and, when the host
//! supports it, mark/measure annotations that land in a shared, append-only
//! entry history queryable by name. Both capabilities are probed per call
//! rather than cached, since an embedding environment may gain or lose them
//! at runtime.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Kind of entry recorded in a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Zero-duration annotation placed by [`Timeline::mark`]
    Mark,
    /// Duration-bearing span computed by [`Timeline::measure`]
    Measure,
    /// Platform-recorded resource fetch timing
    Resource,
    /// Platform-recorded navigation timing
    Navigation,
}

/// A single entry in a timeline's history.
///
/// Times are in milliseconds relative to the timeline's epoch. Mark entries
/// carry a duration of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Name the entry was recorded under
    pub name: String,
    /// Kind of entry
    pub entry_type: EntryType,
    /// When the entry starts, in milliseconds since the timeline epoch
    pub start_time: f64,
    /// Duration in milliseconds (zero for marks)
    pub duration: f64,
}

impl TimelineEntry {
    /// Create a new timeline entry.
    pub fn new(name: impl Into<String>, entry_type: EntryType, start_time: f64, duration: f64) -> Self {
        Self {
            name: name.into(),
            entry_type,
            start_time,
            duration,
        }
    }
}

/// Clock and annotation service consumed by [`crate::Metric`].
///
/// Implementations own a shared, append-only entry history. The history is
/// never cleared by metrics; it may retain entries across many measurements
/// sharing a name.
pub trait Timeline: Send + Sync {
    /// True if the timeline can produce monotonic "now" timestamps.
    fn supports_now(&self) -> bool;

    /// True if the timeline additionally supports mark/measure annotation.
    fn supports_mark(&self) -> bool;

    /// Monotonic milliseconds since an arbitrary epoch.
    fn now(&self) -> f64;

    /// Append a zero-duration annotation under the given label.
    fn mark(&self, label: &str);

    /// Append a duration-bearing annotation spanning two previously placed
    /// marks. If either mark is missing the request is a warned no-op.
    fn measure(&self, name: &str, start_label: &str, end_label: &str);

    /// All entries recorded under `name`, ordered by recording time.
    ///
    /// Re-reads the current history on every call.
    fn entries_by_name(&self, name: &str) -> Vec<TimelineEntry>;
}

/// Snapshot of a timeline's capabilities.
///
/// Probed fresh on each call site that needs it; never cached across
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether now-timing is available
    pub now: bool,
    /// Whether mark/measure annotation is available
    pub mark: bool,
}

impl Capabilities {
    /// Probe a timeline's current capabilities.
    pub fn probe(timeline: &dyn Timeline) -> Self {
        Self {
            now: timeline.supports_now(),
            mark: timeline.supports_mark(),
        }
    }
}

/// In-memory [`Timeline`] backed by [`Instant`].
///
/// The entry history lives behind a mutex so one instance can back many
/// metrics through an `Arc`. Capability flags can be toggled at runtime to
/// simulate degraded hosts.
#[derive(Debug)]
pub struct RecordingTimeline {
    epoch: Instant,
    entries: Mutex<Vec<TimelineEntry>>,
    now_supported: AtomicBool,
    mark_supported: AtomicBool,
}

impl RecordingTimeline {
    /// Create a fully capable timeline with its epoch at now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            entries: Mutex::new(Vec::new()),
            now_supported: AtomicBool::new(true),
            mark_supported: AtomicBool::new(true),
        }
    }

    /// Create a timeline with explicit capability flags.
    pub fn with_capabilities(now: bool, mark: bool) -> Self {
        Self {
            now_supported: AtomicBool::new(now),
            mark_supported: AtomicBool::new(mark),
            ..Self::new()
        }
    }

    /// Enable or disable now-timing.
    pub fn set_now_supported(&self, supported: bool) {
        self.now_supported.store(supported, Ordering::Relaxed);
    }

    /// Enable or disable mark/measure annotation.
    pub fn set_mark_supported(&self, supported: bool) {
        self.mark_supported.store(supported, Ordering::Relaxed);
    }

    /// Total number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a pre-built entry directly.
    ///
    /// Lets a host seed the history with platform entries (resource or
    /// navigation timings) the way a real timeline would.
    pub fn record(&self, entry: TimelineEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    /// Remove all mark entries, optionally restricted to one label.
    pub fn clear_marks(&self, label: Option<&str>) {
        self.clear_entries(EntryType::Mark, label);
    }

    /// Remove all measure entries, optionally restricted to one name.
    pub fn clear_measures(&self, name: Option<&str>) {
        self.clear_entries(EntryType::Measure, name);
    }

    fn clear_entries(&self, entry_type: EntryType, name: Option<&str>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|e| {
                e.entry_type != entry_type || name.map(|n| e.name != n).unwrap_or(false)
            });
        }
    }

    fn last_mark(&self, label: &str) -> Option<TimelineEntry> {
        let entries = self.entries.lock().ok()?;
        entries
            .iter()
            .rev()
            .find(|e| e.entry_type == EntryType::Mark && e.name == label)
            .cloned()
    }
}

impl Default for RecordingTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline for RecordingTimeline {
    fn supports_now(&self) -> bool {
        self.now_supported.load(Ordering::Relaxed)
    }

    fn supports_mark(&self) -> bool {
        self.mark_supported.load(Ordering::Relaxed)
    }

    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn mark(&self, label: &str) {
        let at = self.now();
        self.record(TimelineEntry::new(label, EntryType::Mark, at, 0.0));
    }

    fn measure(&self, name: &str, start_label: &str, end_label: &str) {
        let (start, end) = match (self.last_mark(start_label), self.last_mark(end_label)) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                tracing::warn!(
                    target: "appmetrics::timeline",
                    measure = name,
                    start_label,
                    end_label,
                    "cannot measure: one or both marks are missing"
                );
                return;
            }
        };

        self.record(TimelineEntry::new(
            name,
            EntryType::Measure,
            start.start_time,
            end.start_time - start.start_time,
        ));
    }

    fn entries_by_name(&self, name: &str) -> Vec<TimelineEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().filter(|e| e.name == name).cloned().collect())
            .unwrap_or_default()
    }
}
